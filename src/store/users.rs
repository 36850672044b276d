//! User directory - accounts keyed by id, with a unique email index.

use crate::config::AdminBootstrap;
use crate::model::{Role, User};
use crate::password;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use secrecy::ExposeSecret;
use thiserror::Error;
use uuid::Uuid;

/// Registration failed because the email is already registered.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("email is already registered")]
pub struct EmailTaken;

/// Directory of all registered accounts.
///
/// Email uniqueness is enforced at the index: claiming an address is a single
/// entry operation, so two concurrent registrations of the same email cannot
/// both succeed.
pub struct UserDirectory {
    users: DashMap<Uuid, User>,
    email_index: DashMap<String, Uuid>,
}

fn email_key(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            email_index: DashMap::new(),
        }
    }

    /// Add a new account. Fails if the email is already claimed.
    pub fn insert(&self, user: User) -> Result<(), EmailTaken> {
        match self.email_index.entry(email_key(&user.email)) {
            Entry::Occupied(_) => return Err(EmailTaken),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }
        self.users.insert(user.id, user);
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).map(|u| u.clone())
    }

    /// Look up an account by email, case-insensitively.
    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let id = *self.email_index.get(&email_key(email))?;
        self.users.get(&id).map(|u| u.clone())
    }

    /// Delete an account. Irreversible; frees the email for reuse.
    pub fn remove(&self, id: Uuid) -> Option<User> {
        let (_, user) = self.users.remove(&id)?;
        self.email_index
            .remove_if(&email_key(&user.email), |_, mapped| *mapped == id);
        Some(user)
    }

    /// Change an account's role. Returns the updated account.
    pub fn set_role(&self, id: Uuid, role: Role) -> Option<User> {
        let mut user = self.users.get_mut(&id)?;
        user.role = role;
        Some(user.clone())
    }

    /// All accounts except admins, ordered by email. Password hashes stay
    /// inside the returned `User` values but are skipped on serialization.
    pub fn list_non_admin(&self) -> Vec<User> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|u| u.role != Role::Admin)
            .map(|u| u.clone())
            .collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        users
    }

    pub fn count(&self) -> usize {
        self.users.len()
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Ensure the configured admin account exists, exactly once, at startup.
///
/// Creates the account when the reserved email is unknown, promotes it when
/// it exists with a lesser role, and does nothing otherwise.
pub fn reconcile_admin(directory: &UserDirectory, bootstrap: &AdminBootstrap) -> anyhow::Result<()> {
    match directory.find_by_email(&bootstrap.email) {
        Some(existing) if existing.role == Role::Admin => {}
        Some(existing) => {
            directory.set_role(existing.id, Role::Admin);
            eprintln!("[store] promoted {} to admin", bootstrap.email);
        }
        None => {
            let user = User {
                id: Uuid::new_v4(),
                email: bootstrap.email.clone(),
                password_hash: password::hash_password(bootstrap.password.expose_secret())?,
                first_name: bootstrap.first_name.clone(),
                last_name: bootstrap.last_name.clone(),
                role: Role::Admin,
            };
            // The reserved email cannot be taken here: reconciliation runs
            // before the server accepts requests.
            directory
                .insert(user)
                .map_err(|e| anyhow::anyhow!("admin bootstrap: {}", e))?;
            eprintln!("[store] created admin account {}", bootstrap.email);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use std::sync::Arc;

    fn user(email: &str, role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: "$argon2id$test".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role,
        }
    }

    #[test]
    fn test_insert_and_lookup() {
        let directory = UserDirectory::new();
        let u = user("jane@example.com", Role::Guest);
        let id = u.id;
        directory.insert(u).unwrap();

        assert_eq!(directory.get(id).unwrap().email, "jane@example.com");
        assert_eq!(directory.find_by_email("JANE@example.COM").unwrap().id, id);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let directory = UserDirectory::new();
        directory.insert(user("jane@example.com", Role::Guest)).unwrap();
        assert_eq!(
            directory.insert(user("Jane@Example.com", Role::Host)),
            Err(EmailTaken)
        );
        assert_eq!(directory.count(), 1);
    }

    #[test]
    fn test_concurrent_registration_of_same_email_admits_exactly_one() {
        let directory = Arc::new(UserDirectory::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let directory = Arc::clone(&directory);
                std::thread::spawn(move || directory.insert(user("race@example.com", Role::Guest)))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();

        assert_eq!(winners, 1);
        assert_eq!(directory.count(), 1);
    }

    #[test]
    fn test_remove_frees_the_email() {
        let directory = UserDirectory::new();
        let u = user("jane@example.com", Role::Guest);
        let id = u.id;
        directory.insert(u).unwrap();

        assert!(directory.remove(id).is_some());
        assert!(directory.find_by_email("jane@example.com").is_none());
        assert!(directory.insert(user("jane@example.com", Role::Host)).is_ok());
    }

    #[test]
    fn test_remove_unknown_id_is_none() {
        let directory = UserDirectory::new();
        assert!(directory.remove(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_list_non_admin_excludes_admins() {
        let directory = UserDirectory::new();
        directory.insert(user("b@example.com", Role::Guest)).unwrap();
        directory.insert(user("a@example.com", Role::Host)).unwrap();
        directory.insert(user("root@example.com", Role::Admin)).unwrap();

        let listed = directory.list_non_admin();
        let emails: Vec<&str> = listed.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["a@example.com", "b@example.com"]);
    }

    fn bootstrap() -> AdminBootstrap {
        AdminBootstrap {
            email: "root@example.com".to_string(),
            password: SecretString::from("bootstrap-pw-1"),
            first_name: "Site".to_string(),
            last_name: "Admin".to_string(),
        }
    }

    #[test]
    fn test_reconcile_creates_missing_admin() {
        let directory = UserDirectory::new();
        reconcile_admin(&directory, &bootstrap()).unwrap();

        let admin = directory.find_by_email("root@example.com").unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(crate::password::verify_password("bootstrap-pw-1", &admin.password_hash).unwrap());
    }

    #[test]
    fn test_reconcile_promotes_existing_account() {
        let directory = UserDirectory::new();
        directory.insert(user("root@example.com", Role::Guest)).unwrap();

        reconcile_admin(&directory, &bootstrap()).unwrap();
        let admin = directory.find_by_email("root@example.com").unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(directory.count(), 1);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let directory = UserDirectory::new();
        reconcile_admin(&directory, &bootstrap()).unwrap();
        let first = directory.find_by_email("root@example.com").unwrap();

        reconcile_admin(&directory, &bootstrap()).unwrap();
        let second = directory.find_by_email("root@example.com").unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(directory.count(), 1);
    }
}
