//! Registration, the current-account view, and admin directory operations.

use crate::api::guard::{AuthSubject, Capability};
use crate::api::{session, AppState};
use crate::config::AdminBootstrap;
use crate::error::ApiError;
use crate::model::{Role, User};
use crate::password;
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register_handler))
        .route("/me", get(me_handler))
        .route("/all", get(list_users_handler))
        .route("/{id}", delete(delete_user_handler))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

fn validate_register(request: &RegisterRequest) -> Vec<String> {
    let mut errors = Vec::new();
    if request.first_name.trim().is_empty() {
        errors.push("First name is required".to_string());
    }
    if request.last_name.trim().is_empty() {
        errors.push("Last name is required".to_string());
    }
    if !EMAIL_RE.is_match(request.email.trim()) {
        errors.push("A valid email is required".to_string());
    }
    if request.password.len() < 6 {
        errors.push("Password with 6 or more characters required".to_string());
    }
    errors
}

/// Decide the role a registration ends up with.
///
/// "guest" and "host" are open to anyone. The admin role is granted only
/// when the submitted email and password exactly match the reserved
/// credential pair - and then it is granted regardless of the requested
/// role. Every other role value is rejected.
fn resolve_role(request: &RegisterRequest, reserved: &AdminBootstrap) -> Result<Role, String> {
    if request.email == reserved.email && request.password == reserved.password.expose_secret() {
        return Ok(Role::Admin);
    }
    match request.role.as_str() {
        "guest" => Ok(Role::Guest),
        "host" => Ok(Role::Host),
        _ => Err("Role must be either 'guest' or 'host'".to_string()),
    }
}

/// POST /api/users/register
async fn register_handler(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let mut errors = validate_register(&request);
    let role = resolve_role(&request, &state.config.admin).unwrap_or_else(|message| {
        errors.push(message);
        Role::Guest
    });
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let user = User {
        id: Uuid::new_v4(),
        email: request.email.trim().to_string(),
        password_hash: password::hash_password(&request.password)?,
        first_name: request.first_name.trim().to_string(),
        last_name: request.last_name.trim().to_string(),
        role,
    };
    let user_id = user.id;

    state
        .store
        .users
        .insert(user)
        .map_err(|_| ApiError::invalid("User already exists"))?;

    let token = state.tokens.issue(user_id, role)?;
    let jar = jar.add(session::auth_cookie(token, state.config.production));
    Ok((jar, Json(json!({ "userId": user_id }))))
}

/// GET /api/users/me - the caller's own account, hash never included.
async fn me_handler(
    subject: AuthSubject,
    State(state): State<Arc<AppState>>,
) -> Result<Json<User>, ApiError> {
    state
        .store
        .users
        .get(subject.user_id)
        .map(Json)
        .ok_or(ApiError::NotFound("User"))
}

/// GET /api/users/all - every non-admin account.
async fn list_users_handler(
    subject: AuthSubject,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<User>>, ApiError> {
    subject.require(Capability::AdministerDirectory)?;
    Ok(Json(state.store.users.list_non_admin()))
}

/// DELETE /api/users/{id}
async fn delete_user_handler(
    subject: AuthSubject,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    subject.require(Capability::AdministerDirectory)?;
    state
        .store
        .users
        .remove(id)
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(json!({ "message": "User deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn reserved() -> AdminBootstrap {
        AdminBootstrap {
            email: "root@example.com".to_string(),
            password: SecretString::from("root-password"),
            first_name: "Site".to_string(),
            last_name: "Admin".to_string(),
        }
    }

    fn request(email: &str, password: &str, role: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_open_roles_are_accepted() {
        assert_eq!(
            resolve_role(&request("jane@example.com", "hunter22", "guest"), &reserved()),
            Ok(Role::Guest)
        );
        assert_eq!(
            resolve_role(&request("jane@example.com", "hunter22", "host"), &reserved()),
            Ok(Role::Host)
        );
    }

    #[test]
    fn test_admin_without_reserved_credentials_is_rejected() {
        assert!(resolve_role(&request("jane@example.com", "hunter22", "admin"), &reserved()).is_err());
        // Right email, wrong password.
        assert!(resolve_role(&request("root@example.com", "guess", "admin"), &reserved()).is_err());
    }

    #[test]
    fn test_reserved_pair_grants_admin_whatever_role_was_asked() {
        for role in ["admin", "guest", "host"] {
            assert_eq!(
                resolve_role(&request("root@example.com", "root-password", role), &reserved()),
                Ok(Role::Admin)
            );
        }
    }

    #[test]
    fn test_unknown_role_values_are_rejected() {
        assert!(resolve_role(&request("jane@example.com", "hunter22", "superuser"), &reserved()).is_err());
        assert!(resolve_role(&request("jane@example.com", "hunter22", ""), &reserved()).is_err());
    }

    #[test]
    fn test_validate_register_reports_one_message_per_field() {
        let bad = RegisterRequest {
            first_name: " ".to_string(),
            last_name: String::new(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            role: "guest".to_string(),
        };
        let errors = validate_register(&bad);
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_validate_register_accepts_a_clean_payload() {
        assert!(validate_register(&request("jane@example.com", "hunter22", "guest")).is_empty());
    }
}
