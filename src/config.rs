//! Service configuration.
//!
//! Defaults first, then environment overrides. The reserved admin credential
//! pair is part of the configuration and is reconciled once at startup; no
//! module holds privileged state of its own.

use secrecy::SecretString;

/// Top-level service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP server listens on
    pub port: u16,
    /// Origin allowed to make credentialed cross-site requests
    pub frontend_origin: String,
    /// Directory uploaded images are written to (served under /uploads)
    pub upload_dir: String,
    /// Whether the service runs behind TLS; controls the Secure cookie flag
    pub production: bool,
    /// HMAC secret for session tokens
    pub jwt_secret: SecretString,
    /// Reserved admin account, ensured to exist at startup
    pub admin: AdminBootstrap,
}

/// The one privileged account the service guarantees to exist.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            frontend_origin: "http://localhost:5173".to_string(),
            upload_dir: "uploads".to_string(),
            production: false,
            jwt_secret: SecretString::from("dev-secret-change-me"),
            admin: AdminBootstrap::default(),
        }
    }
}

impl Default for AdminBootstrap {
    fn default() -> Self {
        Self {
            email: "admin@stayhub.local".to_string(),
            password: SecretString::from("change-me-123"),
            first_name: "Site".to_string(),
            last_name: "Admin".to_string(),
        }
    }
}

impl AppConfig {
    /// Build a configuration from defaults plus environment overrides.
    ///
    /// Recognized variables:
    ///   STAYHUB_PORT, STAYHUB_FRONTEND_ORIGIN, STAYHUB_UPLOAD_DIR,
    ///   STAYHUB_ENV (production enables the Secure cookie flag),
    ///   STAYHUB_JWT_SECRET, STAYHUB_ADMIN_EMAIL, STAYHUB_ADMIN_PASSWORD
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("STAYHUB_PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }

        if let Ok(origin) = std::env::var("STAYHUB_FRONTEND_ORIGIN") {
            config.frontend_origin = origin;
        }

        if let Ok(dir) = std::env::var("STAYHUB_UPLOAD_DIR") {
            config.upload_dir = dir;
        }

        if let Ok(env) = std::env::var("STAYHUB_ENV") {
            config.production = env == "production";
        }

        if let Ok(secret) = std::env::var("STAYHUB_JWT_SECRET") {
            config.jwt_secret = SecretString::from(secret);
        }

        if let Ok(email) = std::env::var("STAYHUB_ADMIN_EMAIL") {
            config.admin.email = email;
        }

        if let Ok(password) = std::env::var("STAYHUB_ADMIN_PASSWORD") {
            config.admin.password = SecretString::from(password);
        }

        config
    }
}
