//! Login, logout, and token validation. Owns the auth cookie shape.

use crate::api::guard::{AuthSubject, AUTH_COOKIE};
use crate::api::AppState;
use crate::error::ApiError;
use crate::password;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/validate-token", get(validate_token_handler))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Session cookie: httpOnly, SameSite=Lax, 24h, Secure when behind TLS.
pub fn auth_cookie(token: String, production: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(production)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(24))
        .build()
}

fn removal_cookie() -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, "")).path("/").build()
}

/// POST /api/auth/login
async fn login_handler(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    // Unknown email and wrong password are indistinguishable to the caller.
    let user = state
        .store
        .users
        .find_by_email(&request.email)
        .ok_or(ApiError::InvalidCredentials)?;

    if !password::verify_password(&request.password, &user.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(user.id, user.role)?;
    let jar = jar.add(auth_cookie(token, state.config.production));
    Ok((jar, Json(json!({ "userId": user.id }))))
}

/// POST /api/auth/logout - clears the cookie; the token itself simply expires.
async fn logout_handler(jar: CookieJar) -> (CookieJar, Json<Value>) {
    (
        jar.remove(removal_cookie()),
        Json(json!({ "message": "signed out" })),
    )
}

/// GET /api/auth/validate-token
async fn validate_token_handler(subject: AuthSubject) -> Json<Value> {
    Json(json!({ "userId": subject.user_id }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_cookie_attributes() {
        let cookie = auth_cookie("tok".to_string(), false);
        assert_eq!(cookie.name(), AUTH_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(24)));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_auth_cookie_secure_in_production() {
        let cookie = auth_cookie("tok".to_string(), true);
        assert_eq!(cookie.secure(), Some(true));
    }
}
