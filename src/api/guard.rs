//! Authentication extractor and role-capability enforcement.
//!
//! Handlers receive an `AuthSubject` only after the bearer cookie has been
//! verified; role checks run after that, against one capability table shared
//! by every privileged route.

use crate::api::AppState;
use crate::error::ApiError;
use crate::model::Role;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use uuid::Uuid;

/// Name of the cookie carrying the session token.
pub const AUTH_COOKIE: &str = "auth_token";

/// The authenticated caller, as resolved from a verified session token.
#[derive(Debug, Clone, Copy)]
pub struct AuthSubject {
    pub user_id: Uuid,
    pub role: Role,
}

/// Role-gated operations. One table maps each to its allowed role set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create and manage one's own hotel listings.
    ManageOwnListings,
    /// Place a booking on a listing.
    BookStay,
    /// List, edit, and cancel one's own bookings.
    ManageOwnBookings,
    /// Directory-wide subject and listing administration.
    AdministerDirectory,
}

impl Capability {
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Capability::ManageOwnListings => &[Role::Host, Role::Admin],
            Capability::BookStay | Capability::ManageOwnBookings => {
                &[Role::Guest, Role::Host, Role::Admin]
            }
            Capability::AdministerDirectory => &[Role::Admin],
        }
    }
}

impl AuthSubject {
    /// Role check; only ever evaluated on an already-authenticated subject.
    pub fn require(&self, capability: Capability) -> Result<(), ApiError> {
        if capability.allowed_roles().contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

impl FromRequestParts<Arc<AppState>> for AuthSubject {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        // A missing cookie is itself a 401, not a 400.
        let token = jar
            .get(AUTH_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or(ApiError::Unauthorized)?;

        // Malformed, tampered, and expired all collapse into the same
        // generic outcome.
        let ctx = state
            .tokens
            .verify(&token)
            .map_err(|_| ApiError::Unauthorized)?;

        Ok(AuthSubject {
            user_id: ctx.user_id,
            role: ctx.role,
        })
    }
}
