//! Domain types shared by the store and the HTTP surface.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role attached to every account; determines which operations it may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    Host,
    Admin,
}

/// A registered account.
///
/// The password hash is an Argon2id PHC string and is never serialized into
/// any response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// A hotel listing, exclusively owned by the account that created it.
///
/// Bookings live embedded inside the listing; they have no independent
/// existence.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub city: String,
    pub country: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub price_per_night: f64,
    pub star_rating: u8,
    pub facilities: Vec<String>,
    pub image_urls: Vec<String>,
    pub bookings: Vec<Booking>,
    pub last_updated: DateTime<Utc>,
}

/// A booking embedded in a hotel's booking list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adult_count: u32,
    pub child_count: u32,
}

/// Partial update for a booking; only present fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPatch {
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub adult_count: Option<u32>,
    pub child_count: Option<u32>,
}

impl BookingPatch {
    /// Apply the present fields to `booking` in place.
    pub fn apply(&self, booking: &mut Booking) {
        if let Some(check_in) = self.check_in {
            booking.check_in = check_in;
        }
        if let Some(check_out) = self.check_out {
            booking.check_out = check_out;
        }
        if let Some(adult_count) = self.adult_count {
            booking.adult_count = adult_count;
        }
        if let Some(child_count) = self.child_count {
            booking.child_count = child_count;
        }
    }
}

/// Validate stay constraints; returns one message per violated rule.
///
/// Empty result means the stay is acceptable. Run after any patch is applied
/// and before anything is persisted.
pub fn validate_stay(check_in: NaiveDate, check_out: NaiveDate, adult_count: u32) -> Vec<String> {
    let mut errors = Vec::new();
    if check_in >= check_out {
        errors.push("Check-in must be before check-out".to_string());
    }
    if adult_count < 1 {
        errors.push("At least one adult is required".to_string());
    }
    errors
}
