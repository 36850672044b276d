//! The caller's own bookings: list, cancel, edit.
//!
//! Cancel and edit are conditional mutations keyed on (hotel, booking,
//! caller); a booking that does not exist and a booking owned by someone
//! else produce the same 404.

use crate::api::guard::{AuthSubject, Capability};
use crate::api::AppState;
use crate::error::ApiError;
use crate::model::{BookingPatch, Hotel};
use crate::store::hotels::BookingError;
use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_my_bookings_handler))
        .route(
            "/{hotel_id}/{booking_id}",
            delete(cancel_booking_handler).put(edit_booking_handler),
        )
}

/// GET /api/my-bookings - each listing the caller has booked, carrying only
/// the caller's bookings.
async fn list_my_bookings_handler(
    subject: AuthSubject,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Hotel>>, ApiError> {
    subject.require(Capability::ManageOwnBookings)?;
    Ok(Json(state.store.hotels.bookings_for_user(subject.user_id)))
}

/// DELETE /api/my-bookings/{hotel_id}/{booking_id}
async fn cancel_booking_handler(
    subject: AuthSubject,
    State(state): State<Arc<AppState>>,
    Path((hotel_id, booking_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, ApiError> {
    subject.require(Capability::ManageOwnBookings)?;
    if state
        .store
        .hotels
        .remove_booking(hotel_id, booking_id, subject.user_id)
    {
        Ok(Json(json!({ "message": "Booking cancelled" })))
    } else {
        Err(ApiError::NotFound("Booking"))
    }
}

/// PUT /api/my-bookings/{hotel_id}/{booking_id}
async fn edit_booking_handler(
    subject: AuthSubject,
    State(state): State<Arc<AppState>>,
    Path((hotel_id, booking_id)): Path<(Uuid, Uuid)>,
    Json(patch): Json<BookingPatch>,
) -> Result<Json<Value>, ApiError> {
    subject.require(Capability::ManageOwnBookings)?;
    match state
        .store
        .hotels
        .patch_booking(hotel_id, booking_id, subject.user_id, &patch)
    {
        Ok(booking) => Ok(Json(
            json!({ "message": "Booking updated", "booking": booking }),
        )),
        Err(BookingError::NotFound) => Err(ApiError::NotFound("Booking")),
        Err(BookingError::Invalid(messages)) => Err(ApiError::Validation(messages)),
    }
}
