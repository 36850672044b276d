//! Public listing surface, booking placement, and admin listing removal.

use crate::api::guard::{AuthSubject, Capability};
use crate::api::AppState;
use crate::error::ApiError;
use crate::model::{validate_stay, Booking, Hotel};
use crate::recommend;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Suggestions returned when the caller does not ask for a specific count.
const DEFAULT_RECOMMENDATIONS: usize = 3;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_hotels_handler))
        .route("/{id}", get(get_hotel_handler).delete(delete_hotel_handler))
        .route("/{id}/recommendations", get(recommendations_handler))
        .route("/{id}/bookings", post(create_booking_handler))
}

/// GET /api/hotels - unauthenticated browse path, newest first.
async fn list_hotels_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Hotel>> {
    Json(state.store.hotels.list_all())
}

/// GET /api/hotels/{id}
async fn get_hotel_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Hotel>, ApiError> {
    state
        .store
        .hotels
        .get(id)
        .map(Json)
        .ok_or(ApiError::NotFound("Hotel"))
}

#[derive(Debug, Deserialize)]
struct RecommendParams {
    k: Option<usize>,
}

/// GET /api/hotels/{id}/recommendations
///
/// Similarity-ordered suggestions around the given listing; falls back to a
/// random sample when nothing scores above zero.
async fn recommendations_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<Vec<Hotel>>, ApiError> {
    let reference = state
        .store
        .hotels
        .get(id)
        .ok_or(ApiError::NotFound("Hotel"))?;
    let k = params.k.unwrap_or(DEFAULT_RECOMMENDATIONS);

    let candidates = state.store.hotels.list_all();
    let mut picks = recommend::recommend(&reference, &candidates, k);
    if picks.is_empty() {
        let others: Vec<Hotel> = candidates
            .into_iter()
            .filter(|h| h.id != reference.id)
            .collect();
        picks = recommend::fallback_sample(&others, k);
    }
    Ok(Json(picks))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBookingRequest {
    first_name: String,
    last_name: String,
    email: String,
    check_in: NaiveDate,
    check_out: NaiveDate,
    adult_count: u32,
    #[serde(default)]
    child_count: u32,
}

/// POST /api/hotels/{id}/bookings
///
/// Reached only after the payment collaborator has confirmed the charge;
/// this endpoint persists the booking, nothing more.
async fn create_booking_handler(
    subject: AuthSubject,
    State(state): State<Arc<AppState>>,
    Path(hotel_id): Path<Uuid>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    subject.require(Capability::BookStay)?;

    let errors = validate_stay(request.check_in, request.check_out, request.adult_count);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let booking = Booking {
        id: Uuid::new_v4(),
        user_id: subject.user_id,
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
        check_in: request.check_in,
        check_out: request.check_out,
        adult_count: request.adult_count,
        child_count: request.child_count,
    };

    state
        .store
        .hotels
        .append_booking(hotel_id, booking)
        .map(|b| (StatusCode::CREATED, Json(b)))
        .ok_or(ApiError::NotFound("Hotel"))
}

/// DELETE /api/hotels/{id} - removes the listing and every embedded booking.
async fn delete_hotel_handler(
    subject: AuthSubject,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    subject.require(Capability::AdministerDirectory)?;
    state
        .store
        .hotels
        .remove(id)
        .ok_or(ApiError::NotFound("Hotel"))?;
    Ok(Json(json!({ "message": "Hotel deleted" })))
}
