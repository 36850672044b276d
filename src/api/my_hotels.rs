//! Listing management for hosts: create, list, fetch, update.
//!
//! Both mutating routes take multipart form data (scalar fields plus image
//! files). The form is parsed into a typed value and validated before any
//! core logic or upload runs.

use crate::api::guard::{AuthSubject, Capability};
use crate::api::AppState;
use crate::error::ApiError;
use crate::model::Hotel;
use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Upload limits, enforced during validation.
const MAX_IMAGES: usize = 6;
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_hotel_handler).get(list_my_hotels_handler))
        .route("/{id}", get(get_my_hotel_handler).put(update_hotel_handler))
}

#[derive(Debug)]
struct UploadedImage {
    file_name: String,
    bytes: Vec<u8>,
}

/// Raw multipart fields, before validation.
#[derive(Default)]
struct HotelForm {
    name: Option<String>,
    city: Option<String>,
    country: Option<String>,
    description: Option<String>,
    kind: Option<String>,
    price_per_night: Option<String>,
    star_rating: Option<String>,
    facilities: Vec<String>,
    image_urls: Vec<String>,
    images: Vec<UploadedImage>,
}

/// Validated payload for a new listing.
#[derive(Debug)]
struct NewHotel {
    name: String,
    city: String,
    country: String,
    description: String,
    kind: String,
    price_per_night: f64,
    star_rating: u8,
    facilities: Vec<String>,
}

/// Validated payload for a listing update. Absent scalars keep their stored
/// value; the image URL list always replaces the stored one.
#[derive(Debug)]
struct HotelUpdate {
    name: Option<String>,
    city: Option<String>,
    country: Option<String>,
    description: Option<String>,
    kind: Option<String>,
    price_per_night: Option<f64>,
    star_rating: Option<u8>,
    facilities: Option<Vec<String>>,
    image_urls: Vec<String>,
}

async fn field_text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|_| ApiError::invalid("Malformed multipart payload"))
}

impl HotelForm {
    async fn collect(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| ApiError::invalid("Malformed multipart payload"))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match name.as_str() {
                "imageFiles" => {
                    let file_name = field.file_name().unwrap_or("image").to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|_| ApiError::invalid("Malformed multipart payload"))?;
                    form.images.push(UploadedImage {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
                "facilities" => form.facilities.push(field_text(field).await?),
                "imageUrls" => form.image_urls.push(field_text(field).await?),
                "name" => form.name = Some(field_text(field).await?),
                "city" => form.city = Some(field_text(field).await?),
                "country" => form.country = Some(field_text(field).await?),
                "description" => form.description = Some(field_text(field).await?),
                "type" => form.kind = Some(field_text(field).await?),
                "pricePerNight" => form.price_per_night = Some(field_text(field).await?),
                "starRating" => form.star_rating = Some(field_text(field).await?),
                _ => {}
            }
        }
        Ok(form)
    }

    fn validate_create(self) -> Result<(NewHotel, Vec<UploadedImage>), ApiError> {
        let mut errors = Vec::new();

        let name = required(self.name, "Name is required", &mut errors);
        let city = required(self.city, "City is required", &mut errors);
        let country = required(self.country, "Country is required", &mut errors);
        let description = required(self.description, "Description is required", &mut errors);
        let kind = required(self.kind, "Hotel type is required", &mut errors);

        let price_per_night = match self.price_per_night.as_deref().map(str::trim) {
            Some(raw) => match raw.parse::<f64>() {
                Ok(price) if price > 0.0 => price,
                Ok(_) => {
                    errors.push("Price per night must be greater than zero".to_string());
                    0.0
                }
                Err(_) => {
                    errors.push("Price per night is required and must be a number".to_string());
                    0.0
                }
            },
            None => {
                errors.push("Price per night is required and must be a number".to_string());
                0.0
            }
        };

        let star_rating = match self.star_rating.as_deref().map(str::trim) {
            Some(raw) => match raw.parse::<u8>() {
                Ok(stars) if (1..=5).contains(&stars) => stars,
                _ => {
                    errors.push("Star rating must be a number between 1 and 5".to_string());
                    0
                }
            },
            None => {
                errors.push("Star rating must be a number between 1 and 5".to_string());
                0
            }
        };

        if self.facilities.is_empty() {
            errors.push("Facilities are required".to_string());
        }

        if self.images.is_empty() {
            errors.push("At least one image is required".to_string());
        }
        validate_images(&self.images, &mut errors);

        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        Ok((
            NewHotel {
                name,
                city,
                country,
                description,
                kind,
                price_per_night,
                star_rating,
                facilities: self.facilities,
            },
            self.images,
        ))
    }

    fn validate_update(self) -> Result<(HotelUpdate, Vec<UploadedImage>), ApiError> {
        let mut errors = Vec::new();

        let price_per_night = match self.price_per_night.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<f64>() {
                Ok(price) if price > 0.0 => Some(price),
                _ => {
                    errors.push("Price per night must be a number greater than zero".to_string());
                    None
                }
            },
        };

        let star_rating = match self.star_rating.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<u8>() {
                Ok(stars) if (1..=5).contains(&stars) => Some(stars),
                _ => {
                    errors.push("Star rating must be a number between 1 and 5".to_string());
                    None
                }
            },
        };

        validate_images(&self.images, &mut errors);

        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        Ok((
            HotelUpdate {
                name: supplied(self.name),
                city: supplied(self.city),
                country: supplied(self.country),
                description: supplied(self.description),
                kind: supplied(self.kind),
                price_per_night,
                star_rating,
                facilities: if self.facilities.is_empty() {
                    None
                } else {
                    Some(self.facilities)
                },
                image_urls: self.image_urls,
            },
            self.images,
        ))
    }
}

fn required(value: Option<String>, message: &str, errors: &mut Vec<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => {
            errors.push(message.to_string());
            String::new()
        }
    }
}

/// Empty strings count as "not supplied" on update.
fn supplied(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_images(images: &[UploadedImage], errors: &mut Vec<String>) {
    if images.len() > MAX_IMAGES {
        errors.push("A maximum of 6 images is allowed".to_string());
    }
    if images.iter().any(|i| i.bytes.len() > MAX_IMAGE_BYTES) {
        errors.push("Images must be 5MB or smaller".to_string());
    }
}

/// POST /api/my-hotels
async fn create_hotel_handler(
    subject: AuthSubject,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Hotel>), ApiError> {
    subject.require(Capability::ManageOwnListings)?;

    let form = HotelForm::collect(multipart).await?;
    let (new_hotel, images) = form.validate_create()?;

    let mut image_urls = Vec::with_capacity(images.len());
    for image in &images {
        image_urls.push(state.images.save(&image.file_name, &image.bytes)?);
    }

    let hotel = Hotel {
        id: Uuid::new_v4(),
        owner_id: subject.user_id,
        name: new_hotel.name,
        city: new_hotel.city,
        country: new_hotel.country,
        description: new_hotel.description,
        kind: new_hotel.kind,
        price_per_night: new_hotel.price_per_night,
        star_rating: new_hotel.star_rating,
        facilities: new_hotel.facilities,
        image_urls,
        bookings: Vec::new(),
        last_updated: Utc::now(),
    };
    state.store.hotels.insert(hotel.clone());

    Ok((StatusCode::CREATED, Json(hotel)))
}

/// GET /api/my-hotels
async fn list_my_hotels_handler(
    subject: AuthSubject,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Hotel>>, ApiError> {
    subject.require(Capability::ManageOwnListings)?;
    Ok(Json(state.store.hotels.list_by_owner(subject.user_id)))
}

/// GET /api/my-hotels/{id}
async fn get_my_hotel_handler(
    subject: AuthSubject,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Hotel>, ApiError> {
    subject.require(Capability::ManageOwnListings)?;
    state
        .store
        .hotels
        .get_owned(subject.user_id, id)
        .map(Json)
        .ok_or(ApiError::NotFound("Hotel"))
}

/// PUT /api/my-hotels/{id}
///
/// The stored image list becomes exactly the resubmitted `imageUrls` plus
/// any newly uploaded files; a request without retained URLs drops the
/// existing images.
async fn update_hotel_handler(
    subject: AuthSubject,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Hotel>, ApiError> {
    subject.require(Capability::ManageOwnListings)?;

    let form = HotelForm::collect(multipart).await?;
    let (update, images) = form.validate_update()?;

    // Ownership pre-check so a stranger's request never writes image files.
    // The conditional update below enforces ownership again.
    if state.store.hotels.get_owned(subject.user_id, id).is_none() {
        return Err(ApiError::NotFound("Hotel"));
    }

    let mut image_urls = update.image_urls;
    for image in &images {
        image_urls.push(state.images.save(&image.file_name, &image.bytes)?);
    }

    state
        .store
        .hotels
        .update_owned(subject.user_id, id, |hotel| {
            if let Some(name) = update.name {
                hotel.name = name;
            }
            if let Some(city) = update.city {
                hotel.city = city;
            }
            if let Some(country) = update.country {
                hotel.country = country;
            }
            if let Some(description) = update.description {
                hotel.description = description;
            }
            if let Some(kind) = update.kind {
                hotel.kind = kind;
            }
            if let Some(price) = update.price_per_night {
                hotel.price_per_night = price;
            }
            if let Some(stars) = update.star_rating {
                hotel.star_rating = stars;
            }
            if let Some(facilities) = update.facilities {
                hotel.facilities = facilities;
            }
            hotel.image_urls = image_urls;
            hotel.last_updated = Utc::now();
        })
        .map(Json)
        .ok_or(ApiError::NotFound("Hotel"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_form() -> HotelForm {
        HotelForm {
            name: Some("Seaside".to_string()),
            city: Some("Nice".to_string()),
            country: Some("France".to_string()),
            description: Some("On the water".to_string()),
            kind: Some("Resort".to_string()),
            price_per_night: Some("180".to_string()),
            star_rating: Some("4".to_string()),
            facilities: vec!["wifi".to_string()],
            image_urls: Vec::new(),
            images: vec![UploadedImage {
                file_name: "a.jpg".to_string(),
                bytes: vec![0u8; 16],
            }],
        }
    }

    fn messages(err: ApiError) -> Vec<String> {
        match err {
            ApiError::Validation(messages) => messages,
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_create_accepts_a_complete_form() {
        let (new_hotel, images) = full_form().validate_create().unwrap();
        assert_eq!(new_hotel.name, "Seaside");
        assert_eq!(new_hotel.price_per_night, 180.0);
        assert_eq!(new_hotel.star_rating, 4);
        assert_eq!(images.len(), 1);
    }

    #[test]
    fn test_create_reports_every_missing_field() {
        let empty = HotelForm::default();
        let errors = messages(empty.validate_create().unwrap_err());
        for expected in [
            "Name is required",
            "City is required",
            "Country is required",
            "Description is required",
            "Hotel type is required",
            "Price per night is required and must be a number",
            "Star rating must be a number between 1 and 5",
            "Facilities are required",
            "At least one image is required",
        ] {
            assert!(errors.iter().any(|m| m == expected), "missing: {}", expected);
        }
    }

    #[test]
    fn test_create_rejects_non_positive_price() {
        let mut form = full_form();
        form.price_per_night = Some("0".to_string());
        let errors = messages(form.validate_create().unwrap_err());
        assert!(errors.contains(&"Price per night must be greater than zero".to_string()));
    }

    #[test]
    fn test_create_rejects_too_many_and_oversized_images() {
        let mut form = full_form();
        form.images = (0..7)
            .map(|i| UploadedImage {
                file_name: format!("{}.jpg", i),
                bytes: vec![0u8; 8],
            })
            .collect();
        let errors = messages(form.validate_create().unwrap_err());
        assert!(errors.contains(&"A maximum of 6 images is allowed".to_string()));

        let mut form = full_form();
        form.images = vec![UploadedImage {
            file_name: "big.jpg".to_string(),
            bytes: vec![0u8; MAX_IMAGE_BYTES + 1],
        }];
        let errors = messages(form.validate_create().unwrap_err());
        assert!(errors.contains(&"Images must be 5MB or smaller".to_string()));
    }

    #[test]
    fn test_update_keeps_absent_scalars_and_replaces_images() {
        let form = HotelForm {
            price_per_night: Some("220.5".to_string()),
            image_urls: vec!["/uploads/keep.jpg".to_string()],
            ..Default::default()
        };
        let (update, images) = form.validate_update().unwrap();
        assert!(update.name.is_none());
        assert_eq!(update.price_per_night, Some(220.5));
        assert!(update.facilities.is_none());
        assert_eq!(update.image_urls, vec!["/uploads/keep.jpg".to_string()]);
        assert!(images.is_empty());
    }

    #[test]
    fn test_update_without_retained_urls_yields_empty_list() {
        let (update, _) = HotelForm::default().validate_update().unwrap();
        assert!(update.image_urls.is_empty());
    }

    #[test]
    fn test_update_rejects_bad_price() {
        let form = HotelForm {
            price_per_night: Some("free".to_string()),
            ..Default::default()
        };
        let errors = messages(form.validate_update().unwrap_err());
        assert_eq!(errors.len(), 1);
    }
}
