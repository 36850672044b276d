//! Hotel shelf - listings keyed by id, bookings embedded in each listing.
//!
//! Every booking mutation runs inside a single entry guard keyed on the
//! listing id, conditioned on (booking id, booking owner). Two concurrent
//! mutations against the same listing serialize on the guard instead of
//! racing through a read-then-write window, so neither can drop the other's
//! effect.

use crate::model::{validate_stay, Booking, BookingPatch, Hotel};
use dashmap::DashMap;
use uuid::Uuid;

/// Outcome of a conditional booking mutation.
///
/// `NotFound` covers the listing being absent, the booking being absent, and
/// the booking belonging to someone else - deliberately indistinguishable so
/// nothing leaks about other accounts' bookings.
#[derive(Debug, PartialEq, Eq)]
pub enum BookingError {
    NotFound,
    Invalid(Vec<String>),
}

/// All hotel listings.
pub struct HotelShelf {
    hotels: DashMap<Uuid, Hotel>,
}

impl HotelShelf {
    pub fn new() -> Self {
        Self {
            hotels: DashMap::new(),
        }
    }

    pub fn insert(&self, hotel: Hotel) {
        self.hotels.insert(hotel.id, hotel);
    }

    pub fn get(&self, id: Uuid) -> Option<Hotel> {
        self.hotels.get(&id).map(|h| h.clone())
    }

    /// Lookup filtered by both listing id and owner in one query. A listing
    /// owned by someone else is reported exactly like a missing one.
    pub fn get_owned(&self, owner_id: Uuid, id: Uuid) -> Option<Hotel> {
        self.hotels
            .get(&id)
            .filter(|h| h.owner_id == owner_id)
            .map(|h| h.clone())
    }

    pub fn list_by_owner(&self, owner_id: Uuid) -> Vec<Hotel> {
        let mut hotels: Vec<Hotel> = self
            .hotels
            .iter()
            .filter(|h| h.owner_id == owner_id)
            .map(|h| h.clone())
            .collect();
        hotels.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        hotels
    }

    /// Public browse path; newest first.
    pub fn list_all(&self) -> Vec<Hotel> {
        let mut hotels: Vec<Hotel> = self.hotels.iter().map(|h| h.clone()).collect();
        hotels.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        hotels
    }

    /// Mutate a listing under its entry guard, conditioned on ownership.
    /// Returns the updated listing, or None when absent or not owned.
    pub fn update_owned(
        &self,
        owner_id: Uuid,
        id: Uuid,
        mutate: impl FnOnce(&mut Hotel),
    ) -> Option<Hotel> {
        let mut hotel = self.hotels.get_mut(&id)?;
        if hotel.owner_id != owner_id {
            return None;
        }
        mutate(&mut hotel);
        Some(hotel.clone())
    }

    /// Delete a listing and, with it, every embedded booking. Irreversible.
    pub fn remove(&self, id: Uuid) -> Option<Hotel> {
        self.hotels.remove(&id).map(|(_, h)| h)
    }

    pub fn count(&self) -> usize {
        self.hotels.len()
    }

    /// Append a booking to a listing. None when the listing does not exist.
    pub fn append_booking(&self, hotel_id: Uuid, booking: Booking) -> Option<Booking> {
        let mut hotel = self.hotels.get_mut(&hotel_id)?;
        hotel.bookings.push(booking.clone());
        Some(booking)
    }

    /// Remove a booking matched on (listing, booking, owner) in one
    /// conditional mutation. False when nothing matched.
    pub fn remove_booking(&self, hotel_id: Uuid, booking_id: Uuid, user_id: Uuid) -> bool {
        let Some(mut hotel) = self.hotels.get_mut(&hotel_id) else {
            return false;
        };
        let Some(position) = hotel
            .bookings
            .iter()
            .position(|b| b.id == booking_id && b.user_id == user_id)
        else {
            return false;
        };
        hotel.bookings.remove(position);
        true
    }

    /// Patch a booking matched on (listing, booking, owner). The patch is
    /// applied to a copy and re-validated; the stored booking changes only
    /// if the result is valid.
    pub fn patch_booking(
        &self,
        hotel_id: Uuid,
        booking_id: Uuid,
        user_id: Uuid,
        patch: &BookingPatch,
    ) -> Result<Booking, BookingError> {
        let mut hotel = self.hotels.get_mut(&hotel_id).ok_or(BookingError::NotFound)?;
        let slot = hotel
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id && b.user_id == user_id)
            .ok_or(BookingError::NotFound)?;

        let mut updated = slot.clone();
        patch.apply(&mut updated);

        let errors = validate_stay(updated.check_in, updated.check_out, updated.adult_count);
        if !errors.is_empty() {
            return Err(BookingError::Invalid(errors));
        }

        *slot = updated.clone();
        Ok(updated)
    }

    /// Every listing holding at least one booking owned by `user_id`, with
    /// only the matching bookings attached. Other accounts' bookings never
    /// leave the store.
    pub fn bookings_for_user(&self, user_id: Uuid) -> Vec<Hotel> {
        let mut hotels: Vec<Hotel> = self
            .hotels
            .iter()
            .filter_map(|entry| {
                let mine: Vec<Booking> = entry
                    .bookings
                    .iter()
                    .filter(|b| b.user_id == user_id)
                    .cloned()
                    .collect();
                if mine.is_empty() {
                    return None;
                }
                let mut hotel = entry.clone();
                hotel.bookings = mine;
                Some(hotel)
            })
            .collect();
        hotels.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        hotels
    }
}

impl Default for HotelShelf {
    fn default() -> Self {
        Self::new()
    }
}
