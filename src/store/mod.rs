//! In-memory document store.
//!
//! Two collections: the user directory and the hotel shelf. All cross-request
//! consistency rests on the store's single-entry conditional mutations; no
//! caller ever does a read-whole/modify/write-whole cycle, and no store
//! method suspends while holding an entry guard.

pub mod hotels;
pub mod users;

use hotels::HotelShelf;
use users::UserDirectory;

/// The shared persistent state of the service.
pub struct Store {
    pub users: UserDirectory,
    pub hotels: HotelShelf,
}

impl Store {
    pub fn new() -> Self {
        Self {
            users: UserDirectory::new(),
            hotels: HotelShelf::new(),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
