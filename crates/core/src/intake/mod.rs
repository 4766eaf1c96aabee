//! Reservation requests and contact messages.
//!
//! Append-only: records are created and listed, never edited. Nothing here
//! touches the catalog, so a reservation naming a vehicle keeps that ID even
//! after the vehicle is deleted.

mod error;
mod service;
mod types;

pub use error::IntakeError;
pub use service::IntakeService;
pub use types::{
    ContactMessage, ContactRequest, MAX_MESSAGE_LEN, Reservation, ReservationRequest,
    ReservationStatus,
};
