//! Intake records and form inputs.

use chrono::{DateTime, NaiveDate, Utc};
use ndiambour_shared::types::{MessageId, ReservationId, VehicleId};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Longest accepted contact message, in characters.
pub const MAX_MESSAGE_LEN: u64 = 5000;

/// Reservation form.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "check_reservation"))]
pub struct ReservationRequest {
    /// Customer's full name.
    #[validate(length(min = 1, message = "customer name is required"))]
    pub customer_name: String,
    /// Customer's email.
    #[serde(default)]
    #[validate(email(message = "invalid email address"))]
    pub email: Option<String>,
    /// Customer's phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Requested vehicle, if any.
    #[serde(default)]
    pub vehicle_id: Option<VehicleId>,
    /// First rental day.
    pub start_date: NaiveDate,
    /// Last rental day.
    pub end_date: NaiveDate,
    /// Free-text notes.
    #[serde(default)]
    #[validate(length(max = 5000, message = "message is too long"))]
    pub message: Option<String>,
}

fn check_reservation(request: &ReservationRequest) -> Result<(), ValidationError> {
    let has = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
    if !has(&request.email) && !has(&request.phone) {
        return Err(ValidationError::new("contact")
            .with_message("a phone number or an email is required".into()));
    }
    if request.end_date < request.start_date {
        return Err(ValidationError::new("dates")
            .with_message("end date is before start date".into()));
    }
    Ok(())
}

/// Processing state of a reservation. Intake records every request as pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Waiting for the agency to answer.
    #[default]
    Pending,
}

/// A stored reservation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Reservation ID.
    pub id: ReservationId,
    /// Customer's full name.
    pub customer_name: String,
    /// Customer's email.
    #[serde(default)]
    pub email: Option<String>,
    /// Customer's phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Requested vehicle.
    #[serde(default)]
    pub vehicle_id: Option<VehicleId>,
    /// First rental day.
    pub start_date: NaiveDate,
    /// Last rental day.
    pub end_date: NaiveDate,
    /// Free-text notes.
    #[serde(default)]
    pub message: Option<String>,
    /// Processing state.
    #[serde(default)]
    pub status: ReservationStatus,
    /// When the request was received.
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// Number of rental days, both ends included.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// Contact form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactRequest {
    /// Sender's name.
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Sender's email.
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    /// Sender's phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Subject line.
    #[serde(default)]
    pub subject: Option<String>,
    /// Message body.
    #[validate(length(min = 1, max = 5000, message = "message must be 1 to 5000 characters"))]
    pub message: String,
}

/// A stored contact message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    /// Message ID.
    pub id: MessageId,
    /// Sender's name.
    pub name: String,
    /// Sender's email.
    pub email: String,
    /// Sender's phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Subject line.
    #[serde(default)]
    pub subject: Option<String>,
    /// Message body.
    pub message: String,
    /// When the message was received.
    pub created_at: DateTime<Utc>,
}
