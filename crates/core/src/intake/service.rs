//! Intake service.

use std::sync::Arc;

use chrono::Utc;
use ndiambour_shared::types::{MessageId, ReservationId};
use tracing::info;
use validator::Validate;

use super::error::IntakeError;
use super::types::{ContactMessage, ContactRequest, Reservation, ReservationRequest, ReservationStatus};
use crate::store::{DocumentStore, collections, from_documents, to_document};

/// Records reservation requests and contact messages.
pub struct IntakeService<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> Clone for IntakeService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore> IntakeService<S> {
    /// Create a new intake service.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Validate and store a reservation request as pending.
    pub async fn submit_reservation(
        &self,
        request: ReservationRequest,
    ) -> Result<Reservation, IntakeError> {
        let request = ReservationRequest {
            customer_name: request.customer_name.trim().to_string(),
            email: non_blank(request.email),
            phone: non_blank(request.phone),
            message: non_blank(request.message),
            ..request
        };
        request.validate()?;

        let reservation = Reservation {
            id: ReservationId::new(),
            customer_name: request.customer_name,
            email: request.email,
            phone: request.phone,
            vehicle_id: request.vehicle_id,
            start_date: request.start_date,
            end_date: request.end_date,
            message: request.message,
            status: ReservationStatus::Pending,
            created_at: Utc::now(),
        };
        self.store
            .create(collections::RESERVATIONS, to_document(&reservation)?)
            .await?;

        info!(
            reservation_id = %reservation.id,
            days = reservation.days(),
            "Reservation received"
        );
        Ok(reservation)
    }

    /// All reservations, newest first.
    pub async fn list_reservations(&self) -> Result<Vec<Reservation>, IntakeError> {
        let docs = self.store.get_all(collections::RESERVATIONS).await?;
        let mut reservations: Vec<Reservation> = from_documents(docs)?;
        reservations.sort_by(|a, b| {
            (b.created_at, b.id.as_str()).cmp(&(a.created_at, a.id.as_str()))
        });
        Ok(reservations)
    }

    /// Validate and store a contact message.
    pub async fn submit_message(&self, request: ContactRequest) -> Result<ContactMessage, IntakeError> {
        let request = ContactRequest {
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: non_blank(request.phone),
            subject: non_blank(request.subject),
            message: request.message.trim().to_string(),
        };
        request.validate()?;

        let message = ContactMessage {
            id: MessageId::new(),
            name: request.name,
            email: request.email,
            phone: request.phone,
            subject: request.subject,
            message: request.message,
            created_at: Utc::now(),
        };
        self.store
            .create(collections::MESSAGES, to_document(&message)?)
            .await?;

        info!(message_id = %message.id, "Contact message received");
        Ok(message)
    }

    /// All contact messages, newest first.
    pub async fn list_messages(&self) -> Result<Vec<ContactMessage>, IntakeError> {
        let docs = self.store.get_all(collections::MESSAGES).await?;
        let mut messages: Vec<ContactMessage> = from_documents(docs)?;
        messages.sort_by(|a, b| (b.created_at, b.id.as_str()).cmp(&(a.created_at, a.id.as_str())));
        Ok(messages)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::MAX_MESSAGE_LEN;
    use crate::test_support::MockStore;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn service() -> (IntakeService<MockStore>, Arc<MockStore>) {
        let store = Arc::new(MockStore::new());
        (IntakeService::new(Arc::clone(&store)), store)
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, day).unwrap()
    }

    fn reservation() -> ReservationRequest {
        ReservationRequest {
            customer_name: "Awa Diop".to_string(),
            email: Some("awa@example.sn".to_string()),
            phone: None,
            vehicle_id: None,
            start_date: date(3),
            end_date: date(6),
            message: None,
        }
    }

    fn contact() -> ContactRequest {
        ContactRequest {
            name: "Moussa".to_string(),
            email: "moussa@example.sn".to_string(),
            phone: None,
            subject: Some("Tarifs".to_string()),
            message: "Bonjour, quels sont vos tarifs ?".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_reservation_is_pending() {
        let (service, store) = service();
        let stored = service.submit_reservation(reservation()).await.unwrap();

        assert_eq!(stored.status, ReservationStatus::Pending);
        assert_eq!(stored.days(), 4);
        assert_eq!(store.len(collections::RESERVATIONS), 1);
    }

    #[tokio::test]
    async fn test_reservation_accepts_phone_only() {
        let (service, _) = service();
        let request = ReservationRequest {
            email: Some("  ".to_string()),
            phone: Some("+221 77 000 00 00".to_string()),
            ..reservation()
        };

        let stored = service.submit_reservation(request).await.unwrap();
        assert_eq!(stored.email, None);
    }

    #[rstest]
    #[case::no_contact(ReservationRequest { email: None, ..reservation() })]
    #[case::bad_email(ReservationRequest { email: Some("not-an-email".into()), ..reservation() })]
    #[case::blank_name(ReservationRequest { customer_name: "   ".into(), ..reservation() })]
    #[case::reversed_dates(ReservationRequest { start_date: date(9), ..reservation() })]
    #[tokio::test]
    async fn test_invalid_reservations_are_rejected(#[case] request: ReservationRequest) {
        let (service, store) = service();
        let result = service.submit_reservation(request).await;

        assert!(matches!(result, Err(IntakeError::Validation(_))));
        assert_eq!(store.len(collections::RESERVATIONS), 0);
    }

    #[tokio::test]
    async fn test_single_day_reservation() {
        let (service, _) = service();
        let request = ReservationRequest {
            end_date: date(3),
            ..reservation()
        };
        assert_eq!(service.submit_reservation(request).await.unwrap().days(), 1);
    }

    #[tokio::test]
    async fn test_lists_are_newest_first() {
        let (service, _) = service();
        let first = service.submit_message(contact()).await.unwrap();
        let second = service.submit_message(contact()).await.unwrap();

        let listed: Vec<_> = service
            .list_messages()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(listed, vec![second.id, first.id]);
    }

    #[rstest]
    #[case::empty_message(ContactRequest { message: " ".into(), ..contact() })]
    #[case::bad_email(ContactRequest { email: "moussa".into(), ..contact() })]
    #[case::missing_name(ContactRequest { name: String::new(), ..contact() })]
    #[tokio::test]
    async fn test_invalid_messages_are_rejected(#[case] request: ContactRequest) {
        let (service, _) = service();
        assert!(matches!(
            service.submit_message(request).await,
            Err(IntakeError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_message_length_limit() {
        let (service, _) = service();
        let limit = usize::try_from(MAX_MESSAGE_LEN).unwrap();

        let at_limit = ContactRequest {
            message: "é".repeat(limit),
            ..contact()
        };
        assert!(service.submit_message(at_limit).await.is_ok());

        let over = ContactRequest {
            message: "a".repeat(limit + 1),
            ..contact()
        };
        assert!(service.submit_message(over).await.is_err());
    }
}
