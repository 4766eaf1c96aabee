//! Document store abstraction.
//!
//! The catalog is written against a small capability set: collection-scoped
//! create, get-by-id, get-all, query-by-equality, partial update and delete.
//! Documents are flat JSON maps. The db crate provides the local key-value
//! and remote document database implementations; nothing above this trait
//! knows which one is in use.

mod codec;
mod error;

use std::future::Future;

use serde_json::Value;

pub use codec::{from_document, from_documents, to_document};
pub use error::StoreError;

/// A stored document: field name to JSON value.
pub type Document = serde_json::Map<String, Value>;

/// Field holding a document's identifier.
pub const ID_FIELD: &str = "id";

/// Collection names used by the catalog.
pub mod collections {
    /// Vehicle documents.
    pub const VEHICLES: &str = "vehicles";
    /// Image documents.
    pub const IMAGES: &str = "images";
    /// Category documents.
    pub const CATEGORIES: &str = "categories";
    /// Reservation requests.
    pub const RESERVATIONS: &str = "reservations";
    /// Contact form messages.
    pub const MESSAGES: &str = "messages";
    /// Site settings.
    pub const SETTINGS: &str = "settings";

    /// Every collection, in dependency order.
    pub const ALL: [&str; 6] = [CATEGORIES, VEHICLES, IMAGES, RESERVATIONS, MESSAGES, SETTINGS];
}

/// Collection-scoped document persistence.
///
/// Implemented by the db crate. Calls are independent round-trips; no method
/// spans more than one document and none is transactional.
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return its ID.
    ///
    /// Uses the document's `id` field when it is a non-empty string, otherwise
    /// generates one and writes it into the stored document.
    fn create(
        &self,
        collection: &str,
        doc: Document,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Fetch one document.
    fn get_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<Document>, StoreError>> + Send;

    /// Fetch every document in a collection, oldest ID first.
    fn get_all(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Fetch documents whose top-level `field` equals `value`.
    fn query_equals(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Merge top-level fields of `patch` into an existing document.
    ///
    /// A `null` value in the patch removes that field. Fails with [`StoreError::Missing`] when the document does not exist.
    fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete a document. Deleting a missing document is not an error.
    fn delete(&self, collection: &str, id: &str)
    -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Read the ID of a document, generating one if the field is absent or empty.
#[must_use]
pub fn document_id_or_new(doc: &Document) -> String {
    doc.get(ID_FIELD)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map_or_else(|| uuid::Uuid::now_v7().to_string(), str::to_string)
}
