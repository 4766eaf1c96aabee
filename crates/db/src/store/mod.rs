//! [`DocumentStore`](ndiambour_core::store::DocumentStore) implementations.

mod backend;
mod local;
mod postgres;

pub use backend::StoreBackend;
pub use local::LocalStore;
pub use postgres::PgDocumentStore;
