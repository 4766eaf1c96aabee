//! Shared identifiers, errors, and configuration for the Ndiambour catalog.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for vehicles, images, reservations and contact messages
//! - Application-wide error types with HTTP status mapping
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
