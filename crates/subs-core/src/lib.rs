//! Subs Tracker Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the Subs Tracker system. It includes:
//!
//! - Month-granular date arithmetic and the `MM-YYYY` wire codec
//! - Domain models (Subscription, SubscriptionFilter, wire requests)
//! - The repository trait implemented by every storage adapter
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod dates;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::{AppError, FieldError};

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
