//! Subs Tracker Storage Layer
//!
//! This crate provides the storage collaborators behind
//! `subs_core::traits::SubscriptionRepository`:
//!
//! - Connection pool management with sqlx, with startup ping retries
//! - Embedded schema migrations
//! - A PostgreSQL repository
//! - An in-memory repository enforcing the same constraints

pub mod pool;
pub mod repositories;

pub use pool::{create_pool, run_migrations};
pub use repositories::*;

// Re-export commonly used types
pub use sqlx::PgPool;
pub use subs_core::{AppError, AppResult};
