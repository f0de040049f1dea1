//! Business logic services for Subs Tracker
//!
//! This crate holds the subscription lifecycle rules and the cost
//! aggregation that sits on top of them.
//!
//! # Services
//!
//! - `SubscriptionService` - Validation, uniqueness and CRUD orchestration
//!   over any `SubscriptionRepository`, each operation under a deadline
//! - `CostCalculator` - Pure month-granular cost arithmetic

pub mod cost;
pub mod subscription;

pub use cost::CostCalculator;
pub use subscription::{DynSubscriptionService, SubscriptionService};

/// Business logic constants
pub mod constants {
    use std::time::Duration;

    /// Deadline for the storage work of one operation
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Largest page size accepted by list
    pub const DEFAULT_MAX_LIMIT: i64 = 100;
}
