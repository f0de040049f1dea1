//! Domain models for Subs Tracker
//!
//! The stored entity, the query value object, and the wire-level request and
//! response shapes that carry `MM-YYYY` dates.

pub mod subscription;
pub mod wire;

pub use subscription::{Subscription, SubscriptionFilter};
pub use wire::{
    CostFilterRequest, SubscriptionFilterRequest, SubscriptionRequest, SubscriptionResponse,
    TotalCostResponse,
};
