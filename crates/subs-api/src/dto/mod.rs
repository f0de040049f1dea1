//! Data Transfer Objects (DTOs) for API requests and responses
//!
//! Subscription payloads live in `subs_core::models`, shared with the
//! service layer.

pub mod common;

pub use common::*;
pub use subs_core::models::{
    CostFilterRequest, SubscriptionFilterRequest, SubscriptionRequest, SubscriptionResponse,
    TotalCostResponse,
};
