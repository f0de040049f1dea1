//! API layer for Subs Tracker
//!
//! HTTP handlers for the subscription lifecycle and cost aggregation
//! endpoints.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dto;
pub mod handlers;

pub use dto::HeartbeatResponse;
pub use handlers::configure;
