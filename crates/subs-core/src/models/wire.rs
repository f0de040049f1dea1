//! Wire-level request and response shapes
//!
//! Dates travel as `MM-YYYY` strings; an empty string means "absent" for
//! optional fields. Parsing into the domain model happens in the lifecycle
//! service so that every input error is reported before storage is touched.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Subscription;
use crate::dates::format_month_year;

/// Default page for listing requests
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size for listing requests
pub const DEFAULT_LIMIT: i64 = 20;

/// Subscription create/update request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SubscriptionRequest {
    /// Service name
    #[validate(length(min = 1, message = "service_name is required"))]
    pub service_name: String,

    /// Monthly price
    #[validate(range(min = 0, message = "price must not be negative"))]
    pub price: i64,

    /// Owner UUID, checked by the service
    pub user_id: String,

    /// First month (`MM-YYYY`)
    pub start_date: String,

    /// Last month (`MM-YYYY`), empty when open-ended
    pub end_date: String,
}

/// Subscription listing query
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubscriptionFilterRequest {
    /// Page number (1-indexed)
    pub page: i64,

    /// Items per page
    pub limit: i64,

    pub service_name: String,
    pub user_id: String,
    pub start_date: String,
    pub end_date: String,
}

impl Default for SubscriptionFilterRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            service_name: String::new(),
            user_id: String::new(),
            start_date: String::new(),
            end_date: String::new(),
        }
    }
}

/// Cost aggregation query; both window bounds are required
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CostFilterRequest {
    pub service_name: String,
    pub user_id: String,
    pub start_date: String,
    pub end_date: String,
}

/// Subscription as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub id: i32,
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(sub: Subscription) -> Self {
        Self {
            id: sub.id,
            service_name: sub.service_name,
            price: sub.price,
            user_id: sub.user_id.to_string(),
            start_date: format_month_year(sub.start_date),
            end_date: sub.end_date.map(format_month_year),
        }
    }
}

/// Result of a cost aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalCostResponse {
    pub total_cost: i64,
}
