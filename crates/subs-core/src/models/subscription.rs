//! Subscription model
//!
//! A user's recurring monthly payment to a named service. Dates are stored as
//! the first day of their month; an absent end date means the subscription is
//! still running.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Server-assigned id, immutable after creation
    pub id: i32,

    /// Name of the subscribed service (e.g. "Netflix")
    pub service_name: String,

    /// Monthly price in the smallest currency unit
    pub price: i64,

    /// Owner of the subscription
    pub user_id: Uuid,

    /// First billed month
    pub start_date: NaiveDate,

    /// Last month of the subscription, `None` while open-ended
    pub end_date: Option<NaiveDate>,
}

impl Subscription {
    /// Check whether the subscription's lifetime intersects a window
    ///
    /// Either bound may be absent, in which case that side is not checked.
    pub fn overlaps(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
        let ends_after_from = match (from, self.end_date) {
            (Some(from), Some(end)) => end >= from,
            _ => true,
        };
        let starts_before_to = match to {
            Some(to) => self.start_date <= to,
            None => true,
        };

        ends_after_from && starts_before_to
    }

    /// Check the stored-record invariants
    pub fn validate(&self) -> Result<(), String> {
        if self.service_name.is_empty() {
            return Err("Service name cannot be empty".to_string());
        }

        if self.price < 0 {
            return Err("Price cannot be negative".to_string());
        }

        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err("End date cannot precede start date".to_string());
            }
        }

        Ok(())
    }
}

/// Query value object narrowing a set of subscriptions
///
/// All present criteria are combined with AND. Pagination is carried
/// separately so the same filter serves both listing and aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    /// Exact service name match
    pub service_name: Option<String>,

    /// Exact owner match
    pub user_id: Option<Uuid>,

    /// Window start: keeps subscriptions still running at or after this month
    pub start_date: Option<NaiveDate>,

    /// Window end: keeps subscriptions started at or before this month
    pub end_date: Option<NaiveDate>,
}

impl SubscriptionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    pub fn with_user_id(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_window(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Evaluate the filter against one record
    pub fn matches(&self, sub: &Subscription) -> bool {
        if let Some(ref name) = self.service_name {
            if &sub.service_name != name {
                return false;
            }
        }

        if let Some(user_id) = self.user_id {
            if sub.user_id != user_id {
                return false;
            }
        }

        sub.overlaps(self.start_date, self.end_date)
    }
}
