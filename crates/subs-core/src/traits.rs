//! Storage abstraction and pagination types
//!
//! The lifecycle service only talks to storage through
//! [`SubscriptionRepository`], so any engine (PostgreSQL, in-memory) can sit
//! behind it.

use crate::error::AppError;
use crate::models::{Subscription, SubscriptionFilter};
use async_trait::async_trait;
use serde::Serialize;

/// Subscription repository
///
/// Adapters must enforce `(user_id, service_name)` uniqueness themselves and
/// report a collision as [`AppError::DuplicateSubscription`]; the service
/// treats that as the authoritative signal. Rows are returned in ascending
/// `id` order.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a new subscription; the id on the argument is ignored
    async fn insert(&self, subscription: &Subscription) -> Result<Subscription, AppError>;

    /// Overwrite every mutable field of the subscription with the same id
    async fn update(&self, subscription: &Subscription) -> Result<Subscription, AppError>;

    /// Delete subscription by ID
    async fn delete(&self, id: i32) -> Result<(), AppError>;

    /// Check whether a subscription exists
    async fn exists_by_id(&self, id: i32) -> Result<bool, AppError>;

    /// Find subscription by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Subscription>, AppError>;

    /// Find one page of subscriptions matching the filter
    async fn find(
        &self,
        filter: &SubscriptionFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Subscription>, AppError>;

    /// Find every subscription matching the filter
    async fn find_all(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>, AppError>;

    /// Count subscriptions matching the filter, ignoring pagination
    async fn total(&self, filter: &SubscriptionFilter) -> Result<i64, AppError>;
}

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Build pagination from already validated values
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    /// Rows to skip, `None` when `(page - 1) * limit` does not fit in `i64`
    pub fn checked_offset(&self) -> Option<i64> {
        self.page.checked_sub(1)?.checked_mul(self.limit)
    }

    /// Rows to skip; saturates so an out-of-range page reads as empty
    pub fn offset(&self) -> i64 {
        self.checked_offset().unwrap_or(i64::MAX)
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };

        Self {
            total,
            page,
            limit,
            total_pages,
        }
    }
}

impl Pagination {
    /// Wrap one page of data together with the filtered total
    pub fn paginate<T>(&self, data: Vec<T>, total: i64) -> PaginatedResponse<T> {
        PaginatedResponse {
            data,
            pagination: PaginationMeta::new(total, self.page, self.limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination() {
        let p = Pagination::new(1, 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 10);

        let p = Pagination::new(2, 10);
        assert_eq!(p.offset(), 10);

        let p = Pagination::new(3, 20);
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn test_offset_past_i64_range() {
        let p = Pagination::new(i64::MAX, 10);
        assert_eq!(p.checked_offset(), None);
        assert_eq!(p.offset(), i64::MAX);

        let p = Pagination::new(i64::MAX, 1);
        assert_eq!(p.checked_offset(), Some(i64::MAX - 1));
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(95, 1, 10);
        assert_eq!(meta.total_pages, 10);

        let meta = PaginationMeta::new(100, 1, 10);
        assert_eq!(meta.total_pages, 10);

        let meta = PaginationMeta::new(101, 1, 10);
        assert_eq!(meta.total_pages, 11);

        let meta = PaginationMeta::new(0, 1, 10);
        assert_eq!(meta.total_pages, 0);
    }

    #[test]
    fn test_paginate_echoes_parameters() {
        let response = Pagination::new(2, 25).paginate(vec![1, 2, 3], 100);

        assert_eq!(response.data.len(), 3);
        assert_eq!(response.pagination.total, 100);
        assert_eq!(response.pagination.page, 2);
        assert_eq!(response.pagination.limit, 25);
        assert_eq!(response.pagination.total_pages, 4);
    }
}
