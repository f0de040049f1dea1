//! In-memory repository implementation
//!
//! Keeps subscriptions in a `BTreeMap` keyed by id behind a `parking_lot`
//! lock. It enforces the same `(user_id, service_name)` uniqueness as the
//! PostgreSQL schema, which makes it a faithful stand-in for tests and for
//! running the service without a database.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use subs_core::{
    models::{Subscription, SubscriptionFilter},
    traits::{Pagination, SubscriptionRepository},
    AppError, AppResult,
};
use tracing::debug;

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i32,
    rows: BTreeMap<i32, Subscription>,
}

impl MemoryState {
    fn collides(&self, candidate: &Subscription, exclude_id: Option<i32>) -> bool {
        self.rows.values().any(|row| {
            Some(row.id) != exclude_id
                && row.user_id == candidate.user_id
                && row.service_name == candidate.service_name
        })
    }
}

fn duplicate(sub: &Subscription) -> AppError {
    AppError::DuplicateSubscription {
        user_id: sub.user_id.to_string(),
        service_name: sub.service_name.clone(),
    }
}

/// In-memory implementation of SubscriptionRepository
#[derive(Debug, Default)]
pub struct MemorySubscriptionRepository {
    state: RwLock<MemoryState>,
}

impl MemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored subscriptions
    pub fn len(&self) -> usize {
        self.state.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SubscriptionRepository for MemorySubscriptionRepository {
    async fn insert(&self, subscription: &Subscription) -> AppResult<Subscription> {
        // Mirrors the CHECK constraints of the SQL schema
        subscription.validate().map_err(AppError::Database)?;

        let mut state = self.state.write();

        if state.collides(subscription, None) {
            return Err(duplicate(subscription));
        }

        state.last_id += 1;
        let stored = Subscription {
            id: state.last_id,
            ..subscription.clone()
        };
        state.rows.insert(stored.id, stored.clone());

        debug!(id = stored.id, "Stored subscription in memory");
        Ok(stored)
    }

    async fn update(&self, subscription: &Subscription) -> AppResult<Subscription> {
        subscription.validate().map_err(AppError::Database)?;

        let mut state = self.state.write();

        if !state.rows.contains_key(&subscription.id) {
            return Err(AppError::SubscriptionNotFound(subscription.id));
        }
        if state.collides(subscription, Some(subscription.id)) {
            return Err(duplicate(subscription));
        }

        state.rows.insert(subscription.id, subscription.clone());
        Ok(subscription.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        self.state
            .write()
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::SubscriptionNotFound(id))
    }

    async fn exists_by_id(&self, id: i32) -> AppResult<bool> {
        Ok(self.state.read().rows.contains_key(&id))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Subscription>> {
        Ok(self.state.read().rows.get(&id).cloned())
    }

    async fn find(
        &self,
        filter: &SubscriptionFilter,
        pagination: &Pagination,
    ) -> AppResult<Vec<Subscription>> {
        let offset = usize::try_from(pagination.offset()).unwrap_or(0);
        let limit = usize::try_from(pagination.limit()).unwrap_or(0);

        Ok(self
            .state
            .read()
            .rows
            .values()
            .filter(|sub| filter.matches(sub))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_all(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>> {
        Ok(self
            .state
            .read()
            .rows
            .values()
            .filter(|sub| filter.matches(sub))
            .cloned()
            .collect())
    }

    async fn total(&self, filter: &SubscriptionFilter) -> AppResult<i64> {
        let count = self
            .state
            .read()
            .rows
            .values()
            .filter(|sub| filter.matches(sub))
            .count();

        Ok(count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn ym(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    fn sub(service_name: &str, user_id: Uuid) -> Subscription {
        Subscription {
            id: 0,
            service_name: service_name.to_string(),
            price: 100,
            user_id,
            start_date: ym(2024, 1),
            end_date: None,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let repo = MemorySubscriptionRepository::new();
        let user = Uuid::new_v4();

        let a = repo.insert(&sub("Netflix", user)).await.unwrap();
        let b = repo.insert(&sub("Spotify", user)).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_pair_rejected() {
        let repo = MemorySubscriptionRepository::new();
        let user = Uuid::new_v4();

        repo.insert(&sub("Netflix", user)).await.unwrap();
        let err = repo.insert(&sub("Netflix", user)).await.unwrap_err();

        assert!(err.is_duplicate());
        assert_eq!(repo.len(), 1);

        // Same service for another user is fine
        repo.insert(&sub("Netflix", Uuid::new_v4())).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_collision_and_missing_row() {
        let repo = MemorySubscriptionRepository::new();
        let user = Uuid::new_v4();

        repo.insert(&sub("Netflix", user)).await.unwrap();
        let mut spotify = repo.insert(&sub("Spotify", user)).await.unwrap();

        // Keeping its own pair is not a collision
        spotify.price = 250;
        assert_eq!(repo.update(&spotify).await.unwrap().price, 250);

        spotify.service_name = "Netflix".to_string();
        assert!(repo.update(&spotify).await.unwrap_err().is_duplicate());
        assert_eq!(
            repo.find_by_id(spotify.id).await.unwrap().unwrap().service_name,
            "Spotify"
        );

        spotify.id = 999;
        assert!(repo.update(&spotify).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_find_pages_in_id_order() {
        let repo = MemorySubscriptionRepository::new();
        let user = Uuid::new_v4();
        for i in 0..25 {
            repo.insert(&sub(&format!("svc-{:02}", i), user)).await.unwrap();
        }

        let filter = SubscriptionFilter::new().with_user_id(user);
        let page = repo.find(&filter, &Pagination::new(2, 10)).await.unwrap();
        let ids: Vec<i32> = page.iter().map(|s| s.id).collect();

        assert_eq!(ids, (11..=20).collect::<Vec<_>>());
        assert_eq!(repo.total(&filter).await.unwrap(), 25);

        let last = repo.find(&filter, &Pagination::new(3, 10)).await.unwrap();
        assert_eq!(last.len(), 5);
    }

    #[tokio::test]
    async fn test_check_constraints_enforced() {
        let repo = MemorySubscriptionRepository::new();
        let mut bad = sub("Netflix", Uuid::new_v4());
        bad.end_date = Some(ym(2023, 1));

        let err = repo.insert(&bad).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = MemorySubscriptionRepository::new();
        let created = repo.insert(&sub("Netflix", Uuid::new_v4())).await.unwrap();

        assert!(repo.exists_by_id(created.id).await.unwrap());
        repo.delete(created.id).await.unwrap();
        assert!(!repo.exists_by_id(created.id).await.unwrap());
        assert!(repo.delete(created.id).await.unwrap_err().is_not_found());
        assert!(repo.is_empty());
    }
}
