//! Subscription repository implementation
//!
//! Provides PostgreSQL-backed storage for subscriptions. Filters are rendered
//! with `sqlx::QueryBuilder` so every value is bound, never interpolated.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use subs_core::{
    dates::first_of_month,
    models::{Subscription, SubscriptionFilter},
    traits::{Pagination, SubscriptionRepository},
    AppError, AppResult,
};
use tracing::{debug, error, instrument};
use uuid::Uuid;

const SELECT_SUBSCRIPTIONS: &str =
    "SELECT id, service_name, price, user_id, start_date, end_date FROM subscriptions";

const COUNT_SUBSCRIPTIONS: &str = "SELECT COUNT(*) FROM subscriptions";

/// Database row representation of a subscription
#[derive(Debug, FromRow)]
struct SubscriptionRow {
    id: i32,
    service_name: String,
    price: i64,
    user_id: Uuid,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
}

impl From<SubscriptionRow> for Subscription {
    /// Rows written outside the service may carry any day of month
    fn from(row: SubscriptionRow) -> Self {
        Subscription {
            id: row.id,
            service_name: row.service_name,
            price: row.price,
            user_id: row.user_id,
            start_date: first_of_month(row.start_date),
            end_date: row.end_date.map(first_of_month),
        }
    }
}

/// PostgreSQL implementation of SubscriptionRepository
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append the filter as a WHERE clause
    fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &SubscriptionFilter) {
        qb.push(" WHERE TRUE");

        if let Some(ref service_name) = filter.service_name {
            qb.push(" AND service_name = ").push_bind(service_name.clone());
        }

        if let Some(user_id) = filter.user_id {
            qb.push(" AND user_id = ").push_bind(user_id);
        }

        if let Some(start) = filter.start_date {
            qb.push(" AND (end_date IS NULL OR end_date >= ")
                .push_bind(start)
                .push(")");
        }

        if let Some(end) = filter.end_date {
            qb.push(" AND start_date <= ").push_bind(end);
        }
    }

    /// Classify a failed write
    fn map_write_error(e: sqlx::Error, sub: &Subscription, action: &str) -> AppError {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                debug!(
                    user_id = %sub.user_id,
                    service_name = %sub.service_name,
                    "Unique constraint rejected subscription {}", action
                );
                return AppError::DuplicateSubscription {
                    user_id: sub.user_id.to_string(),
                    service_name: sub.service_name.clone(),
                };
            }
        }

        error!("Database error on subscription {}: {}", action, e);
        AppError::Database(format!("Failed to {} subscription: {}", action, e))
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    #[instrument(skip(self, subscription), fields(user_id = %subscription.user_id))]
    async fn insert(&self, subscription: &Subscription) -> AppResult<Subscription> {
        debug!("Inserting subscription: {}", subscription.service_name);

        let row = sqlx::query_as::<Postgres, SubscriptionRow>(
            r#"
            INSERT INTO subscriptions (service_name, price, user_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, service_name, price, user_id, start_date, end_date
            "#,
        )
        .bind(&subscription.service_name)
        .bind(subscription.price)
        .bind(subscription.user_id)
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, subscription, "insert"))?;

        Ok(row.into())
    }

    #[instrument(skip(self, subscription), fields(id = subscription.id))]
    async fn update(&self, subscription: &Subscription) -> AppResult<Subscription> {
        debug!("Updating subscription: {}", subscription.id);

        let row = sqlx::query_as::<Postgres, SubscriptionRow>(
            r#"
            UPDATE subscriptions
            SET service_name = $1, price = $2, user_id = $3, start_date = $4, end_date = $5
            WHERE id = $6
            RETURNING id, service_name, price, user_id, start_date, end_date
            "#,
        )
        .bind(&subscription.service_name)
        .bind(subscription.price)
        .bind(subscription.user_id)
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .bind(subscription.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, subscription, "update"))?;

        // The row may have been deleted after the service's existence check
        row.map(Into::into)
            .ok_or(AppError::SubscriptionNotFound(subscription.id))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> AppResult<()> {
        debug!("Deleting subscription: {}", id);

        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting subscription {}: {}", id, e);
                AppError::Database(format!("Failed to delete subscription: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::SubscriptionNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn exists_by_id(&self, id: i32) -> AppResult<bool> {
        sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM subscriptions WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error checking subscription {}: {}", id, e);
            AppError::Database(format!("Failed to check subscription: {}", e))
        })
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Subscription>> {
        debug!("Finding subscription by id: {}", id);

        let mut qb = QueryBuilder::<Postgres>::new(SELECT_SUBSCRIPTIONS);
        qb.push(" WHERE id = ").push_bind(id);

        let row = qb
            .build_query_as::<SubscriptionRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding subscription {}: {}", id, e);
                AppError::Database(format!("Failed to find subscription: {}", e))
            })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find(
        &self,
        filter: &SubscriptionFilter,
        pagination: &Pagination,
    ) -> AppResult<Vec<Subscription>> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_SUBSCRIPTIONS);
        Self::push_filter(&mut qb, filter);
        qb.push(" ORDER BY id ASC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = qb
            .build_query_as::<SubscriptionRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing subscriptions: {}", e);
                AppError::Database(format!("Failed to list subscriptions: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_all(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_SUBSCRIPTIONS);
        Self::push_filter(&mut qb, filter);
        qb.push(" ORDER BY id ASC");

        let rows = qb
            .build_query_as::<SubscriptionRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error fetching subscriptions: {}", e);
                AppError::Database(format!("Failed to fetch subscriptions: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn total(&self, filter: &SubscriptionFilter) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new(COUNT_SUBSCRIPTIONS);
        Self::push_filter(&mut qb, filter);

        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting subscriptions: {}", e);
                AppError::Database(format!("Failed to count subscriptions: {}", e))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_sql_includes_only_supplied_sides() {
        let filter = SubscriptionFilter::new()
            .with_service_name("Netflix")
            .with_window(NaiveDate::from_ymd_opt(2024, 3, 1), None);

        let mut qb = QueryBuilder::<Postgres>::new(COUNT_SUBSCRIPTIONS);
        PgSubscriptionRepository::push_filter(&mut qb, &filter);
        let sql = qb.sql();

        assert!(sql.contains("service_name = $1"));
        assert!(sql.contains("(end_date IS NULL OR end_date >= $2)"));
        assert!(!sql.contains("user_id"));
        assert!(!sql.contains("start_date <="));
    }

    #[test]
    fn test_row_dates_normalized_to_month() {
        let row = SubscriptionRow {
            id: 3,
            service_name: "Netflix".to_string(),
            price: 100,
            user_id: Uuid::nil(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 17).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 9, 30),
        };

        let sub = Subscription::from(row);
        assert_eq!(sub.start_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(sub.end_date, NaiveDate::from_ymd_opt(2024, 9, 1));
    }

    #[test]
    fn test_empty_filter_sql() {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_SUBSCRIPTIONS);
        PgSubscriptionRepository::push_filter(&mut qb, &SubscriptionFilter::new());
        assert!(qb.sql().ends_with("FROM subscriptions WHERE TRUE"));
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_duplicate_insert_is_classified() {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/subscriptions".to_string());
        let pool = PgPool::connect(&database_url).await.unwrap();
        crate::run_migrations(&pool).await.unwrap();

        let repo = PgSubscriptionRepository::new(pool);
        let sub = Subscription {
            id: 0,
            service_name: format!("svc-{}", Uuid::new_v4()),
            price: 100,
            user_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
        };

        let created = repo.insert(&sub).await.unwrap();
        assert!(created.id > 0);

        let err = repo.insert(&sub).await.unwrap_err();
        assert!(err.is_duplicate());

        repo.delete(created.id).await.unwrap();
        assert!(!repo.exists_by_id(created.id).await.unwrap());
    }
}
