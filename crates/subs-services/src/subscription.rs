//! Subscription lifecycle service
//!
//! Orchestrates create/update/delete/read/list and cost totals against a
//! [`SubscriptionRepository`]. All input is validated and parsed before any
//! storage call; every storage interaction of one operation runs under a
//! single deadline.
//!
//! Existence and uniqueness are checked read-then-act. The uniqueness
//! pre-check only produces a friendlier error early; the storage constraint
//! stays authoritative, so a collision that slips past the pre-check still
//! surfaces as [`AppError::DuplicateSubscription`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use subs_core::{
    dates::{parse_month_year, parse_optional_month_year},
    error::field_errors_from,
    models::{
        CostFilterRequest, Subscription, SubscriptionFilter, SubscriptionFilterRequest,
        SubscriptionRequest, SubscriptionResponse, TotalCostResponse,
    },
    traits::{PaginatedResponse, Pagination, SubscriptionRepository},
    AppError, AppResult, FieldError,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::constants::{DEFAULT_MAX_LIMIT, DEFAULT_REQUEST_TIMEOUT};
use crate::cost::CostCalculator;

/// Service over any repository, including trait objects
pub type DynSubscriptionService = SubscriptionService<dyn SubscriptionRepository>;

/// Subscription lifecycle service
pub struct SubscriptionService<R: SubscriptionRepository + ?Sized> {
    repo: Arc<R>,
    calculator: CostCalculator,
    request_timeout: Duration,
    max_limit: i64,
}

impl<R: SubscriptionRepository + ?Sized> SubscriptionService<R> {
    /// Create a new subscription service
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            calculator: CostCalculator::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }

    /// Deadline applied to the storage work of each operation
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Largest accepted page size
    pub fn with_max_limit(mut self, max_limit: i64) -> Self {
        self.max_limit = max_limit;
        self
    }

    /// Create a subscription
    #[instrument(skip(self, req), fields(service_name = %req.service_name))]
    pub async fn create(&self, req: &SubscriptionRequest) -> AppResult<SubscriptionResponse> {
        let sub = parse_request(req)?;

        let created = self
            .bounded(async {
                self.ensure_unique(&sub, None).await?;
                self.repo.insert(&sub).await
            })
            .await?;

        info!(
            id = created.id,
            user_id = %created.user_id,
            "Subscription created"
        );

        Ok(created.into())
    }

    /// Replace every mutable field of an existing subscription
    #[instrument(skip(self, req), fields(service_name = %req.service_name))]
    pub async fn update(&self, req: &SubscriptionRequest, id: i32) -> AppResult<SubscriptionResponse> {
        let mut sub = parse_request(req)?;
        sub.id = id;

        let updated = self
            .bounded(async {
                if !self.repo.exists_by_id(id).await? {
                    return Err(AppError::SubscriptionNotFound(id));
                }
                self.ensure_unique(&sub, Some(id)).await?;
                self.repo.update(&sub).await
            })
            .await?;

        info!(id, user_id = %updated.user_id, "Subscription updated");

        Ok(updated.into())
    }

    /// Delete a subscription
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.bounded(async {
            if !self.repo.exists_by_id(id).await? {
                return Err(AppError::SubscriptionNotFound(id));
            }
            self.repo.delete(id).await
        })
        .await?;

        info!(id, "Subscription deleted");
        Ok(())
    }

    /// Fetch one subscription
    #[instrument(skip(self))]
    pub async fn index(&self, id: i32) -> AppResult<SubscriptionResponse> {
        let sub = self
            .bounded(self.repo.find_by_id(id))
            .await?
            .ok_or(AppError::SubscriptionNotFound(id))?;

        Ok(sub.into())
    }

    /// List one page of subscriptions with the filtered total
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        req: &SubscriptionFilterRequest,
    ) -> AppResult<PaginatedResponse<SubscriptionResponse>> {
        let (filter, pagination) = self.parse_list_request(req)?;

        let (subs, total) = self
            .bounded(async {
                let subs = self.repo.find(&filter, &pagination).await?;
                let total = self.repo.total(&filter).await?;
                Ok::<_, AppError>((subs, total))
            })
            .await?;

        debug!("Listed {} subscriptions out of {} total", subs.len(), total);

        let data = subs.into_iter().map(SubscriptionResponse::from).collect();
        Ok(pagination.paginate(data, total))
    }

    /// Sum the cost of every matching subscription inside a bounded window
    #[instrument(skip(self))]
    pub async fn total(&self, req: &CostFilterRequest) -> AppResult<TotalCostResponse> {
        let (filter, window_start, window_end) = parse_cost_request(req)?;

        let subs = self.bounded(self.repo.find_all(&filter)).await?;
        let total_cost = self.calculator.total_cost(&subs, window_start, window_end);

        debug!(
            "Total cost {} over {} subscriptions",
            total_cost,
            subs.len()
        );

        Ok(TotalCostResponse { total_cost })
    }

    /// Reject early when another subscription already holds the pair
    async fn ensure_unique(&self, sub: &Subscription, exclude_id: Option<i32>) -> AppResult<()> {
        let filter = SubscriptionFilter::new()
            .with_service_name(sub.service_name.clone())
            .with_user_id(sub.user_id);

        let taken = self
            .repo
            .find_all(&filter)
            .await?
            .iter()
            .any(|existing| Some(existing.id) != exclude_id);

        if taken {
            warn!(
                user_id = %sub.user_id,
                service_name = %sub.service_name,
                "Subscription rejected: user already subscribed to this service"
            );
            return Err(AppError::DuplicateSubscription {
                user_id: sub.user_id.to_string(),
                service_name: sub.service_name.clone(),
            });
        }

        Ok(())
    }

    /// Run storage work under the request deadline
    ///
    /// On expiry the inner future is dropped, which cancels the in-flight
    /// query.
    async fn bounded<T, F>(&self, work: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        tokio::time::timeout(self.request_timeout, work)
            .await
            .map_err(|_| {
                warn!(
                    "Storage work exceeded the {:?} request deadline",
                    self.request_timeout
                );
                AppError::Timeout(
                    u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX),
                )
            })?
    }

    fn parse_list_request(
        &self,
        req: &SubscriptionFilterRequest,
    ) -> AppResult<(SubscriptionFilter, Pagination)> {
        let mut fields = Vec::new();

        if req.page < 1 {
            fields.push(FieldError::new("page", "page should be at least 1"));
        }
        if req.limit < 1 {
            fields.push(FieldError::new("limit", "limit should be at least 1"));
        } else if req.limit > self.max_limit {
            fields.push(FieldError::new(
                "limit",
                format!("limit should be at most {}", self.max_limit),
            ));
        }
        if fields.is_empty() && Pagination::new(req.page, req.limit).checked_offset().is_none() {
            fields.push(FieldError::new("page", "page is out of range"));
        }

        let user_id = parse_optional_uuid(&req.user_id, &mut fields);
        let start_date = parse_optional_date("start_date", &req.start_date, &mut fields);
        let end_date = parse_optional_date("end_date", &req.end_date, &mut fields);

        reject_if_any(fields)?;

        let filter = SubscriptionFilter {
            service_name: non_empty(&req.service_name),
            user_id,
            start_date,
            end_date,
        };

        Ok((filter, Pagination::new(req.page, req.limit)))
    }
}

/// Validate a create/update request and turn it into an entity
fn parse_request(req: &SubscriptionRequest) -> AppResult<Subscription> {
    let mut fields = match req.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => field_errors_from(&errors),
    };

    let user_id = if req.user_id.is_empty() {
        fields.push(FieldError::required("user_id"));
        None
    } else {
        parse_optional_uuid(&req.user_id, &mut fields)
    };
    let start_date = parse_required_date("start_date", &req.start_date, &mut fields);
    let end_date = parse_optional_date("end_date", &req.end_date, &mut fields);

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end < start {
            fields.push(FieldError::new(
                "end_date",
                "end_date must not precede start_date",
            ));
        }
    }

    let (Some(user_id), Some(start_date)) = (user_id, start_date) else {
        return Err(rejected(fields));
    };
    reject_if_any(fields)?;

    Ok(Subscription {
        id: 0,
        service_name: req.service_name.clone(),
        price: req.price,
        user_id,
        start_date,
        end_date,
    })
}

/// Validate a cost query; both window bounds are mandatory
fn parse_cost_request(
    req: &CostFilterRequest,
) -> AppResult<(SubscriptionFilter, NaiveDate, NaiveDate)> {
    let mut fields = Vec::new();

    let user_id = parse_optional_uuid(&req.user_id, &mut fields);
    let start_date = parse_required_date("start_date", &req.start_date, &mut fields);
    let end_date = parse_required_date("end_date", &req.end_date, &mut fields);

    let (Some(window_start), Some(window_end)) = (start_date, end_date) else {
        return Err(rejected(fields));
    };
    reject_if_any(fields)?;

    let filter = SubscriptionFilter {
        service_name: non_empty(&req.service_name),
        user_id,
        start_date: Some(window_start),
        end_date: Some(window_end),
    };

    Ok((filter, window_start, window_end))
}

fn parse_required_date(field: &str, value: &str, fields: &mut Vec<FieldError>) -> Option<NaiveDate> {
    if value.is_empty() {
        fields.push(FieldError::required(field));
        return None;
    }

    match parse_month_year(value) {
        Ok(date) => Some(date),
        Err(_) => {
            fields.push(FieldError::month_year(field));
            None
        }
    }
}

fn parse_optional_date(field: &str, value: &str, fields: &mut Vec<FieldError>) -> Option<NaiveDate> {
    match parse_optional_month_year(value) {
        Ok(date) => date,
        Err(_) => {
            fields.push(FieldError::month_year(field));
            None
        }
    }
}

fn parse_optional_uuid(value: &str, fields: &mut Vec<FieldError>) -> Option<Uuid> {
    if value.is_empty() {
        return None;
    }

    match Uuid::parse_str(value) {
        Ok(id) => Some(id),
        Err(_) => {
            fields.push(FieldError::uuid("user_id"));
            None
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn rejected(mut fields: Vec<FieldError>) -> AppError {
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    warn!(?fields, "Request validation failed");
    AppError::Validation(fields)
}

fn reject_if_any(fields: Vec<FieldError>) -> AppResult<()> {
    if fields.is_empty() {
        Ok(())
    } else {
        Err(rejected(fields))
    }
}
