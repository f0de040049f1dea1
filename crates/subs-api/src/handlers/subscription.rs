//! Subscription handlers
//!
//! HTTP handlers for subscription lifecycle endpoints. Input parsing and
//! validation live in the service; these handlers only shape responses.

use actix_web::{http::header, web, HttpResponse};
use subs_core::AppError;
use subs_services::DynSubscriptionService;
use tracing::{debug, instrument};

use crate::dto::{SubscriptionFilterRequest, SubscriptionRequest};

/// List subscriptions
///
/// GET /subscriptions
#[instrument(skip(service))]
pub async fn list_subscriptions(
    service: web::Data<DynSubscriptionService>,
    query: web::Query<SubscriptionFilterRequest>,
) -> Result<HttpResponse, AppError> {
    let page = service.list(&query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Get a single subscription by ID
///
/// GET /subscriptions/{id}
#[instrument(skip(service))]
pub async fn get_subscription(
    service: web::Data<DynSubscriptionService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    debug!(id, "Getting subscription");

    let subscription = service.index(id).await?;
    Ok(HttpResponse::Ok().json(subscription))
}

/// Create a new subscription
///
/// POST /subscriptions
#[instrument(skip(service, req))]
pub async fn create_subscription(
    service: web::Data<DynSubscriptionService>,
    req: web::Json<SubscriptionRequest>,
) -> Result<HttpResponse, AppError> {
    let created = service.create(&req).await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/subscriptions/{}", created.id)))
        .json(created))
}

/// Replace an existing subscription
///
/// PUT /subscriptions/{id}
#[instrument(skip(service, req))]
pub async fn update_subscription(
    service: web::Data<DynSubscriptionService>,
    path: web::Path<i32>,
    req: web::Json<SubscriptionRequest>,
) -> Result<HttpResponse, AppError> {
    let updated = service.update(&req, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Delete a subscription
///
/// DELETE /subscriptions/{id}
#[instrument(skip(service))]
pub async fn delete_subscription(
    service: web::Data<DynSubscriptionService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    service.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configure subscription routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("", web::get().to(list_subscriptions))
            .route("", web::post().to(create_subscription))
            .route("/{id}", web::get().to(get_subscription))
            .route("/{id}", web::put().to(update_subscription))
            .route("/{id}", web::delete().to(delete_subscription)),
    );
}
