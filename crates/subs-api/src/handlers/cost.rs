//! Cost handlers

use actix_web::{web, HttpResponse};
use subs_core::AppError;
use subs_services::DynSubscriptionService;
use tracing::instrument;

use crate::dto::CostFilterRequest;

/// Total cost of matching subscriptions inside a window
///
/// GET /costs/total?start_date=MM-YYYY&end_date=MM-YYYY[&service_name][&user_id]
#[instrument(skip(service))]
pub async fn total_cost(
    service: web::Data<DynSubscriptionService>,
    query: web::Query<CostFilterRequest>,
) -> Result<HttpResponse, AppError> {
    let total = service.total(&query).await?;
    Ok(HttpResponse::Ok().json(total))
}

/// Configure cost routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/costs").route("/total", web::get().to(total_cost)));
}
