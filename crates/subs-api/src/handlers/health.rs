//! Liveness endpoint

use actix_web::{web, HttpResponse};

use crate::dto::HeartbeatResponse;

/// Liveness probe
///
/// GET /heartbeat
pub async fn heartbeat() -> HttpResponse {
    HttpResponse::Ok().json(HeartbeatResponse::default())
}

/// Configure health routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/heartbeat", web::get().to(heartbeat));
}
