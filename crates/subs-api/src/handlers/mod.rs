//! HTTP request handlers

pub mod cost;
pub mod health;
pub mod subscription;

use actix_web::web;

use crate::dto::{json_config, path_config, query_config};

pub use cost::configure as configure_costs;
pub use health::configure as configure_health;
pub use subscription::configure as configure_subscriptions;

/// Register every route together with the extractor error handlers
///
/// Handlers expect a `web::Data<DynSubscriptionService>` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .configure(configure_health)
        .configure(configure_subscriptions)
        .configure(configure_costs);
}
