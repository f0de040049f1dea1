//! Common DTOs and extractor settings used across the API

use actix_web::{error, web, HttpRequest};
use serde::{Deserialize, Serialize};
use subs_core::AppError;
use tracing::debug;

/// Liveness probe body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeartbeatResponse {
    /// Always `"ok"` while the process serves requests
    pub status: String,
    /// Crate version
    pub version: String,
}

impl Default for HeartbeatResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

fn bad_request(kind: &str, err: impl std::fmt::Display, req: &HttpRequest) -> error::Error {
    debug!(path = %req.path(), "Malformed {}: {}", kind, err);
    AppError::BadRequest(err.to_string()).into()
}

/// JSON body extractor that answers malformed payloads with 400
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| bad_request("JSON body", err, req))
}

/// Query string extractor that answers malformed parameters with 400
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, req| bad_request("query string", err, req))
}

/// Path extractor that answers non-integer ids with 400
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, req| bad_request("path", err, req))
}
