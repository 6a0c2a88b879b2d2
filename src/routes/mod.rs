// Route exports
pub mod auth;
pub mod survey;

use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;

use crate::auth::token::{Claims, TokenIssuer};
use crate::core::Scorer;
use crate::models::ErrorResponse;
use crate::services::{CacheManager, PostgresClient};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub cache: Arc<CacheManager>,
    pub tokens: TokenIssuer,
    pub scorer: Scorer,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(auth::configure)
            .configure(survey::configure),
    );
}

/// Resolve the caller from the request's bearer token.
///
/// Returns the ready-to-send 401 response on failure so handlers can
/// bail with a plain `return`.
pub(crate) fn authenticate(state: &AppState, req: &HttpRequest) -> Result<Claims, HttpResponse> {
    let token = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let token = match token {
        Some(token) => token,
        None => return Err(unauthorized("Missing bearer token")),
    };

    state
        .tokens
        .verify(token)
        .map_err(|e| unauthorized(&e.to_string()))
}

pub(crate) fn unauthorized(message: &str) -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse {
        error: "Not authenticated".to_string(),
        message: message.to_string(),
        status_code: 401,
    })
}
