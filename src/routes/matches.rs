use actix_web::{http::StatusCode, web, HttpResponse, Responder, ResponseError};
use validator::Validate;
use crate::core::{MatchPipeline, PipelineError};
use crate::models::{
    ErrorResponse, FindMatchesRequest, FindMatchesResponse, HealthResponse, ListMatchesQuery,
    ListMatchesResponse, MatchStatus, UpdateMatchStatusRequest,
};
use crate::services::{MatchStore, NotificationService, PostgresClient};
use std::sync::Arc;
use uuid::Uuid;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<MatchPipeline>,
    pub matches: Arc<dyn MatchStore>,
    pub notifications: Arc<NotificationService>,
    /// Absent when running on the in-memory store
    pub postgres: Option<Arc<PostgresClient>>,
}

impl ResponseError for PipelineError {
    fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::NotFound => StatusCode::NOT_FOUND,
            e if e.is_rate_limited() => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string()))
    }
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches))
        .route("/matches", web::get().to(list_matches))
        .route("/matches/{match_id}", web::patch().to(update_match_status));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = match &state.postgres {
        Some(pg) => pg.health_check().await.unwrap_or(false),
        None => true,
    };

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// { "itemId": "string" }
/// ```
///
/// Responds with every candidate the scorer reported, including those
/// below the match threshold. Clients re-query `/matches` to see which
/// pairs were recorded.
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> Result<HttpResponse, PipelineError> {
    let outcome = state.pipeline.run(&req.item_id).await.map_err(|e| {
        match &e {
            PipelineError::NotFound => tracing::info!("Item {} not found", req.item_id),
            _ => tracing::error!("Error in find-matches for {}: {}", req.item_id, e),
        }
        e
    })?;

    tracing::info!(
        "Returning {} scored candidates for item {} ({} newly recorded)",
        outcome.matches.len(),
        req.item_id,
        outcome.recorded.len()
    );

    Ok(HttpResponse::Ok().json(FindMatchesResponse {
        matches: outcome.matches,
    }))
}

/// List recorded matches for an item
///
/// GET /api/v1/matches?itemId={itemId}
///
/// Dismissed matches are left out; best score first.
async fn list_matches(
    state: web::Data<AppState>,
    query: web::Query<ListMatchesQuery>,
) -> impl Responder {
    match state.matches.list_for_item(query.item_id).await {
        Ok(matches) => HttpResponse::Ok().json(ListMatchesResponse { matches }),
        Err(e) => {
            tracing::error!("Failed to list matches for {}: {}", query.item_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(e.to_string()))
        }
    }
}

/// Confirm or dismiss a match
///
/// PATCH /api/v1/matches/{matchId}
///
/// Request body:
/// ```json
/// { "status": "confirmed|dismissed" }
/// ```
async fn update_match_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateMatchStatusRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::new(errors.to_string()));
    }

    let status = match MatchStatus::parse(&req.status) {
        Some(MatchStatus::Confirmed) => MatchStatus::Confirmed,
        Some(MatchStatus::Dismissed) => MatchStatus::Dismissed,
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse::new(
                "Status must be one of: confirmed, dismissed",
            ));
        }
    };

    let match_id = path.into_inner();

    match state.matches.update_status(match_id, status).await {
        Ok(Some(record)) => {
            tracing::info!("Match {} marked {}", match_id, status.as_str());
            HttpResponse::Ok().json(record)
        }
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::new("Match not found")),
        Err(e) => {
            tracing::error!("Failed to update match {}: {}", match_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScoringError;

    #[test]
    fn test_pipeline_error_status_codes() {
        assert_eq!(PipelineError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            PipelineError::Scoring(ScoringError::RateLimited).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            PipelineError::Scoring(ScoringError::Unavailable("down".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_pipeline_error_messages() {
        assert_eq!(PipelineError::NotFound.to_string(), "Item not found");
        assert_eq!(
            PipelineError::Scoring(ScoringError::RateLimited).to_string(),
            "Rate limit exceeded. Please try again later."
        );
    }
}
