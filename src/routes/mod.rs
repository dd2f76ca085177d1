// Route exports
pub mod matches;
pub mod notifications;

use actix_web::{error, web, HttpRequest, HttpResponse};
use crate::models::ErrorResponse;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(notifications::configure),
    );
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    let body = ErrorResponse::new(format!("Invalid JSON: {}", err));
    error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = ErrorResponse::new(format!("Invalid query: {}", err));
    error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

/// Handle path parameter errors
pub fn handle_path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    let body = ErrorResponse::new(format!("Invalid path: {}", err));
    error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

/// JSON, query and path extractor configs that answer with `{error}` bodies
pub fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
        .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
        .app_data(web::PathConfig::default().error_handler(handle_path_error));
}
