use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{ErrorResponse, NotificationRequest, NotificationResponse};
use crate::routes::matches::AppState;

/// Configure notification routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/notifications/send", web::post().to(send_notification));
}

/// Deliver a notification
///
/// POST /api/v1/notifications/send
///
/// Request body:
/// ```json
/// {
///   "type": "match|message|status_change",
///   "userId": "uuid",
///   "title": "string",
///   "message": "string",
///   "itemId": "uuid",
///   "relatedItemId": "uuid",
///   "sendEmail": true
/// }
/// ```
///
/// Succeeds once the in-app row is stored, whether or not the email went out.
async fn send_notification(
    state: web::Data<AppState>,
    req: web::Json<NotificationRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::new(errors.to_string()));
    }

    tracing::info!(
        "Sending {} notification to {}",
        req.notification_type.as_str(),
        req.user_id
    );

    match state.notifications.deliver(&req).await {
        Ok(_) => HttpResponse::Ok().json(NotificationResponse { success: true }),
        Err(e) => {
            tracing::error!("Error in send-notification: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(e.to_string()))
        }
    }
}
