use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, auth, invitation, email, member};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))

        // Invitation lifecycle
        .route("/check-email", post(invitation::check_email))
        .route("/invitation", post(invitation::issue_invitation))
        .route("/invitation/accept", post(invitation::accept_invitation))
        .route("/invitation/resend", post(invitation::resend_invitation))

        // Notifications
        .route("/email/welcome", post(email::send_welcome))
        .route("/email/task-assignment", post(email::send_task_assignment))
        .route("/email/event-invitation", post(email::send_event_invitation))
        .route("/email/logs", get(email::list_mail_logs))

        // Club roster
        .route("/clubs/{club}/members", get(member::list_members))
        .route("/clubs/{club}/members/{member_id}", delete(member::delete_member))
        .route("/clubs/{club}/invitations", get(invitation::list_club_invitations))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}