use axum::{extract::{State, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::{EventInvitationEmailRequest, MailLogQuery, TaskAssignmentEmailRequest, WelcomeEmailRequest};
use crate::api::dtos::responses::EmailSentResponse;
use crate::api::extractors::auth::{require_admin, AuthUser};
use crate::api::extractors::json::JsonBody;
use crate::domain::services::notifier::Notification;
use crate::domain::services::validation::{normalize_email, optional, validate_email, RequiredFields};
use std::sync::Arc;

pub async fn send_welcome(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    JsonBody(payload): JsonBody<WelcomeEmailRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut required = RequiredFields::new();
    let email = required.take("email", payload.email);
    let name = required.take("name", payload.name);
    required.finish()?;

    let email = normalize_email(&email);
    validate_email(&email)?;

    let receipt = state.notifier.send(&Notification::Welcome { email, name }).await?;

    Ok(Json(EmailSentResponse {
        message: "Welcome email sent successfully",
        message_id: receipt.message_id,
    }))
}

pub async fn send_task_assignment(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    JsonBody(payload): JsonBody<TaskAssignmentEmailRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut required = RequiredFields::new();
    let assignee_email = required.take("assigneeEmail", payload.assignee_email);
    let assignee_name = required.take("assigneeName", payload.assignee_name);
    let task_title = required.take("taskTitle", payload.task_title);
    let task_description = required.take("taskDescription", payload.task_description);
    let assigned_by = required.take("assignedBy", payload.assigned_by);
    required.finish()?;

    let assignee_email = normalize_email(&assignee_email);
    validate_email(&assignee_email)?;

    let receipt = state.notifier.send(&Notification::TaskAssignment {
        assignee_email,
        assignee_name,
        task_title,
        task_description,
        assigned_by,
    }).await?;

    Ok(Json(EmailSentResponse {
        message: "Task assignment email sent successfully",
        message_id: receipt.message_id,
    }))
}

pub async fn send_event_invitation(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    JsonBody(payload): JsonBody<EventInvitationEmailRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut required = RequiredFields::new();
    let attendee_email = required.take("attendeeEmail", payload.attendee_email);
    let attendee_name = required.take("attendeeName", payload.attendee_name);
    let event_title = required.take("eventTitle", payload.event_title);
    let event_date = required.take("eventDate", payload.event_date);
    required.finish()?;

    let attendee_email = normalize_email(&attendee_email);
    validate_email(&attendee_email)?;

    let receipt = state.notifier.send(&Notification::EventInvitation {
        attendee_email,
        attendee_name,
        event_title,
        event_date,
        event_location: optional(payload.event_location),
    }).await?;

    Ok(Json(EmailSentResponse {
        message: "Event invitation email sent successfully",
        message_id: receipt.message_id,
    }))
}

pub async fn list_mail_logs(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<MailLogQuery>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&user)?;

    let recipient = optional(query.recipient).map(|r| normalize_email(&r));
    let logs = state.mail_log_repo.list_logs(recipient.as_deref()).await?;
    Ok(Json(logs))
}
