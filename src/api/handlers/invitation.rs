use axum::{extract::{State, Path}, response::{IntoResponse, Response}, Json, http::StatusCode};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::{AcceptInvitationRequest, CheckEmailRequest, IssueInvitationRequest, ResendInvitationRequest};
use crate::api::dtos::responses::{CheckEmailResponse, InvitationAcceptedResponse, InvitationSentResponse};
use crate::api::extractors::auth::{require_club_manager, AuthUser};
use crate::api::extractors::json::JsonBody;
use crate::domain::services::invitation_service::IssueInvitation;
use crate::domain::services::validation::{normalize_email, optional, validate_email, RequiredFields};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub async fn check_email(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<CheckEmailRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut required = RequiredFields::new();
    let email = required.take("email", payload.email);
    required.finish()?;

    let availability = state.invitation_service
        .check_email(&normalize_email(&email), optional(payload.invitation_token).as_deref())
        .await?;

    Ok(Json(CheckEmailResponse { exists: availability.exists, message: availability.message }))
}

/// Persists the invitation, then emails the signup link. When only the email
/// fails, the 500 still carries the token so the invitation can be re-sent.
/// The inviter is always the signed-in club manager.
pub async fn issue_invitation(
    State(state): State<Arc<AppState>>,
    AuthUser(inviter): AuthUser,
    JsonBody(payload): JsonBody<IssueInvitationRequest>,
) -> Result<Response, AppError> {
    let mut required = RequiredFields::new();
    let invitee_email = required.take("inviteeEmail", payload.invitee_email);
    let invitee_name = required.take("inviteeName", payload.invitee_name);
    let club = required.take("clubName", payload.club_name);
    required.finish()?;

    let invitee_email = normalize_email(&invitee_email);
    validate_email(&invitee_email)?;
    require_club_manager(&inviter, &club)?;

    let issued = state.invitation_service.issue(IssueInvitation {
        invitee_email,
        invitee_name,
        club,
        inviter_name: inviter.name,
    }).await?;

    match issued.delivery {
        Ok(receipt) => Ok(Json(InvitationSentResponse {
            message: "Member invitation sent successfully",
            message_id: receipt.message_id,
            token: issued.invitation.token,
        }).into_response()),
        Err(e) => {
            let (status, message) = e.status_and_message();
            let body = json!({
                "error": message,
                "code": e.code(),
                "token": issued.invitation.token,
            });
            Ok((status, Json(body)).into_response())
        }
    }
}

pub async fn accept_invitation(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<AcceptInvitationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut required = RequiredFields::new();
    let token = required.take("token", payload.token);
    let user_email = required.take("userEmail", payload.user_email);
    let user_name = required.take("userName", payload.user_name);
    required.finish()?;

    let user_email = normalize_email(&user_email);
    validate_email(&user_email)?;

    let (invitation, _membership) = state.invitation_service
        .accept(&token, &user_email, &user_name)
        .await?;

    Ok(Json(InvitationAcceptedResponse {
        message: "Invitation accepted successfully",
        club: invitation.club,
    }))
}

pub async fn resend_invitation(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    JsonBody(payload): JsonBody<ResendInvitationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut required = RequiredFields::new();
    let token = required.take("token", payload.token);
    required.finish()?;

    let (invitation, receipt) = state.invitation_service.resend(&token, &user).await?;

    Ok(Json(InvitationSentResponse {
        message: "Member invitation sent successfully",
        message_id: receipt.message_id,
        token: invitation.token,
    }))
}

pub async fn list_club_invitations(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(club): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_club_manager(&user, &club)?;

    let invitations = state.invitation_service.list_for_club(&club).await?;
    info!("Listed {} invitations for {}", invitations.len(), club);

    Ok((StatusCode::OK, Json(invitations)))
}
