use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::{require_club_manager, AuthUser};
use std::sync::Arc;
use crate::error::AppError;
use tracing::{info, error};

pub async fn list_members(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(club): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let members = state.membership_repo.list_by_club(&club).await?;
    Ok(Json(members))
}

pub async fn delete_member(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path((club, member_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    require_club_manager(&user, &club)?;

    let target = state.membership_repo.find_by_id(&member_id).await?
        .filter(|m| m.club == club)
        .ok_or(AppError::NotFound("Member not found".into()))?;

    match state.membership_repo.delete(&club, &target.id).await {
        Ok(_) => {
            info!("Removed {} from {}", target.email, club);
            Ok(Json(serde_json::json!({"status": "deleted"})))
        },
        Err(e) => {
            error!("Failed to remove member {}: {:?}", member_id, e);
            Err(e)
        }
    }
}
