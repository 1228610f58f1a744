use axum::{
    extract::{FromRequestParts, FromRef},
    http::request::Parts,
};
use crate::api::extractors::SESSION_COOKIE;
use crate::state::AppState;
use crate::domain::models::user::User;
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::Span;

/// A request with a live session. Identity and role are always read from the
/// `users` row the session points at.
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = parts.extensions.get::<Cookies>()
            .ok_or(AppError::Internal)?;

        let raw_session = cookies.get(SESSION_COOKIE)
            .ok_or(AppError::Unauthorized)?
            .value()
            .to_string();

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let user = app_state.auth_service.resolve(&raw_session).await?
            .ok_or(AppError::Unauthorized)?;

        Span::current().record("user_id", &user.id);

        Ok(AuthUser(user))
    }
}

/// 403 unless the user presides over `club` or is an admin.
pub fn require_club_manager(user: &User, club: &str) -> Result<(), AppError> {
    if user.can_manage_club(club) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("You cannot manage {}", club)))
    }
}

pub fn require_admin(user: &User) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin access required".into()))
    }
}
