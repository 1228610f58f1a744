use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::error::{AppError, RuleViolation};
use crate::api::dtos::requests::{LoginRequest, SignupRequest};
use crate::api::dtos::responses::SignupResponse;
use crate::api::extractors::{auth::AuthUser, maybe_auth::MaybeAuthUser, SESSION_COOKIE};
use crate::api::extractors::json::JsonBody;
use crate::domain::models::auth::{AuthResponse, UserProfile};
use crate::domain::models::membership::ROLE_MEMBER;
use crate::domain::services::auth_service::NewAccount;
use crate::domain::services::notifier::Notification;
use crate::domain::services::validation::{normalize_email, optional, validate_email, RequiredFields};
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use time::Duration;
use tracing::{info, warn};

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut required = RequiredFields::new();
    let email = required.take("email", payload.email);
    let password = required.take_verbatim("password", payload.password);
    required.finish()?;

    let (user, session) = state.auth_service.login(&normalize_email(&email), &password).await?;
    set_session_cookie(&state, &cookies, session);

    Ok(Json(AuthResponse { user: UserProfile::from(&user) }))
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    MaybeAuthUser(current): MaybeAuthUser,
    JsonBody(payload): JsonBody<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut required = RequiredFields::new();
    let name = required.take("name", payload.name);
    let email = required.take("email", payload.email);
    let password = required.take_verbatim("password", payload.password);
    required.finish()?;

    let email = normalize_email(&email);
    validate_email(&email)?;

    let invitation_token = optional(payload.invitation_token);
    let availability = state.invitation_service
        .check_email(&email, invitation_token.as_deref())
        .await?;
    if availability.exists {
        return Err(RuleViolation::EmailAlreadyRegistered.into());
    }

    let account = NewAccount {
        email,
        name,
        password,
        role: ROLE_MEMBER.to_string(),
        club: None,
    };

    let (user, invitation_accepted) = match &invitation_token {
        Some(token) => {
            let prepared = state.auth_service.prepare_account(account)?;
            let (_, _, user) = state.invitation_service.accept_for_new_user(token, &prepared).await?;
            (user, true)
        }
        None => (state.auth_service.register(account).await?, false),
    };

    if let Some(previous) = current {
        info!("Signup replaces session of user {}", previous.id);
        end_session(&state, &cookies).await;
    }

    let session = state.auth_service.open_session(&user).await?;
    set_session_cookie(&state, &cookies, session);

    let welcome = Notification::Welcome { email: user.email.clone(), name: user.name.clone() };
    if let Err(e) = state.notifier.send(&welcome).await {
        warn!("Welcome email for {} failed, signup continues: {}", user.id, e);
    }

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse { user: UserProfile::from(&user), invitation_accepted }),
    ))
}

pub async fn me(AuthUser(user): AuthUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(AuthResponse { user: UserProfile::from(&user) }))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    end_session(&state, &cookies).await;
    info!("User logged out");
    Ok(StatusCode::OK)
}

async fn end_session(state: &AppState, cookies: &Cookies) {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        if let Err(e) = state.auth_service.logout(cookie.value()).await {
            warn!("Failed to delete session: {}", e);
        }
    }
    cookies.remove(Cookie::build((SESSION_COOKIE, "")).path("/").into());
}

fn set_session_cookie(state: &AppState, cookies: &Cookies, session: String) {
    let ttl = state.auth_service.session_ttl();

    let mut cookie = Cookie::new(SESSION_COOKIE, session);
    cookie.set_http_only(true);
    cookie.set_secure(state.config.cookie_secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(Duration::seconds(ttl.num_seconds()));
    cookies.add(cookie);
}
