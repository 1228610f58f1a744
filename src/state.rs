use std::sync::Arc;
use crate::domain::ports::{
    InvitationRepository, MembershipRepository, UserRepository, SessionRepository,
    MailLogRepository, EmailService
};
use crate::domain::services::{
    auth_service::AuthService, invitation_service::InvitationService, notifier::Notifier
};
use crate::config::Config;
use tera::Tera;

/// Storage adapters for one backend (SQLite or PostgreSQL).
pub struct Repositories {
    pub invitation_repo: Arc<dyn InvitationRepository>,
    pub membership_repo: Arc<dyn MembershipRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub session_repo: Arc<dyn SessionRepository>,
    pub mail_log_repo: Arc<dyn MailLogRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub invitation_repo: Arc<dyn InvitationRepository>,
    pub membership_repo: Arc<dyn MembershipRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub mail_log_repo: Arc<dyn MailLogRepository>,
    pub notifier: Arc<Notifier>,
    pub invitation_service: Arc<InvitationService>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    pub fn new(config: Config, repos: Repositories, email_service: Arc<dyn EmailService>, templates: Arc<Tera>) -> Self {
        let notifier = Arc::new(Notifier::new(
            email_service,
            repos.mail_log_repo.clone(),
            templates,
            config.app_base_url.clone(),
        ));

        let invitation_service = Arc::new(InvitationService::new(
            repos.invitation_repo.clone(),
            repos.membership_repo.clone(),
            repos.user_repo.clone(),
            notifier.clone(),
        ));

        let auth_service = Arc::new(AuthService::new(
            repos.user_repo.clone(),
            repos.session_repo,
            config.session_ttl_hours,
        ));

        Self {
            config,
            invitation_repo: repos.invitation_repo,
            membership_repo: repos.membership_repo,
            user_repo: repos.user_repo,
            mail_log_repo: repos.mail_log_repo,
            notifier,
            invitation_service,
            auth_service,
        }
    }
}
