use crate::domain::models::{
    invitation::Invitation, membership::Membership, user::User, auth::SessionRecord,
    mail_log::MailLog, email::{OutgoingEmail, DeliveryReceipt}
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    async fn create(&self, invitation: &Invitation) -> Result<Invitation, AppError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>, AppError>;
    async fn find_pending(&self, email: &str, club: &str) -> Result<Option<Invitation>, AppError>;
    async fn find_pending_by_email(&self, email: &str) -> Result<Vec<Invitation>, AppError>;
    async fn list_by_club(&self, club: &str) -> Result<Vec<Invitation>, AppError>;

    /// Flips `pending -> accepted` and inserts the membership in one transaction.
    /// Nothing is written unless both steps succeed.
    async fn accept_with_membership(
        &self,
        token: &str,
        accepted_email: &str,
        accepted_name: &str,
        accepted_at: DateTime<Utc>,
    ) -> Result<(Invitation, Membership), AppError>;

    /// Same transaction as `accept_with_membership`, also inserting `user` with the
    /// invitation's club. Any failure leaves the invitation pending and no rows behind.
    async fn accept_with_new_user(
        &self,
        token: &str,
        user: &User,
        accepted_at: DateTime<Utc>,
    ) -> Result<(Invitation, Membership, User), AppError>;
}

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn create(&self, membership: &Membership) -> Result<Membership, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Membership>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Vec<Membership>, AppError>;
    async fn find_by_email_and_club(&self, email: &str, club: &str) -> Result<Option<Membership>, AppError>;
    async fn list_by_club(&self, club: &str) -> Result<Vec<Membership>, AppError>;
    async fn delete(&self, club: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn count(&self) -> Result<i64, AppError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, record: &SessionRecord) -> Result<(), AppError>;
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<SessionRecord>, AppError>;
    async fn delete(&self, token_hash: &str) -> Result<(), AppError>;
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

#[async_trait]
pub trait MailLogRepository: Send + Sync {
    async fn log_mail(&self, log: &MailLog) -> Result<(), AppError>;
    async fn list_logs(&self, recipient: Option<&str>) -> Result<Vec<MailLog>, AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, AppError>;
}
