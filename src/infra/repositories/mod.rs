pub mod sqlite_invitation_repo;
pub mod sqlite_membership_repo;
pub mod sqlite_user_repo;
pub mod sqlite_session_repo;
pub mod sqlite_mail_log_repo;

pub mod postgres_invitation_repo;
pub mod postgres_membership_repo;
pub mod postgres_user_repo;
pub mod postgres_session_repo;
pub mod postgres_mail_log_repo;
