pub mod auth;
pub mod email;
pub mod invitation;
pub mod mail_log;
pub mod membership;
pub mod user;
