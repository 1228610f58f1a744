pub mod auth;
pub mod email;
pub mod health;
pub mod invitation;
pub mod member;
