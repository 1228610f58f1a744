pub mod auth_service;
pub mod invitation_service;
pub mod notifier;
pub mod templates;
pub mod validation;
