pub mod auth;
pub mod json;
pub mod maybe_auth;

/// Name of the cookie carrying the raw session id.
pub const SESSION_COOKIE: &str = "session";
