use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub mail_service_url: String,
    pub mail_api_key: String,
    pub mail_sender_email: String,
    pub mail_sender_name: String,
    pub mail_timeout_secs: u64,
    pub app_base_url: String, // Used to build signup links
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub seed_demo_users: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "https://api.brevo.com/v3/smtp/email".to_string()),
            mail_api_key: env::var("MAIL_API_KEY").expect("MAIL_API_KEY must be set"),
            mail_sender_email: env::var("MAIL_SENDER_EMAIL").unwrap_or_else(|_| "noreply@clubos.com".to_string()),
            mail_sender_name: env::var("MAIL_SENDER_NAME").unwrap_or_else(|_| "Club OS".to_string()),
            mail_timeout_secs: env::var("MAIL_TIMEOUT_SECS").unwrap_or_else(|_| "10".to_string()).parse().expect("MAIL_TIMEOUT_SECS must be a number"),
            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3002".to_string())
                .trim_end_matches('/')
                .to_string(),
            session_ttl_hours: env::var("SESSION_TTL_HOURS").unwrap_or_else(|_| "168".to_string()).parse().expect("SESSION_TTL_HOURS must be a number"),
            cookie_secure: flag("COOKIE_SECURE", true),
            seed_demo_users: flag("SEED_DEMO_USERS", false),
        }
    }
}

fn flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}
