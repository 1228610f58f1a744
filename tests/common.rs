#![allow(dead_code)]

use club_os_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::email::{DeliveryReceipt, OutgoingEmail},
    domain::ports::EmailService,
    domain::services::auth_service::NewAccount,
    domain::services::templates::load_email_templates,
    infra::factory::sqlite_repositories,
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use async_trait::async_trait;
use tower::ServiceExt;
use serde_json::Value;

/// Records every outgoing email. Flip `failing` to make the provider reject sends.
#[derive(Default)]
pub struct MockEmailService {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub failing: AtomicBool,
    attempts: AtomicUsize,
}

impl MockEmailService {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, AppError> {
        let n = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::EmailDelivery("Status: 502, Body: upstream unavailable".into()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(DeliveryReceipt { message_id: format!("<mock-{}@smtp.test>", n) })
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub email: Arc<MockEmailService>,
    inviters: Mutex<HashMap<(String, String), String>>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            mail_service_url: "http://localhost".to_string(),
            mail_api_key: "test-key".to_string(),
            mail_sender_email: "noreply@clubos.test".to_string(),
            mail_sender_name: "Club OS".to_string(),
            mail_timeout_secs: 1,
            app_base_url: "http://localhost:3002".to_string(),
            session_ttl_hours: 24,
            cookie_secure: false,
            seed_demo_users: false,
        };

        let email = Arc::new(MockEmailService::default());
        let templates = Arc::new(load_email_templates().expect("templates compile"));

        let state = Arc::new(AppState::new(
            config,
            sqlite_repositories(pool.clone()),
            email.clone(),
            templates,
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            email,
            inviters: Mutex::new(HashMap::new()),
        }
    }

    /// Inserts the demo accounts (admin and the three presidents).
    pub async fn seed_users(&self) {
        self.state.auth_service.seed_demo_users().await.expect("Failed to seed demo users");
    }

    pub async fn post_json(&self, uri: &str, payload: Value, session: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = session {
            builder = builder.header(header::COOKIE, cookie);
        }
        let response = self.router.clone()
            .oneshot(builder.body(Body::from(payload.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, parse_body(response).await)
    }

    pub async fn get(&self, uri: &str, session: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", uri, session).await
    }

    pub async fn delete(&self, uri: &str, session: Option<&str>) -> (StatusCode, Value) {
        self.request("DELETE", uri, session).await
    }

    async fn request(&self, method: &str, uri: &str, session: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = session {
            builder = builder.header(header::COOKIE, cookie);
        }
        let response = self.router.clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, parse_body(response).await)
    }

    /// Logs in and returns the `session=<id>` pair ready for a Cookie header.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let payload = serde_json::json!({ "email": email, "password": password });

        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap()
        ).await.unwrap();

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        session_cookie(&response).expect("No session cookie returned")
    }

    /// Creates an account directly and returns a `session=<id>` pair for it.
    pub async fn session_as(&self, name: &str, email: &str, role: &str, club: Option<&str>) -> String {
        let user = self.state.auth_service.register(NewAccount {
            email: email.to_string(),
            name: name.to_string(),
            password: "password123".to_string(),
            role: role.to_string(),
            club: club.map(String::from),
        }).await.expect("Failed to create test account");

        let raw = self.state.auth_service.open_session(&user).await.expect("Failed to open session");
        format!("session={}", raw)
    }

    /// Session of a president named `inviter` for `club`, created on first use.
    pub async fn inviter_session(&self, inviter: &str, club: &str) -> String {
        let key = (inviter.to_string(), club.to_string());
        if let Some(session) = self.inviters.lock().unwrap().get(&key) {
            return session.clone();
        }

        let email = format!("{}.{}@inviters.test", slug(inviter), slug(club));
        let session = self.session_as(inviter, &email, "president", Some(club)).await;
        self.inviters.lock().unwrap().insert(key, session.clone());
        session
    }

    /// Issues an invitation through the API as `inviter` and returns its token.
    pub async fn invite(&self, email: &str, name: &str, club: &str, inviter: &str) -> String {
        let session = self.inviter_session(inviter, club).await;
        let (status, body) = self.post_json("/invitation", serde_json::json!({
            "inviteeEmail": email,
            "inviteeName": name,
            "clubName": club,
        }), Some(&session)).await;
        assert_eq!(status, StatusCode::OK, "invite failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    /// A plain signed-in member, for endpoints that only need a session.
    pub async fn member_session(&self) -> String {
        let key = ("member".to_string(), String::new());
        if let Some(session) = self.inviters.lock().unwrap().get(&key) {
            return session.clone();
        }

        let session = self.session_as("Member", "member@inviters.test", "member", None).await;
        self.inviters.lock().unwrap().insert(key, session.clone());
        session
    }

    pub async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(sql).fetch_one(&self.pool).await.unwrap()
    }
}

fn slug(value: &str) -> String {
    value.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

pub fn session_cookie(response: &axum::response::Response) -> Option<String> {
    response.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find(|c| c.starts_with("session=") && !c.starts_with("session=;"))
        .map(|c| c.split(';').next().unwrap().to_string())
}

pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
