use std::sync::Arc;
use crate::domain::{
    models::{auth::SessionRecord, user::User},
    ports::{SessionRepository, UserRepository}
};
use crate::error::{is_unique_violation, AppError, RuleViolation};
use argon2::{password_hash::{SaltString, PasswordHasher}, Argon2, PasswordHash, PasswordVerifier};
use chrono::{Utc, Duration};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use sha2::{Sha256, Digest};
use tracing::{debug, info};

pub const MIN_PASSWORD_LEN: usize = 6;

// (email, password, name, role, club)
const DEMO_USERS: &[(&str, &str, &str, &str, Option<&str>)] = &[
    ("admin@clubos.com", "admin123", "Admin User", "admin", None),
    ("rahul@techclub.com", "tech123", "Rahul Kumar", "president", Some("Tech Club")),
    ("priya@cultural.com", "cultural123", "Priya Sharma", "president", Some("Cultural Society")),
    ("amit@sports.com", "sports123", "Amit Singh", "president", Some("Sports Club")),
];

pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: String,
    pub club: Option<String>,
}

pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(user_repo: Arc<dyn UserRepository>, session_repo: Arc<dyn SessionRepository>, session_ttl_hours: i64) -> Self {
        Self { user_repo, session_repo, session_ttl: Duration::hours(session_ttl_hours) }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Returns the user and a fresh raw session id.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AppError> {
        let user = self.user_repo.find_by_email(email).await?
            .ok_or(AppError::Unauthorized)?;

        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal)?;

        Argon2::default().verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AppError::Unauthorized)?;

        let session = self.open_session(&user).await?;
        info!("User logged in: {}", user.id);
        Ok((user, session))
    }

    /// Validates and hashes a new account without storing it.
    pub fn prepare_account(&self, account: NewAccount) -> Result<User, AppError> {
        if account.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters long", MIN_PASSWORD_LEN
            )));
        }

        let password_hash = hash_password(&account.password)?;
        Ok(User::new(account.email, account.name, password_hash, account.role, account.club))
    }

    pub async fn register(&self, account: NewAccount) -> Result<User, AppError> {
        let user = self.prepare_account(account)?;
        let created = self.user_repo.create(&user).await.map_err(email_taken)?;

        info!("Registered user: {}", created.id);
        Ok(created)
    }

    pub async fn open_session(&self, user: &User) -> Result<String, AppError> {
        let raw: String = rand::thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect();
        let now = Utc::now();

        let record = SessionRecord {
            token_hash: self.hash_token(&raw),
            user_id: user.id.clone(),
            expires_at: now + self.session_ttl,
            created_at: now,
        };

        self.session_repo.create(&record).await?;
        Ok(raw)
    }

    /// Resolves a raw session id to its user. Expired sessions are removed and treated as absent.
    pub async fn resolve(&self, raw_session: &str) -> Result<Option<User>, AppError> {
        let token_hash = self.hash_token(raw_session);

        let Some(record) = self.session_repo.find_by_token_hash(&token_hash).await? else {
            return Ok(None);
        };

        if record.expires_at < Utc::now() {
            debug!("Session for user {} expired", record.user_id);
            self.session_repo.delete(&token_hash).await?;
            return Ok(None);
        }

        self.user_repo.find_by_id(&record.user_id).await
    }

    pub async fn logout(&self, raw_session: &str) -> Result<(), AppError> {
        let token_hash = self.hash_token(raw_session);
        self.session_repo.delete(&token_hash).await
    }

    pub async fn purge_expired_sessions(&self) -> Result<u64, AppError> {
        self.session_repo.delete_expired(Utc::now()).await
    }

    /// Inserts the demo accounts when the user table is empty. Returns how many were created.
    pub async fn seed_demo_users(&self) -> Result<usize, AppError> {
        if self.user_repo.count().await? > 0 {
            return Ok(0);
        }

        for (email, password, name, role, club) in DEMO_USERS {
            self.register(NewAccount {
                email: email.to_string(),
                name: name.to_string(),
                password: password.to_string(),
                role: role.to_string(),
                club: club.map(String::from),
            }).await?;
        }

        info!("Seeded {} demo users", DEMO_USERS.len());
        Ok(DEMO_USERS.len())
    }

    pub fn hash_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// A unique violation on account insert means the address was registered concurrently.
pub fn email_taken(e: AppError) -> AppError {
    match e {
        AppError::Database(ref db) if is_unique_violation(db) => RuleViolation::EmailAlreadyRegistered.into(),
        other => other,
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalWithMsg(format!("Password hashing failed: {}", e)))
}
