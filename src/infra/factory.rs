use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::{AppState, Repositories};
use crate::infra::email::http_email_service::HttpEmailService;
use crate::domain::services::templates::load_email_templates;
use crate::infra::repositories::{
    postgres_invitation_repo::PostgresInvitationRepo, postgres_membership_repo::PostgresMembershipRepo,
    postgres_user_repo::PostgresUserRepo, postgres_session_repo::PostgresSessionRepo,
    postgres_mail_log_repo::PostgresMailLogRepo,
    sqlite_invitation_repo::SqliteInvitationRepo, sqlite_membership_repo::SqliteMembershipRepo,
    sqlite_user_repo::SqliteUserRepo, sqlite_session_repo::SqliteSessionRepo,
    sqlite_mail_log_repo::SqliteMailLogRepo,
};

/// Connects to the store (required), runs migrations and wires every service.
/// Any failure here aborts startup.
pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;
    let email_service = Arc::new(HttpEmailService::new(
        config.mail_service_url.clone(),
        config.mail_api_key.clone(),
        config.mail_sender_email.clone(),
        config.mail_sender_name.clone(),
        config.mail_timeout_secs,
    ));

    let templates = Arc::new(load_email_templates().expect("Failed to load email templates"));

    let repos = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;
        postgres_repositories(pool)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;
        sqlite_repositories(pool)
    };

    let state = AppState::new(config.clone(), repos, email_service, templates);

    if config.seed_demo_users {
        let seeded = state.auth_service.seed_demo_users().await.expect("Failed to seed demo users");
        info!("Demo user seeding done ({} created)", seeded);
    }

    state
}

pub fn sqlite_repositories(pool: SqlitePool) -> Repositories {
    Repositories {
        invitation_repo: Arc::new(SqliteInvitationRepo::new(pool.clone())),
        membership_repo: Arc::new(SqliteMembershipRepo::new(pool.clone())),
        user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
        session_repo: Arc::new(SqliteSessionRepo::new(pool.clone())),
        mail_log_repo: Arc::new(SqliteMailLogRepo::new(pool)),
    }
}

pub fn postgres_repositories(pool: PgPool) -> Repositories {
    Repositories {
        invitation_repo: Arc::new(PostgresInvitationRepo::new(pool.clone())),
        membership_repo: Arc::new(PostgresMembershipRepo::new(pool.clone())),
        user_repo: Arc::new(PostgresUserRepo::new(pool.clone())),
        session_repo: Arc::new(PostgresSessionRepo::new(pool.clone())),
        mail_log_repo: Arc::new(PostgresMailLogRepo::new(pool)),
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
