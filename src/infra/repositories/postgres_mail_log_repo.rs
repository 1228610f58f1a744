use crate::domain::{models::mail_log::MailLog, ports::MailLogRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresMailLogRepo {
    pool: PgPool,
}

impl PostgresMailLogRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MailLogRepository for PostgresMailLogRepo {
    async fn log_mail(&self, log: &MailLog) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO mail_logs (id, recipient, template, message_id, status, error_message, sent_at) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        )
            .bind(&log.id)
            .bind(&log.recipient)
            .bind(&log.template)
            .bind(&log.message_id)
            .bind(&log.status)
            .bind(&log.error_message)
            .bind(log.sent_at)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn list_logs(&self, recipient: Option<&str>) -> Result<Vec<MailLog>, AppError> {
        match recipient {
            Some(r) => sqlx::query_as::<_, MailLog>("SELECT * FROM mail_logs WHERE recipient = $1 ORDER BY sent_at DESC LIMIT 100")
                .bind(r)
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database),
            None => sqlx::query_as::<_, MailLog>("SELECT * FROM mail_logs ORDER BY sent_at DESC LIMIT 100")
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database),
        }
    }
}
