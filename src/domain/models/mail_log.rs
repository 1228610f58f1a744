use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct MailLog {
    pub id: String,
    pub recipient: String,
    pub template: String,
    pub message_id: Option<String>,
    pub status: String, // SENT, FAILED
    pub error_message: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl MailLog {
    pub fn sent(recipient: &str, template: &str, message_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            recipient: recipient.to_string(),
            template: template.to_string(),
            message_id: Some(message_id.to_string()),
            status: "SENT".to_string(),
            error_message: None,
            sent_at: Utc::now(),
        }
    }

    pub fn failed(recipient: &str, template: &str, error_message: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            recipient: recipient.to_string(),
            template: template.to_string(),
            message_id: None,
            status: "FAILED".to_string(),
            error_message: Some(error_message),
            sent_at: Utc::now(),
        }
    }
}
