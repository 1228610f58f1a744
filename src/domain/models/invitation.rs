use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use rand::{distributions::Alphanumeric, Rng};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACCEPTED: &str = "accepted";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Invitation {
    pub token: String,
    pub email: String,
    pub name: String,
    pub club: String,
    pub inviter_name: String,
    pub status: String, // pending, accepted
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub accepted_by_email: Option<String>,
    pub accepted_by_name: Option<String>,
}

impl Invitation {
    pub fn new(email: String, name: String, club: String, inviter_name: String) -> Self {
        Self {
            token: generate_token(),
            email,
            name,
            club,
            inviter_name,
            status: STATUS_PENDING.to_string(),
            created_at: Utc::now(),
            accepted_at: None,
            accepted_by_email: None,
            accepted_by_name: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == STATUS_PENDING
    }
}

/// `inv_<unix millis>_<32 alphanumerics>`. The suffix comes from the thread-local CSPRNG.
pub fn generate_token() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();

    format!("inv_{}_{}", Utc::now().timestamp_millis(), suffix)
}
