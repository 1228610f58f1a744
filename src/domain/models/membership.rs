use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::domain::models::invitation::Invitation;

pub const ROLE_MEMBER: &str = "member";
pub const STATUS_ACTIVE: &str = "active";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Membership {
    pub id: String,
    pub name: String,
    pub email: String,
    pub club: String,
    pub role: String,
    pub status: String,
    pub joined_at: DateTime<Utc>,
    pub invited_by: Option<String>,
}

impl Membership {
    pub fn new(name: String, email: String, club: String, role: String, invited_by: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            club,
            role,
            status: STATUS_ACTIVE.to_string(),
            joined_at: Utc::now(),
            invited_by,
        }
    }

    /// Role and status are fixed regardless of what the invitation says.
    pub fn from_invitation(invitation: &Invitation, name: String, email: String, joined_at: DateTime<Utc>) -> Self {
        Self {
            joined_at,
            ..Self::new(
                name,
                email,
                invitation.club.clone(),
                ROLE_MEMBER.to_string(),
                Some(invitation.inviter_name.clone()),
            )
        }
    }
}
