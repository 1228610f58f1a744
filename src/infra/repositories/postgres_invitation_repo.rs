use crate::domain::{
    models::{invitation::Invitation, membership::Membership, user::User},
    ports::InvitationRepository,
};
use crate::error::{AppError, RuleViolation};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

pub struct PostgresInvitationRepo {
    pool: PgPool,
}

impl PostgresInvitationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationRepository for PostgresInvitationRepo {
    async fn create(&self, invitation: &Invitation) -> Result<Invitation, AppError> {
        sqlx::query_as::<_, Invitation>(
            "INSERT INTO invitations (token, email, name, club, inviter_name, status, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
            .bind(&invitation.token)
            .bind(&invitation.email)
            .bind(&invitation.name)
            .bind(&invitation.club)
            .bind(&invitation.inviter_name)
            .bind(&invitation.status)
            .bind(invitation.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>, AppError> {
        sqlx::query_as::<_, Invitation>("SELECT * FROM invitations WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_pending(&self, email: &str, club: &str) -> Result<Option<Invitation>, AppError> {
        sqlx::query_as::<_, Invitation>(
            "SELECT * FROM invitations WHERE email = $1 AND club = $2 AND status = 'pending'",
        )
            .bind(email)
            .bind(club)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_pending_by_email(&self, email: &str) -> Result<Vec<Invitation>, AppError> {
        sqlx::query_as::<_, Invitation>(
            "SELECT * FROM invitations WHERE email = $1 AND status = 'pending' ORDER BY created_at ASC",
        )
            .bind(email)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_club(&self, club: &str) -> Result<Vec<Invitation>, AppError> {
        sqlx::query_as::<_, Invitation>(
            "SELECT * FROM invitations WHERE club = $1 ORDER BY created_at DESC",
        )
            .bind(club)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn accept_with_membership(
        &self,
        token: &str,
        accepted_email: &str,
        accepted_name: &str,
        accepted_at: DateTime<Utc>,
    ) -> Result<(Invitation, Membership), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let accepted = accept_in(&mut *tx, token, accepted_email, accepted_name, accepted_at).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(accepted)
    }

    async fn accept_with_new_user(
        &self,
        token: &str,
        user: &User,
        accepted_at: DateTime<Utc>,
    ) -> Result<(Invitation, Membership, User), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let (invitation, membership) = accept_in(&mut *tx, token, &user.email, &user.name, accepted_at).await?;

        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, name, password_hash, role, club, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id, email, name, password_hash, role, club, created_at",
        )
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(&user.role)
            .bind(&invitation.club)
            .bind(user.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok((invitation, membership, created))
    }
}

/// `pending -> accepted` plus the membership insert, on a caller-owned transaction.
async fn accept_in(
    conn: &mut PgConnection,
    token: &str,
    accepted_email: &str,
    accepted_name: &str,
    accepted_at: DateTime<Utc>,
) -> Result<(Invitation, Membership), AppError> {
    let accepted = sqlx::query_as::<_, Invitation>(
        "UPDATE invitations SET status = 'accepted', accepted_at = $1, accepted_by_email = $2, accepted_by_name = $3
         WHERE token = $4 AND status = 'pending'
         RETURNING *"
    )
        .bind(accepted_at)
        .bind(accepted_email)
        .bind(accepted_name)
        .bind(token)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    let invitation = match accepted {
        Some(invitation) => invitation,
        None => {
            let known: Option<String> = sqlx::query_scalar("SELECT status FROM invitations WHERE token = $1")
                .bind(token)
                .fetch_optional(&mut *conn)
                .await
                .map_err(AppError::Database)?;
            return Err(match known {
                Some(_) => RuleViolation::InvitationAlreadyAccepted.into(),
                None => RuleViolation::InvitationNotFound.into(),
            });
        }
    };

    let existing: Option<String> = sqlx::query_scalar("SELECT id FROM memberships WHERE email = $1 AND club = $2")
        .bind(accepted_email)
        .bind(&invitation.club)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::Database)?;
    if existing.is_some() {
        return Err(RuleViolation::AlreadyMember.into());
    }

    let membership = Membership::from_invitation(&invitation, accepted_name.to_string(), accepted_email.to_string(), accepted_at);
    let created = sqlx::query_as::<_, Membership>(
        "INSERT INTO memberships (id, name, email, club, role, status, joined_at, invited_by) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
        .bind(&membership.id)
        .bind(&membership.name)
        .bind(&membership.email)
        .bind(&membership.club)
        .bind(&membership.role)
        .bind(&membership.status)
        .bind(membership.joined_at)
        .bind(&membership.invited_by)
        .fetch_one(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    Ok((invitation, created))
}
