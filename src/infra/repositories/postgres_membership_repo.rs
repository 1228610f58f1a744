use crate::domain::{models::membership::Membership, ports::MembershipRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresMembershipRepo {
    pool: PgPool,
}

impl PostgresMembershipRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepo {
    async fn create(&self, membership: &Membership) -> Result<Membership, AppError> {
        sqlx::query_as::<_, Membership>(
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
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Membership>, AppError> {
        sqlx::query_as::<_, Membership>("SELECT * FROM memberships WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<Membership>, AppError> {
        sqlx::query_as::<_, Membership>("SELECT * FROM memberships WHERE email = $1")
            .bind(email)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_email_and_club(&self, email: &str, club: &str) -> Result<Option<Membership>, AppError> {
        sqlx::query_as::<_, Membership>("SELECT * FROM memberships WHERE email = $1 AND club = $2")
            .bind(email)
            .bind(club)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_club(&self, club: &str) -> Result<Vec<Membership>, AppError> {
        sqlx::query_as::<_, Membership>("SELECT * FROM memberships WHERE club = $1 ORDER BY joined_at DESC")
            .bind(club)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, club: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM memberships WHERE id = $1 AND club = $2")
            .bind(id)
            .bind(club)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Member not found".into()));
        }
        Ok(())
    }
}
