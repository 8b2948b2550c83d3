use async_trait::async_trait;
use sqlx::PgPool;
use skywatch_core::models::REGISTER_USER;
use skywatch_core::repository::UserRepository;
use skywatch_core::{CoreResult, NewUser, RegistrationOutcome};
use crate::persistence;

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn register_once(
        &self,
        request_id: &str,
        user: &NewUser,
    ) -> CoreResult<RegistrationOutcome> {
        let mut tx = self.pool.begin().await.map_err(persistence)?;

        let seen: Option<(String,)> = sqlx::query_as(
            "SELECT request_id FROM processed_requests WHERE request_id = $1",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(persistence)?;

        if seen.is_some() {
            tx.rollback().await.map_err(persistence)?;
            return Ok(RegistrationOutcome::IdempotentReplay);
        }

        let inserted = sqlx::query(
            "INSERT INTO users (email, username) VALUES ($1, $2) ON CONFLICT (email) DO NOTHING",
        )
        .bind(&user.email)
        .bind(&user.username)
        .execute(&mut *tx)
        .await
        .map_err(persistence)?
        .rows_affected();

        // A concurrent attempt with the same id blocks here until the winner
        // commits, then sees the conflict.
        let claimed = sqlx::query(
            "INSERT INTO processed_requests (request_id, operation) VALUES ($1, $2) ON CONFLICT (request_id) DO NOTHING",
        )
        .bind(request_id)
        .bind(REGISTER_USER)
        .execute(&mut *tx)
        .await
        .map_err(persistence)?
        .rows_affected();

        if claimed == 0 {
            tx.rollback().await.map_err(persistence)?;
            return Ok(RegistrationOutcome::IdempotentReplay);
        }

        tx.commit().await.map_err(persistence)?;

        Ok(if inserted > 0 {
            RegistrationOutcome::Created
        } else {
            RegistrationOutcome::AlreadyExisted
        })
    }

    async fn exists(&self, email: &str) -> CoreResult<bool> {
        let row: Option<(String,)> = sqlx::query_as("SELECT email FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence)?;
        Ok(row.is_some())
    }

    async fn delete(&self, email: &str) -> CoreResult<u64> {
        let result = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(persistence)?;
        Ok(result.rows_affected())
    }
}
