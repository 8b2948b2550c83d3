use async_trait::async_trait;
use sqlx::PgPool;
use skywatch_core::repository::InterestRepository;
use skywatch_core::CoreResult;
use crate::persistence;

pub struct PgInterestRepository {
    pool: PgPool,
}

impl PgInterestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InterestRepository for PgInterestRepository {
    async fn insert(&self, email: &str, airport_code: &str) -> CoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO interests (user_email, airport_code)
            VALUES ($1, $2)
            ON CONFLICT (user_email, airport_code) DO NOTHING
            "#,
        )
        .bind(email)
        .bind(airport_code)
        .execute(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(&self, email: &str) -> CoreResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT airport_code FROM interests WHERE user_email = $1 ORDER BY airport_code",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(rows.into_iter().map(|(code,)| code).collect())
    }

    async fn delete_for_user(&self, email: &str) -> CoreResult<u64> {
        let result = sqlx::query("DELETE FROM interests WHERE user_email = $1")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(persistence)?;
        Ok(result.rows_affected())
    }

    async fn monitored_airports(&self) -> CoreResult<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT airport_code FROM interests ORDER BY airport_code")
                .fetch_all(&self.pool)
                .await
                .map_err(persistence)?;

        Ok(rows.into_iter().map(|(code,)| code).collect())
    }
}
