//! Per-address token balances, replaced wholesale from node snapshots.

use super::batch::Batch;
use crate::models::Balance;
use sqlx::PgPool;

const UPSERT: &str = r#"
    INSERT INTO balances (address, token_standard, balance)
    VALUES ($1, $2, $3)
    ON CONFLICT (address, token_standard) DO UPDATE SET balance = $3"#;

#[derive(Clone)]
pub struct BalanceRepository {
    pool: PgPool,
}

impl BalanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, b: &Balance) -> sqlx::Result<()> {
        sqlx::query(UPSERT)
            .bind(b.address.clone())
            .bind(b.token_standard.clone())
            .bind(b.balance)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub fn upsert_batch(batch: &mut Batch, b: &Balance) {
        batch.queue(
            "balance.upsert",
            sqlx::query(UPSERT)
                .bind(b.address.clone())
                .bind(b.token_standard.clone())
                .bind(b.balance),
        );
    }

    pub async fn get_by_address_and_token(
        &self,
        address: &str,
        token_standard: &str,
    ) -> sqlx::Result<Option<Balance>> {
        sqlx::query_as(
            r#"SELECT address, token_standard, balance
               FROM balances WHERE address = $1 AND token_standard = $2"#,
        )
        .bind(address.to_string())
        .bind(token_standard.to_string())
        .fetch_optional(&self.pool)
        .await
    }

    /// Holders with a positive balance of the given token.
    pub async fn holder_count(&self, token_standard: &str) -> sqlx::Result<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM balances WHERE token_standard = $1 AND balance > 0",
        )
        .bind(token_standard.to_string())
        .fetch_one(&self.pool)
        .await
    }
}
