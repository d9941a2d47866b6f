//! Token rows. Burn totals and transaction counts are relative increments,
//! guarded so that replaying an already-indexed momentum cannot apply them
//! twice (the guard checks that the momentum row does not exist yet; the
//! momentum insert is always the last statement of its batch).

use super::batch::Batch;
use crate::models::Token;
use sqlx::PgPool;

const UPSERT: &str = r#"
    INSERT INTO tokens (token_standard, name, symbol, domain, decimals, owner,
        total_supply, max_supply, is_burnable, is_mintable, is_utility)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
    ON CONFLICT (token_standard) DO UPDATE SET
        domain = EXCLUDED.domain,
        total_supply = EXCLUDED.total_supply,
        max_supply = EXCLUDED.max_supply"#;

const UPDATE_BURN_AMOUNT: &str = r#"
    UPDATE tokens SET total_burned = total_burned + $2
    WHERE token_standard = $1
        AND NOT EXISTS (SELECT 1 FROM momentums WHERE height = $3)"#;

const UPDATE_LAST_UPDATE: &str = r#"
    UPDATE tokens SET last_update_timestamp = $2
    WHERE token_standard = $1"#;

const INCREMENT_TX_COUNT: &str = r#"
    UPDATE tokens SET transaction_count = transaction_count + 1
    WHERE token_standard = $1
        AND NOT EXISTS (SELECT 1 FROM momentums WHERE height = $2)"#;

#[derive(Clone)]
pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, t: &Token) -> sqlx::Result<()> {
        sqlx::query(UPSERT)
            .bind(t.token_standard.clone())
            .bind(t.name.clone())
            .bind(t.symbol.clone())
            .bind(t.domain.clone())
            .bind(t.decimals)
            .bind(t.owner.clone())
            .bind(t.total_supply)
            .bind(t.max_supply)
            .bind(t.is_burnable)
            .bind(t.is_mintable)
            .bind(t.is_utility)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub fn upsert_batch(batch: &mut Batch, t: &Token) {
        batch.queue(
            "token.upsert",
            sqlx::query(UPSERT)
                .bind(t.token_standard.clone())
                .bind(t.name.clone())
                .bind(t.symbol.clone())
                .bind(t.domain.clone())
                .bind(t.decimals)
                .bind(t.owner.clone())
                .bind(t.total_supply)
                .bind(t.max_supply)
                .bind(t.is_burnable)
                .bind(t.is_mintable)
                .bind(t.is_utility),
        );
    }

    pub fn update_burn_amount_batch(
        batch: &mut Batch,
        token_standard: &str,
        burn_amount: i64,
        momentum_height: i64,
    ) {
        batch.queue(
            "token.update_burn_amount",
            sqlx::query(UPDATE_BURN_AMOUNT)
                .bind(token_standard.to_string())
                .bind(burn_amount)
                .bind(momentum_height),
        );
    }

    pub fn update_last_update_timestamp_batch(
        batch: &mut Batch,
        token_standard: &str,
        timestamp: i64,
    ) {
        batch.queue(
            "token.update_last_update_timestamp",
            sqlx::query(UPDATE_LAST_UPDATE)
                .bind(token_standard.to_string())
                .bind(timestamp),
        );
    }

    pub fn increment_transaction_count_batch(
        batch: &mut Batch,
        token_standard: &str,
        momentum_height: i64,
    ) {
        batch.queue(
            "token.increment_transaction_count",
            sqlx::query(INCREMENT_TX_COUNT)
                .bind(token_standard.to_string())
                .bind(momentum_height),
        );
    }

    pub async fn update_holder_count(&self, token_standard: &str, count: i64) -> sqlx::Result<()> {
        sqlx::query("UPDATE tokens SET holder_count = $2 WHERE token_standard = $1")
            .bind(token_standard.to_string())
            .bind(count)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_by_standard(&self, token_standard: &str) -> sqlx::Result<Option<Token>> {
        sqlx::query_as(
            r#"SELECT token_standard, name, symbol, domain, decimals, owner,
                   total_supply, max_supply, is_burnable, is_mintable, is_utility,
                   total_burned, last_update_timestamp, holder_count, transaction_count
               FROM tokens WHERE token_standard = $1"#,
        )
        .bind(token_standard.to_string())
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_all(&self) -> sqlx::Result<Vec<Token>> {
        sqlx::query_as(
            r#"SELECT token_standard, name, symbol, domain, decimals, owner,
                   total_supply, max_supply, is_burnable, is_mintable, is_utility,
                   total_burned, last_update_timestamp, holder_count, transaction_count
               FROM tokens"#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
