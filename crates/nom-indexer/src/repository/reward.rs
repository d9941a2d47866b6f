//! Reward transactions and cumulative totals.

use super::batch::Batch;
use crate::models::RewardTransaction;
use sqlx::PgPool;

/// One statement records both sides: the reward transaction (conflict-
/// do-nothing on its hash) and, only when that insert actually lands, the
/// cumulative accumulation. Replays therefore cannot double-count.
const RECORD: &str = r#"
    WITH inserted AS (
        INSERT INTO reward_transactions (hash, address, reward_type, momentum_timestamp,
            momentum_height, account_height, amount, token_standard, source_address)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (hash) DO NOTHING
        RETURNING address, reward_type, amount, token_standard
    )
    INSERT INTO cumulative_rewards (address, reward_type, amount, token_standard)
    SELECT address, reward_type, amount, token_standard FROM inserted
    ON CONFLICT (address, reward_type, token_standard) DO UPDATE SET
        amount = cumulative_rewards.amount + EXCLUDED.amount"#;

#[derive(Clone)]
pub struct RewardRepository {
    pool: PgPool,
}

impl RewardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, rt: &RewardTransaction) -> sqlx::Result<()> {
        sqlx::query(RECORD)
            .bind(rt.hash.clone())
            .bind(rt.address.clone())
            .bind(rt.reward_type.as_i16())
            .bind(rt.momentum_timestamp)
            .bind(rt.momentum_height)
            .bind(rt.account_height)
            .bind(rt.amount)
            .bind(rt.token_standard.clone())
            .bind(rt.source_address.clone())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub fn record_batch(batch: &mut Batch, rt: &RewardTransaction) {
        batch.queue(
            "reward.record",
            sqlx::query(RECORD)
                .bind(rt.hash.clone())
                .bind(rt.address.clone())
                .bind(rt.reward_type.as_i16())
                .bind(rt.momentum_timestamp)
                .bind(rt.momentum_height)
                .bind(rt.account_height)
                .bind(rt.amount)
                .bind(rt.token_standard.clone())
                .bind(rt.source_address.clone()),
        );
    }

    /// Cumulative amount for an address, reward type and token.
    pub async fn cumulative_amount(
        &self,
        address: &str,
        reward_type: i16,
        token_standard: &str,
    ) -> sqlx::Result<Option<i64>> {
        sqlx::query_scalar(
            r#"SELECT amount FROM cumulative_rewards
               WHERE address = $1 AND reward_type = $2 AND token_standard = $3"#,
        )
        .bind(address.to_string())
        .bind(reward_type)
        .bind(token_standard.to_string())
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn transaction_count_by_address(&self, address: &str) -> sqlx::Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM reward_transactions WHERE address = $1")
            .bind(address.to_string())
            .fetch_one(&self.pool)
            .await
    }
}
