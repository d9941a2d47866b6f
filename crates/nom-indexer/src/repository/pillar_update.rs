//! Pillar configuration history, used to resolve which pillar owned a
//! producer address at a given momentum height.

use super::batch::Batch;
use crate::models::PillarUpdate;
use sqlx::{PgPool, Row};

/// Keyed on (momentum_hash, name) so replaying a momentum cannot duplicate
/// history rows.
const INSERT: &str = r#"
    INSERT INTO pillar_updates (name, owner_address, producer_address, withdraw_address,
        momentum_timestamp, momentum_height, momentum_hash,
        give_momentum_reward_percentage, give_delegate_reward_percentage)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT (momentum_hash, name) DO NOTHING"#;

#[derive(Clone)]
pub struct PillarUpdateRepository {
    pool: PgPool,
}

impl PillarUpdateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, pu: &PillarUpdate) -> sqlx::Result<()> {
        sqlx::query(INSERT)
            .bind(pu.name.clone())
            .bind(pu.owner_address.clone())
            .bind(pu.producer_address.clone())
            .bind(pu.withdraw_address.clone())
            .bind(pu.momentum_timestamp)
            .bind(pu.momentum_height)
            .bind(pu.momentum_hash.clone())
            .bind(pu.give_momentum_reward_percentage)
            .bind(pu.give_delegate_reward_percentage)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub fn insert_batch(batch: &mut Batch, pu: &PillarUpdate) {
        batch.queue(
            "pillar_update.insert",
            sqlx::query(INSERT)
                .bind(pu.name.clone())
                .bind(pu.owner_address.clone())
                .bind(pu.producer_address.clone())
                .bind(pu.withdraw_address.clone())
                .bind(pu.momentum_timestamp)
                .bind(pu.momentum_height)
                .bind(pu.momentum_hash.clone())
                .bind(pu.give_momentum_reward_percentage)
                .bind(pu.give_delegate_reward_percentage),
        );
    }

    /// Latest (owner, name) on record for a producer at or before `height`.
    pub async fn info_at_height_by_producer(
        &self,
        producer_address: &str,
        height: i64,
    ) -> sqlx::Result<Option<(String, String)>> {
        let row = sqlx::query(
            r#"SELECT owner_address, name FROM pillar_updates
               WHERE producer_address = $1 AND momentum_height <= $2
               ORDER BY id DESC LIMIT 1"#,
        )
        .bind(producer_address.to_string())
        .bind(height)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| (r.get("owner_address"), r.get("name"))))
    }

    /// Latest owner on record for a withdraw address at or before `height`.
    pub async fn owner_at_height_by_withdraw(
        &self,
        withdraw_address: &str,
        height: i64,
    ) -> sqlx::Result<Option<String>> {
        let row = sqlx::query(
            r#"SELECT owner_address FROM pillar_updates
               WHERE withdraw_address = $1 AND momentum_height <= $2
               ORDER BY id DESC LIMIT 1"#,
        )
        .bind(withdraw_address.to_string())
        .bind(height)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.get("owner_address")))
    }
}
