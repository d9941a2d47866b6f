//! Momentum rows. `max(height)` is the sync watermark.

use super::batch::Batch;
use crate::models::Momentum;
use sqlx::PgPool;

/// Inserts the momentum and, when the insert actually lands, bumps the
/// producing pillar's momentum counter. Gating the counter on the insert
/// keeps replays from double-counting.
const INSERT_WITH_PRODUCER_COUNT: &str = r#"
    WITH inserted AS (
        INSERT INTO momentums (height, hash, timestamp, tx_count, producer, producer_owner, producer_name)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (height) DO NOTHING
        RETURNING height
    )
    UPDATE pillars SET produced_momentum_count = produced_momentum_count + 1
    WHERE owner_address = $6 AND $6 <> '' AND EXISTS (SELECT 1 FROM inserted)"#;

#[derive(Clone)]
pub struct MomentumRepository {
    pool: PgPool,
}

impl MomentumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Latest indexed momentum height, 0 when the table is empty.
    pub async fn latest_height(&self) -> sqlx::Result<u64> {
        let height: Option<i64> = sqlx::query_scalar("SELECT MAX(height) FROM momentums")
            .fetch_one(&self.pool)
            .await?;
        Ok(height.unwrap_or(0) as u64)
    }

    pub async fn insert(&self, m: &Momentum) -> sqlx::Result<()> {
        sqlx::query(INSERT_WITH_PRODUCER_COUNT)
            .bind(m.height)
            .bind(m.hash.clone())
            .bind(m.timestamp)
            .bind(m.tx_count)
            .bind(m.producer.clone())
            .bind(m.producer_owner.clone())
            .bind(m.producer_name.clone())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub fn insert_batch(batch: &mut Batch, m: &Momentum) {
        batch.queue(
            "momentum.insert",
            sqlx::query(INSERT_WITH_PRODUCER_COUNT)
                .bind(m.height)
                .bind(m.hash.clone())
                .bind(m.timestamp)
                .bind(m.tx_count)
                .bind(m.producer.clone())
                .bind(m.producer_owner.clone())
                .bind(m.producer_name.clone()),
        );
    }

    pub async fn get_by_height(&self, height: u64) -> sqlx::Result<Option<Momentum>> {
        sqlx::query_as(
            r#"SELECT height, hash, timestamp, tx_count, producer, producer_owner, producer_name
               FROM momentums WHERE height = $1"#,
        )
        .bind(height as i64)
        .fetch_optional(&self.pool)
        .await
    }
}
