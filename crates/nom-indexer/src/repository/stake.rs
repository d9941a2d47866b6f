//! Stake entries. The id is the originating send-block hash; cancellation
//! matches on the derived cancel id plus the staker's address.

use super::batch::Batch;
use crate::models::Stake;
use sqlx::PgPool;

const INSERT: &str = r#"
    INSERT INTO stakes (id, address, start_timestamp, expiration_timestamp, znn_amount,
        duration_in_sec, is_active, cancel_id)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    ON CONFLICT (id) DO NOTHING"#;

const SET_INACTIVE: &str = r#"
    UPDATE stakes SET is_active = false
    WHERE cancel_id = $1 AND address = $2"#;

#[derive(Clone)]
pub struct StakeRepository {
    pool: PgPool,
}

impl StakeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, s: &Stake) -> sqlx::Result<()> {
        sqlx::query(INSERT)
            .bind(s.id.clone())
            .bind(s.address.clone())
            .bind(s.start_timestamp)
            .bind(s.expiration_timestamp)
            .bind(s.znn_amount)
            .bind(s.duration_in_sec)
            .bind(s.is_active)
            .bind(s.cancel_id.clone())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub fn insert_batch(batch: &mut Batch, s: &Stake) {
        batch.queue(
            "stake.insert",
            sqlx::query(INSERT)
                .bind(s.id.clone())
                .bind(s.address.clone())
                .bind(s.start_timestamp)
                .bind(s.expiration_timestamp)
                .bind(s.znn_amount)
                .bind(s.duration_in_sec)
                .bind(s.is_active)
                .bind(s.cancel_id.clone()),
        );
    }

    pub async fn set_inactive(&self, cancel_id: &str, address: &str) -> sqlx::Result<()> {
        sqlx::query(SET_INACTIVE)
            .bind(cancel_id.to_string())
            .bind(address.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub fn set_inactive_batch(batch: &mut Batch, cancel_id: &str, address: &str) {
        batch.queue(
            "stake.set_inactive",
            sqlx::query(SET_INACTIVE)
                .bind(cancel_id.to_string())
                .bind(address.to_string()),
        );
    }

    pub async fn get_by_id(&self, id: &str) -> sqlx::Result<Option<Stake>> {
        sqlx::query_as(
            r#"SELECT id, address, start_timestamp, expiration_timestamp, znn_amount,
                   duration_in_sec, is_active, cancel_id
               FROM stakes WHERE id = $1"#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
    }
}
