//! Plasma fusion entries.

use super::batch::Batch;
use crate::models::Fusion;
use sqlx::PgPool;

const INSERT: &str = r#"
    INSERT INTO fusions (id, address, beneficiary, momentum_hash, momentum_timestamp,
        momentum_height, qsr_amount, expiration_height, is_active, cancel_id)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
    ON CONFLICT (id) DO NOTHING"#;

const SET_INACTIVE: &str = r#"
    UPDATE fusions SET is_active = false
    WHERE cancel_id = $1 AND address = $2"#;

#[derive(Clone)]
pub struct FusionRepository {
    pool: PgPool,
}

impl FusionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, f: &Fusion) -> sqlx::Result<()> {
        sqlx::query(INSERT)
            .bind(f.id.clone())
            .bind(f.address.clone())
            .bind(f.beneficiary.clone())
            .bind(f.momentum_hash.clone())
            .bind(f.momentum_timestamp)
            .bind(f.momentum_height)
            .bind(f.qsr_amount)
            .bind(f.expiration_height)
            .bind(f.is_active)
            .bind(f.cancel_id.clone())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub fn insert_batch(batch: &mut Batch, f: &Fusion) {
        batch.queue(
            "fusion.insert",
            sqlx::query(INSERT)
                .bind(f.id.clone())
                .bind(f.address.clone())
                .bind(f.beneficiary.clone())
                .bind(f.momentum_hash.clone())
                .bind(f.momentum_timestamp)
                .bind(f.momentum_height)
                .bind(f.qsr_amount)
                .bind(f.expiration_height)
                .bind(f.is_active)
                .bind(f.cancel_id.clone()),
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
            "fusion.set_inactive",
            sqlx::query(SET_INACTIVE)
                .bind(cancel_id.to_string())
                .bind(address.to_string()),
        );
    }

    pub async fn get_by_id(&self, id: &str) -> sqlx::Result<Option<Fusion>> {
        sqlx::query_as(
            r#"SELECT id, address, beneficiary, momentum_hash, momentum_timestamp,
                   momentum_height, qsr_amount, expiration_height, is_active, cancel_id
               FROM fusions WHERE id = $1"#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
    }
}
