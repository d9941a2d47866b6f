//! Sentinel rows.

use super::batch::Batch;
use crate::models::Sentinel;
use sqlx::PgPool;

const UPSERT: &str = r#"
    INSERT INTO sentinels (owner, registration_timestamp, is_revocable, revoke_cooldown, active)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (owner) DO UPDATE SET
        is_revocable = EXCLUDED.is_revocable,
        revoke_cooldown = EXCLUDED.revoke_cooldown"#;

const SET_INACTIVE: &str = "UPDATE sentinels SET active = false WHERE owner = $1";

#[derive(Clone)]
pub struct SentinelRepository {
    pool: PgPool,
}

impl SentinelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, s: &Sentinel) -> sqlx::Result<()> {
        sqlx::query(UPSERT)
            .bind(s.owner.clone())
            .bind(s.registration_timestamp)
            .bind(s.is_revocable)
            .bind(s.revoke_cooldown.clone())
            .bind(s.active)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_inactive(&self, owner: &str) -> sqlx::Result<()> {
        sqlx::query(SET_INACTIVE)
            .bind(owner.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub fn set_inactive_batch(batch: &mut Batch, owner: &str) {
        batch.queue(
            "sentinel.set_inactive",
            sqlx::query(SET_INACTIVE).bind(owner.to_string()),
        );
    }

    pub async fn get_by_owner(&self, owner: &str) -> sqlx::Result<Option<Sentinel>> {
        sqlx::query_as(
            r#"SELECT owner, registration_timestamp, is_revocable, revoke_cooldown, active
               FROM sentinels WHERE owner = $1"#,
        )
        .bind(owner.to_string())
        .fetch_optional(&self.pool)
        .await
    }
}
