//! Pillar state snapshots.
//!
//! The revoke path is an upsert-with-defaults so it lands whether or not the
//! pillar row was ever synced; it clears producer and withdraw addresses.

use super::batch::Batch;
use crate::models::Pillar;
use sqlx::PgPool;

const UPSERT: &str = r#"
    INSERT INTO pillars (owner_address, producer_address, withdraw_address, name, rank,
        give_momentum_reward_percentage, give_delegate_reward_percentage, is_revocable,
        revoke_cooldown, revoke_timestamp, weight, epoch_produced_momentums, epoch_expected_momentums)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
    ON CONFLICT (owner_address) DO UPDATE SET
        producer_address = EXCLUDED.producer_address,
        withdraw_address = EXCLUDED.withdraw_address,
        name = EXCLUDED.name,
        rank = EXCLUDED.rank,
        give_momentum_reward_percentage = EXCLUDED.give_momentum_reward_percentage,
        give_delegate_reward_percentage = EXCLUDED.give_delegate_reward_percentage,
        is_revocable = EXCLUDED.is_revocable,
        revoke_cooldown = EXCLUDED.revoke_cooldown,
        revoke_timestamp = EXCLUDED.revoke_timestamp,
        weight = EXCLUDED.weight,
        epoch_produced_momentums = EXCLUDED.epoch_produced_momentums,
        epoch_expected_momentums = EXCLUDED.epoch_expected_momentums"#;

const UPDATE_SPAWN_INFO: &str = r#"
    UPDATE pillars SET spawn_timestamp = $2, slot_cost_qsr = $3
    WHERE owner_address = $1"#;

const SET_AS_REVOKED: &str = r#"
    INSERT INTO pillars (owner_address, producer_address, withdraw_address, name, rank,
        give_momentum_reward_percentage, give_delegate_reward_percentage, is_revocable,
        revoke_cooldown, revoke_timestamp, weight, epoch_produced_momentums, epoch_expected_momentums,
        slot_cost_qsr, spawn_timestamp, voting_activity, produced_momentum_count, is_revoked)
    VALUES ($1, '', '', $2, 0, 0, 0, false, 0, $3, 0, 0, 0, 0, 0, 0, 0, true)
    ON CONFLICT (owner_address) DO UPDATE SET
        producer_address = '',
        withdraw_address = '',
        name = $2,
        rank = 0,
        give_momentum_reward_percentage = 0,
        give_delegate_reward_percentage = 0,
        is_revocable = false,
        revoke_cooldown = 0,
        revoke_timestamp = $3,
        weight = 0,
        epoch_produced_momentums = 0,
        epoch_expected_momentums = 0,
        is_revoked = true"#;

const ALL_COLUMNS: &str = r#"owner_address, producer_address, withdraw_address, name, rank,
    give_momentum_reward_percentage, give_delegate_reward_percentage, is_revocable,
    revoke_cooldown, revoke_timestamp, weight, epoch_produced_momentums, epoch_expected_momentums,
    slot_cost_qsr, spawn_timestamp, voting_activity, produced_momentum_count, is_revoked"#;

#[derive(Clone)]
pub struct PillarRepository {
    pool: PgPool,
}

impl PillarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, p: &Pillar) -> sqlx::Result<()> {
        sqlx::query(UPSERT)
            .bind(p.owner_address.clone())
            .bind(p.producer_address.clone())
            .bind(p.withdraw_address.clone())
            .bind(p.name.clone())
            .bind(p.rank)
            .bind(p.give_momentum_reward_percentage)
            .bind(p.give_delegate_reward_percentage)
            .bind(p.is_revocable)
            .bind(p.revoke_cooldown)
            .bind(p.revoke_timestamp)
            .bind(p.weight)
            .bind(p.epoch_produced_momentums)
            .bind(p.epoch_expected_momentums)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub fn update_spawn_info_batch(
        batch: &mut Batch,
        owner_address: &str,
        spawn_timestamp: i64,
        slot_cost_qsr: i64,
    ) {
        batch.queue(
            "pillar.update_spawn_info",
            sqlx::query(UPDATE_SPAWN_INFO)
                .bind(owner_address.to_string())
                .bind(spawn_timestamp)
                .bind(slot_cost_qsr),
        );
    }

    pub async fn set_as_revoked(
        &self,
        owner_address: &str,
        name: &str,
        revoke_timestamp: i64,
    ) -> sqlx::Result<()> {
        sqlx::query(SET_AS_REVOKED)
            .bind(owner_address.to_string())
            .bind(name.to_string())
            .bind(revoke_timestamp)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub fn set_as_revoked_batch(
        batch: &mut Batch,
        owner_address: &str,
        name: &str,
        revoke_timestamp: i64,
    ) {
        batch.queue(
            "pillar.set_as_revoked",
            sqlx::query(SET_AS_REVOKED)
                .bind(owner_address.to_string())
                .bind(name.to_string())
                .bind(revoke_timestamp),
        );
    }

    pub async fn update_voting_activity(
        &self,
        owner_address: &str,
        voting_activity: f32,
    ) -> sqlx::Result<()> {
        sqlx::query("UPDATE pillars SET voting_activity = $2 WHERE owner_address = $1")
            .bind(owner_address.to_string())
            .bind(voting_activity)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_by_name(&self, name: &str) -> sqlx::Result<Option<Pillar>> {
        sqlx::query_as(&format!(
            "SELECT {ALL_COLUMNS} FROM pillars WHERE name = $1"
        ))
        .bind(name.to_string())
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_by_producer(&self, producer_address: &str) -> sqlx::Result<Option<Pillar>> {
        sqlx::query_as(&format!(
            "SELECT {ALL_COLUMNS} FROM pillars WHERE producer_address = $1"
        ))
        .bind(producer_address.to_string())
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_by_owner(&self, owner_address: &str) -> sqlx::Result<Option<Pillar>> {
        sqlx::query_as(&format!(
            "SELECT {ALL_COLUMNS} FROM pillars WHERE owner_address = $1"
        ))
        .bind(owner_address.to_string())
        .fetch_optional(&self.pool)
        .await
    }

    /// All pillars that have not been revoked.
    pub async fn get_all(&self) -> sqlx::Result<Vec<Pillar>> {
        sqlx::query_as(&format!(
            "SELECT {ALL_COLUMNS} FROM pillars WHERE is_revoked = false"
        ))
        .fetch_all(&self.pool)
        .await
    }
}
