//! Account block rows.
//!
//! Inserts are keyed on the block hash; the conflict clause refreshes only
//! the fields that later processing can improve (decoded method/input and
//! the paired back-pointer).

use super::batch::Batch;
use crate::models::{AccountBlock, TxData};
use sqlx::{PgPool, Row};

const INSERT: &str = r#"
    INSERT INTO account_blocks (hash, momentum_hash, momentum_timestamp, momentum_height, block_type,
        height, address, to_address, amount, token_standard, data, method, input, paired_account_block)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
    ON CONFLICT (hash) DO UPDATE SET
        method = EXCLUDED.method,
        input = EXCLUDED.input,
        paired_account_block = EXCLUDED.paired_account_block"#;

const UPDATE_PAIRED: &str =
    "UPDATE account_blocks SET paired_account_block = $2 WHERE hash = $1";

const UPDATE_DESCENDANT_OF: &str =
    "UPDATE account_blocks SET descendant_of = $2 WHERE hash = $1";

fn input_json(tx_data: Option<&TxData>) -> serde_json::Value {
    match tx_data {
        Some(tx) if !tx.inputs.is_empty() => {
            serde_json::to_value(&tx.inputs).unwrap_or_else(|_| serde_json::json!({}))
        }
        _ => serde_json::json!({}),
    }
}

/// Reward payout details reconstructed from a receive block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardDetails {
    pub reward_amount: i64,
    pub source: String,
    pub token_standard: String,
}

#[derive(Clone)]
pub struct AccountBlockRepository {
    pool: PgPool,
}

impl AccountBlockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, ab: &AccountBlock, tx_data: Option<&TxData>) -> sqlx::Result<()> {
        sqlx::query(INSERT)
            .bind(ab.hash.clone())
            .bind(ab.momentum_hash.clone())
            .bind(ab.momentum_timestamp)
            .bind(ab.momentum_height)
            .bind(ab.block_type)
            .bind(ab.height)
            .bind(ab.address.clone())
            .bind(ab.to_address.clone())
            .bind(ab.amount)
            .bind(ab.token_standard.clone())
            .bind(ab.data.clone())
            .bind(tx_data.map(|t| t.method.clone()).unwrap_or_default())
            .bind(input_json(tx_data))
            .bind(ab.paired_account_block.clone())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub fn insert_batch(batch: &mut Batch, ab: &AccountBlock, tx_data: Option<&TxData>) {
        batch.queue(
            "account_block.insert",
            sqlx::query(INSERT)
                .bind(ab.hash.clone())
                .bind(ab.momentum_hash.clone())
                .bind(ab.momentum_timestamp)
                .bind(ab.momentum_height)
                .bind(ab.block_type)
                .bind(ab.height)
                .bind(ab.address.clone())
                .bind(ab.to_address.clone())
                .bind(ab.amount)
                .bind(ab.token_standard.clone())
                .bind(ab.data.clone())
                .bind(tx_data.map(|t| t.method.clone()).unwrap_or_default())
                .bind(input_json(tx_data))
                .bind(ab.paired_account_block.clone()),
        );
    }

    pub async fn update_paired_block(&self, hash: &str, paired_hash: &str) -> sqlx::Result<()> {
        sqlx::query(UPDATE_PAIRED)
            .bind(hash.to_string())
            .bind(paired_hash.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub fn update_paired_block_batch(batch: &mut Batch, hash: &str, paired_hash: &str) {
        batch.queue(
            "account_block.update_paired",
            sqlx::query(UPDATE_PAIRED)
                .bind(hash.to_string())
                .bind(paired_hash.to_string()),
        );
    }

    pub async fn update_descendant_of(&self, hash: &str, parent_hash: &str) -> sqlx::Result<()> {
        sqlx::query(UPDATE_DESCENDANT_OF)
            .bind(hash.to_string())
            .bind(parent_hash.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub fn update_descendant_of_batch(batch: &mut Batch, hash: &str, parent_hash: &str) {
        batch.queue(
            "account_block.update_descendant_of",
            sqlx::query(UPDATE_DESCENDANT_OF)
                .bind(hash.to_string())
                .bind(parent_hash.to_string()),
        );
    }

    pub async fn get_by_hash(&self, hash: &str) -> sqlx::Result<Option<AccountBlock>> {
        sqlx::query_as(
            r#"SELECT hash, momentum_hash, momentum_timestamp, momentum_height, block_type,
                   height, address, to_address, amount, token_standard, data, method, input,
                   paired_account_block, descendant_of
               FROM account_blocks WHERE hash = $1"#,
        )
        .bind(hash.to_string())
        .fetch_optional(&self.pool)
        .await
    }

    /// Attribute an incoming transfer as a reward payout by walking the
    /// descendant chain: receive -> Mint -> CollectReward, filtered to the
    /// reward-bearing contracts and the ZNN/QSR standards, newest first.
    pub async fn reward_details(
        &self,
        receive_block_hash: &str,
        reward_contracts: &[&str],
    ) -> sqlx::Result<Option<RewardDetails>> {
        let contracts: Vec<String> = reward_contracts.iter().map(|s| s.to_string()).collect();
        let row = sqlx::query(
            r#"SELECT T1.amount AS reward_amount, T2.address AS source, T1.token_standard
               FROM account_blocks T1
               INNER JOIN account_blocks T2
                   ON T1.descendant_of = T2.paired_account_block AND T2.method = 'Mint'
               INNER JOIN account_blocks T3
                   ON T2.descendant_of = T3.paired_account_block AND T3.method = 'CollectReward'
               WHERE T1.hash = $1
                   AND (T1.token_standard = $2 OR T1.token_standard = $3)
                   AND T2.address = ANY($4)
               ORDER BY T1.momentum_height DESC LIMIT 1"#,
        )
        .bind(receive_block_hash.to_string())
        .bind(znn_abi::constants::ZNN_TOKEN_STANDARD)
        .bind(znn_abi::constants::QSR_TOKEN_STANDARD)
        .bind(contracts)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| RewardDetails {
            reward_amount: r.get("reward_amount"),
            source: r.get("source"),
            token_standard: r.get("token_standard"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn input_json_defaults_to_empty_object() {
        assert_eq!(input_json(None), serde_json::json!({}));
        assert_eq!(input_json(Some(&TxData::default())), serde_json::json!({}));
        let mut inputs = BTreeMap::new();
        inputs.insert("name".to_string(), "X".to_string());
        let tx = TxData {
            method: "Register".into(),
            inputs,
        };
        assert_eq!(input_json(Some(&tx)), serde_json::json!({"name": "X"}));
    }
}
