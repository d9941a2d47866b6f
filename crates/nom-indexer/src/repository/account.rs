//! Account rows. The public key is set-once: an upsert never overwrites a
//! stored key with an empty one.

use super::batch::Batch;
use crate::models::Account;
use sqlx::PgPool;

const UPSERT: &str = r#"
    INSERT INTO accounts (address, block_count, public_key)
    VALUES ($1, $2, $3)
    ON CONFLICT (address) DO UPDATE SET
        block_count = $2,
        public_key = COALESCE(NULLIF($3, ''), accounts.public_key)"#;

const UPDATE_DELEGATE: &str = r#"
    UPDATE accounts
    SET delegate = $2, delegation_start_timestamp = $3
    WHERE address = $1"#;

#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, a: &Account) -> sqlx::Result<()> {
        sqlx::query(UPSERT)
            .bind(a.address.clone())
            .bind(a.block_count)
            .bind(a.public_key.clone())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub fn upsert_batch(batch: &mut Batch, a: &Account) {
        batch.queue(
            "account.upsert",
            sqlx::query(UPSERT)
                .bind(a.address.clone())
                .bind(a.block_count)
                .bind(a.public_key.clone()),
        );
    }

    pub async fn update_delegate(
        &self,
        address: &str,
        delegate: &str,
        timestamp: i64,
    ) -> sqlx::Result<()> {
        sqlx::query(UPDATE_DELEGATE)
            .bind(address.to_string())
            .bind(delegate.to_string())
            .bind(timestamp)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub fn update_delegate_batch(batch: &mut Batch, address: &str, delegate: &str, timestamp: i64) {
        batch.queue(
            "account.update_delegate",
            sqlx::query(UPDATE_DELEGATE)
                .bind(address.to_string())
                .bind(delegate.to_string())
                .bind(timestamp),
        );
    }

    pub async fn get_by_address(&self, address: &str) -> sqlx::Result<Option<Account>> {
        sqlx::query_as(
            r#"SELECT address, block_count, public_key, delegate, delegation_start_timestamp
               FROM accounts WHERE address = $1"#,
        )
        .bind(address.to_string())
        .fetch_optional(&self.pool)
        .await
    }
}
