//! Bridge wrap/unwrap requests and the stop heights that bound each
//! page-back sync tick.

use crate::models::{UnwrapTokenRequest, WrapTokenRequest};
use sqlx::PgPool;

const UPSERT_WRAP: &str = r#"
    INSERT INTO wrap_token_requests (id, network_class, chain_id, to_address, token_standard,
        token_address, amount, fee, signature, creation_momentum_height, confirmations_to_finality)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
    ON CONFLICT (id) DO UPDATE SET
        signature = EXCLUDED.signature,
        confirmations_to_finality = EXCLUDED.confirmations_to_finality"#;

const UPSERT_UNWRAP: &str = r#"
    INSERT INTO unwrap_token_requests (transaction_hash, log_index, network_class, chain_id,
        to_address, token_standard, token_address, amount, signature,
        registration_momentum_height, redeemed, revoked, redeemable_in)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
    ON CONFLICT (transaction_hash, log_index) DO UPDATE SET
        signature = EXCLUDED.signature,
        redeemed = EXCLUDED.redeemed,
        revoked = EXCLUDED.revoked,
        redeemable_in = EXCLUDED.redeemable_in"#;

#[derive(Clone)]
pub struct BridgeRepository {
    pool: PgPool,
}

impl BridgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert_wrap_request(&self, w: &WrapTokenRequest) -> sqlx::Result<()> {
        sqlx::query(UPSERT_WRAP)
            .bind(w.id.clone())
            .bind(w.network_class)
            .bind(w.chain_id)
            .bind(w.to_address.clone())
            .bind(w.token_standard.clone())
            .bind(w.token_address.clone())
            .bind(w.amount)
            .bind(w.fee)
            .bind(w.signature.clone())
            .bind(w.creation_momentum_height)
            .bind(w.confirmations_to_finality)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn upsert_unwrap_request(&self, u: &UnwrapTokenRequest) -> sqlx::Result<()> {
        sqlx::query(UPSERT_UNWRAP)
            .bind(u.transaction_hash.clone())
            .bind(u.log_index)
            .bind(u.network_class)
            .bind(u.chain_id)
            .bind(u.to_address.clone())
            .bind(u.token_standard.clone())
            .bind(u.token_address.clone())
            .bind(u.amount)
            .bind(u.signature.clone())
            .bind(u.registration_momentum_height)
            .bind(u.redeemed)
            .bind(u.revoked)
            .bind(u.redeemable_in)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_wrap_request_by_id(&self, id: &str) -> sqlx::Result<Option<WrapTokenRequest>> {
        sqlx::query_as(
            r#"SELECT id, network_class, chain_id, to_address, token_standard,
                   token_address, amount, fee, signature, creation_momentum_height,
                   confirmations_to_finality
               FROM wrap_token_requests WHERE id = $1"#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_unwrap_request(
        &self,
        transaction_hash: &str,
        log_index: i64,
    ) -> sqlx::Result<Option<UnwrapTokenRequest>> {
        sqlx::query_as(
            r#"SELECT transaction_hash, log_index, network_class, chain_id,
                   to_address, token_standard, token_address, amount, signature,
                   registration_momentum_height, redeemed, revoked, redeemable_in
               FROM unwrap_token_requests WHERE transaction_hash = $1 AND log_index = $2"#,
        )
        .bind(transaction_hash.to_string())
        .bind(log_index)
        .fetch_optional(&self.pool)
        .await
    }

    /// Height to page back to for wrap requests: the oldest unfinalized
    /// request, else the newest known one, else 0 (full scan).
    pub async fn wrap_sync_stop_height(&self) -> sqlx::Result<i64> {
        let unfinalized: Option<i64> = sqlx::query_scalar(
            r#"SELECT creation_momentum_height FROM wrap_token_requests
               WHERE confirmations_to_finality > 0
               ORDER BY creation_momentum_height ASC
               LIMIT 1"#,
        )
        .fetch_optional(&self.pool)
        .await?;
        if let Some(height) = unfinalized {
            return Ok(height);
        }
        let newest: Option<i64> = sqlx::query_scalar(
            r#"SELECT creation_momentum_height FROM wrap_token_requests
               ORDER BY creation_momentum_height DESC
               LIMIT 1"#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(newest.unwrap_or(0))
    }

    /// Height to page back to for unwrap requests. Unfinalized means neither
    /// redeemed nor revoked; unlike wraps, finalization is user-initiated and
    /// can land out of order.
    pub async fn unwrap_sync_stop_height(&self) -> sqlx::Result<i64> {
        let unfinalized: Option<i64> = sqlx::query_scalar(
            r#"SELECT registration_momentum_height FROM unwrap_token_requests
               WHERE redeemed = false AND revoked = false
               ORDER BY registration_momentum_height ASC
               LIMIT 1"#,
        )
        .fetch_optional(&self.pool)
        .await?;
        if let Some(height) = unfinalized {
            return Ok(height);
        }
        let newest: Option<i64> = sqlx::query_scalar(
            r#"SELECT registration_momentum_height FROM unwrap_token_requests
               ORDER BY registration_momentum_height DESC
               LIMIT 1"#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(newest.unwrap_or(0))
    }
}
