//! Pillar votes on projects and phases.

use super::batch::Batch;
use crate::models::Vote;
use sqlx::PgPool;

/// Append-only, but keyed on (momentum_hash, voter, voting_id) so replaying
/// a momentum cannot record the same vote twice.
const INSERT: &str = r#"
    INSERT INTO votes (momentum_hash, momentum_timestamp, momentum_height,
        voter_address, project_id, phase_id, voting_id, vote)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    ON CONFLICT (momentum_hash, voter_address, voting_id) DO NOTHING"#;

#[derive(Clone)]
pub struct VoteRepository {
    pool: PgPool,
}

impl VoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, v: &Vote) -> sqlx::Result<()> {
        sqlx::query(INSERT)
            .bind(v.momentum_hash.clone())
            .bind(v.momentum_timestamp)
            .bind(v.momentum_height)
            .bind(v.voter_address.clone())
            .bind(v.project_id.clone())
            .bind(v.phase_id.clone())
            .bind(v.voting_id.clone())
            .bind(v.vote)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub fn insert_batch(batch: &mut Batch, v: &Vote) {
        batch.queue(
            "vote.insert",
            sqlx::query(INSERT)
                .bind(v.momentum_hash.clone())
                .bind(v.momentum_timestamp)
                .bind(v.momentum_height)
                .bind(v.voter_address.clone())
                .bind(v.project_id.clone())
                .bind(v.phase_id.clone())
                .bind(v.voting_id.clone())
                .bind(v.vote),
        );
    }

    /// Distinct projects the voter has voted on, restricted to `project_ids`.
    pub async fn count_projects_voted(
        &self,
        voter_address: &str,
        project_ids: &[String],
    ) -> sqlx::Result<i64> {
        sqlx::query_scalar(
            r#"SELECT COUNT(DISTINCT project_id) FROM votes
               WHERE voter_address = $1 AND project_id = ANY($2) AND phase_id = ''"#,
        )
        .bind(voter_address.to_string())
        .bind(project_ids.to_vec())
        .fetch_one(&self.pool)
        .await
    }

    /// Distinct phases the voter has voted on, restricted to `phase_ids`.
    pub async fn count_phases_voted(
        &self,
        voter_address: &str,
        phase_ids: &[String],
    ) -> sqlx::Result<i64> {
        sqlx::query_scalar(
            r#"SELECT COUNT(DISTINCT phase_id) FROM votes
               WHERE voter_address = $1 AND phase_id = ANY($2)"#,
        )
        .bind(voter_address.to_string())
        .bind(phase_ids.to_vec())
        .fetch_one(&self.pool)
        .await
    }
}
