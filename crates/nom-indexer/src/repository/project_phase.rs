//! Accelerator project phases.

use crate::models::ProjectPhase;
use sqlx::{PgPool, Row};

const UPSERT: &str = r#"
    INSERT INTO project_phases (id, project_id, voting_id, name, description, url,
        znn_funds_needed, qsr_funds_needed, creation_timestamp, accepted_timestamp,
        status, yes_votes, no_votes, total_votes)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
    ON CONFLICT (id) DO UPDATE SET
        accepted_timestamp = EXCLUDED.accepted_timestamp,
        status = EXCLUDED.status,
        yes_votes = EXCLUDED.yes_votes,
        no_votes = EXCLUDED.no_votes,
        total_votes = EXCLUDED.total_votes"#;

#[derive(Clone)]
pub struct ProjectPhaseRepository {
    pool: PgPool,
}

impl ProjectPhaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, p: &ProjectPhase) -> sqlx::Result<()> {
        sqlx::query(UPSERT)
            .bind(p.id.clone())
            .bind(p.project_id.clone())
            .bind(p.voting_id.clone())
            .bind(p.name.clone())
            .bind(p.description.clone())
            .bind(p.url.clone())
            .bind(p.znn_funds_needed)
            .bind(p.qsr_funds_needed)
            .bind(p.creation_timestamp)
            .bind(p.accepted_timestamp)
            .bind(p.status)
            .bind(p.yes_votes)
            .bind(p.no_votes)
            .bind(p.total_votes)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Resolve (project id, phase id) from a phase voting id.
    pub async fn project_and_phase_from_voting_id(
        &self,
        voting_id: &str,
    ) -> sqlx::Result<Option<(String, String)>> {
        let row = sqlx::query("SELECT project_id, id FROM project_phases WHERE voting_id = $1")
            .bind(voting_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| (r.get("project_id"), r.get("id"))))
    }

    pub async fn ids_created_since(&self, timestamp: i64) -> sqlx::Result<Vec<String>> {
        sqlx::query_scalar("SELECT id FROM project_phases WHERE creation_timestamp >= $1")
            .bind(timestamp)
            .fetch_all(&self.pool)
            .await
    }
}
