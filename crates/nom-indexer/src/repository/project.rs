//! Accelerator projects.

use crate::models::Project;
use sqlx::PgPool;

const UPSERT: &str = r#"
    INSERT INTO projects (id, voting_id, owner, name, description, url,
        znn_funds_needed, qsr_funds_needed, creation_timestamp, last_update_timestamp,
        status, yes_votes, no_votes, total_votes)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
    ON CONFLICT (id) DO UPDATE SET
        last_update_timestamp = EXCLUDED.last_update_timestamp,
        status = EXCLUDED.status,
        yes_votes = EXCLUDED.yes_votes,
        no_votes = EXCLUDED.no_votes,
        total_votes = EXCLUDED.total_votes"#;

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, p: &Project) -> sqlx::Result<()> {
        sqlx::query(UPSERT)
            .bind(p.id.clone())
            .bind(p.voting_id.clone())
            .bind(p.owner.clone())
            .bind(p.name.clone())
            .bind(p.description.clone())
            .bind(p.url.clone())
            .bind(p.znn_funds_needed)
            .bind(p.qsr_funds_needed)
            .bind(p.creation_timestamp)
            .bind(p.last_update_timestamp)
            .bind(p.status)
            .bind(p.yes_votes)
            .bind(p.no_votes)
            .bind(p.total_votes)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn id_from_voting_id(&self, voting_id: &str) -> sqlx::Result<Option<String>> {
        sqlx::query_scalar("SELECT id FROM projects WHERE voting_id = $1")
            .bind(voting_id.to_string())
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn ids_created_since(&self, timestamp: i64) -> sqlx::Result<Vec<String>> {
        sqlx::query_scalar("SELECT id FROM projects WHERE creation_timestamp >= $1")
            .bind(timestamp)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get_all(&self) -> sqlx::Result<Vec<Project>> {
        sqlx::query_as(
            r#"SELECT id, voting_id, owner, name, description, url,
                   znn_funds_needed, qsr_funds_needed, creation_timestamp, last_update_timestamp,
                   status, yes_votes, no_votes, total_votes
               FROM projects"#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
