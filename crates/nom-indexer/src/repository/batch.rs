//! Batched writes.
//!
//! A [`Batch`] queues parameterised statements and later executes them
//! sequentially on a single pooled connection. It is a pipeline, not a
//! transaction: per-statement failures are logged and the rest proceed,
//! since idempotent conflict clauses make replays converge.

use sqlx::postgres::PgArguments;
use sqlx::{PgPool, Postgres};
use tracing::warn;

pub type PgQuery = sqlx::query::Query<'static, Postgres, PgArguments>;

#[derive(Default)]
pub struct Batch {
    ops: Vec<(&'static str, PgQuery)>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&mut self, label: &'static str, query: PgQuery) {
        self.ops.push((label, query));
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Statement labels in queue order; used by tests to assert composition.
    pub fn labels(&self) -> Vec<&'static str> {
        self.ops.iter().map(|(label, _)| *label).collect()
    }

    /// Execute every queued statement in order. Only failure to obtain a
    /// connection is an error; statement failures are logged and skipped.
    pub async fn submit(self, pool: &PgPool) -> Result<(), sqlx::Error> {
        let mut conn = pool.acquire().await?;
        for (index, (label, query)) in self.ops.into_iter().enumerate() {
            if let Err(e) = query.execute(&mut *conn).await {
                warn!(index, statement = label, error = %e, "batch operation failed");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_preserves_order_and_labels() {
        let mut batch = Batch::new();
        assert!(batch.is_empty());
        batch.queue("first", sqlx::query("SELECT 1"));
        batch.queue("second", sqlx::query("SELECT 2"));
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.labels(), vec!["first", "second"]);
    }
}
