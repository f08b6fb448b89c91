use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::{PgPool, Postgres, Transaction, postgres::PgPoolOptions};
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{info, warn};

use crate::{
    error::{Result, ServiceError},
    models::NewInteractionLog,
};

/// Insert-only store for accepted interaction records
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Persist one record and return its generated id.
    async fn insert(&self, record: NewInteractionLog) -> Result<i64>;
}

/// Checks every store applies before writing, so both report a blank name the same way.
fn validate_record(record: &NewInteractionLog) -> Result<()> {
    if record.hcp_name.trim().is_empty() {
        return Err(ServiceError::Validation(
            "hcp_name must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// In-memory implementation of InteractionStore
pub struct InMemoryInteractionStore {
    rows: DashMap<i64, NewInteractionLog>,
    next_id: AtomicI64,
}

impl InMemoryInteractionStore {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<NewInteractionLog> {
        self.rows.get(&id).map(|entry| entry.clone())
    }
}

impl Default for InMemoryInteractionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InteractionStore for InMemoryInteractionStore {
    async fn insert(&self, record: NewInteractionLog) -> Result<i64> {
        validate_record(&record)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.rows.insert(id, record);
        Ok(id)
    }
}

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS interaction_logs (
    id BIGSERIAL PRIMARY KEY,
    hcp_name TEXT NOT NULL CHECK (char_length(btrim(hcp_name)) > 0),
    date_of_interaction DATE NOT NULL,
    time TEXT,
    interaction_type TEXT,
    key_discussion_points TEXT NOT NULL,
    products_discussed TEXT,
    follow_up_needed BOOLEAN NOT NULL DEFAULT FALSE,
    outcome TEXT,
    original_message TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const INSERT_INTERACTION: &str = r#"
INSERT INTO interaction_logs (
    hcp_name, date_of_interaction, time, interaction_type, key_discussion_points,
    products_discussed, follow_up_needed, outcome, original_message
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
RETURNING id
"#;

/// PostgreSQL implementation of InteractionStore
pub struct PostgresInteractionStore {
    pool: PgPool,
}

impl PostgresInteractionStore {
    /// Connect, then create `interaction_logs` if it does not exist yet.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        let store = Self { pool };
        store.ensure_table().await?;
        Ok(store)
    }

    pub async fn ensure_table(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        info!("interaction_logs table ready");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn insert_row(
        tx: &mut Transaction<'_, Postgres>,
        record: &NewInteractionLog,
    ) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(INSERT_INTERACTION)
            .bind(&record.hcp_name)
            .bind(record.date_of_interaction)
            .bind(&record.time)
            .bind(&record.interaction_type)
            .bind(&record.key_discussion_points)
            .bind(&record.products_discussed)
            .bind(record.follow_up_needed)
            .bind(&record.outcome)
            .bind(&record.original_message)
            .fetch_one(&mut **tx)
            .await?;
        Ok(id)
    }
}

#[async_trait]
impl InteractionStore for PostgresInteractionStore {
    async fn insert(&self, record: NewInteractionLog) -> Result<i64> {
        validate_record(&record)?;
        let mut tx = self.pool.begin().await?;

        match Self::insert_row(&mut tx, &record).await {
            Ok(id) => {
                tx.commit().await?;
                Ok(id)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "rollback after failed insert also failed");
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(name: &str) -> NewInteractionLog {
        NewInteractionLog {
            hcp_name: name.to_string(),
            date_of_interaction: NaiveDate::from_ymd_opt(2025, 7, 27).unwrap(),
            time: None,
            interaction_type: None,
            key_discussion_points: "Discussed samples".to_string(),
            products_discussed: Some("Solara".to_string()),
            follow_up_needed: false,
            outcome: None,
            original_message: "note".to_string(),
        }
    }

    #[tokio::test]
    async fn in_memory_ids_increase_from_one() {
        let store = InMemoryInteractionStore::new();

        assert_eq!(store.insert(record("Dr. A")).await.unwrap(), 1);
        assert_eq!(store.insert(record("Dr. B")).await.unwrap(), 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(2).unwrap().hcp_name, "Dr. B");
    }

    #[tokio::test]
    async fn in_memory_rejects_blank_name_without_storing() {
        let store = InMemoryInteractionStore::new();

        let err = store.insert(record(" ")).await.unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn blank_name_is_a_validation_error_for_every_store() {
        assert!(validate_record(&record("Dr. A")).is_ok());
        for name in ["", "   ", "\t"] {
            assert!(matches!(
                validate_record(&record(name)),
                Err(ServiceError::Validation(msg)) if msg.contains("hcp_name")
            ));
        }
    }
}
