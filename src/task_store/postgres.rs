//! # PostgreSQL Task Store
//!
//! Task records persisted as JSONB documents keyed by `(request_id, id)`.
//! The document keeps the record's own camelCase field names so reads and
//! writes stay shape-stable; `status` is denormalized into a column for
//! operational queries.

use super::{CreateMode, TaskStore};
use crate::config::TaskStoreConfig;
use crate::error::{Result, Stage, TextExtractorError};
use crate::models::TaskRecord;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
    table: String,
    create_mode: CreateMode,
}

fn store_error(operation: &str, error: sqlx::Error) -> TextExtractorError {
    TextExtractorError::dependency(Stage::Store, format!("{operation} failed: {error}"))
}

/// Accept `name` or `schema.name` made of ASCII letters, digits and `_`
pub fn validate_table_name(table: &str) -> Result<()> {
    let valid_part = |part: &str| {
        !part.is_empty()
            && !part.starts_with(|c: char| c.is_ascii_digit())
            && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    };

    let parts: Vec<&str> = table.split('.').collect();
    if parts.len() <= 2 && parts.iter().all(|part| valid_part(part)) {
        Ok(())
    } else {
        Err(TextExtractorError::configuration(format!(
            "Invalid task table name '{table}'"
        )))
    }
}

impl PgTaskStore {
    pub fn new(pool: PgPool, config: &TaskStoreConfig) -> Result<Self> {
        validate_table_name(&config.table_name)?;
        Ok(Self {
            pool,
            table: config.table_name.clone(),
            create_mode: config.create_mode,
        })
    }

    /// Open a dedicated pool from `database_url`
    pub async fn connect(config: &TaskStoreConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .map_err(|e| store_error("connect", e))?;

        info!(table = %config.table_name, "Connected task store");
        Self::new(pool, config)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the task table if it does not exist
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(&self.schema_sql())
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("ensure_schema", e))?;
        debug!(table = %self.table, "Task table ready");
        Ok(())
    }

    fn schema_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                request_id TEXT NOT NULL,
                id TEXT NOT NULL,
                status TEXT NOT NULL,
                document JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (request_id, id)
            )",
            self.table
        )
    }

    fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (request_id, id, status, document) VALUES ($1, $2, $3, $4)",
            self.table
        )
    }

    fn upsert_sql(&self) -> String {
        format!(
            "{} ON CONFLICT (request_id, id) DO UPDATE SET status = EXCLUDED.status, document = EXCLUDED.document, updated_at = NOW()",
            self.insert_sql()
        )
    }

    async fn write(&self, sql: &str, record: &TaskRecord) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(sql)
            .bind(&record.request_id)
            .bind(&record.id)
            .bind(record.status.as_str())
            .bind(Json(record))
            .execute(&self.pool)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    #[instrument(skip(self, record), fields(request_id = %record.request_id, status = %record.status))]
    async fn create(&self, record: &TaskRecord) -> Result<()> {
        let sql = match self.create_mode {
            CreateMode::Upsert => self.upsert_sql(),
            CreateMode::Strict => self.insert_sql(),
        };

        self.write(&sql, record).await.map_err(|e| {
            let duplicate = matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation());
            if duplicate {
                TextExtractorError::conflict(&record.id)
            } else {
                store_error("create", e)
            }
        })
    }

    #[instrument(skip(self, record), fields(request_id = %record.request_id, status = %record.status))]
    async fn update(&self, record: &TaskRecord) -> Result<()> {
        self.write(&self.upsert_sql(), record)
            .await
            .map_err(|e| store_error("update", e))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<TaskRecord>> {
        let sql = format!(
            "SELECT document FROM {} WHERE request_id = $1 AND id = $1",
            self.table
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("get_by_id", e))?;

        row.map(|row| {
            row.try_get::<Json<TaskRecord>, _>("document")
                .map(|document| document.0)
                .map_err(|e| store_error("get_by_id", e))
        })
        .transpose()
    }

    async fn get_all(&self) -> Result<Vec<TaskRecord>> {
        let sql = format!("SELECT document FROM {}", self.table);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error("get_all", e))?;

        rows.into_iter()
            .map(|row| {
                row.try_get::<Json<TaskRecord>, _>("document")
                    .map(|document| document.0)
                    .map_err(|e| store_error("get_all", e))
            })
            .collect()
    }
}
