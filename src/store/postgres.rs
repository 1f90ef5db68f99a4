use anyhow::Context;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use tracing::{debug, error};
use uuid::Uuid;

use super::{Direction, Document, DocumentStore, Query, StoreError};

/// Documents live in a single JSONB table keyed by (collection, id).
#[derive(Clone)]
pub struct PgDocumentStore {
    db: PgPool,
}

impl PgDocumentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    error!(error = %e, "document store query failed");
    StoreError::Backend(e.to_string())
}

/// Equality filters folded into one object for `body @> $2`.
fn containment_filter(query: &Query) -> Value {
    let fields: Map<String, Value> = query.filters.iter().cloned().collect();
    Value::Object(fields)
}

fn select_sql(query: &Query) -> String {
    let mut sql = String::from(
        r#"
        SELECT id, body
          FROM documents
         WHERE collection = $1
           AND body @> $2"#,
    );
    if let Some((_, direction)) = &query.order_by {
        let dir = match direction {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        };
        sql.push_str(&format!("\n         ORDER BY body -> $3 {dir}"));
    }
    if let Some(limit) = query.limit {
        sql.push_str(&format!("\n         LIMIT {limit}"));
    }
    sql
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    async fn set(&self, collection: &str, id: &str, body: Value) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO UPDATE SET body = EXCLUDED.body
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(body))
        .execute(&self.db)
        .await
        .map_err(backend)?;
        debug!(collection, id, "document written");
        Ok(())
    }

    async fn create(&self, collection: &str, id: &str, body: Value) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO NOTHING
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(body))
        .execute(&self.db)
        .await
        .map_err(backend)?;
        let created = result.rows_affected() == 1;
        debug!(collection, id, created, "document created");
        Ok(created)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query_as::<_, (Json<Value>,)>(
            r#"
            SELECT body
              FROM documents
             WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(backend)?;
        Ok(row.map(|(Json(body),)| body))
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let sql = select_sql(query);
        let mut q = sqlx::query_as::<_, (String, Json<Value>)>(&sql)
            .bind(collection)
            .bind(Json(containment_filter(query)));
        if let Some((field, _)) = &query.order_by {
            q = q.bind(field.as_str());
        }
        let rows = q.fetch_all(&self.db).await.map_err(backend)?;
        Ok(rows
            .into_iter()
            .map(|(id, Json(body))| Document { id, body })
            .collect())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(backend)?;
        debug!(collection, id, removed = result.rows_affected(), "document deleted");
        Ok(())
    }
}
