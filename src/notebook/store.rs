use crate::error::{TomoError, TomoResult};
use crate::notebook::catalog::NotebookId;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool};
use sqlx::Row;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Persistent notebook texts, keyed by notebook.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns the stored text, or an empty string for a notebook never saved.
    async fn get(&self, id: &NotebookId) -> TomoResult<String>;

    /// Replaces the stored text of a notebook.
    async fn put(&self, id: &NotebookId, text: &str) -> TomoResult<()>;
}

/// A [`DocumentStore`] held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<NotebookId, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, id: &NotebookId) -> TomoResult<String> {
        let docs = self
            .docs
            .lock()
            .map_err(|_| TomoError::Other("document store lock poisoned".into()))?;
        Ok(docs.get(id).cloned().unwrap_or_default())
    }

    async fn put(&self, id: &NotebookId, text: &str) -> TomoResult<()> {
        let mut docs = self
            .docs
            .lock()
            .map_err(|_| TomoError::Other("document store lock poisoned".into()))?;
        docs.insert(id.clone(), text.to_owned());
        Ok(())
    }
}

/// SQLite-backed [`DocumentStore`].
///
/// Uses two tables: `cuadernos` (one row per notebook) and `hojas` (the
/// notebook text, one row per notebook).
pub struct SqliteStore {
    pub(crate) pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `db_path` and brings its
    /// schema up to date.
    pub async fn open(db_path: &Path) -> TomoResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let store = SqliteStore { pool };
        store.migrate().await?;

        Ok(store)
    }

    async fn migrate(&self) -> TomoResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS cuadernos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nombre TEXT NOT NULL UNIQUE,
                fecha_creacion TEXT,
                fecha_modificacion TEXT
            )",
        )
        .execute(&self.pool)
        .await?;

        // Early databases had a `hojas` table with no link to its notebook.
        let columns: Vec<String> = sqlx::query("PRAGMA table_info(hojas)")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(|row| row.get::<String, _>("name"))
            .collect();

        if !columns.is_empty() && !columns.iter().any(|c| c == "cuaderno_id") {
            warn!("recreating legacy hojas table without cuaderno_id");
            sqlx::query("DROP TABLE IF EXISTS hojas")
                .execute(&self.pool)
                .await?;
        }

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS hojas (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                cuaderno_id INTEGER NOT NULL,
                contenido TEXT,
                fecha_creacion TEXT,
                fecha_modificacion TEXT,
                FOREIGN KEY (cuaderno_id) REFERENCES cuadernos (id)
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Names of every notebook that has a row, in creation order.
    pub async fn list_notebooks(&self) -> TomoResult<Vec<String>> {
        let rows = sqlx::query("SELECT nombre FROM cuadernos ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get::<String, _>(0)).collect())
    }

    /// Last modification timestamp of a notebook's text, if it was ever saved.
    pub async fn modified_at(&self, id: &NotebookId) -> TomoResult<Option<String>> {
        let row = sqlx::query(
            "SELECT h.fecha_modificacion FROM hojas h
             JOIN cuadernos c ON c.id = h.cuaderno_id
             WHERE c.nombre = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|row| row.get::<Option<String>, _>(0)))
    }

    /// Returns the `cuadernos` row id for `name`, inserting the row if missing.
    async fn notebook_row(conn: &mut SqliteConnection, name: &str, now: &str) -> TomoResult<i64> {
        let existing = sqlx::query("SELECT id FROM cuadernos WHERE nombre = ?")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;

        if let Some(row) = existing {
            return Ok(row.get(0));
        }

        let res = sqlx::query(
            "INSERT INTO cuadernos (nombre, fecha_creacion, fecha_modificacion) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(res.last_insert_rowid())
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, id: &NotebookId) -> TomoResult<String> {
        let row = sqlx::query(
            "SELECT h.contenido FROM hojas h
             JOIN cuadernos c ON c.id = h.cuaderno_id
             WHERE c.nombre = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let text = row
            .and_then(|row| row.get::<Option<String>, _>(0))
            .unwrap_or_default();
        debug!(notebook = %id, bytes = text.len(), "loaded notebook");

        Ok(text)
    }

    async fn put(&self, id: &NotebookId, text: &str) -> TomoResult<()> {
        let now = timestamp();
        let mut tx = self.pool.begin().await?;

        let notebook = Self::notebook_row(&mut *tx, id.as_str(), &now).await?;

        let updated = sqlx::query(
            "UPDATE hojas SET contenido = ?, fecha_modificacion = ? WHERE cuaderno_id = ?",
        )
        .bind(text)
        .bind(&now)
        .bind(notebook)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            sqlx::query(
                "INSERT INTO hojas (cuaderno_id, contenido, fecha_creacion, fecha_modificacion)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(notebook)
            .bind(text)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE cuadernos SET fecha_modificacion = ? WHERE id = ?")
            .bind(&now)
            .bind(notebook)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(notebook = %id, bytes = text.len(), "stored notebook");

        Ok(())
    }
}

fn timestamp() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}
