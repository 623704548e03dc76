use crate::error::TomoResult;
use crate::records::sink::{RecordRow, RecordSink};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use std::fmt;
use std::path::Path;
use tracing::info;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS registros (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    direccion_regional TEXT NOT NULL,
    item_monitoreo TEXT NOT NULL,
    detalle TEXT NOT NULL,
    estado TEXT,
    plazo_dias INTEGER,
    fecha_reunion TEXT
)";

const SELECT_COLUMNS: &str = "SELECT id, direccion_regional, item_monitoreo, detalle, estado, plazo_dias, fecha_reunion FROM registros";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Follow-up state of a monitoring record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl RecordStatus {
    pub const ALL: [RecordStatus; 4] = [
        RecordStatus::Pending,
        RecordStatus::InProgress,
        RecordStatus::Completed,
        RecordStatus::Cancelled,
    ];

    /// The label stored in the database and shown in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "Pendiente",
            RecordStatus::InProgress => "En progreso",
            RecordStatus::Completed => "Completado",
            RecordStatus::Cancelled => "Cancelado",
        }
    }

    pub fn parse(label: &str) -> Option<RecordStatus> {
        let label = label.trim();
        Self::ALL.into_iter().find(|s| s.as_str() == label)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of a record about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub region: String,
    pub topic: String,
    pub detail: String,
    pub status: Option<RecordStatus>,
    pub deadline_days: Option<i64>,
    /// Defaults to today when not set.
    pub meeting_date: Option<NaiveDate>,
}

impl NewRecord {
    pub fn new(region: &str, topic: &str, detail: &str) -> Self {
        NewRecord {
            region: region.to_owned(),
            topic: topic.to_owned(),
            detail: detail.to_owned(),
            status: None,
            deadline_days: None,
            meeting_date: None,
        }
    }
}

impl From<&RecordRow> for NewRecord {
    fn from(row: &RecordRow) -> Self {
        NewRecord {
            meeting_date: Some(row.date),
            ..NewRecord::new(&row.region, &row.topic, &row.detail)
        }
    }
}

/// A stored monitoring record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoringRecord {
    pub id: i64,
    pub region: String,
    pub topic: String,
    pub detail: String,
    pub status: Option<RecordStatus>,
    pub deadline_days: Option<i64>,
    pub meeting_date: Option<NaiveDate>,
}

impl MonitoringRecord {
    fn from_row(row: &SqliteRow) -> Self {
        let status: Option<String> = row.get(4);
        let meeting_date: Option<String> = row.get(6);

        MonitoringRecord {
            id: row.get(0),
            region: row.get(1),
            topic: row.get(2),
            detail: row.get(3),
            status: status.as_deref().and_then(RecordStatus::parse),
            deadline_days: row.get(5),
            meeting_date: meeting_date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok()),
        }
    }
}

/// Narrows a ledger listing. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub region: Option<String>,
    pub topic: Option<String>,
    pub status: Option<RecordStatus>,

    /// Literal substring of the detail, case-insensitive for ASCII letters.
    pub text: Option<String>,

    /// Maximum number of records; `None` returns all of them.
    pub limit: Option<u32>,

    pub offset: Option<u32>,
}

/// Monitoring records kept in the SQLite table `registros`.
#[derive(Clone)]
pub struct RecordLedger {
    pub(crate) pool: SqlitePool,
}

impl RecordLedger {
    pub async fn open(db_path: &Path) -> TomoResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        sqlx::query(CREATE_TABLE).execute(&pool).await?;

        Ok(RecordLedger { pool })
    }

    /// Writes a record and returns its id.
    pub async fn insert(&self, record: &NewRecord) -> TomoResult<i64> {
        let date = record
            .meeting_date
            .unwrap_or_else(|| Local::now().date_naive());

        let res = sqlx::query(
            "INSERT INTO registros
             (direccion_regional, item_monitoreo, detalle, estado, plazo_dias, fecha_reunion)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.region)
        .bind(&record.topic)
        .bind(&record.detail)
        .bind(record.status.map(|s| s.as_str()))
        .bind(record.deadline_days)
        .bind(date.format(DATE_FORMAT).to_string())
        .execute(&self.pool)
        .await?;

        Ok(res.last_insert_rowid())
    }

    /// Overwrites every field of record `id`. Returns `false` if it does not exist.
    pub async fn update(&self, id: i64, record: &NewRecord) -> TomoResult<bool> {
        let date = record
            .meeting_date
            .unwrap_or_else(|| Local::now().date_naive());

        let res = sqlx::query(
            "UPDATE registros SET direccion_regional = ?, item_monitoreo = ?, detalle = ?,
             estado = ?, plazo_dias = ?, fecha_reunion = ? WHERE id = ?",
        )
        .bind(&record.region)
        .bind(&record.topic)
        .bind(&record.detail)
        .bind(record.status.map(|s| s.as_str()))
        .bind(record.deadline_days)
        .bind(date.format(DATE_FORMAT).to_string())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }

    pub async fn get(&self, id: i64) -> TomoResult<Option<MonitoringRecord>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(MonitoringRecord::from_row))
    }

    /// Every record, oldest first.
    pub async fn list(&self) -> TomoResult<Vec<MonitoringRecord>> {
        self.filter(&RecordFilter::default()).await
    }

    pub async fn filter(&self, filter: &RecordFilter) -> TomoResult<Vec<MonitoringRecord>> {
        let limit = filter.limit.map_or(-1, i64::from);
        let offset = filter.offset.map_or(0, i64::from);
        let status = filter.status.map(|s| s.as_str());

        let sql = format!(
            "{SELECT_COLUMNS}
             WHERE (? IS NULL OR direccion_regional = ?)
               AND (? IS NULL OR item_monitoreo = ?)
               AND (? IS NULL OR estado = ?)
               AND (? IS NULL OR instr(lower(detalle), lower(?)) > 0)
             ORDER BY id ASC
             LIMIT ? OFFSET ?"
        );

        let rows = sqlx::query(&sql)
            .bind(&filter.region)
            .bind(&filter.region)
            .bind(&filter.topic)
            .bind(&filter.topic)
            .bind(status)
            .bind(status)
            .bind(&filter.text)
            .bind(&filter.text)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(MonitoringRecord::from_row).collect())
    }

    pub async fn count(&self) -> TomoResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) FROM registros")
            .fetch_one(&self.pool)
            .await?;

        let count: i64 = row.get(0);
        Ok(count as u64)
    }

    pub async fn delete(&self, id: i64) -> TomoResult<bool> {
        let res = sqlx::query("DELETE FROM registros WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(res.rows_affected() > 0)
    }

    /// Rebuilds the table from `records`, in one transaction.
    ///
    /// Ids restart from 1. Used when importing a full sheet.
    pub async fn replace_all(&self, records: &[NewRecord]) -> TomoResult<()> {
        let today = Local::now().date_naive();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DROP TABLE IF EXISTS registros")
            .execute(&mut *tx)
            .await?;
        sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;

        for record in records {
            let date = record.meeting_date.unwrap_or(today);
            sqlx::query(
                "INSERT INTO registros
                 (direccion_regional, item_monitoreo, detalle, estado, plazo_dias, fecha_reunion)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&record.region)
            .bind(&record.topic)
            .bind(&record.detail)
            .bind(record.status.map(|s| s.as_str()))
            .bind(record.deadline_days)
            .bind(date.format(DATE_FORMAT).to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(records = records.len(), "ledger replaced");

        Ok(())
    }
}

#[async_trait]
impl RecordSink for RecordLedger {
    async fn append_row(&self, row: &RecordRow) -> TomoResult<()> {
        let id = self.insert(&NewRecord::from(row)).await?;
        info!(id, region = %row.region, topic = %row.topic, "record appended");
        Ok(())
    }
}
