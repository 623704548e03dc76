use crate::error::{TomoError, TomoResult};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use std::sync::Mutex;

/// One row of the monitoring sheet: who, when, which topic, what was said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub region: String,
    pub date: NaiveDate,
    pub topic: String,
    pub detail: String,
}

impl RecordRow {
    /// A row dated today (local time).
    pub fn today(region: &str, topic: &str, detail: &str) -> Self {
        Self::dated(region, Local::now().date_naive(), topic, detail)
    }

    pub fn dated(region: &str, date: NaiveDate, topic: &str, detail: &str) -> Self {
        RecordRow {
            region: region.to_owned(),
            date,
            topic: topic.to_owned(),
            detail: detail.to_owned(),
        }
    }

    /// The date as written in the sheet, `dd/mm/YYYY`.
    pub fn date_label(&self) -> String {
        self.date.format("%d/%m/%Y").to_string()
    }
}

/// Append-only destination for record rows.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn append_row(&self, row: &RecordRow) -> TomoResult<()>;
}

/// A [`RecordSink`] that keeps rows in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Mutex<Vec<RecordRow>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows appended so far, in insertion order.
    pub fn rows(&self) -> Vec<RecordRow> {
        self.rows
            .lock()
            .map(|rows| rows.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn append_row(&self, row: &RecordRow) -> TomoResult<()> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| TomoError::Other("record sink lock poisoned".into()))?;
        rows.push(row.clone());
        Ok(())
    }
}
