//! Spreadsheet export and import of monitoring records.
//!
//! Workbooks are rendered in memory and written atomically, so a reader never
//! sees a half-written file.

use crate::error::{TomoError, TomoResult};
use crate::notebook::file::write_atomic;
use crate::records::ledger::{MonitoringRecord, NewRecord, RecordLedger, RecordStatus};
use crate::records::sink::{RecordRow, RecordSink};
use async_trait::async_trait;
use calamine::{Data, Reader, Xlsx, open_workbook};
use chrono::{Days, Local, NaiveDate};
use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Columns of the row layout.
pub const ROW_HEADERS: [&str; 4] = [
    "Dirección Regional",
    "Fecha de Reunión",
    "Ítem de monitoreo",
    "Detalle",
];

/// Columns of the full record layout.
pub const RECORD_HEADERS: [&str; 7] = [
    "N° Registro",
    "Dirección Regional",
    "Ítem Monitoreo",
    "Detalle",
    "Estado",
    "Plazo (días)",
    "Fecha Reunión",
];

/// Writes rows or records to one worksheet of an `.xlsx` file.
#[derive(Debug, Clone)]
pub struct WorkbookExporter {
    path: PathBuf,
    sheet_name: String,
}

impl WorkbookExporter {
    pub fn new(path: impl Into<PathBuf>, sheet_name: &str) -> Self {
        WorkbookExporter {
            path: path.into(),
            sheet_name: sheet_name.to_owned(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Region / date (`dd/mm/YYYY`) / topic / detail, one row each.
    pub fn export_rows(&self, rows: &[RecordRow]) -> TomoResult<()> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.sheet_name)?;
        write_headers(sheet, &ROW_HEADERS)?;

        for (i, row) in rows.iter().enumerate() {
            let r = (i + 1) as u32;
            sheet.write_string(r, 0, &row.region)?;
            sheet.write_string(r, 1, row.date_label())?;
            sheet.write_string(r, 2, &row.topic)?;
            sheet.write_string(r, 3, &row.detail)?;
        }

        self.save(&mut workbook, rows.len())
    }

    /// The full ledger layout, dates as `dd-mm-YYYY`.
    pub fn export_records(&self, records: &[MonitoringRecord]) -> TomoResult<()> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.sheet_name)?;
        write_headers(sheet, &RECORD_HEADERS)?;

        for (i, record) in records.iter().enumerate() {
            let r = (i + 1) as u32;
            sheet.write_number(r, 0, record.id as f64)?;
            sheet.write_string(r, 1, &record.region)?;
            sheet.write_string(r, 2, &record.topic)?;
            sheet.write_string(r, 3, &record.detail)?;
            if let Some(status) = record.status {
                sheet.write_string(r, 4, status.as_str())?;
            }
            if let Some(days) = record.deadline_days {
                sheet.write_number(r, 5, days as f64)?;
            }
            if let Some(date) = record.meeting_date {
                sheet.write_string(r, 6, date.format("%d-%m-%Y").to_string())?;
            }
        }

        self.save(&mut workbook, records.len())
    }

    fn save(&self, workbook: &mut Workbook, rows: usize) -> TomoResult<()> {
        let buffer = workbook.save_to_buffer()?;
        write_atomic(&self.path, &buffer)?;
        info!(path = %self.path.display(), rows, "workbook written");
        Ok(())
    }
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str]) -> Result<(), XlsxError> {
    let header = Format::new().set_bold().set_border(FormatBorder::Thin);

    for (col, title) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
        sheet.set_column_width(col as u16, if col == 3 { 60 } else { 22 })?;
    }
    Ok(())
}

/// Appends to a ledger and keeps a sheet of every ledger row, in the
/// region / date / topic / detail layout, next to it.
///
/// The ledger is the source of truth. The sheet is rewritten from it after
/// each row, so the exporter should point at a file this crate owns.
pub struct WorkbookSink {
    ledger: RecordLedger,
    exporter: WorkbookExporter,
}

impl WorkbookSink {
    pub fn new(ledger: RecordLedger, exporter: WorkbookExporter) -> Self {
        WorkbookSink { ledger, exporter }
    }

    pub fn ledger(&self) -> &RecordLedger {
        &self.ledger
    }

    pub fn exporter(&self) -> &WorkbookExporter {
        &self.exporter
    }

    /// Rewrites the sheet from the ledger.
    pub async fn refresh(&self) -> TomoResult<()> {
        let today = Local::now().date_naive();
        let rows: Vec<RecordRow> = self
            .ledger
            .list()
            .await?
            .iter()
            .map(|r| {
                RecordRow::dated(&r.region, r.meeting_date.unwrap_or(today), &r.topic, &r.detail)
            })
            .collect();

        self.exporter.export_rows(&rows)
    }
}

#[async_trait]
impl RecordSink for WorkbookSink {
    /// Succeeds once the ledger holds the row. A failed sheet rewrite is only
    /// logged; the next row or [`WorkbookSink::refresh`] writes it again.
    async fn append_row(&self, row: &RecordRow) -> TomoResult<()> {
        self.ledger.append_row(row).await?;

        if let Err(e) = self.refresh().await {
            warn!(
                path = %self.exporter.path().display(),
                error = %e,
                "sheet left behind the ledger"
            );
        }
        Ok(())
    }
}

/// Reads monitoring records back from a sheet in the [`RECORD_HEADERS`] layout.
///
/// Columns are found by header name, so their order does not matter.
/// `N° Registro` is ignored since ids are reassigned on import. A blank
/// deadline reads as 0 days.
#[derive(Debug, Clone)]
pub struct WorkbookImporter {
    path: PathBuf,
    sheet_name: String,
}

impl WorkbookImporter {
    pub fn new(path: impl Into<PathBuf>, sheet_name: &str) -> Self {
        WorkbookImporter {
            path: path.into(),
            sheet_name: sheet_name.to_owned(),
        }
    }

    pub fn read_records(&self) -> TomoResult<Vec<NewRecord>> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path)?;
        let range = workbook.worksheet_range(&self.sheet_name)?;
        let mut rows = range.rows();

        let Some(header) = rows.next() else {
            return Ok(Vec::new());
        };
        let column = |title: &str| header.iter().position(|cell| cell_text(cell) == title);
        let required = |title: &str| {
            column(title).ok_or_else(|| TomoError::MissingColumn(title.to_owned()))
        };

        let region = required(RECORD_HEADERS[1])?;
        let topic = required(RECORD_HEADERS[2])?;
        let detail = required(RECORD_HEADERS[3])?;
        let status = column(RECORD_HEADERS[4]);
        let deadline = column(RECORD_HEADERS[5]);
        let meeting = column(RECORD_HEADERS[6]);

        let mut records = Vec::new();
        for row in rows {
            let text = |col: usize| row.get(col).map(cell_text).unwrap_or_default();
            let mut record = NewRecord::new(&text(region), &text(topic), &text(detail));
            if record.region.is_empty() && record.topic.is_empty() && record.detail.is_empty() {
                continue;
            }

            record.status = status.and_then(|c| RecordStatus::parse(&text(c)));
            let days = deadline.and_then(|c| row.get(c)).and_then(cell_int);
            record.deadline_days = Some(days.unwrap_or(0));
            record.meeting_date = meeting.and_then(|c| row.get(c)).and_then(cell_date);
            records.push(record);
        }

        debug!(path = %self.path.display(), records = records.len(), "sheet read");
        Ok(records)
    }

    /// Replaces the ledger's content with the sheet's records.
    pub async fn import_into(&self, ledger: &RecordLedger) -> TomoResult<usize> {
        let records = self.read_records()?;
        ledger.replace_all(&records).await?;
        Ok(records.len())
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_owned(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_owned(),
    }
}

fn cell_int(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(i) => Some(*i),
        Data::Float(f) => Some(f.round() as i64),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn cell_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) => {
            let s = s.trim();
            ["%d-%m-%Y", "%d/%m/%Y", "%Y-%m-%d"]
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), f).ok())
        }
        Data::DateTime(dt) => serial_date(dt.as_f64()),
        Data::Float(f) => serial_date(*f),
        _ => None,
    }
}

/// Day of a spreadsheet date serial (days since 1899-12-30).
fn serial_date(serial: f64) -> Option<NaiveDate> {
    if serial.is_nan() || serial < 1.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.floor() as u64))
}
