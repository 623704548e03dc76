//! Monitoring records produced from themed segments.
//!
//! Closing a themed segment yields a [`RecordRow`] which is handed to a
//! [`RecordSink`]. The sink may be the SQLite [`RecordLedger`], a
//! [`WorkbookSink`] that also keeps an `.xlsx` copy up to date, or a
//! [`MemorySink`] for tests.

pub mod ledger;
pub mod sink;
pub mod workbook;

pub use ledger::{MonitoringRecord, NewRecord, RecordFilter, RecordLedger, RecordStatus};
pub use sink::{MemorySink, RecordRow, RecordSink};
pub use workbook::{RECORD_HEADERS, ROW_HEADERS, WorkbookExporter, WorkbookImporter, WorkbookSink};
