//! # tomo_core
//!
//! The core of a regional notebook editor: one plain-text notebook ("tomo")
//! per region, inline comment annotations that survive saving, in-document
//! search, and themed segments exported as monitoring records.
//!
//! ## Features
//!
//! - **Comment Annotations**: Inline `[ComentarioN]` markers backed by an out-of-line comment table
//! - **Lossless Persistence**: A readable text format that round-trips body and comments
//! - **In-document Search**: Case-insensitive, wrap-around next/previous navigation
//! - **Themed Segments**: Text written under a theme label becomes a dated record row
//! - **SQLite Storage**: Notebooks and monitoring records kept in SQLite via `sqlx`
//! - **Workbook Export**: Records written to an `.xlsx` sheet
//! - **Robust Error Handling**: One error type with automatic conversions
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tomo_core::config::TomoConfig;
//! use tomo_core::notebook::{NotebookManager, SqliteStore};
//! use tomo_core::records::RecordLedger;
//! use tomo_core::surface::BufferSurface;
//!
//! # async fn run() -> tomo_core::TomoResult<()> {
//! let config = TomoConfig::default();
//! config.ensure_data_dir()?;
//!
//! let catalog = config.catalog()?;
//! let store = SqliteStore::open(&config.database_path()).await?;
//! let ledger = RecordLedger::open(&config.ledger_path()).await?;
//!
//! let mut manager: NotebookManager<_, _, BufferSurface> =
//!     NotebookManager::new(&store, &ledger, &catalog);
//!
//! let session = manager.show("Atacama").await?;
//! session.insert_comment("revisar con el equipo");
//!
//! manager.insert_theme("Planificación").await?;
//! manager.save().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`document`]**: Comment ids, the comment table and the persisted text codec
//! - **[`search`]**: Match finding and the stateful search session
//! - **[`surface`]**: The text-view capability interface and an in-memory implementation
//! - **[`notebook`]**: Catalog, storage, per-notebook sessions and the manager
//! - **[`records`]**: Record rows, the SQLite ledger and workbook export
//! - **[`config`]**: TOML configuration of file locations, notebooks and themes
//! - **[`error`]**: Unified error handling throughout the library
//!
//! ## Persisted Format
//!
//! A notebook is stored as its body followed, when it has comments, by one
//! comment block. Decoding re-attaches every marker found in the body to its
//! comment so that clicking it opens the comment again.
//!
//! ```rust
//! use tomo_core::document::Document;
//!
//! let mut doc = Document::new("Reunión con el equipo regional.");
//! let id = doc.insert_comment(7, "confirmar fecha").unwrap();
//!
//! let raw = doc.encode();
//! assert!(raw.ends_with("[[/comentarios]]"));
//!
//! let back = Document::decode(&raw);
//! assert_eq!(back.comments.get(&id), Some("confirmar fecha"));
//! assert_eq!(back.hit_regions().len(), 1);
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`TomoResult<T>`], which wraps the unified
//! [`TomoError`] type. Database, I/O and workbook errors convert
//! automatically, allowing the use of the `?` operator throughout.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber; the
//! host application decides where they go.

pub mod config;
pub mod document;
pub mod error;
pub mod notebook;
pub mod records;
pub mod search;
pub mod surface;

/// Re-exports the most commonly used types for convenience.
pub use error::{TomoError, TomoResult};
