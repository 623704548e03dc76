//! Notebooks: which ones exist, where their text is kept, and the editing
//! session each one carries while open.
//!
//! - [`catalog`]: the fixed notebook and theme names of a workspace
//! - [`store`]: the [`DocumentStore`] seam and its SQLite implementation
//! - [`file`]: plain-text export and import
//! - [`session`]: one open notebook over a presentation surface
//! - [`manager`]: switching, saving and theme export across notebooks

pub mod catalog;
pub mod file;
pub mod manager;
pub mod session;
pub mod store;

pub use catalog::{Catalog, NotebookId};
pub use manager::{NotebookManager, SaveReport};
pub use session::{NotebookSession, Segment, ThemeMark};
pub use store::{DocumentStore, MemoryStore, SqliteStore};
