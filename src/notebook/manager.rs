use crate::error::{TomoError, TomoResult};
use crate::notebook::catalog::{Catalog, NotebookId};
use crate::notebook::file;
use crate::notebook::session::NotebookSession;
use crate::notebook::store::DocumentStore;
use crate::records::sink::{RecordRow, RecordSink};
use crate::surface::PresentationSurface;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// What a save did besides writing the notebook text.
#[derive(Debug, Default)]
pub struct SaveReport {
    /// Row pushed to the record sink for the open themed segment, if any.
    pub record: Option<RecordRow>,

    /// Why the record could not be pushed. The notebook text was still saved.
    pub sink_error: Option<TomoError>,
}

/// High-level operations over the notebooks of one workspace.
///
/// Borrows a document store, a record sink and a catalog, and keeps one
/// [`NotebookSession`] per notebook opened so far; switching back to a
/// notebook returns to its in-memory state, unsaved edits included.
pub struct NotebookManager<'a, S, K, V> {
    store: &'a S,
    sink: &'a K,
    catalog: &'a Catalog,
    sessions: HashMap<NotebookId, NotebookSession<V>>,
    current: Option<NotebookId>,
}

impl<'a, S, K, V> NotebookManager<'a, S, K, V>
where
    S: DocumentStore,
    K: RecordSink,
    V: PresentationSurface + Default,
{
    pub fn new(store: &'a S, sink: &'a K, catalog: &'a Catalog) -> Self {
        NotebookManager {
            store,
            sink,
            catalog,
            sessions: HashMap::new(),
            current: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog
    }

    pub fn current_id(&self) -> Option<&NotebookId> {
        self.current.as_ref()
    }

    pub fn current(&self) -> Option<&NotebookSession<V>> {
        self.current.as_ref().and_then(|id| self.sessions.get(id))
    }

    pub fn current_mut(&mut self) -> Option<&mut NotebookSession<V>> {
        let id = self.current.as_ref()?;
        self.sessions.get_mut(id)
    }

    /// Makes `name` the current notebook, loading it from the store on first use.
    ///
    /// Any search active on the notebook is cleared.
    ///
    /// # Errors
    /// - [`TomoError::UnknownNotebook`] if `name` is not in the catalog
    /// - any store error while loading
    pub async fn show(&mut self, name: &str) -> TomoResult<&mut NotebookSession<V>> {
        let id = self.catalog.resolve(name)?;

        if !self.sessions.contains_key(&id) {
            let raw = self.store.get(&id).await?;
            let session = NotebookSession::load(id.clone(), &raw, V::default());
            self.sessions.insert(id.clone(), session);
        }

        self.current = Some(id.clone());
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(TomoError::NoActiveNotebook)?;
        session.clear_search();

        Ok(session)
    }

    /// Inserts a theme label into the current notebook.
    ///
    /// When this closes a themed segment with some detail, the detail is
    /// pushed to the record sink and the row is returned. The label stays
    /// in the text even if the sink fails.
    ///
    /// # Errors
    /// - [`TomoError::NoActiveNotebook`] if no notebook is shown
    /// - [`TomoError::UnknownTheme`] if the label is not in the catalog
    /// - the sink's error, if it rejects the row
    pub async fn insert_theme(&mut self, label: &str) -> TomoResult<Option<RecordRow>> {
        let label = self.catalog.theme(label)?.to_owned();
        let sink = self.sink;
        let session = self.current_mut().ok_or(TomoError::NoActiveNotebook)?;

        let Some(segment) = session.insert_theme(&label) else {
            return Ok(None);
        };

        let row = RecordRow::today(session.id().as_str(), &segment.topic, &segment.detail);
        sink.append_row(&row).await?;
        info!(notebook = %row.region, topic = %row.topic, "themed segment exported");

        Ok(Some(row))
    }

    /// Saves the current notebook.
    ///
    /// The encoded text is written to the store first; if that fails the
    /// error is returned and the session is left exactly as it was. Then the
    /// open themed segment, if it has detail, is pushed to the sink. A sink
    /// failure does not fail the save; it is reported in [`SaveReport`].
    pub async fn save(&mut self) -> TomoResult<SaveReport> {
        let store = self.store;
        let sink = self.sink;
        let session = self.current_mut().ok_or(TomoError::NoActiveNotebook)?;

        let encoded = session.encode();
        store.put(session.id(), &encoded).await?;
        session.mark_saved();
        info!(notebook = %session.id(), comments = session.comments().len(), "notebook saved");

        let mut report = SaveReport::default();
        if let Some(segment) = session.pending_segment() {
            let row = RecordRow::today(session.id().as_str(), &segment.topic, &segment.detail);
            match sink.append_row(&row).await {
                Ok(()) => {
                    session.advance_segment();
                    report.record = Some(row);
                }
                Err(e) => {
                    warn!(notebook = %session.id(), error = %e, "failed to export themed segment");
                    report.sink_error = Some(e);
                }
            }
        }

        Ok(report)
    }

    /// Writes the current notebook, comments included, to a text file.
    pub fn export_current(&self, path: &Path) -> TomoResult<()> {
        let session = self.current().ok_or(TomoError::NoActiveNotebook)?;
        file::export_text(path, &session.encode())
    }

    /// Replaces the current notebook's in-memory content with a text file.
    ///
    /// Nothing is written to the store until the next [`save`](Self::save).
    pub fn import_into_current(&mut self, path: &Path) -> TomoResult<()> {
        let raw = file::import_text(path)?;
        let session = self.current_mut().ok_or(TomoError::NoActiveNotebook)?;
        session.reload(&raw);
        session.surface_mut().set_modified(true);
        Ok(())
    }

    /// Empties the current notebook in memory.
    pub fn new_document(&mut self) -> TomoResult<()> {
        let session = self.current_mut().ok_or(TomoError::NoActiveNotebook)?;
        session.reset();
        Ok(())
    }

    /// Whether any opened notebook has edits not yet saved.
    pub fn has_unsaved_changes(&self) -> bool {
        self.sessions.values().any(|s| s.is_modified())
    }
}
