use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tomo_core::notebook::{Catalog, DocumentStore, MemoryStore, NotebookId, NotebookManager};
use tomo_core::records::{
    MemorySink, RecordLedger, RecordRow, RecordSink, WorkbookExporter, WorkbookSink,
};
use tomo_core::surface::{BufferSurface, PresentationSurface};
use tomo_core::{TomoError, TomoResult};

type Manager<'a, S, K> = NotebookManager<'a, S, K, BufferSurface>;

/// Reads fine, refuses every write.
struct ReadOnlyStore;

#[async_trait]
impl DocumentStore for ReadOnlyStore {
    async fn get(&self, _id: &NotebookId) -> TomoResult<String> {
        Ok("texto guardado".into())
    }

    async fn put(&self, _id: &NotebookId, _text: &str) -> TomoResult<()> {
        Err(TomoError::Other("disk full".into()))
    }
}

/// Rejects every row.
struct ClosedSink;

#[async_trait]
impl RecordSink for ClosedSink {
    async fn append_row(&self, _row: &RecordRow) -> TomoResult<()> {
        Err(TomoError::Other("workbook is open elsewhere".into()))
    }
}

fn type_text<S, K>(manager: &mut Manager<'_, S, K>, text: &str)
where
    S: DocumentStore,
    K: RecordSink,
{
    let session = manager.current_mut().unwrap();
    let at = session.surface().cursor();
    session.surface_mut().insert_text(at, text);
}

#[tokio::test]
async fn save_writes_encoded_text_to_store() -> Result<(), TomoError> {
    let store = MemoryStore::new();
    let sink = MemorySink::new();
    let catalog = Catalog::standard();
    let mut manager: Manager<_, _> = NotebookManager::new(&store, &sink, &catalog);

    let session = manager.show("Atacama").await?;
    session.surface_mut().insert_text(0, "acta de reunión");
    session.go_to_end();
    session.insert_comment("pendiente");

    let report = manager.save().await?;

    let saved = store.get(&catalog.resolve("Atacama")?).await?;
    assert_eq!(
        saved,
        "acta de reunión[Comentario1]\n[[comentarios]]\ncomment_1=pendiente\n[[/comentarios]]"
    );
    assert!(report.record.is_none());
    assert!(report.sink_error.is_none());
    assert!(!manager.has_unsaved_changes());

    Ok(())
}

#[tokio::test]
async fn unknown_notebook_and_theme_are_rejected() -> Result<(), TomoError> {
    let store = MemoryStore::new();
    let sink = MemorySink::new();
    let catalog = Catalog::standard();
    let mut manager: Manager<_, _> = NotebookManager::new(&store, &sink, &catalog);

    assert!(matches!(
        manager.show("Narnia").await,
        Err(TomoError::UnknownNotebook(_))
    ));
    assert!(matches!(
        manager.insert_theme("Planificación").await,
        Err(TomoError::NoActiveNotebook)
    ));
    assert!(matches!(manager.save().await, Err(TomoError::NoActiveNotebook)));

    manager.show("Maule").await?;
    assert!(matches!(
        manager.insert_theme("Vacaciones").await,
        Err(TomoError::UnknownTheme(_))
    ));
    assert_eq!(manager.current().unwrap().surface().text(), "");

    Ok(())
}

#[tokio::test]
async fn switching_notebooks_keeps_unsaved_edits() -> Result<(), TomoError> {
    let store = MemoryStore::new();
    let sink = MemorySink::new();
    let catalog = Catalog::standard();
    let mut manager: Manager<_, _> = NotebookManager::new(&store, &sink, &catalog);

    manager.show("Arica").await?;
    type_text(&mut manager, "borrador");
    manager.current_mut().unwrap().search_next("borrador");

    manager.show("Tarapacá").await?;
    assert_eq!(manager.current_id().map(|id| id.as_str()), Some("Tarapacá"));

    let arica = manager.show("Arica").await?;
    assert_eq!(arica.surface().text(), "borrador");
    assert!(!arica.search().is_active());
    assert!(manager.has_unsaved_changes());

    Ok(())
}

#[tokio::test]
async fn themed_segments_reach_the_sink_once() -> Result<(), TomoError> {
    let store = MemoryStore::new();
    let sink = MemorySink::new();
    let catalog = Catalog::standard();
    let mut manager: Manager<_, _> = NotebookManager::new(&store, &sink, &catalog);

    manager.show("Coquimbo").await?;
    assert_eq!(manager.insert_theme("Planificación").await?, None);
    type_text(&mut manager, "metas del trimestre");

    let report = manager.save().await?;
    let row = report.record.unwrap();
    assert_eq!(row.region, "Coquimbo");
    assert_eq!(row.topic, "Planificación");
    assert_eq!(row.detail, "metas del trimestre");

    let again = manager.save().await?;
    assert!(again.record.is_none());
    assert_eq!(sink.rows().len(), 1);

    type_text(&mut manager, "\ny el presupuesto\n");
    let closed = manager.insert_theme("Otros").await?.unwrap();
    assert_eq!(closed.detail, "y el presupuesto");
    assert_eq!(closed.topic, "Planificación");

    let details: Vec<String> = sink.rows().into_iter().map(|r| r.detail).collect();
    assert_eq!(details, vec!["metas del trimestre", "y el presupuesto"]);

    Ok(())
}

#[tokio::test]
async fn failed_store_write_leaves_session_untouched() -> Result<(), TomoError> {
    let store = ReadOnlyStore;
    let sink = MemorySink::new();
    let catalog = Catalog::standard();
    let mut manager: Manager<_, _> = NotebookManager::new(&store, &sink, &catalog);

    let session = manager.show("Maule").await?;
    assert_eq!(session.surface().text(), "texto guardado");
    session.go_to_end();
    manager.insert_theme("Informática").await?;
    type_text(&mut manager, "servidores");

    assert!(matches!(manager.save().await, Err(TomoError::Other(_))));

    let session = manager.current().unwrap();
    assert!(session.is_modified());
    assert!(session.pending_segment().is_some());
    assert!(sink.rows().is_empty());

    Ok(())
}

#[tokio::test]
async fn failed_sink_still_saves_text() -> Result<(), TomoError> {
    let store = MemoryStore::new();
    let sink = ClosedSink;
    let catalog = Catalog::standard();
    let mut manager: Manager<_, _> = NotebookManager::new(&store, &sink, &catalog);

    manager.show("Magallanes").await?;
    manager.insert_theme("Otros").await?;
    type_text(&mut manager, "algo");

    let report = manager.save().await?;

    assert!(report.record.is_none());
    assert!(matches!(report.sink_error, Some(TomoError::Other(_))));
    assert_eq!(
        store.get(&catalog.resolve("Magallanes")?).await?,
        "Otros\nalgo"
    );
    assert!(manager.current().unwrap().pending_segment().is_some());

    let closed = manager.insert_theme("Planificación").await;
    assert!(closed.is_err());
    assert!(
        manager
            .current()
            .unwrap()
            .surface()
            .text()
            .ends_with("Planificación\n")
    );

    Ok(())
}

#[tokio::test]
async fn unwritable_sheet_does_not_duplicate_ledger_rows() -> Result<(), TomoError> {
    let tmpdir = TempDir::new()?;
    let ledger = RecordLedger::open(&tmpdir.path().join("seguimiento.db")).await?;
    let sheet = tmpdir.path().join("no_existe").join("registros.xlsx");
    let sink = WorkbookSink::new(ledger, WorkbookExporter::new(&sheet, "Hoja3"));

    let store = MemoryStore::new();
    let catalog = Catalog::standard();
    let mut manager: Manager<_, _> = NotebookManager::new(&store, &sink, &catalog);

    manager.show("Bío-Bío").await?;
    manager.insert_theme("Otros").await?;
    type_text(&mut manager, "revisar convenio");

    let report = manager.save().await?;
    assert!(report.sink_error.is_none());
    assert_eq!(report.record.unwrap().detail, "revisar convenio");

    let again = manager.save().await?;
    assert!(again.record.is_none());
    assert!(again.sink_error.is_none());

    assert_eq!(sink.ledger().count().await?, 1);
    assert!(!sheet.exists());
    assert!(sink.refresh().await.is_err());

    Ok(())
}

#[tokio::test]
async fn export_and_import_round_trip() -> Result<(), TomoError> {
    let tmpdir = TempDir::new()?;
    let path = tmpdir.path().join("Los Lagos.txt");

    let store = MemoryStore::new();
    let sink = MemorySink::new();
    let catalog = Catalog::standard();
    let mut manager: Manager<_, _> = NotebookManager::new(&store, &sink, &catalog);

    let session = manager.show("Los Lagos").await?;
    session.surface_mut().insert_text(0, "puerto ");
    session.go_to_end();
    session.insert_comment("ver dársena");
    let before = session.surface().text();

    manager.export_current(&path)?;
    manager.new_document()?;
    assert_eq!(manager.current().unwrap().surface().text(), "");

    manager.import_into_current(&path)?;

    let session = manager.current().unwrap();
    assert_eq!(session.surface().text(), before.trim_end());
    assert_eq!(session.comments().len(), 1);
    assert_eq!(session.surface().tag_ranges("comment_1").len(), 1);
    assert!(session.is_modified());

    Ok(())
}

#[test]
fn file_operations_need_an_open_notebook() {
    let store = MemoryStore::new();
    let sink = MemorySink::new();
    let catalog = Catalog::standard();
    let mut manager: Manager<_, _> = NotebookManager::new(&store, &sink, &catalog);

    assert!(matches!(
        manager.export_current(std::path::Path::new("x.txt")),
        Err(TomoError::NoActiveNotebook)
    ));
    assert!(matches!(
        manager.new_document(),
        Err(TomoError::NoActiveNotebook)
    ));
}
