use crate::document::codec::{self, Document};
use crate::document::comment::{CommentId, CommentTable};
use crate::document::char_slice;
use crate::error::TomoResult;
use crate::notebook::catalog::NotebookId;
use crate::search::{SearchSession, Span};
use crate::surface::{ClickAction, FormatTag, PresentationSurface};
use tracing::debug;

/// Where the last theme label was inserted, and which label it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeMark {
    pub position: usize,
    pub label: String,
}

/// The detail text written under a theme label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub topic: String,
    pub detail: String,
}

/// Everything one open notebook carries between user actions.
///
/// The surface owns the text and the cursor; the session owns the comment
/// table, the open theme mark and the search state, and keeps the surface's
/// comment tags in step with the table.
pub struct NotebookSession<V> {
    id: NotebookId,
    surface: V,
    comments: CommentTable,
    theme: Option<ThemeMark>,
    search: SearchSession,
}

impl<V: PresentationSurface> NotebookSession<V> {
    /// Opens a session over `surface` showing the decoded `raw` text.
    pub fn load(id: NotebookId, raw: &str, surface: V) -> Self {
        let mut session = NotebookSession {
            id,
            surface,
            comments: CommentTable::new(),
            theme: None,
            search: SearchSession::new(),
        };
        session.reload(raw);
        session
    }

    /// Replaces the whole document with the decoded `raw` text.
    ///
    /// Comment markers found in the body are tagged and bound again, the
    /// cursor goes to the start, the open theme mark is forgotten and the
    /// surface is marked unmodified.
    pub fn reload(&mut self, raw: &str) {
        let doc = codec::decode(raw);

        self.search.clear(&mut self.surface);
        for old in self.comments.ids() {
            self.surface.remove_tag(&old.to_string());
        }

        self.surface.replace_text(&doc.body);
        for region in doc.hit_regions() {
            let tag = region.id.to_string();
            self.surface.tag_range(region.start, region.end, &tag);
            self.surface
                .bind_click(&tag, ClickAction::OpenComment(region.id.clone()));
        }

        self.comments = doc.comments;
        self.theme = None;
        self.surface.set_cursor(0);
        self.surface.set_modified(false);

        debug!(notebook = %self.id, comments = self.comments.len(), "notebook loaded");
    }

    /// Clears the notebook to an empty document.
    pub fn reset(&mut self) {
        self.reload("");
    }

    pub fn id(&self) -> &NotebookId {
        &self.id
    }

    pub fn surface(&self) -> &V {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut V {
        &mut self.surface
    }

    pub fn into_surface(self) -> V {
        self.surface
    }

    pub fn comments(&self) -> &CommentTable {
        &self.comments
    }

    pub fn comment(&self, id: &CommentId) -> Option<&str> {
        self.comments.get(id)
    }

    pub fn theme_mark(&self) -> Option<&ThemeMark> {
        self.theme.as_ref()
    }

    pub fn search(&self) -> &SearchSession {
        &self.search
    }

    pub fn is_modified(&self) -> bool {
        self.surface.is_modified()
    }

    pub fn mark_saved(&mut self) {
        self.surface.set_modified(false);
    }

    /// Snapshot of the current body and comments.
    pub fn document(&self) -> Document {
        Document {
            body: self.surface.text(),
            comments: self.comments.clone(),
        }
    }

    /// The persisted form of the current text and comments.
    pub fn encode(&self) -> String {
        codec::encode(&self.surface.text(), &self.comments)
    }

    /// Inserts a comment marker at the cursor and registers its text.
    ///
    /// Empty text does nothing and returns `None`.
    pub fn insert_comment(&mut self, text: &str) -> Option<CommentId> {
        let id = self.comments.insert_new(text)?;
        let marker = id.marker();
        let tag = id.to_string();

        let at = self.surface.cursor();
        let end = at + marker.chars().count();
        self.surface.insert_text(at, &marker);
        self.surface.tag_range(at, end, &tag);
        self.surface
            .bind_click(&tag, ClickAction::OpenComment(id.clone()));
        self.surface.set_cursor(end);

        debug!(notebook = %self.id, comment = %id, "comment inserted");
        Some(id)
    }

    pub fn edit_comment(&mut self, id: &CommentId, text: &str) -> TomoResult<()> {
        self.comments.edit(id, text)?;
        self.surface.set_modified(true);
        Ok(())
    }

    /// Deletes a comment: every marker in the text, its tag and its entry.
    ///
    /// Returns how many markers were removed.
    pub fn delete_comment(&mut self, id: &CommentId) -> TomoResult<usize> {
        self.comments.remove(id)?;

        let regions = codec::marker_regions(&self.surface.text(), id);
        for region in regions.iter().rev() {
            self.surface.delete_range(region.start, region.end);
        }
        self.surface.remove_tag(&id.to_string());
        self.surface.set_modified(true);

        debug!(notebook = %self.id, comment = %id, markers = regions.len(), "comment deleted");
        Ok(regions.len())
    }

    pub fn search_comments(&self, term: &str) -> Vec<(&CommentId, &str)> {
        self.comments.search(term)
    }

    /// Inserts `label` on its own line at the cursor and opens a new themed
    /// segment after it.
    ///
    /// If a segment was already open, the text between its start and the
    /// insertion point is returned as that segment's detail, trimmed, unless
    /// it is empty. A blank label does nothing.
    pub fn insert_theme(&mut self, label: &str) -> Option<Segment> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }

        let at = self.surface.cursor();
        let line = format!("{label}\n");
        let after = at + line.chars().count();
        self.surface.insert_text(at, &line);
        self.surface.set_cursor(after);

        let closed = self.theme.take().and_then(|mark| {
            let text = self.surface.text();
            let detail = char_slice(&text, mark.position, at).trim();
            (!detail.is_empty()).then(|| Segment {
                topic: mark.label,
                detail: detail.to_owned(),
            })
        });

        self.theme = Some(ThemeMark {
            position: after,
            label: label.to_owned(),
        });

        closed
    }

    /// Detail of the open segment up to the end of the text, if non-empty.
    pub fn pending_segment(&self) -> Option<Segment> {
        let mark = self.theme.as_ref()?;
        let text = self.surface.text();
        let end = text.chars().count();
        let detail = char_slice(&text, mark.position, end).trim();

        (!detail.is_empty()).then(|| Segment {
            topic: mark.label.clone(),
            detail: detail.to_owned(),
        })
    }

    /// Moves the open segment's start to the end of the text, keeping its
    /// label, so detail already exported is not exported again.
    pub fn advance_segment(&mut self) {
        let end = self.surface.len();
        if let Some(mark) = self.theme.as_mut() {
            mark.position = end;
        }
    }

    pub fn search_next(&mut self, query: &str) -> Option<Span> {
        self.search.next(&mut self.surface, query)
    }

    pub fn search_previous(&mut self, query: &str) -> Option<Span> {
        self.search.previous(&mut self.surface, query)
    }

    pub fn clear_search(&mut self) {
        self.search.clear(&mut self.surface);
    }

    pub fn go_to_end(&mut self) {
        let end = self.surface.len();
        self.surface.set_cursor(end);
    }

    /// Toggles a format tag over the current selection.
    ///
    /// The tag is removed when one of its ranges already covers the whole
    /// selection and added otherwise. Returns `false` when nothing is selected.
    pub fn toggle_format(&mut self, format: FormatTag) -> bool {
        let Some((start, end)) = self.surface.selection() else {
            return false;
        };
        let tag = format.as_tag();

        let covered = self
            .surface
            .tag_ranges(tag)
            .iter()
            .any(|&(s, e)| s <= start && e >= end);

        if covered {
            self.surface.untag_range(start, end, tag);
        } else {
            self.surface.tag_range(start, end, tag);
        }
        true
    }
}
