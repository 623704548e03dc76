//! The text-presentation surface the core drives.
//!
//! The core never owns a widget. It issues position, range and tag commands
//! through [`PresentationSurface`], and a host (a GUI text widget, a web
//! form, a test) carries them out. [`BufferSurface`] is a complete in-memory
//! implementation used for headless operation and tests.

use crate::document::CommentId;
use std::collections::HashMap;

/// What happens when the user clicks a tagged range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    OpenComment(CommentId),
}

/// Character formatting the user can toggle over a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTag {
    Bold,
    Italic,
    Underline,
}

impl FormatTag {
    pub fn as_tag(&self) -> &'static str {
        match self {
            FormatTag::Bold => "bold",
            FormatTag::Italic => "italic",
            FormatTag::Underline => "underline",
        }
    }
}

/// Capability interface over a rich-text view.
///
/// Every offset is a character offset. Implementations clamp out-of-range
/// offsets to the end of the text instead of failing.
pub trait PresentationSurface {
    fn text(&self) -> String;

    fn len(&self) -> usize {
        self.text().chars().count()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cursor(&self) -> usize;
    fn set_cursor(&mut self, offset: usize);

    /// Current selection as `(start, end)`, if any.
    fn selection(&self) -> Option<(usize, usize)>;

    fn insert_text(&mut self, offset: usize, text: &str);
    fn delete_range(&mut self, start: usize, end: usize);

    fn tag_range(&mut self, start: usize, end: usize, tag: &str);
    fn untag_range(&mut self, start: usize, end: usize, tag: &str);
    fn tag_ranges(&self, tag: &str) -> Vec<(usize, usize)>;

    /// Removes every range of `tag` and any click binding on it.
    fn remove_tag(&mut self, tag: &str);

    fn bind_click(&mut self, tag: &str, action: ClickAction);

    fn is_modified(&self) -> bool;
    fn set_modified(&mut self, modified: bool);

    /// Replaces the whole text.
    fn replace_text(&mut self, text: &str) {
        let len = self.len();
        self.delete_range(0, len);
        self.insert_text(0, text);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TagRange {
    tag: String,
    start: usize,
    end: usize,
}

/// An in-memory [`PresentationSurface`].
///
/// Tag ranges, the cursor and the selection follow edits the way a text
/// widget's marks do: text inserted at or before a position pushes it right,
/// and text inserted strictly inside a tagged range splits that range.
#[derive(Debug, Clone, Default)]
pub struct BufferSurface {
    chars: Vec<char>,
    cursor: usize,
    selection: Option<(usize, usize)>,
    tags: Vec<TagRange>,
    bindings: HashMap<String, ClickAction>,
    modified: bool,
}

impl BufferSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        BufferSurface {
            chars: text.chars().collect(),
            ..Self::default()
        }
    }

    /// Selects `[start, end)`. An empty range clears the selection.
    pub fn select(&mut self, start: usize, end: usize) {
        let (start, end) = (self.clamp(start.min(end)), self.clamp(start.max(end)));
        self.selection = (start < end).then_some((start, end));
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn binding(&self, tag: &str) -> Option<&ClickAction> {
        self.bindings.get(tag)
    }

    /// Simulates a click at `offset`, returning the action bound to the
    /// narrowest tagged range under it.
    pub fn click(&self, offset: usize) -> Option<ClickAction> {
        self.tags
            .iter()
            .filter(|r| r.start <= offset && offset < r.end)
            .filter_map(|r| self.bindings.get(&r.tag).map(|a| (r.end - r.start, a)))
            .min_by_key(|(width, _)| *width)
            .map(|(_, action)| action.clone())
    }

    /// Tags covering `offset`, in no particular order.
    pub fn tags_at(&self, offset: usize) -> Vec<&str> {
        self.tags
            .iter()
            .filter(|r| r.start <= offset && offset < r.end)
            .map(|r| r.tag.as_str())
            .collect()
    }

    fn clamp(&self, offset: usize) -> usize {
        offset.min(self.chars.len())
    }

    fn normalize(&mut self, tag: &str) {
        let mut ranges: Vec<(usize, usize)> = self
            .tags
            .iter()
            .filter(|r| r.tag == tag)
            .map(|r| (r.start, r.end))
            .collect();
        self.tags.retain(|r| r.tag != tag);
        ranges.sort_unstable();

        let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
        for (start, end) in ranges {
            match merged.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }

        self.tags.extend(merged.into_iter().map(|(start, end)| TagRange {
            tag: tag.to_owned(),
            start,
            end,
        }));
    }
}

fn shift_for_delete(pos: usize, start: usize, end: usize) -> usize {
    if pos >= end {
        pos - (end - start)
    } else if pos > start {
        start
    } else {
        pos
    }
}

impl PresentationSurface for BufferSurface {
    fn text(&self) -> String {
        self.chars.iter().collect()
    }

    fn len(&self) -> usize {
        self.chars.len()
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn set_cursor(&mut self, offset: usize) {
        self.cursor = self.clamp(offset);
    }

    fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    fn insert_text(&mut self, offset: usize, text: &str) {
        let offset = self.clamp(offset);
        let inserted: Vec<char> = text.chars().collect();
        let n = inserted.len();
        if n == 0 {
            return;
        }

        self.chars.splice(offset..offset, inserted);

        let mut split = Vec::new();
        for range in &mut self.tags {
            if range.start >= offset {
                range.start += n;
                range.end += n;
            } else if range.end > offset {
                split.push(TagRange {
                    tag: range.tag.clone(),
                    start: offset + n,
                    end: range.end + n,
                });
                range.end = offset;
            }
        }
        self.tags.extend(split);

        if self.cursor >= offset {
            self.cursor += n;
        }
        if let Some((start, end)) = self.selection {
            let start = if start >= offset { start + n } else { start };
            let end = if end >= offset { end + n } else { end };
            self.selection = Some((start, end));
        }

        self.modified = true;
    }

    fn delete_range(&mut self, start: usize, end: usize) {
        let (start, end) = (self.clamp(start), self.clamp(end));
        if start >= end {
            return;
        }

        self.chars.drain(start..end);

        for range in &mut self.tags {
            range.start = shift_for_delete(range.start, start, end);
            range.end = shift_for_delete(range.end, start, end);
        }
        self.tags.retain(|r| r.start < r.end);

        self.cursor = shift_for_delete(self.cursor, start, end);
        self.selection = self.selection.and_then(|(s, e)| {
            let (s, e) = (
                shift_for_delete(s, start, end),
                shift_for_delete(e, start, end),
            );
            (s < e).then_some((s, e))
        });

        self.modified = true;
    }

    fn tag_range(&mut self, start: usize, end: usize, tag: &str) {
        let (start, end) = (self.clamp(start), self.clamp(end));
        if start >= end {
            return;
        }
        self.tags.push(TagRange {
            tag: tag.to_owned(),
            start,
            end,
        });
        self.normalize(tag);
    }

    fn untag_range(&mut self, start: usize, end: usize, tag: &str) {
        let (start, end) = (self.clamp(start), self.clamp(end));
        if start >= end {
            return;
        }

        let mut kept = Vec::with_capacity(self.tags.len());
        for range in self.tags.drain(..) {
            if range.tag != tag || range.end <= start || range.start >= end {
                kept.push(range);
                continue;
            }
            if range.start < start {
                kept.push(TagRange {
                    tag: range.tag.clone(),
                    start: range.start,
                    end: start,
                });
            }
            if range.end > end {
                kept.push(TagRange {
                    tag: range.tag,
                    start: end,
                    end: range.end,
                });
            }
        }
        self.tags = kept;
    }

    fn tag_ranges(&self, tag: &str) -> Vec<(usize, usize)> {
        let mut ranges: Vec<(usize, usize)> = self
            .tags
            .iter()
            .filter(|r| r.tag == tag)
            .map(|r| (r.start, r.end))
            .collect();
        ranges.sort_unstable();
        ranges
    }

    fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|r| r.tag != tag);
        self.bindings.remove(tag);
    }

    fn bind_click(&mut self, tag: &str, action: ClickAction) {
        self.bindings.insert(tag.to_owned(), action);
    }

    fn is_modified(&self) -> bool {
        self.modified
    }

    fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }
}
