use crate::error::{TomoError, TomoResult};
use indexmap::IndexMap;
use std::fmt;
use tracing::warn;

const ID_PREFIX: &str = "comment_";
const PREVIEW_CHARS: usize = 50;

/// Identifier of a comment annotation.
///
/// Canonical keys (`comment_<n>`) are held as their number; anything else read
/// back from storage is kept verbatim so it survives a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommentId {
    Numbered(u32),
    Named(String),
}

impl CommentId {
    /// Parses a stored key. Returns `None` for a blank key.
    pub fn parse(key: &str) -> Option<CommentId> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }

        if let Some(digits) = key.strip_prefix(ID_PREFIX) {
            let canonical = !digits.is_empty()
                && digits.bytes().all(|b| b.is_ascii_digit())
                && (digits == "0" || !digits.starts_with('0'));
            if canonical {
                if let Ok(n) = digits.parse::<u32>() {
                    return Some(CommentId::Numbered(n));
                }
            }
        }

        Some(CommentId::Named(key.to_owned()))
    }

    /// Numeric suffix used for counter derivation, if the key has one.
    pub fn number(&self) -> Option<u32> {
        match self {
            CommentId::Numbered(n) => Some(*n),
            CommentId::Named(key) => {
                let digits = key.strip_prefix(ID_PREFIX)?;
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                digits.parse().ok()
            }
        }
    }

    /// The inline token standing for this comment in the body, e.g. `[Comentario7]`.
    pub fn marker(&self) -> String {
        match self {
            CommentId::Numbered(n) => format!("[Comentario{n}]"),
            CommentId::Named(key) => {
                let suffix = key.strip_prefix(ID_PREFIX).unwrap_or(key);
                format!("[Comentario{suffix}]")
            }
        }
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentId::Numbered(n) => write!(f, "{ID_PREFIX}{n}"),
            CommentId::Named(key) => f.write_str(key),
        }
    }
}

/// Ordered comment map plus the id counter of one document.
///
/// Entries keep insertion order, which is also the order they are written in.
/// `counter` is the highest number handed out or seen so far; new ids are
/// always `counter + 1`, so ids are never reused within a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentTable {
    entries: IndexMap<CommentId, String>,
    counter: u32,
}

impl CommentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from stored entries and derives the counter from them.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (CommentId, String)>,
    {
        let entries: IndexMap<CommentId, String> = entries.into_iter().collect();
        let counter = entries.keys().filter_map(CommentId::number).max().unwrap_or(0);
        CommentTable { entries, counter }
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &CommentId) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &CommentId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CommentId, &str)> {
        self.entries.iter().map(|(id, text)| (id, text.as_str()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &CommentId> {
        self.entries.keys()
    }

    /// Registers `text` under a freshly allocated id.
    ///
    /// Empty text allocates nothing and returns `None`. So does a table whose
    /// counter already sits at `u32::MAX`, since every later id would collide.
    pub fn insert_new(&mut self, text: &str) -> Option<CommentId> {
        if text.is_empty() {
            return None;
        }

        let Some(next) = self.counter.checked_add(1) else {
            warn!(counter = self.counter, "comment ids exhausted");
            return None;
        };
        self.counter = next;
        let id = CommentId::Numbered(next);
        self.entries.insert(id.clone(), text.to_owned());
        Some(id)
    }

    /// Replaces the text of an existing comment; id and marker stay put.
    pub fn edit(&mut self, id: &CommentId, text: &str) -> TomoResult<()> {
        match self.entries.get_mut(id) {
            Some(slot) => {
                *slot = text.to_owned();
                Ok(())
            }
            None => Err(TomoError::CommentNotFound(id.to_string())),
        }
    }

    /// Removes a comment, returning its text. The counter is not rewound.
    pub fn remove(&mut self, id: &CommentId) -> TomoResult<String> {
        self.entries
            .shift_remove(id)
            .ok_or_else(|| TomoError::CommentNotFound(id.to_string()))
    }

    /// Case-insensitive substring filter over comment texts.
    ///
    /// A blank term lists every comment.
    pub fn search(&self, term: &str) -> Vec<(&CommentId, &str)> {
        let term = term.trim().to_lowercase();
        self.iter()
            .filter(|(_, text)| term.is_empty() || text.to_lowercase().contains(&term))
            .collect()
    }
}

/// Short listing form of a comment: the first 50 characters, with `...` when cut.
pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_owned()
    }
}
