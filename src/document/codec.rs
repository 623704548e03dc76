//! Persisted text form of a notebook document.
//!
//! A document is stored as its plain body optionally followed by one comment
//! block:
//!
//! ```text
//! <body text>
//! [[comentarios]]
//! comment_1=<text of comment 1>
//! comment_2=<text of comment 2>
//! [[/comentarios]]
//! ```
//!
//! Comment text is escaped so it stays on one line and can never spell a
//! block tag: backslash, `\n`, `\r`, `\t` and `[` get a backslash escape,
//! and whitespace at either end of the text is written as `\s` or
//! `\u{hex}` so trimming on read leaves it alone.
//!
//! Decoding never fails. Lines of the block that cannot be read as
//! `id=text` are dropped and the rest of the document still loads.

use crate::document::comment::{CommentId, CommentTable};
use crate::document::{byte_offset, char_offset};
use crate::error::TomoResult;
use regex::Regex;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::LazyLock;
use tracing::debug;

pub const OPEN_TAG: &str = "[[comentarios]]";
pub const CLOSE_TAG: &str = "[[/comentarios]]";

static COMMENT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\[\[comentarios\]\](.*?)\[\[/comentarios\]\]")
        .expect("comment block pattern is valid")
});

/// Where a comment marker sits in the body, in character offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitRegion {
    pub id: CommentId,
    pub start: usize,
    pub end: usize,
}

/// A notebook body together with its out-of-line comments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub body: String,
    pub comments: CommentTable,
}

impl Document {
    pub fn new(body: impl Into<String>) -> Self {
        Document {
            body: body.into(),
            comments: CommentTable::new(),
        }
    }

    /// Parses a persisted string. See [`decode`].
    pub fn decode(raw: &str) -> Self {
        decode(raw)
    }

    pub fn encode(&self) -> String {
        encode(&self.body, &self.comments)
    }

    pub fn hit_regions(&self) -> Vec<HitRegion> {
        hit_regions(&self.body, &self.comments)
    }

    /// Splices a new comment marker into the body at `cursor` (a character
    /// offset, clamped to the end of the body).
    ///
    /// Empty text is ignored: no id is consumed and `None` is returned.
    pub fn insert_comment(&mut self, cursor: usize, text: &str) -> Option<CommentId> {
        let id = self.comments.insert_new(text)?;
        let at = byte_offset(&self.body, cursor);
        self.body.insert_str(at, &id.marker());
        Some(id)
    }

    pub fn edit_comment(&mut self, id: &CommentId, text: &str) -> TomoResult<()> {
        self.comments.edit(id, text)
    }

    /// Removes every occurrence of the comment's marker and its entry.
    ///
    /// Returns the number of markers removed. Fails with
    /// [`TomoError::CommentNotFound`](crate::TomoError::CommentNotFound)
    /// without touching the body when the id is unknown.
    pub fn delete_comment(&mut self, id: &CommentId) -> TomoResult<usize> {
        self.comments.remove(id)?;
        let marker = id.marker();
        let removed = self.body.matches(&marker).count();
        self.body = self.body.replace(&marker, "");
        Ok(removed)
    }
}

/// Serializes a body and its comments into one string.
///
/// Trailing whitespace of the body is dropped; the comment block is only
/// written when there is at least one comment.
pub fn encode(body: &str, comments: &CommentTable) -> String {
    let mut out = body.trim_end().to_owned();

    if !comments.is_empty() {
        out.push('\n');
        out.push_str(OPEN_TAG);
        out.push('\n');
        for (id, text) in comments.iter() {
            out.push_str(&format!("{id}={}\n", escape(text)));
        }
        out.push_str(CLOSE_TAG);
    }

    out
}

/// Parses a persisted string back into a [`Document`].
///
/// Every comment block found is read in order and removed from the body. The
/// body is trimmed on both sides. The comment counter is derived from the
/// highest `comment_<n>` key present.
pub fn decode(raw: &str) -> Document {
    let mut entries = Vec::new();

    for caps in COMMENT_BLOCK.captures_iter(raw) {
        let interior = caps.get(1).map_or("", |m| m.as_str()).trim();
        for line in interior.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let Some(id) = CommentId::parse(key) else {
                continue;
            };
            entries.push((id, unescape(value.trim())));
        }
    }

    let body = COMMENT_BLOCK.replace_all(raw, "").trim().to_owned();

    let comments = CommentTable::from_entries(entries);
    debug!(
        comments = comments.len(),
        counter = comments.counter(),
        "decoded document"
    );

    Document { body, comments }
}

/// Finds every marker of every comment in `body`.
///
/// Regions come out grouped by comment in table order; within one comment the
/// scan is left to right and non-overlapping.
pub fn hit_regions(body: &str, comments: &CommentTable) -> Vec<HitRegion> {
    comments
        .ids()
        .flat_map(|id| marker_regions(body, id))
        .collect()
}

/// Every occurrence of one comment's marker in `body`, left to right.
pub fn marker_regions(body: &str, id: &CommentId) -> Vec<HitRegion> {
    let marker = id.marker();
    let width = marker.chars().count();

    body.match_indices(&marker)
        .map(|(at, _)| {
            let start = char_offset(body, at);
            HitRegion {
                id: id.clone(),
                start,
                end: start + width,
            }
        })
        .collect()
}

/// Escapes comment text so it fits on one line of the block.
///
/// `[` is escaped so no comment can spell the closing tag, and whitespace at
/// either end is escaped so it survives the trim applied on decode.
fn escape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let lead = chars.iter().take_while(|c| c.is_whitespace()).count();
    let trail = chars.len() - chars.iter().rev().take_while(|c| c.is_whitespace()).count();

    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        let edge = i < lead || i >= trail;
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '[' => out.push_str("\\["),
            ' ' if edge => out.push_str("\\s"),
            c if edge && c.is_whitespace() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            other => out.push(other),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let plain = match chars.peek() {
            Some('\\') => Some('\\'),
            Some('n') => Some('\n'),
            Some('r') => Some('\r'),
            Some('t') => Some('\t'),
            Some('s') => Some(' '),
            Some('[') => Some('['),
            _ => None,
        };
        match plain {
            Some(p) => {
                out.push(p);
                chars.next();
            }
            None if chars.peek() == Some(&'u') => match read_code_point(&mut chars) {
                Some(p) => out.push(p),
                None => out.push('\\'),
            },
            None => out.push('\\'),
        }
    }
    out
}

/// Reads `u{hex}` after a backslash. Leaves `chars` untouched when malformed.
fn read_code_point(chars: &mut Peekable<Chars<'_>>) -> Option<char> {
    let mut ahead = chars.clone();
    ahead.next();
    if ahead.next() != Some('{') {
        return None;
    }

    let mut hex = String::new();
    loop {
        match ahead.next()? {
            '}' => break,
            c if c.is_ascii_hexdigit() && hex.len() < 6 => hex.push(c),
            _ => return None,
        }
    }

    let c = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)?;
    *chars = ahead;
    Some(c)
}
