//! Annotated notebook documents.
//!
//! - [`comment`]: comment ids, markers and the ordered comment table
//! - [`codec`]: the persisted text form and marker re-attachment
//!
//! All positions exposed by this crate are character offsets, not byte
//! offsets, matching what a text widget reports as a cursor position.

pub mod codec;
pub mod comment;

pub use codec::{Document, HitRegion, decode, encode, hit_regions};
pub use comment::{CommentId, CommentTable};

/// Converts a character offset into a byte offset, clamped to the end of `text`.
pub(crate) fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(byte, _)| byte)
}

/// Converts a byte offset on a char boundary into a character offset.
pub(crate) fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

/// Character slice `[start, end)` of `text`, clamped; empty when `end <= start`.
pub(crate) fn char_slice(text: &str, start: usize, end: usize) -> &str {
    if end <= start {
        return "";
    }
    let from = byte_offset(text, start);
    let to = byte_offset(text, end);
    &text[from..to]
}
