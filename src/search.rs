//! In-document text search.
//!
//! Search is a plain, case-insensitive substring scan over the current body of
//! a notebook. It works on the text the user is looking at right now rather
//! than on an index, so results always reflect unsaved edits.
//!
//! # Features
//!
//! - **Literal matching**: the query is never interpreted as a pattern
//! - **Case-insensitive**: `"ATACAMA"` finds `"Atacama"`
//! - **Wrap-around navigation**: next/previous cycle past either end
//! - **Highlighting**: every match is tagged on the presentation surface
//!
//! # Usage
//!
//! ```rust
//! use tomo_core::search::matcher::{find_all, next, previous, Span};
//!
//! let matches = find_all("ab ab ab", "AB");
//! assert_eq!(matches.len(), 3);
//!
//! // Past the last match, navigation wraps to the first one.
//! assert_eq!(next(&matches, 8), Some(Span::new(0, 2)));
//! // Before the first match, it wraps to the last one.
//! assert_eq!(previous(&matches, 0), Some(Span::new(6, 8)));
//! ```
//!
//! [`session::SearchSession`] drives the same functions against a
//! [`PresentationSurface`](crate::surface::PresentationSurface), keeping track
//! of the current match between calls.

pub mod matcher;
pub mod session;

pub use matcher::Span;
pub use session::{SearchSession, SearchState};
