use crate::search::matcher::{self, Span};
use crate::surface::PresentationSurface;
use tracing::debug;

/// Tag used to highlight search matches on the surface.
pub const SEARCH_TAG: &str = "search";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchState {
    #[default]
    Idle,
    Searching {
        query: String,
        current: Option<Span>,
        matches: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Incremental search over one document view.
///
/// Matches are recomputed from the surface text on every call, so edits made
/// between calls never leave navigation pointing at stale offsets. While the
/// cursor stays on the current match, repeated calls step through the match
/// cycle; once the cursor is moved elsewhere, navigation restarts from it.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    state: SearchState,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SearchState::Searching { .. })
    }

    pub fn current(&self) -> Option<Span> {
        match &self.state {
            SearchState::Searching { current, .. } => *current,
            SearchState::Idle => None,
        }
    }

    /// Moves to the next match and returns it.
    ///
    /// A blank query clears the search and returns `None`.
    pub fn next<V>(&mut self, surface: &mut V, query: &str) -> Option<Span>
    where
        V: PresentationSurface + ?Sized,
    {
        self.navigate(surface, query, Direction::Forward)
    }

    /// Moves to the previous match and returns it.
    pub fn previous<V>(&mut self, surface: &mut V, query: &str) -> Option<Span>
    where
        V: PresentationSurface + ?Sized,
    {
        self.navigate(surface, query, Direction::Backward)
    }

    /// Drops highlights and the current pointer.
    pub fn clear<V>(&mut self, surface: &mut V)
    where
        V: PresentationSurface + ?Sized,
    {
        surface.remove_tag(SEARCH_TAG);
        self.state = SearchState::Idle;
    }

    fn navigate<V>(&mut self, surface: &mut V, query: &str, direction: Direction) -> Option<Span>
    where
        V: PresentationSurface + ?Sized,
    {
        let query = query.trim();
        if query.is_empty() {
            self.clear(surface);
            return None;
        }

        let matches = matcher::find_all(&surface.text(), query);

        surface.remove_tag(SEARCH_TAG);
        for span in &matches {
            surface.tag_range(span.start, span.end, SEARCH_TAG);
        }

        let cursor = surface.cursor();
        let anchor = match &self.state {
            SearchState::Searching {
                query: active,
                current: Some(current),
                ..
            } if active == query && current.start == cursor => Some(current.start),
            _ => None,
        };

        let found = match (direction, anchor) {
            (Direction::Forward, Some(at)) => matcher::next(&matches, at + 1),
            (Direction::Forward, None) => matcher::next(&matches, cursor),
            (Direction::Backward, Some(at)) => matcher::previous(&matches, at),
            (Direction::Backward, None) => matcher::previous(&matches, cursor),
        };

        if let Some(span) = found {
            surface.set_cursor(span.start);
        }

        debug!(query, matches = matches.len(), ?found, "search step");

        self.state = SearchState::Searching {
            query: query.to_owned(),
            current: found,
            matches: matches.len(),
        };

        found
    }
}
