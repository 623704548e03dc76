/// A match in the body, as a half-open range of character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Finds every case-insensitive, literal occurrence of `query` in `body`.
///
/// Scanning is left to right and resumes at the end of the previous match,
/// so overlapping candidates are skipped: `"aa"` in `"aaa"` matches once.
/// An empty query finds nothing.
pub fn find_all(body: &str, query: &str) -> Vec<Span> {
    if query.is_empty() {
        return Vec::new();
    }

    let haystack: Vec<char> = body.chars().collect();
    let needle: Vec<char> = query.chars().collect();
    let width = needle.len();

    let mut spans = Vec::new();
    let mut at = 0;
    while at + width <= haystack.len() {
        let hit = haystack[at..at + width]
            .iter()
            .zip(&needle)
            .all(|(a, b)| same_letter(*a, *b));

        if hit {
            spans.push(Span::new(at, at + width));
            at += width;
        } else {
            at += 1;
        }
    }

    spans
}

/// First match starting at or after `cursor`, wrapping to the first match.
///
/// `None` only when there are no matches.
pub fn next(matches: &[Span], cursor: usize) -> Option<Span> {
    matches
        .iter()
        .find(|m| m.start >= cursor)
        .or_else(|| matches.first())
        .copied()
}

/// Last match starting before `cursor`, wrapping to the last match.
///
/// `None` only when there are no matches.
pub fn previous(matches: &[Span], cursor: usize) -> Option<Span> {
    matches
        .iter()
        .rev()
        .find(|m| m.start < cursor)
        .or_else(|| matches.last())
        .copied()
}

fn same_letter(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
