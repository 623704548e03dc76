use crate::config::{DEFAULT_NOTEBOOKS, DEFAULT_THEMES};
use crate::error::{TomoError, TomoResult};
use std::fmt;

/// Name of one notebook ("tomo"): a region, or "General".
///
/// Only a [`Catalog`] hands these out, so holding one means the name is known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotebookId(String);

impl NotebookId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotebookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NotebookId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The fixed set of notebooks and theme labels of a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    notebooks: Vec<NotebookId>,
    themes: Vec<String>,
}

impl Catalog {
    /// Builds a catalog, validating every notebook name.
    ///
    /// - Names are trimmed and must not be empty
    /// - Names must not contain `/`, `\`, `:`, `"`, `*`, `?`, `<`, `>`, `|`,
    ///   since they double as export file names
    /// - Names must be unique
    ///
    /// Blank theme labels are dropped.
    pub fn new<N, T>(notebooks: N, themes: T) -> TomoResult<Self>
    where
        N: IntoIterator,
        N::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let mut ids: Vec<NotebookId> = Vec::new();
        for name in notebooks {
            let name = Self::valid_name(name.as_ref())?;
            if ids.iter().any(|id| id.0 == name) {
                return Err(TomoError::Config(format!("duplicate notebook: {name}")));
            }
            ids.push(NotebookId(name));
        }

        let themes = themes
            .into_iter()
            .map(|t| t.as_ref().trim().to_owned())
            .filter(|t| !t.is_empty())
            .collect();

        Ok(Catalog {
            notebooks: ids,
            themes,
        })
    }

    /// The regional notebooks and themes used out of the box.
    pub fn standard() -> Self {
        Catalog {
            notebooks: DEFAULT_NOTEBOOKS
                .iter()
                .map(|name| NotebookId(name.to_string()))
                .collect(),
            themes: DEFAULT_THEMES.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn notebooks(&self) -> &[NotebookId] {
        &self.notebooks
    }

    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    /// Looks a notebook up by name.
    ///
    /// Returns [`TomoError::UnknownNotebook`] if it is not part of the catalog.
    pub fn resolve(&self, name: &str) -> TomoResult<NotebookId> {
        let name = name.trim();
        self.notebooks
            .iter()
            .find(|id| id.0 == name)
            .cloned()
            .ok_or_else(|| TomoError::UnknownNotebook(name.to_owned()))
    }

    /// Looks a theme label up.
    ///
    /// Returns [`TomoError::UnknownTheme`] if it is not part of the catalog.
    pub fn theme(&self, label: &str) -> TomoResult<&str> {
        let label = label.trim();
        self.themes
            .iter()
            .find(|t| *t == label)
            .map(String::as_str)
            .ok_or_else(|| TomoError::UnknownTheme(label.to_owned()))
    }

    fn valid_name(name: &str) -> TomoResult<String> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(TomoError::Config("notebook name cannot be empty".into()));
        }

        if trimmed.contains(&['/', '\\', ':', '"', '*', '?', '<', '>', '|'][..]) {
            return Err(TomoError::Config(format!(
                "invalid char in notebook name: {trimmed}"
            )));
        }

        Ok(trimmed.to_owned())
    }
}
