//! Configuration for the notebook workspace.

use crate::error::{TomoError, TomoResult};
use crate::notebook::catalog::Catalog;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_NOTEBOOKS: [&str; 17] = [
    "Arica",
    "Tarapacá",
    "Antofagasta",
    "Atacama",
    "Coquimbo",
    "Valparaíso",
    "R. Metropolitana",
    "O'Higgins",
    "Maule",
    "Ñuble",
    "Bío-Bío",
    "Araucanía",
    "Los Ríos",
    "Los Lagos",
    "Aysén",
    "Magallanes",
    "General",
];

pub const DEFAULT_THEMES: [&str; 10] = [
    "Clima Laboral",
    "Ejecución Presupuestaria",
    "Indicadores de desempeño",
    "Informática",
    "Infraestructura",
    "Planificación",
    "Plan de SSPP",
    "Político Institucional",
    "Otros",
    "Temas Dpto. Personas",
];

/// Where notebooks and records live, and which notebooks and themes exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomoConfig {
    /// Directory holding the databases and the workbook.
    pub data_dir: PathBuf,

    /// SQLite file with the notebook texts.
    pub database_file: String,

    /// SQLite file with the monitoring records.
    pub ledger_file: String,

    /// Workbook the sink rewrites from the ledger. Not meant to be shared with
    /// hand-edited sheets.
    pub workbook_file: String,

    pub sheet_name: String,

    /// Notebook names, one per region plus "General".
    pub notebooks: Vec<String>,

    /// Theme labels that may open a themed segment.
    pub themes: Vec<String>,
}

impl TomoConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            database_file: "cuadernos.db".to_owned(),
            ledger_file: "seguimiento_regional.db".to_owned(),
            workbook_file: "seguimiento_regional.xlsx".to_owned(),
            sheet_name: "Hoja3".to_owned(),
            notebooks: DEFAULT_NOTEBOOKS.iter().map(|s| s.to_string()).collect(),
            themes: DEFAULT_THEMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Reads a TOML file. Missing keys fall back to their defaults.
    pub fn load(path: &Path) -> TomoResult<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> TomoResult<Self> {
        let config: TomoConfig =
            toml::from_str(raw).map_err(|e| TomoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> TomoResult<String> {
        toml::to_string(self).map_err(|e| TomoError::Config(e.to_string()))
    }

    /// Creates `data_dir` if it does not exist yet.
    pub fn ensure_data_dir(&self) -> TomoResult<()> {
        fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(&self.ledger_file)
    }

    pub fn workbook_path(&self) -> PathBuf {
        self.data_dir.join(&self.workbook_file)
    }

    pub fn catalog(&self) -> TomoResult<Catalog> {
        Catalog::new(self.notebooks.clone(), self.themes.clone())
    }

    fn validate(&self) -> TomoResult<()> {
        if self.notebooks.is_empty() {
            return Err(TomoError::Config("at least one notebook is required".into()));
        }
        for file in [&self.database_file, &self.ledger_file, &self.workbook_file] {
            if file.trim().is_empty() {
                return Err(TomoError::Config("file names cannot be empty".into()));
            }
        }
        Ok(())
    }
}

impl Default for TomoConfig {
    fn default() -> Self {
        Self::new(
            dirs::document_dir()
                .unwrap_or_default()
                .join("cuadernos"),
        )
    }
}
