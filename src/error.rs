use thiserror::Error;

#[derive(Debug, Error)]
pub enum TomoError {
    #[error("comment not found: {0}")]
    CommentNotFound(String),

    #[error("unknown notebook: {0}")]
    UnknownNotebook(String),

    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    #[error("no notebook is open")]
    NoActiveNotebook,

    #[error("invalid path")]
    InvalidPath,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("Spreadsheet read error: {0}")]
    SheetRead(#[from] calamine::XlsxError),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Other error: {0}")]
    Other(String),
}

pub type TomoResult<T> = Result<T, TomoError>;
