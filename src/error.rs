use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeypaceError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("no usable state directory")]
    NoStateDir,
}

pub type Result<T> = std::result::Result<T, KeypaceError>;
