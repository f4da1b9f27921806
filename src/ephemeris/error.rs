use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("TLE directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("TLE file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Invalid TLE in {source_name}: {message}")]
    InvalidTle {
        source_name: String,
        message: String,
    },
    #[error("Propagation error: {0}")]
    Propagation(String),
    #[error("Non-finite position for {0}")]
    NonFinite(String),
}
