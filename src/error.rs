use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("SDK error: {0}")]
    Sdk(#[from] liquidex_sdk::Error),

    #[error("store error: {0}")]
    Store(#[from] liquidex_store::StoreError),

    #[error("registry error: {0}")]
    Registry(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("unknown method: {0}")]
    UnknownMethod(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DaemonError>;
