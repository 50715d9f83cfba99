use thiserror::Error;

/// Failures reported by a [`crate::share::Share`] implementation.
#[derive(Error, Debug)]
pub enum ShareError {
    #[error("Access denied: {0}")]
    Access(String),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Could not delete {path}: {message}")]
    Delete { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum JanitorError {
    #[error(transparent)]
    Share(#[from] ShareError),

    #[error("Traversal aborted at '{path}': depth {depth} exceeds limit (cyclic or malformed tree?)")]
    Traversal { path: String, depth: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lock error: {0}")]
    Lock(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("Notification error: {0}")]
    Notify(String),
}
