use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Singular system: {0}")]
    SingularSystem(String),

    #[error("Index out of range: {0}")]
    IndexOutOfRange(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PathError>;
