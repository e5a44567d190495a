use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Malformed month: {0:?} (expected YYYY-MM)")]
    MalformedMonth(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
