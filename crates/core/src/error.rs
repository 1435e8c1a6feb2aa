#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unknown patient field: {0}")]
    UnknownField(String),
    #[error("unknown patient status: {0}")]
    UnknownStatus(String),
    #[error("invalid port: {0}")]
    InvalidPort(std::num::ParseIntError),
    #[error("invalid duration in milliseconds: {0}")]
    InvalidDuration(std::num::ParseIntError),
    #[error("failed to serialize snapshot: {0}")]
    Serialization(serde_json::Error),
}

pub type IntakeResult<T> = std::result::Result<T, IntakeError>;
