use thiserror::Error;

pub type PartitionResult<T> = Result<T, PartitionError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PartitionError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl PartitionError {
    pub fn invalid(message: impl Into<String>) -> Self {
        PartitionError::InvalidArgument(message.into())
    }
}
