use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorStoreError>;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Invalid cluster count: {0}")]
    InvalidClusterCount(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
