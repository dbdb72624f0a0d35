#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("no rows affected for job {0}")]
    NoRowsAffected(String),
    #[error("serialization failed: {0}")]
    Serialization(String),
}
