use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("row {0} was not updated")]
    NotUpdated(i32),
    #[error("database error: {0}")]
    Db(String),
}
