use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("diagram source is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error("diagram source has {lines} lines, limit is {limit}")]
    TooManyLines { lines: usize, limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no note exists for node `{0}`")]
    UnknownNote(String),
}
