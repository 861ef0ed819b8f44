#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unrecognized input at byte {0}")]
    Lex(usize),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("invalid comparison operator {0:?}")]
    InvalidComparisonOperator(String),

    #[error("malformed number literal {0:?}")]
    MalformedNumber(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
