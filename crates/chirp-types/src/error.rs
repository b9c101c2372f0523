use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error("no {0} ids left to allocate")]
    IdSpaceExhausted(&'static str),

    #[error("post body too long: {actual} characters (max {max})")]
    BodyTooLong { max: usize, actual: usize },
}
