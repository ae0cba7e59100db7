#![forbid(unsafe_code)]
use std::collections::TryReserveError;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rav1lrError {
    /// A caller-supplied argument is out of range.
    InvalidArgument(&'static str),
    /// Scratch allocation failed.
    OutOfMemory,
}

pub type Rav1lrResult<T = ()> = Result<T, Rav1lrError>;

impl fmt::Display for Rav1lrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(what) => write!(f, "invalid argument: {what}"),
            Self::OutOfMemory => write!(f, "out of memory"),
        }
    }
}

impl std::error::Error for Rav1lrError {}

impl From<TryReserveError> for Rav1lrError {
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}
