use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use watchfeed_config::ConfigError;
use watchfeed_core::error::{ErrorOrigin as CoreErrorOrigin, InternalError, QueryError};

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        Self::new(ErrorKind::Internal, err.origin.into(), err.message)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Validation(_) => {
                Self::new(ErrorKind::Invalid, ErrorOrigin::Options, err.to_string())
            }

            QueryError::Authorization(_) => Self::new(
                ErrorKind::Unauthorized,
                ErrorOrigin::Permission,
                err.to_string(),
            ),

            QueryError::Execute(_) => {
                Self::new(ErrorKind::Execution, ErrorOrigin::Executor, err.to_string())
            }

            QueryError::Extension { .. } => {
                Self::new(ErrorKind::Extension, ErrorOrigin::Extension, err.to_string())
            }

            QueryError::Internal(err) => err.into(),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Invalid, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Request options or configuration are malformed.
    Invalid,

    /// Watchlist owner token did not match.
    Unauthorized,

    /// The executor or its connection failed.
    Execution,

    /// An extension hook failed.
    Extension,

    /// The caller cannot remediate this.
    Internal,
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Compiler,
    Config,
    Executor,
    Extension,
    Mapper,
    Options,
    Permission,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Compiler => Self::Compiler,
            CoreErrorOrigin::Mapper => Self::Mapper,
        }
    }
}
