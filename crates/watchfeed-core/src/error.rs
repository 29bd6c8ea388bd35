use crate::query::{AuthorizationError, ValidationError};
use std::{error::Error as StdError, fmt};
use thiserror::Error as ThisError;

///
/// QueryError
///
/// Failure of one public service call. Validation and authorization
/// failures are raised before the executor is touched.
///

#[derive(Debug, ThisError)]
pub enum QueryError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Authorization(#[from] AuthorizationError),

    #[error("{0}")]
    Execute(#[from] ExecutorError),

    #[error("extension '{extension}' failed: {source}")]
    Extension {
        extension: String,
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("{0}")]
    Internal(#[from] InternalError),
}

impl QueryError {
    pub(crate) fn extension(
        extension: impl Into<String>,
        source: Box<dyn StdError + Send + Sync>,
    ) -> Self {
        Self::Extension {
            extension: extension.into(),
            source,
        }
    }
}

///
/// ExecutorError
///
/// Failure reported by the query executor or the connection provider.
/// The optional source keeps the backend's own error.
///

#[derive(Debug, ThisError)]
#[error("query execution failed: {message}")]
pub struct ExecutorError {
    pub message: String,

    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl ExecutorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

///
/// InternalError
///
/// Broken contract between the service and a collaborator: a row without a
/// required column, a resolver that omits a field it must provide.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            origin,
            message: message.into(),
        }
    }

    /// Construct a compiler-origin invariant violation.
    pub(crate) fn compiler_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorOrigin::Compiler, message)
    }

    /// Construct a mapper-origin invariant violation.
    pub(crate) fn mapper_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorOrigin::Mapper, message)
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Compiler,
    Mapper,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Compiler => "compiler",
            Self::Mapper => "mapper",
        };
        write!(f, "{label}")
    }
}
