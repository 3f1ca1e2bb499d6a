//! Describes dependency injection errors

use std::fmt::{Display, Formatter};

/// Errors produced while resolving services.
///
/// Errors are [`Clone`] because a pending asynchronous build hands
/// its output, including a failure, to every holder of that build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A reference names a service that is not registered
    NotFound(String),
    /// A resolved service could not be downcast to the requested type
    ResolveFailed {
        /// Name of the service
        name: String,
        /// Requested type
        type_name: &'static str,
    },
    /// A service is still being built asynchronously and must be awaited
    NotReady(String),
    /// A name is absent from a batch of resolved services
    Missing(String),
    /// A failure raised by a build function
    Other(String),
}

impl Error {
    /// Creates an [`Error::Other`] from any message
    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotFound(name) => write!(f, "Services Error: service not registered: {name}"),
            Error::ResolveFailed { name, type_name } => write!(
                f,
                "Services Error: unable to resolve the service: {name} as {type_name}"
            ),
            Error::NotReady(name) => write!(f, "Services Error: service is still being built: {name}"),
            Error::Missing(name) => write!(f, "Services Error: service was not requested: {name}"),
            Error::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}
