//! Error types for callback bridging.
//!
//! `ErrorInfo` is the opaque cause carried by a failed [`Outcome`](crate::Outcome);
//! `BridgeError` is what the raising entry points hand back to callers.

use thiserror::Error;

/// Result type alias for raising-shape operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Coarse classification of an [`ErrorInfo`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// The external operation reported failure
    Provider,
    /// The requested entity does not exist
    NotFound,
    /// The awaiting side cancelled before resolution
    Cancelled,
    /// The provider dropped its callbacks without invoking either
    Abandoned,
    /// Sentinel returned by [`Outcome::cause_or_default`](crate::Outcome::cause_or_default)
    None,
}

/// Human-readable failure cause.
///
/// Provider error codes are not parsed; the message is carried verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("{message}")]
pub struct ErrorInfo {
    kind: ErrorKind,
    message: String,
}

impl ErrorInfo {
    /// A provider-reported failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Provider,
            message: message.into(),
        }
    }

    /// An expected "no such entity" failure.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            message: message.into(),
        }
    }

    /// Local cancellation before resolution.
    pub(crate) fn cancelled() -> Self {
        Self {
            kind: ErrorKind::Cancelled,
            message: "Cancelled".to_string(),
        }
    }

    /// The provider released every callback without calling one.
    pub(crate) fn abandoned() -> Self {
        Self {
            kind: ErrorKind::Abandoned,
            message: "provider dropped its callbacks without resolving".to_string(),
        }
    }

    /// The "No Error" sentinel.
    pub fn no_error() -> Self {
        Self {
            kind: ErrorKind::None,
            message: "No Error".to_string(),
        }
    }

    /// Classification of this cause.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if this cause records a local cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.kind == ErrorKind::Cancelled
    }
}

/// Errors surfaced by the raising entry points
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The external operation reported failure
    #[error("Provider failure: {0}")]
    ProviderFailure(ErrorInfo),

    /// The requested entity does not exist
    #[error("{message}")]
    NotFound {
        /// Message supplied by whoever reported the condition
        message: String,
    },

    /// The awaiting context cancelled before resolution
    #[error("Cancelled")]
    Cancelled,

    /// The provider dropped its callbacks without calling either one
    #[error("Provider dropped its callbacks without resolving")]
    Abandoned,

    /// A failure outcome was requested without a cause
    #[error("A failure outcome requires a cause")]
    MissingCause,
}

/// Maps a cause reported through a failure callback.
///
/// `Cancelled` and `Abandoned` are only raised by the adapter itself, so a
/// provider cause of any kind other than `NotFound` is a provider failure.
impl From<ErrorInfo> for BridgeError {
    fn from(cause: ErrorInfo) -> Self {
        match cause.kind {
            ErrorKind::NotFound => Self::NotFound {
                message: cause.message,
            },
            _ => Self::ProviderFailure(cause),
        }
    }
}

impl From<BridgeError> for ErrorInfo {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::ProviderFailure(cause) => cause,
            BridgeError::NotFound { message } => ErrorInfo::not_found(message),
            BridgeError::Cancelled => ErrorInfo::cancelled(),
            BridgeError::Abandoned => ErrorInfo::abandoned(),
            other @ BridgeError::MissingCause => ErrorInfo::new(other.to_string()),
        }
    }
}
