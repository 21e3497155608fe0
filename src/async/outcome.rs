//! Tagged success/failure value produced by a bridged callback operation
//!
//! Unlike `Option`, an [`Outcome`] keeps "succeeded with nothing" apart from
//! "failed": `Success(None)` is a perfectly good success.

use std::fmt;

use crate::error::{BridgeError, ErrorInfo};

/// Result of a single bridged operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Outcome<T> {
    /// The operation completed; the payload may legitimately be absent.
    Success(Option<T>),
    /// The operation did not complete normally.
    Failure(ErrorInfo),
}

/// Discriminant of an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeTag {
    /// Tag of [`Outcome::Success`]
    Success,
    /// Tag of [`Outcome::Failure`]
    Failure,
}

impl<T> Outcome<T> {
    /// Creates a success outcome. No validation is done on the payload.
    pub fn success(payload: impl Into<Option<T>>) -> Self {
        Self::Success(payload.into())
    }

    /// Creates a failure outcome with the given cause.
    pub fn failure(cause: ErrorInfo) -> Self {
        Self::Failure(cause)
    }

    /// Creates a failure outcome from a cause that may be missing.
    ///
    /// A failure without a cause is rejected with [`BridgeError::MissingCause`].
    pub fn try_failure(cause: Option<ErrorInfo>) -> Result<Self, BridgeError> {
        cause.map(Self::Failure).ok_or(BridgeError::MissingCause)
    }

    /// Rebuilds an outcome from its tag and contents, the inverse of [`Outcome::into_parts`].
    pub fn from_parts(
        tag: OutcomeTag,
        payload: Option<T>,
        cause: Option<ErrorInfo>,
    ) -> Result<Self, BridgeError> {
        match tag {
            OutcomeTag::Success => Ok(Self::Success(payload)),
            OutcomeTag::Failure => Self::try_failure(cause),
        }
    }

    /// Splits the outcome into its tag, payload and cause.
    pub fn into_parts(self) -> (OutcomeTag, Option<T>, Option<ErrorInfo>) {
        match self {
            Self::Success(payload) => (OutcomeTag::Success, payload, None),
            Self::Failure(cause) => (OutcomeTag::Failure, None, Some(cause)),
        }
    }

    /// The variant tag. Use this, not [`Outcome::has_payload`], to tell success from failure.
    pub fn tag(&self) -> OutcomeTag {
        match self {
            Self::Success(_) => OutcomeTag::Success,
            Self::Failure(_) => OutcomeTag::Failure,
        }
    }

    /// Returns true for [`Outcome::Success`], with or without payload.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns true for [`Outcome::Failure`].
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Returns true if this is a success carrying a payload.
    pub fn has_payload(&self) -> bool {
        matches!(self, Self::Success(Some(_)))
    }

    /// Borrows the payload, if any.
    pub fn payload(&self) -> Option<&T> {
        match self {
            Self::Success(payload) => payload.as_ref(),
            Self::Failure(_) => None,
        }
    }

    /// Borrows the cause of a failure.
    pub fn cause(&self) -> Option<&ErrorInfo> {
        match self {
            Self::Success(_) => None,
            Self::Failure(cause) => Some(cause),
        }
    }

    /// Returns the payload of a success, or the cause of a failure as the error.
    pub fn into_result(self) -> Result<Option<T>, ErrorInfo> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Failure(cause) => Err(cause),
        }
    }

    /// Returns the cause of a failure, or [`ErrorInfo::no_error`] for a success.
    ///
    /// Prefer matching on the variant; this exists for callers that want a
    /// cause unconditionally.
    pub fn cause_or_default(&self) -> ErrorInfo {
        match self {
            Self::Success(_) => ErrorInfo::no_error(),
            Self::Failure(cause) => cause.clone(),
        }
    }

    /// Maps the payload of a success, leaving failures untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(payload) => Outcome::Success(payload.map(f)),
            Self::Failure(cause) => Outcome::Failure(cause),
        }
    }
}

impl<T> From<Result<Option<T>, ErrorInfo>> for Outcome<T> {
    fn from(result: Result<Option<T>, ErrorInfo>) -> Self {
        match result {
            Ok(payload) => Self::Success(payload),
            Err(cause) => Self::Failure(cause),
        }
    }
}

impl<T: fmt::Debug> fmt::Display for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(payload) => write!(
                f,
                "Outcome(has_payload={}, payload={:?})",
                payload.is_some(),
                payload
            ),
            Self::Failure(cause) => write!(f, "Outcome(error={cause})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_success_is_not_failure() {
        let outcome: Outcome<i32> = Outcome::success(None);
        assert!(outcome.is_success());
        assert!(!outcome.is_failure());
        assert!(!outcome.has_payload());
        assert_eq!(outcome.tag(), OutcomeTag::Success);
    }

    #[test]
    fn display_mentions_payload_or_error() {
        assert_eq!(
            Outcome::success(7).to_string(),
            "Outcome(has_payload=true, payload=Some(7))"
        );
        let failed: Outcome<i32> = Outcome::failure(ErrorInfo::new("boom"));
        assert_eq!(failed.to_string(), "Outcome(error=boom)");
    }

    #[test]
    fn map_keeps_failures() {
        let failed: Outcome<i32> = Outcome::failure(ErrorInfo::new("boom"));
        assert_eq!(failed.map(|v| v * 2).cause(), Some(&ErrorInfo::new("boom")));
        assert_eq!(Outcome::success(2).map(|v| v * 2).payload(), Some(&4));
    }
}
