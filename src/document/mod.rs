//! Document fetching through a callback-style provider
//!
//! [`FetchProvider`] is the seam to a remote document store. [`DocumentClient`]
//! wraps a provider and offers the same lookup in four call shapes:
//!
//! | method                  | shape     | missing document         |
//! |-------------------------|-----------|--------------------------|
//! | `exists_with_callbacks` | callbacks | `on_success(false)`      |
//! | `exists`                | raising   | `Err(NotFound)`          |
//! | `fetch_data`            | outcome   | `Outcome::Success(None)` |
//! | `exists_cancellable`    | raising   | `Ok(false)`              |
//!
//! The two conventions for a missing document are deliberate; callers of
//! each shape rely on their own one.

#[cfg(feature = "memory-store")]
pub mod memory;

use std::sync::Arc;

use crate::error::{ErrorInfo, Result};
use crate::r#async::{
    callbacks, CallbackAdapter, CancelHandle, CancelToken, OnFailure, OnSuccess, Outcome,
};

/// Key/value payload of a stored document; values may be null.
pub type DocumentData = hashbrown::HashMap<String, Option<String>>;

/// Message reported when the raising shape finds no document.
pub const NOT_FOUND_MESSAGE: &str = "Data Not Exist";

/// Result of a get-by-id lookup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DocumentSnapshot {
    id: String,
    exists: bool,
    data: Option<DocumentData>,
}

impl DocumentSnapshot {
    /// Snapshot of a document that does not exist.
    pub fn missing(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            exists: false,
            data: None,
        }
    }

    /// Snapshot of an existing document.
    pub fn found(id: impl Into<String>, data: DocumentData) -> Self {
        Self {
            id: id.into(),
            exists: true,
            data: Some(data),
        }
    }

    /// Document id this snapshot was read for.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the document exists.
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Borrow the document fields.
    pub fn data(&self) -> Option<&DocumentData> {
        self.data.as_ref()
    }

    /// Take the document fields.
    pub fn into_data(self) -> Option<DocumentData> {
        self.data
    }

    /// Look up a single field; `None` if the document, key or value is absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_deref()
    }
}

/// Remote store that answers a lookup through exactly one of two callbacks.
///
/// Implementations should call one callback exactly once. The bridge ignores
/// extra calls, but does not rely on that.
pub trait FetchProvider: Send + Sync {
    /// Start fetching `collection/id`, optionally returning a cancel hook.
    fn get_document_by_id(
        &self,
        collection: &str,
        id: &str,
        on_success: OnSuccess<DocumentSnapshot>,
        on_failure: OnFailure<DocumentSnapshot>,
    ) -> Option<CancelHandle>;
}

/// Document lookups over an explicitly supplied provider.
#[derive(Debug)]
pub struct DocumentClient<P> {
    provider: Arc<P>,
}

impl<P> Clone for DocumentClient<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: FetchProvider + 'static> DocumentClient<P> {
    /// Wrap a shared provider.
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// The underlying provider.
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Plain callback lookup: reports whether the document exists.
    pub fn exists_with_callbacks<S, F>(
        &self,
        collection: &str,
        id: &str,
        on_success: S,
        on_failure: F,
    ) -> Option<CancelHandle>
    where
        S: FnOnce(bool) + Send + 'static,
        F: FnOnce(ErrorInfo) + Send + 'static,
    {
        let (on_doc, on_err) = callbacks::from_fns(
            move |snapshot: Option<DocumentSnapshot>| {
                on_success(snapshot.is_some_and(|s| s.exists()))
            },
            on_failure,
        );
        self.provider.get_document_by_id(collection, id, on_doc, on_err)
    }

    /// Raising lookup; a missing document is reported as [`BridgeError::NotFound`](crate::BridgeError::NotFound).
    pub async fn exists(&self, collection: &str, id: &str) -> Result<bool> {
        let provider = Arc::clone(&self.provider);
        let found = CallbackAdapter::<bool>::new()
            .run_raising(|ok, err| {
                let (on_doc, on_err) = forward_existence(ok, err, true);
                provider.get_document_by_id(collection, id, on_doc, on_err)
            })
            .await?;
        Ok(found.unwrap_or(false))
    }

    /// Outcome lookup; a missing document is `Success(None)`, provider errors are `Failure`.
    pub async fn fetch_data(&self, collection: &str, id: &str) -> Outcome<DocumentData> {
        let provider = Arc::clone(&self.provider);
        CallbackAdapter::<DocumentData>::new()
            .run(|ok, err| {
                let fail = err.clone();
                let (on_doc, on_err) = callbacks::from_fns(
                    move |snapshot: Option<DocumentSnapshot>| {
                        let data = snapshot
                            .filter(DocumentSnapshot::exists)
                            .and_then(DocumentSnapshot::into_data);
                        ok.call(data);
                    },
                    move |cause| {
                        fail.call(cause);
                    },
                );
                provider.get_document_by_id(collection, id, on_doc, on_err)
            })
            .await
    }

    /// Raising lookup linked to `token`; a missing document is `Ok(false)`.
    ///
    /// Cancelling the token runs the provider's cancel hook, if it gave one,
    /// and resolves with [`BridgeError::Cancelled`](crate::BridgeError::Cancelled).
    pub async fn exists_cancellable(
        &self,
        collection: &str,
        id: &str,
        token: &CancelToken,
    ) -> Result<bool> {
        let provider = Arc::clone(&self.provider);
        let found = CallbackAdapter::<bool>::new()
            .with_cancel_token(token.clone())
            .run_raising(|ok, err| {
                let (on_doc, on_err) = forward_existence(ok, err, false);
                provider.get_document_by_id(collection, id, on_doc, on_err)
            })
            .await?;
        Ok(found.unwrap_or(false))
    }
}

/// Translates snapshot callbacks into existence callbacks.
///
/// With `missing_is_failure` a missing document goes to `err` as not-found,
/// otherwise it is reported as `ok(false)`.
fn forward_existence(
    ok: OnSuccess<bool>,
    err: OnFailure<bool>,
    missing_is_failure: bool,
) -> (OnSuccess<DocumentSnapshot>, OnFailure<DocumentSnapshot>) {
    let fail = err.clone();
    callbacks::from_fns(
        move |snapshot: Option<DocumentSnapshot>| {
            let exists = snapshot.is_some_and(|s| s.exists());
            if exists || !missing_is_failure {
                ok.call(exists);
            } else {
                fail.call(ErrorInfo::not_found(NOT_FOUND_MESSAGE));
            }
        },
        move |cause| {
            err.call(cause);
        },
    )
}
