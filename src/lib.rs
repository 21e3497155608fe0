//! # Callback Bridge
//!
//! Turn a one-shot, callback-based operation into a single awaitable.
//!
//! A provider gets an [`OnSuccess`] and an [`OnFailure`] handle and calls one
//! of them, from any thread, whenever it is done. The caller awaits either an
//! [`Outcome`] or a plain `Result`, and can cancel through a [`CancelToken`]
//! or by dropping the future.
//!
//! ## Features
//!
//! - `memory-store` (default) - [`document::memory::InMemoryStore`], a reference provider
//! - `serde` - `Serialize`/`Deserialize` for documents and error causes
//!
//! ## Example
//!
//! ```rust
//! use callback_bridge::{CallbackAdapter, ErrorInfo, Outcome};
//!
//! # tokio_test::block_on(async {
//! let outcome = CallbackAdapter::<u32>::new()
//!     .run(|on_success, _on_failure| {
//!         on_success.call(42);
//!         None
//!     })
//!     .await;
//! assert_eq!(outcome, Outcome::success(42));
//!
//! let raised = CallbackAdapter::<u32>::new()
//!     .run_raising(|_on_success, on_failure| {
//!         on_failure.call(ErrorInfo::new("offline"));
//!         None
//!     })
//!     .await;
//! assert!(raised.is_err());
//! # });
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod r#async;
pub mod document;
pub mod error;

pub use document::{DocumentClient, DocumentData, DocumentSnapshot, FetchProvider};
pub use error::{BridgeError, ErrorInfo, ErrorKind, Result};
pub use r#async::{
    callbacks::from_fns, CallbackAdapter, CancelHandle, CancelToken, OnFailure, OnSuccess,
    Outcome, OutcomeFuture, OutcomeTag, PayloadFuture,
};

#[cfg(feature = "memory-store")]
pub use document::memory::InMemoryStore;
