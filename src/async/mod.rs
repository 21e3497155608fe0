//! Callback-to-future bridging
//!
//! - [`outcome`]: the [`Outcome`] tagged result
//! - [`callbacks`]: the [`OnSuccess`]/[`OnFailure`] handles given to providers
//! - [`cancel`]: [`CancelHandle`] and [`CancelToken`]
//! - [`adapter`]: [`CallbackAdapter`] and the futures it returns

pub mod adapter;
pub mod callbacks;
pub mod cancel;
pub mod outcome;

pub use adapter::{CallbackAdapter, OutcomeFuture, PayloadFuture};
pub use callbacks::{OnFailure, OnSuccess};
pub use cancel::{CancelHandle, CancelToken};
pub use outcome::{Outcome, OutcomeTag};
