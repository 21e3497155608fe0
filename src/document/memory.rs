//! In-process [`FetchProvider`] backed by a hash map
//!
//! With no latency configured the store answers synchronously, inside the
//! registration call. With latency it answers from its own OS thread, which
//! is how real network clients behave, and hands back a cancel hook that
//! suppresses the pending answer.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hashbrown::HashMap;
use parking_lot::RwLock;

use super::{DocumentData, DocumentSnapshot, FetchProvider};
use crate::error::ErrorInfo;
use crate::r#async::{CancelHandle, OnFailure, OnSuccess};

/// Reference document store for demos and tests
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: RwLock<HashMap<(String, String), DocumentData>>,
    failure: RwLock<Option<ErrorInfo>>,
    latency: Duration,
    cancellations: Arc<AtomicUsize>,
}

impl InMemoryStore {
    /// Creates an empty, synchronous store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every lookup after `latency`, from a background thread.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fail every lookup with `cause`.
    pub fn with_failure(self, cause: ErrorInfo) -> Self {
        self.set_failure(Some(cause));
        self
    }

    /// Replace (or clear) the injected failure.
    pub fn set_failure(&self, cause: Option<ErrorInfo>) {
        *self.failure.write() = cause;
    }

    /// Store a document, replacing any previous one with the same key.
    pub fn insert(
        &self,
        collection: impl Into<String>,
        id: impl Into<String>,
        data: DocumentData,
    ) {
        self.documents
            .write()
            .insert((collection.into(), id.into()), data);
    }

    /// Remove a document, returning its data if it existed.
    pub fn remove(&self, collection: &str, id: &str) -> Option<DocumentData> {
        self.documents
            .write()
            .remove(&(collection.to_string(), id.to_string()))
    }

    /// Number of times a cancel hook from this store has run.
    pub fn cancellations(&self) -> usize {
        self.cancellations.load(Ordering::SeqCst)
    }

    fn lookup(&self, collection: &str, id: &str) -> Result<DocumentSnapshot, ErrorInfo> {
        if let Some(cause) = self.failure.read().clone() {
            return Err(cause);
        }
        let documents = self.documents.read();
        Ok(
            match documents.get(&(collection.to_string(), id.to_string())) {
                Some(data) => DocumentSnapshot::found(id, data.clone()),
                None => DocumentSnapshot::missing(id),
            },
        )
    }
}

fn deliver(
    answer: Result<DocumentSnapshot, ErrorInfo>,
    on_success: &OnSuccess<DocumentSnapshot>,
    on_failure: &OnFailure<DocumentSnapshot>,
) {
    match answer {
        Ok(snapshot) => {
            on_success.call(snapshot);
        }
        Err(cause) => {
            on_failure.call(cause);
        }
    }
}

impl FetchProvider for InMemoryStore {
    fn get_document_by_id(
        &self,
        collection: &str,
        id: &str,
        on_success: OnSuccess<DocumentSnapshot>,
        on_failure: OnFailure<DocumentSnapshot>,
    ) -> Option<CancelHandle> {
        let answer = self.lookup(collection, id);
        if self.latency.is_zero() {
            log::trace!("answering {collection}/{id} synchronously");
            deliver(answer, &on_success, &on_failure);
            return None;
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let latency = self.latency;
        let path = format!("{collection}/{id}");
        thread::spawn(move || {
            thread::sleep(latency);
            if flag.load(Ordering::SeqCst) {
                log::trace!("dropping answer for cancelled lookup {path}");
                return;
            }
            log::trace!("answering {path} after {latency:?}");
            deliver(answer, &on_success, &on_failure);
        });

        let cancellations = Arc::clone(&self.cancellations);
        Some(CancelHandle::new(move || {
            cancelled.store(true, Ordering::SeqCst);
            cancellations.fetch_add(1, Ordering::SeqCst);
        }))
    }
}
