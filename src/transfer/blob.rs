//! Locally materialized download payloads
//!
//! A downloaded payload lives in a [`BlobHandle`] from the moment the gateway
//! returns it until the save action finishes. The owning [`BlobRegistry`]
//! counts live handles so that a leaked payload is observable.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;

/// Issues blob handles and tracks how many are alive
#[derive(Debug, Clone, Default)]
pub struct BlobRegistry {
    live: Arc<AtomicUsize>,
}

impl BlobRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a payload
    pub fn register(&self, file_name: impl Into<String>, bytes: Bytes) -> BlobHandle {
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        let file_name = file_name.into();
        tracing::debug!(
            "Blob for {} registered ({} bytes, {} live)",
            file_name,
            bytes.len(),
            live
        );
        BlobHandle {
            file_name,
            bytes,
            live: Arc::clone(&self.live),
        }
    }

    /// Number of handles not yet released
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// A payload waiting to be saved
///
/// Released on drop; [`BlobHandle::release`] makes the release point explicit.
#[derive(Debug)]
pub struct BlobHandle {
    file_name: String,
    bytes: Bytes,
    live: Arc<AtomicUsize>,
}

impl BlobHandle {
    /// Original file name of the payload
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Payload contents
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Release the handle
    pub fn release(self) {}
}

impl Drop for BlobHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!("Blob for {} released", self.file_name);
    }
}
