//! Vignette Worker Library
//!
//! The thumbnail worker: a long-running consumer loop that reacts to upload
//! events by rendering a thumbnail derivative, tracking each job in a
//! derivative record, and notifying a callback endpoint on success.

pub mod consumer;
pub mod processor;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use consumer::ThumbnailWorker;
pub use processor::ThumbnailProcessor;
