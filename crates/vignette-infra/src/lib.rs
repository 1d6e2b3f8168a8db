//! Vignette Infra Library
//!
//! Ambient infrastructure shared by the coordinator and the worker:
//! telemetry initialization and the thumbnail callback notifier.

pub mod callback;
pub mod telemetry;

pub use callback::{CallbackNotifier, HttpCallbackNotifier};
pub use telemetry::init_telemetry;
