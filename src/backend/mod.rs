//! Host toolkit backends
//!
//! This module contains the backend trait the shim drives and the in-crate
//! hosts: a null host that accepts everything and a recording host that logs
//! every call it receives.

mod r#trait;
pub use r#trait::*;

pub mod null;
pub mod recording;

/// Names accepted by `create_backend`
pub fn available_backends() -> Vec<&'static str> {
    vec!["null", "recording"]
}

/// Construct a backend by name
pub fn create_backend(name: &str) -> Option<Box<dyn Backend>> {
    match name {
        "null" => Some(Box::new(null::NullBackend::new())),
        "recording" => Some(Box::new(recording::RecordingBackend::new())),
        _ => None,
    }
}
