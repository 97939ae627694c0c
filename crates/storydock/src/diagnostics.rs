//! Conditions the story recovered from.
//!
//! Recovery keeps the engine running, but data may have been replaced by
//! defaults along the way. Every such event is kept here so a host can show
//! it or write it to a report.

use std::path::PathBuf;

use serde::Serialize;
use storydock_core::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    /// Document involved, when there is one.
    pub path: Option<PathBuf>,
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn new(kind: ErrorKind, path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }
}
