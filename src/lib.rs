//! Deterministic wiring for a modal-backed form page.
//!
//! The crate models one page's UI glue as plain Rust: an in-memory element
//! tree addressable by id, an event dispatcher with capture and bubble
//! phases, inline-style-driven visibility, and a pluggable [`Dialog`]
//! capability. On top of that sits [`FormWiring`], a submit interceptor that
//! cancels the native submission, hides the dialog and its trigger button,
//! and reveals a confirmation message. Keyboard loggers write pressed keys
//! to a captured console stream that tests can drain.
//!
//! Everything runs single-threaded and to completion; there is no browser,
//! no HTML parsing, and no script language. Handles are resolved once at
//! registration time and injected into handlers, so a missing element
//! surfaces as an [`Error`] at the call site instead of a fault inside an
//! event handler.

use std::error::Error as StdError;
use std::fmt;

mod dialog;
mod dom;
mod events;
mod keyboard;
mod page;
mod wiring;

pub use dialog::{Dialog, ModalDialog};
pub use dom::NodeId;
pub use events::{EventState, Handler};
pub use keyboard::{attach_key_loggers, log_key_down, log_key_press, log_key_up};
pub use page::Page;
pub use wiring::FormWiring;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    ElementNotFound(String),
    DuplicateId(String),
    TagMismatch {
        id: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        id: String,
        expected: String,
        actual: String,
    },
    PageRuntime(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElementNotFound(id) => write!(f, "element not found: #{id}"),
            Self::DuplicateId(id) => write!(f, "duplicate element id: #{id}"),
            Self::TagMismatch {
                id,
                expected,
                actual,
            } => write!(
                f,
                "tag mismatch for #{id}: expected <{expected}>, actual <{actual}>"
            ),
            Self::AssertionFailed {
                id,
                expected,
                actual,
            } => write!(
                f,
                "assertion failed for #{id}: expected {expected}, actual {actual}"
            ),
            Self::PageRuntime(msg) => write!(f, "page runtime error: {msg}"),
        }
    }
}

impl StdError for Error {}
