//! Error reporting channel
//!
//! The platform layer reports failures as a single `(kind, description)`
//! pair. Failures never panic and are never retried: the failing operation
//! returns an empty result and the error is additionally published through
//! a thread-local "last error" slot plus an optional user callback fired
//! synchronously at the point of failure.
//!
//! The slot is thread-local because the platform context itself is confined
//! to the thread that initialized it (see [`crate::App`]).

use std::cell::RefCell;

use thiserror::Error;

/// Classification of a platform failure, mirroring the underlying
/// library's error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The platform library has not been initialized.
    #[error("not initialized")]
    NotInitialized,
    /// No OpenGL context is current on the calling thread.
    #[error("no current context")]
    NoCurrentContext,
    /// An invalid enum value was passed to the platform.
    #[error("invalid enum")]
    InvalidEnum,
    /// An invalid argument value was passed to the platform.
    #[error("invalid value")]
    InvalidValue,
    /// The platform ran out of memory.
    #[error("out of memory")]
    OutOfMemory,
    /// The requested client API is unavailable.
    #[error("api unavailable")]
    ApiUnavailable,
    /// The requested context version is unavailable.
    #[error("version unavailable")]
    VersionUnavailable,
    /// A platform-specific error occurred.
    #[error("platform error")]
    PlatformError,
    /// The requested framebuffer format is unavailable.
    #[error("format unavailable")]
    FormatUnavailable,
    /// The window has no OpenGL context.
    #[error("no window context")]
    NoWindowContext,
    /// Window creation failed without a more specific platform report.
    #[error("window creation failed")]
    CreationFailed,
}

/// The most recent failure reported by the platform layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {description}")]
pub struct Error {
    /// Failure classification.
    pub kind: ErrorKind,
    /// Human-readable message text from the platform.
    pub description: String,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }
}

type ErrorCallback = Box<dyn FnMut(&Error)>;

thread_local! {
    static LAST_ERROR: RefCell<Option<Error>> = const { RefCell::new(None) };
    static CALLBACK: RefCell<Option<ErrorCallback>> = const { RefCell::new(None) };
}

/// Record a platform failure: update the last-error slot and fire the user
/// callback if one is registered.
pub(crate) fn record(error: Error) {
    log::warn!("platform error: {error}");
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(error.clone()));
    // Take the callback out for the duration of the call so a callback that
    // itself fails cannot recurse into a borrowed slot.
    let taken = CALLBACK.with(|slot| slot.borrow_mut().take());
    if let Some(mut cb) = taken {
        cb(&error);
        CALLBACK.with(|slot| {
            let mut current = slot.borrow_mut();
            if current.is_none() {
                *current = Some(cb);
            }
        });
    }
}

/// The most recent error recorded on this thread, if any.
pub(crate) fn last_error() -> Option<Error> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Replace the error callback. Passing a new callback drops the old one.
pub(crate) fn set_callback(cb: impl FnMut(&Error) + 'static) {
    CALLBACK.with(|slot| *slot.borrow_mut() = Some(Box::new(cb)));
}

/// Return the last recorded error, or record and return a fallback when the
/// platform did not report anything more specific.
pub(crate) fn last_or(kind: ErrorKind, description: &str) -> Error {
    match last_error() {
        Some(err) => err,
        None => {
            let err = Error::new(kind, description);
            record(err.clone());
            err
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn record_updates_last_error() {
        record(Error::new(ErrorKind::InvalidValue, "bad size"));
        let last = last_error().unwrap();
        assert_eq!(last.kind, ErrorKind::InvalidValue);
        assert_eq!(last.description, "bad size");
    }

    #[test]
    fn callback_fires_on_record() {
        let seen = Rc::new(Cell::new(0));
        let seen2 = Rc::clone(&seen);
        set_callback(move |err| {
            assert_eq!(err.kind, ErrorKind::PlatformError);
            seen2.set(seen2.get() + 1);
        });
        record(Error::new(ErrorKind::PlatformError, "boom"));
        record(Error::new(ErrorKind::PlatformError, "boom again"));
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn last_or_prefers_recorded_error() {
        record(Error::new(ErrorKind::InvalidValue, "invalid window size"));
        let err = last_or(ErrorKind::CreationFailed, "window creation failed");
        assert_eq!(err.kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn display_includes_kind_and_description() {
        let err = Error::new(ErrorKind::InvalidValue, "invalid window size");
        assert_eq!(err.to_string(), "invalid value: invalid window size");
    }
}
