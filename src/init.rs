//! Process-wide library initialization latch.
//!
//! The runtime needs no socket-stack setup on the supported platforms, but
//! embedders get an idempotent init/teardown pair and servers initialize
//! lazily on [`listen`](crate::HttpServer::listen), so the latch state stays
//! meaningful for diagnostics.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static IS_LIBRARY_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Error from [`init_library`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitLibraryError {
    /// [`init_library`] has already been called.
    AlreadyInitialized,
}

impl std::error::Error for InitLibraryError {}

impl fmt::Display for InitLibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInitialized => f.write_str("library already initialized"),
        }
    }
}

/// Marks the library initialized.
///
/// # Errors
///
/// - [`InitLibraryError::AlreadyInitialized`] on repeated calls
pub fn init_library() -> Result<(), InitLibraryError> {
    if IS_LIBRARY_INITIALIZED.swap(true, Ordering::AcqRel) {
        return Err(InitLibraryError::AlreadyInitialized);
    }

    Ok(())
}

/// Clears the initialized state. A no-op when not initialized.
pub fn cleanup_library() {
    IS_LIBRARY_INITIALIZED.store(false, Ordering::Release);
}

/// `true` between [`init_library`] and [`cleanup_library`].
#[must_use]
pub fn is_library_initialized() -> bool {
    IS_LIBRARY_INITIALIZED.load(Ordering::Acquire)
}
