//! Cooperative cancellation.
//!
//! The pipeline polls a [`CancelSignal`] at stage boundaries and once per
//! iteration of each stage's outer loop. The signal is only read, never set.
//!
//! # Example
//!
//! ```
//! use makevalid::cancel::CancelSignal;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//!
//! let flag = Arc::new(AtomicBool::new(false));
//! let worker_view = Arc::clone(&flag);
//! assert!(!worker_view.is_cancelled());
//!
//! flag.store(true, Ordering::Relaxed);
//! assert!(worker_view.is_cancelled());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A readable flag telling a running invocation to stop.
pub trait CancelSignal {
    /// Returns `true` once the invocation should abort.
    fn is_cancelled(&self) -> bool;
}

/// A signal that never fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeverCancel;

impl CancelSignal for NeverCancel {
    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl CancelSignal for AtomicBool {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<T: CancelSignal + ?Sized> CancelSignal for &T {
    #[inline]
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

impl<T: CancelSignal + ?Sized> CancelSignal for Arc<T> {
    #[inline]
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}
