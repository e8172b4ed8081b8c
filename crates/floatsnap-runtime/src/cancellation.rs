#![forbid(unsafe_code)]

//! Release signal shared between a presenter and its worker.
//!
//! [`CancellationSource`] lives with the [`Presenter`](crate::Presenter) on
//! the UI thread. Every [`CancellationToken`] handed to the worker and to
//! [`MainPoster`](crate::MainPoster)s observes the same flag. Releasing the
//! presenter cancels the source; from then on queued work is skipped and new
//! posts are dropped.
//!
//! Long-running tasks can bail out early with [`CancellationToken::check`]:
//!
//! ```
//! use floatsnap_runtime::cancellation::CancellationSource;
//!
//! let source = CancellationSource::new();
//! let token = source.token();
//!
//! type Work = Result<u32, Box<dyn std::error::Error>>;
//!
//! let work = |token: &floatsnap_runtime::CancellationToken| -> Work {
//!     let mut done = 0;
//!     for _ in 0..3 {
//!         token.check()?;
//!         done += 1;
//!     }
//!     Ok(done)
//! };
//!
//! assert_eq!(work(&token).ok(), Some(3));
//! source.cancel();
//! assert!(work(&token).is_err());
//! ```
//!
//! # Invariants
//!
//! 1. Cancellation is one-way; there is no reset.
//! 2. Dropping the source does not cancel its tokens.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Returned by [`CancellationToken::check`] once the presenter is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("presenter released")
    }
}

impl std::error::Error for Cancelled {}

/// Cloneable, thread-safe view of the release flag.
#[derive(Clone)]
pub struct CancellationToken {
    released: Arc<AtomicBool>,
}

/// The UI-side handle that triggers release.
pub struct CancellationSource {
    released: Arc<AtomicBool>,
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl fmt::Debug for CancellationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationSource")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancellationSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            released: Arc::clone(&self.released),
        }
    }

    /// Mark every token cancelled. Returns `true` on the first call only.
    pub fn cancel(&self) -> bool {
        !self.released.swap(true, Ordering::AcqRel)
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// `Err(Cancelled)` once released, for early exit with `?`.
    #[inline]
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn release_reaches_tokens_on_other_threads() {
        let source = CancellationSource::new();
        let token = source.token();
        let (tx, rx) = std::sync::mpsc::channel();
        let handle = thread::spawn(move || {
            rx.recv().ok();
            token.is_cancelled()
        });
        source.cancel();
        tx.send(()).ok();
        assert!(handle.join().unwrap());
    }

    #[test]
    fn only_first_cancel_reports_true() {
        let source = CancellationSource::default();
        assert!(source.cancel());
        assert!(!source.cancel());
        assert!(source.is_cancelled());
    }

    #[test]
    fn dropping_source_leaves_tokens_live() {
        let source = CancellationSource::new();
        let token = source.token();
        drop(source);
        assert_eq!(token.check(), Ok(()));
    }

    #[test]
    fn check_fails_after_release() {
        let source = CancellationSource::new();
        let token = source.token().clone();
        source.cancel();
        assert_eq!(token.check(), Err(Cancelled));
        assert_eq!(Cancelled.to_string(), "presenter released");
    }
}
