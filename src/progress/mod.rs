//! Hierarchical unit-count progress and cooperative cancellation.
//!
//! Batch operations report progress through a tree of [`Progress`]
//! reporters: the root covers the whole operation, and each phase or
//! per-item task gets a child covering a fixed share of the parent's
//! units. All counters are atomic, so parallel tasks advance the same
//! reporter without locks. [`CancelToken`] is the cooperative stop flag
//! those tasks poll between units of work.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::LabelpackError;

/// Scaled-integer resolution for fractional child contributions.
const SCALE: u64 = 1_000_000;

/// A shareable fraction observer, as accepted by the batch operations'
/// option structs.
pub type ProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

struct Inner {
    scaled_total: u64,
    scaled_done: AtomicU64,
    parent: Option<ParentLink>,
    observer: Option<ProgressFn>,
}

struct ParentLink {
    parent: Progress,
    scaled_share: u64,
    contributed: AtomicU64,
}

/// A shareable progress reporter counting completed units of a fixed
/// total.
///
/// Reporters form a tree: a child created with [`child`](Progress::child)
/// counts `child_total` units of its own and, as they complete, feeds
/// up to `parent_units` of its parent's units through, proportionally
/// along the way. Advancement is atomic; [`fraction`](Progress::fraction)
/// is clamped to 1.0 and never moves backwards.
#[derive(Clone)]
pub struct Progress(Arc<Inner>);

impl Progress {
    /// Creates a root reporter over `total` units. A zero-unit reporter
    /// reads as already finished.
    pub fn new(total: u64) -> Self {
        Self::build(total, None, None)
    }

    /// Creates a root reporter whose observer receives the new fraction
    /// after every change. Concurrent advances may deliver fractions out
    /// of order; the last delivered value is the true one.
    pub fn with_observer(total: u64, observer: impl Fn(f64) + Send + Sync + 'static) -> Self {
        Self::build(total, None, Some(Arc::new(observer)))
    }

    /// Creates a child reporter covering `parent_units` of this
    /// reporter's units. Completing all `child_total` child units
    /// advances the parent by exactly `parent_units`.
    pub fn child(&self, parent_units: u64, child_total: u64) -> Progress {
        Self::build(
            child_total,
            Some(ParentLink {
                parent: self.clone(),
                scaled_share: parent_units.saturating_mul(SCALE),
                contributed: AtomicU64::new(0),
            }),
            None,
        )
    }

    fn build(total: u64, parent: Option<ParentLink>, observer: Option<ProgressFn>) -> Self {
        Self(Arc::new(Inner {
            scaled_total: total.saturating_mul(SCALE),
            scaled_done: AtomicU64::new(0),
            parent,
            observer,
        }))
    }

    /// Records `n` completed units.
    pub fn advance(&self, n: u64) {
        self.advance_scaled(n.saturating_mul(SCALE));
    }

    /// Forces this reporter to finished and credits any outstanding
    /// remainder of its parent share (covers skipped or dropped units).
    /// Safe to call more than once.
    pub fn complete(&self) {
        self.0
            .scaled_done
            .fetch_max(self.0.scaled_total, Ordering::Relaxed);
        self.sync_parent(true);
        self.notify();
    }

    /// The completed fraction in `[0, 1]`; 1.0 for a zero-unit reporter.
    pub fn fraction(&self) -> f64 {
        if self.0.scaled_total == 0 {
            return 1.0;
        }
        let done = self
            .0
            .scaled_done
            .load(Ordering::Relaxed)
            .min(self.0.scaled_total);
        done as f64 / self.0.scaled_total as f64
    }

    fn advance_scaled(&self, scaled: u64) {
        self.0.scaled_done.fetch_add(scaled, Ordering::Relaxed);
        self.sync_parent(false);
        self.notify();
    }

    /// Brings the parent's view of this reporter in line with its own
    /// completion, feeding through only the delta since the last sync.
    /// `contributed` tracks the high-water mark so racing advances never
    /// double-credit the parent.
    fn sync_parent(&self, finished: bool) {
        let Some(link) = &self.0.parent else { return };
        let target = if finished || self.0.scaled_total == 0 {
            link.scaled_share
        } else {
            let done = self
                .0
                .scaled_done
                .load(Ordering::Relaxed)
                .min(self.0.scaled_total) as u128;
            (link.scaled_share as u128 * done / self.0.scaled_total as u128) as u64
        };
        let prior = link.contributed.fetch_max(target, Ordering::Relaxed);
        if target > prior {
            link.parent.advance_scaled(target - prior);
        }
    }

    fn notify(&self) {
        if let Some(observer) = &self.0.observer {
            observer(self.fraction());
        }
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("fraction", &self.fraction())
            .finish()
    }
}

/// A shared cooperative cancellation flag.
///
/// Clones observe the same flag. Cancellation is a request: in-flight
/// per-item tasks notice it at their next poll and abort, and the batch
/// operation returns [`Cancelled`](LabelpackError::Cancelled) with no
/// partial output.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Returns `Err(Cancelled)` once cancellation has been requested.
    pub fn check(&self) -> Result<(), LabelpackError> {
        if self.is_cancelled() {
            Err(LabelpackError::Cancelled)
        } else {
            Ok(())
        }
    }
}
