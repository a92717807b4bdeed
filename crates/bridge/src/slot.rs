//! Per-view generation counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

/// Tracks which bridge instance currently owns a view.
///
/// Each activation claims the next generation and cancels the previous
/// instance's token, so its feed task closes its sources even while the
/// old handle is still held.
#[derive(Debug, Default)]
pub struct ViewSlot {
    generation: AtomicU64,
    active: Mutex<Option<CancellationToken>>,
}

impl ViewSlot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Claim the next generation for a new instance, cancelling the
    /// instance it supersedes.
    pub fn claim(self: &Arc<Self>, cancel: CancellationToken) -> GenerationGuard {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = active.replace(cancel.clone()) {
            previous.cancel();
        }
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        GenerationGuard {
            slot: Arc::clone(self),
            generation,
            cancel,
        }
    }

    pub fn current(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

/// Proof of ownership held by one bridge instance.
#[derive(Debug, Clone)]
pub struct GenerationGuard {
    slot: Arc<ViewSlot>,
    generation: u64,
    cancel: CancellationToken,
}

impl GenerationGuard {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while this instance is the slot's latest and has not been
    /// cancelled.
    pub fn is_current(&self) -> bool {
        !self.cancel.is_cancelled() && self.slot.current() == self.generation
    }
}
