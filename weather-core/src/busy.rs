use std::sync::atomic::{AtomicBool, Ordering};

/// Allows one operation at a time; a second start is refused, not queued.
#[derive(Debug, Default)]
pub struct BusyFlag(AtomicBool);

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the flag busy, or return `None` if an operation is already running.
    /// The flag is released when the guard drops.
    pub fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.0))
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
