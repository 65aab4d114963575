use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Liveness flag owned by a controller. Closed on drop.
#[derive(Debug)]
pub struct Scope {
    open: Arc<AtomicBool>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Handle for async work that must not outlive the owner.
    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle {
            open: Arc::clone(&self.open),
        }
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.close();
    }
}

#[derive(Debug, Clone)]
pub struct ScopeHandle {
    open: Arc<AtomicBool>,
}

impl ScopeHandle {
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}
