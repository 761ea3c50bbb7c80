use std::sync::atomic::{AtomicU64, Ordering};

/// Stable identity of an object within one editing session.
pub type ElementId = u64;

// Load epochs are process-wide so a completion can never match another surface's epoch
static NEXT_LOAD_EPOCH: AtomicU64 = AtomicU64::new(1);

pub fn next_load_epoch() -> u64 {
    NEXT_LOAD_EPOCH.fetch_add(1, Ordering::SeqCst)
}

/// Hands out object identities for one Scene: first id is 1, never reused.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: ElementId,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdGenerator {
    pub fn next_id(&mut self) -> ElementId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to `next_id` will return
    pub fn peek(&self) -> ElementId {
        self.next
    }
}
