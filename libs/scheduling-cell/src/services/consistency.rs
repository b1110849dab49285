use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

/// Per-professional critical sections for booking creation.
///
/// The availability check and the chain append form a check-then-act window;
/// two concurrent bookings for the same professional must not both pass the
/// check. Holding the professional's guard across the whole window closes
/// that race while leaving bookings for different professionals fully
/// parallel.
#[derive(Default)]
pub struct ProfessionalLocks {
    locks: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl ProfessionalLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, professional_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut registry = self
                .locks
                .lock()
                .expect("professional lock registry poisoned");
            Arc::clone(registry.entry(professional_id).or_default())
        };

        debug!("Acquiring booking guard for professional {}", professional_id);
        lock.lock_owned().await
    }
}
