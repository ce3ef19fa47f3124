use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async lock per browser session. Holding the guard makes an open, change and
/// flush of that session's snapshot a single step for concurrent requests.
#[derive(Clone, Default)]
pub struct SessionLocks {
    slots: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl SessionLocks {
    pub fn new() -> Self { Self::default() }

    pub async fn lock(&self, session: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            // Idle slots are only referenced by the map.
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots.entry(session.to_string()).or_default().clone()
        };
        slot.lock_owned().await
    }
}
