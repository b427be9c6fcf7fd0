//! Process-wide counters that decide whether the DLL may be unloaded.

use std::sync::atomic::{AtomicU32, Ordering};

static LIVE_OBJECTS: AtomicU32 = AtomicU32::new(0);
static SERVER_LOCKS: AtomicU32 = AtomicU32::new(0);

/// Held by every COM object this module hands out.
pub struct ObjectGuard(());

impl ObjectGuard {
    pub fn new() -> Self {
        LIVE_OBJECTS.fetch_add(1, Ordering::SeqCst);
        Self(())
    }
}

impl Default for ObjectGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ObjectGuard {
    fn drop(&mut self) {
        LIVE_OBJECTS.fetch_sub(1, Ordering::SeqCst);
    }
}

/// `IClassFactory::LockServer`. Unbalanced unlocks are ignored.
pub fn lock_server(lock: bool) {
    if lock {
        SERVER_LOCKS.fetch_add(1, Ordering::SeqCst);
    } else {
        let _ = SERVER_LOCKS.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }
}

pub fn live_objects() -> u32 {
    LIVE_OBJECTS.load(Ordering::SeqCst)
}

pub fn can_unload() -> bool {
    live_objects() == 0 && SERVER_LOCKS.load(Ordering::SeqCst) == 0
}
