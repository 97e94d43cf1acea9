//! In-memory record stores backed by `dashmap`.
//!
//! These stores honour the same ownership scoping as the PostgreSQL
//! repositories. Each one also carries a [`StoreProbe`] so callers can
//! count store calls and simulate an unavailable backend.

pub mod device_token;
pub mod history;
pub mod medication;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use medrem_core::error::AppError;
use medrem_core::result::AppResult;

pub use device_token::MemoryDeviceTokenStore;
pub use history::MemoryMedicationHistoryStore;
pub use medication::MemoryMedicationStore;

/// Call counter and fault switch shared by the in-memory stores.
#[derive(Debug, Default)]
pub struct StoreProbe {
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl StoreProbe {
    /// Number of store calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail with a database error (or recover).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Record a call to `operation`, failing if the store is unavailable.
    fn enter(&self, operation: &str) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::database(format!(
                "in-memory store unavailable during {operation}"
            )));
        }
        Ok(())
    }
}
