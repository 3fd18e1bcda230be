// SPDX-License-Identifier: Apache-2.0

use crate::receivers::file::error::Result;
use crate::receivers::file::persistence::schema::TailStates;

/// Storage for tail state that survives process restarts.
///
/// A store has a single writer: `save` replaces whatever was stored before,
/// nothing is merged.
pub trait OffsetStore {
    /// Load all tail states. Never fails: a store that cannot be read behaves
    /// like an empty one.
    fn load(&self) -> TailStates;

    /// Replace the stored states.
    fn save(&self, states: &TailStates) -> Result<()>;
}

/// In-memory store for testing
#[cfg(test)]
pub struct MockStore {
    states: std::sync::Mutex<TailStates>,
    fail_saves: bool,
    saves: portable_atomic::AtomicU64,
}

#[cfg(test)]
impl MockStore {
    /// Create an empty mock store
    pub fn new() -> Self {
        Self {
            states: std::sync::Mutex::new(TailStates::new()),
            fail_saves: false,
            saves: portable_atomic::AtomicU64::new(0),
        }
    }

    /// Create a mock store whose saves always fail
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::new()
        }
    }

    /// Seed the store with a state
    pub fn with_state(self, state: crate::receivers::file::persistence::TailState) -> Self {
        self.states.lock().unwrap().insert(state);
        self
    }

    /// Number of successful saves
    pub fn save_count(&self) -> u64 {
        self.saves.load(portable_atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl OffsetStore for MockStore {
    fn load(&self) -> TailStates {
        self.states.lock().unwrap().clone()
    }

    fn save(&self, states: &TailStates) -> Result<()> {
        if self.fail_saves {
            return Err(crate::receivers::file::error::Error::Persistence(
                "mock save failure".to_string(),
            ));
        }
        *self.states.lock().unwrap() = states.clone();
        self.saves.fetch_add(1, portable_atomic::Ordering::SeqCst);
        Ok(())
    }
}
