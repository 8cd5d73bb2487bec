use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{EntityStore, StoreError};
use crate::model::ChampionshipData;

/// Store kept entirely in memory. Used for previews and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<ChampionshipData>,
    commits: AtomicUsize,
}

impl MemoryStore {
    pub fn new(data: ChampionshipData) -> Self {
        Self {
            data: Mutex::new(data),
            commits: AtomicUsize::new(0),
        }
    }

    /// Number of successful commits so far
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

impl EntityStore for MemoryStore {
    fn load(&self) -> Result<ChampionshipData, StoreError> {
        let guard = self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.clone())
    }

    fn commit(&self, data: &ChampionshipData) -> Result<(), StoreError> {
        let mut guard = self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = data.clone();
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
