//! Save/load of in-progress games
//!
//! Features:
//! - Versioned JSON record
//! - Board rebuilt from seed, matched cards fast-forwarded to removed
//! - Corruption detection (caller falls back to a fresh game)
//! - Pluggable key-value backend (memory, files, LocalStorage)

pub mod record;
pub mod store;

pub use record::{RestoredGame, SAVE_VERSION, SaveRecord};
#[cfg(not(target_arch = "wasm32"))]
pub use store::FileStore;
#[cfg(target_arch = "wasm32")]
pub use store::LocalStorage;
pub use store::{KeyValueStore, MemoryStore};

use crate::error::{GameError, Result};
use crate::sim::BoardGenerator;

/// Reads and writes the single saved game
pub struct SessionStore {
    store: Box<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Storage key
    const STORAGE_KEY: &'static str = "memory_match_save";

    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Store backed by a fresh [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    pub fn backend(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn backend_mut(&mut self) -> &mut dyn KeyValueStore {
        self.store.as_mut()
    }

    pub fn save(&mut self, record: &SaveRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        self.store.set(Self::STORAGE_KEY, &json)?;
        log::info!(
            "Game saved ({}/{} pairs, {} moves)",
            record.pairs_found,
            record.rows.saturating_mul(record.cols) / 2,
            record.moves
        );
        Ok(())
    }

    /// Fetch the stored record. A finished game counts as not found.
    pub fn load_record(&self) -> Result<SaveRecord> {
        let json = self
            .store
            .get(Self::STORAGE_KEY)?
            .ok_or(GameError::NotFound)?;
        let record: SaveRecord = serde_json::from_str(&json)
            .map_err(|e| GameError::CorruptSave(format!("unreadable record: {e}")))?;
        if !record.in_progress {
            return Err(GameError::NotFound);
        }
        Ok(record)
    }

    /// Load and rebuild the saved game
    pub fn load(&self, generator: &BoardGenerator) -> Result<RestoredGame> {
        let restored = self.load_record()?.restore(generator)?;
        log::info!(
            "Game loaded ({}/{} pairs, {} moves)",
            restored.progress.pairs_found,
            restored.progress.total_pairs,
            restored.progress.moves
        );
        Ok(restored)
    }

    /// Delete the saved game
    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(Self::STORAGE_KEY)?;
        log::info!("Saved game cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn record(in_progress: bool) -> SaveRecord {
        SaveRecord {
            version: SAVE_VERSION,
            seed: 3,
            rows: 2,
            cols: 2,
            moves: 0,
            pairs_found: 0,
            score: 0,
            combo_count: 0,
            matched_indices: BTreeSet::new(),
            in_progress,
        }
    }

    #[test]
    fn test_empty_store_not_found() {
        let store = SessionStore::in_memory();
        assert!(matches!(store.load_record(), Err(GameError::NotFound)));
    }

    #[test]
    fn test_save_then_load() {
        let mut store = SessionStore::in_memory();
        store.save(&record(true)).unwrap();
        assert_eq!(store.load_record().unwrap(), record(true));
        let restored = store.load(&BoardGenerator::new(8)).unwrap();
        assert_eq!(restored.board.len(), 4);
    }

    #[test]
    fn test_finished_game_not_resumable() {
        let mut store = SessionStore::in_memory();
        store.save(&record(false)).unwrap();
        assert!(matches!(store.load_record(), Err(GameError::NotFound)));
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let mut backend = MemoryStore::new();
        backend
            .set(SessionStore::STORAGE_KEY, "{\"seed\": \"x\"}")
            .unwrap();
        let store = SessionStore::new(Box::new(backend));
        assert!(matches!(store.load_record(), Err(GameError::CorruptSave(_))));
    }

    #[test]
    fn test_clear() {
        let mut store = SessionStore::in_memory();
        store.save(&record(true)).unwrap();
        store.clear().unwrap();
        assert!(matches!(store.load_record(), Err(GameError::NotFound)));
    }
}
