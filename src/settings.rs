//! Game settings
//!
//! Scoring constants, timings and board defaults. Persisted in the same
//! key-value store as the save, under its own key.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Result;
use crate::persistence::KeyValueStore;
use crate::sim::{BoardGenerator, ScoringRules};

/// Tunable game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Scoring ===
    /// Points for each matched pair
    pub match_points: u32,
    /// Extra points for each consecutive match in a combo
    pub combo_bonus: u32,

    // === Board ===
    /// Number of distinct card faces the presentation can draw
    pub face_count: u32,
    pub default_rows: u32,
    pub default_cols: u32,

    // === Timing (seconds) ===
    /// All faces shown at game start before input is accepted
    pub reveal_delay: f32,
    /// Mismatched cards stay visible this long
    pub flip_back_delay: f32,
    /// Matched cards linger for the removal animation
    pub removal_delay: f32,
    /// Pause between the last match and the level-finished announcement
    pub level_finished_delay: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            match_points: 1,
            combo_bonus: 2,

            face_count: DEFAULT_FACE_COUNT,
            default_rows: DEFAULT_ROWS,
            default_cols: DEFAULT_COLS,

            reveal_delay: REVEAL_DELAY_SECS,
            flip_back_delay: FLIP_BACK_DELAY_SECS,
            removal_delay: REMOVAL_DELAY_SECS,
            level_finished_delay: LEVEL_FINISHED_DELAY_SECS,
        }
    }
}

/// Seconds to a duration; negative or non-finite values become zero
fn secs(value: f32) -> Duration {
    Duration::try_from_secs_f32(value).unwrap_or(Duration::ZERO)
}

impl Settings {
    /// Settings with every delay set to zero (headless play, tests)
    pub fn instant() -> Self {
        Self {
            reveal_delay: 0.0,
            flip_back_delay: 0.0,
            removal_delay: 0.0,
            level_finished_delay: 0.0,
            ..Self::default()
        }
    }

    pub fn scoring(&self) -> ScoringRules {
        ScoringRules {
            match_points: self.match_points,
            combo_bonus: self.combo_bonus,
        }
    }

    pub fn generator(&self) -> BoardGenerator {
        BoardGenerator::new(self.face_count)
    }

    pub fn reveal_duration(&self) -> Duration {
        secs(self.reveal_delay)
    }

    pub fn flip_back_duration(&self) -> Duration {
        secs(self.flip_back_delay)
    }

    pub fn removal_duration(&self) -> Duration {
        secs(self.removal_delay)
    }

    pub fn level_finished_duration(&self) -> Duration {
        secs(self.level_finished_delay)
    }

    /// Storage key
    const STORAGE_KEY: &'static str = "memory_match_settings";

    /// Load settings, falling back to defaults if missing or unreadable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Could not read settings: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
