//! Memory Match - tile-matching memory game engine
//!
//! Core modules:
//! - `sim`: Deterministic game state (board, turns, scoring, events, timers)
//! - `persistence`: Save/resume of in-progress games
//! - `settings`: Tunable scoring and timing
//! - `error`: Error types

pub mod error;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use error::{GameError, Result};
pub use settings::Settings;
pub use sim::{GameEvent, GamePhase, GameSession, SelectOutcome};

/// Game configuration constants
pub mod consts {
    /// Distinct card faces in the default face set
    pub const DEFAULT_FACE_COUNT: u32 = 32;

    /// Default grid
    pub const DEFAULT_ROWS: u32 = 4;
    pub const DEFAULT_COLS: u32 = 4;

    /// Faces shown at game start before play begins (seconds)
    pub const REVEAL_DELAY_SECS: f32 = 1.0;
    /// Mismatched pair stays face up this long (seconds)
    pub const FLIP_BACK_DELAY_SECS: f32 = 0.5;
    /// Matched pair scale/fade-out before removal (seconds)
    pub const REMOVAL_DELAY_SECS: f32 = 1.0;
    /// Pause before announcing level complete (seconds)
    pub const LEVEL_FINISHED_DELAY_SECS: f32 = 1.0;
}
