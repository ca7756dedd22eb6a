//! Deterministic game-state engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Virtual clock only (the host advances it)
//! - Stable card order (by board index)
//! - No rendering, audio or platform dependencies

pub mod board;
pub mod event;
pub mod resolver;
pub mod scheduler;
pub mod score;
pub mod session;
pub mod shuffle;

pub use board::{Board, Card, CardState, card_count};
pub use event::{EventBus, GameEvent, SubscriberId};
pub use resolver::{Progress, ResolverState, SelectOutcome, TurnResolver};
pub use scheduler::Scheduler;
pub use score::{ScoreEngine, ScoringRules};
pub use session::{GamePhase, GameSession};
pub use shuffle::{BoardGenerator, FaceId};
