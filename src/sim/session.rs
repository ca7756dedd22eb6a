//! Game session orchestrator
//!
//! Owns the board, the resolver, the score engine, the deferred-task
//! queue and the event bus. Every mutation happens inside one of the
//! public calls below, and the events it produced are published in order
//! once the call has finished mutating.

use std::collections::BTreeSet;
use std::time::Duration;

use super::board::{Board, CardState};
use super::event::{EventBus, GameEvent, SubscriberId};
use super::resolver::{Progress, ResolverState, SelectOutcome, TurnResolver};
use super::scheduler::Scheduler;
use super::score::ScoreEngine;
use super::shuffle::BoardGenerator;
use crate::error::{GameError, Result};
use crate::persistence::{SAVE_VERSION, SaveRecord, SessionStore};
use crate::settings::Settings;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// No board yet
    NotStarted,
    /// Faces on show at game start, input ignored
    Preview,
    Playing,
    /// Every pair found
    Finished,
}

/// Work deferred to a later clock tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    EndPreview,
    FlipBack { first: usize, second: usize },
    Remove { first: usize, second: usize },
    AnnounceLevelFinished,
}

#[derive(Debug)]
pub struct GameSession {
    settings: Settings,
    generator: BoardGenerator,
    board: Option<Board>,
    progress: Progress,
    resolver: TurnResolver,
    score: ScoreEngine,
    scheduler: Scheduler<Deferred>,
    bus: EventBus,
    store: SessionStore,
    phase: GamePhase,
}

impl GameSession {
    pub fn new(settings: Settings, store: SessionStore) -> Self {
        Self {
            generator: settings.generator(),
            score: ScoreEngine::new(settings.scoring()),
            settings,
            board: None,
            progress: Progress::default(),
            resolver: TurnResolver::new(),
            scheduler: Scheduler::new(),
            bus: EventBus::new(),
            store,
            phase: GamePhase::NotStarted,
        }
    }

    // === Observers ===

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.bus.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.bus.unsubscribe(id)
    }

    // === Commands ===

    /// Deal a new board and start a fresh game.
    ///
    /// On error the current session is left as it was.
    pub fn setup_game(&mut self, rows: u32, cols: u32, seed: Option<u64>) -> Result<()> {
        let seed = seed.unwrap_or_else(rand::random);
        let board = Board::deal(rows, cols, seed, &self.generator).inspect_err(|e| {
            log::warn!("Refusing to set up {}x{} game: {}", rows, cols, e);
        })?;

        log::info!(
            "New game {}x{} (seed {}, {} pairs)",
            rows,
            cols,
            seed,
            board.total_pairs()
        );
        let progress = Progress::new(board.total_pairs());
        self.start(board, progress, None);
        Ok(())
    }

    /// Replace the current game with the saved one.
    ///
    /// On error the current session is left as it was and the caller is
    /// expected to fall back to [`GameSession::setup_game`].
    pub fn load_game(&mut self) -> Result<()> {
        let restored = self.store.load(&self.generator).inspect_err(|e| {
            if !matches!(e, GameError::NotFound) {
                log::warn!("Could not resume saved game: {}", e);
            }
        })?;
        self.start(
            restored.board,
            restored.progress,
            Some((restored.score, restored.combo)),
        );
        Ok(())
    }

    /// Persist the current game
    pub fn save_game(&mut self) -> Result<()> {
        let record = self.snapshot().ok_or(GameError::NotFound)?;
        self.store.save(&record)
    }

    /// Delete the save and restart the current layout from scratch
    pub fn reset_progress(&mut self) -> Result<()> {
        self.store.clear()?;
        if let Some(board) = &self.board {
            let (rows, cols, seed) = (board.rows(), board.cols(), board.seed());
            self.setup_game(rows, cols, Some(seed))?;
        }
        Ok(())
    }

    /// Pick the card at `index`
    pub fn select(&mut self, index: usize) -> SelectOutcome {
        if self.phase != GamePhase::Playing {
            return SelectOutcome::Ignored;
        }
        let Some(board) = self.board.as_mut() else {
            return SelectOutcome::Ignored;
        };

        let mut turn = Vec::new();
        let outcome = self.resolver.select(
            index,
            board,
            &mut self.progress,
            self.settings.flip_back_duration().as_secs_f32(),
            &mut turn,
        );

        // Score events follow the outcome event they stem from
        let mut events = Vec::with_capacity(turn.len() + 2);
        for event in turn {
            events.push(event.clone());
            self.score.apply(&event, &mut events);
        }

        match outcome {
            SelectOutcome::Mismatched { first, second } => {
                self.scheduler.schedule(
                    self.settings.flip_back_duration(),
                    Deferred::FlipBack { first, second },
                );
            }
            SelectOutcome::Matched {
                first,
                second,
                level_complete,
            } => {
                self.scheduler.schedule(
                    self.settings.removal_duration(),
                    Deferred::Remove { first, second },
                );
                if level_complete {
                    log::info!(
                        "All {} pairs found in {} moves, score {}",
                        self.progress.total_pairs,
                        self.progress.moves,
                        self.score.score()
                    );
                    self.phase = GamePhase::Finished;
                    self.scheduler.schedule(
                        self.settings.level_finished_duration(),
                        Deferred::AnnounceLevelFinished,
                    );
                }
            }
            SelectOutcome::Flipped | SelectOutcome::Ignored => {}
        }

        self.bus.publish_all(&events);
        outcome
    }

    /// Advance the clock by `dt`, running every deferred task that comes due
    pub fn advance(&mut self, dt: Duration) {
        let deadline = self.scheduler.now().saturating_add(dt);
        let mut events = Vec::new();
        while let Some(task) = self.scheduler.pop_due(deadline) {
            self.run(task, &mut events);
        }
        self.scheduler.settle(deadline);
        self.bus.publish_all(&events);
    }

    // === Queries ===

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn seed(&self) -> Option<u64> {
        self.board.as_ref().map(Board::seed)
    }

    pub fn moves(&self) -> u32 {
        self.progress.moves
    }

    pub fn pairs_found(&self) -> u32 {
        self.progress.pairs_found
    }

    pub fn total_pairs(&self) -> u32 {
        self.progress.total_pairs
    }

    pub fn matched_indices(&self) -> &BTreeSet<usize> {
        &self.progress.matched
    }

    pub fn score(&self) -> u32 {
        self.score.score()
    }

    pub fn combo(&self) -> u32 {
        self.score.combo()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::Finished
    }

    pub fn resolver_state(&self) -> ResolverState {
        self.resolver.state()
    }

    /// Deferred tasks not yet run
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SessionStore {
        &mut self.store
    }

    /// The persisted form of the current game, if there is one
    pub fn snapshot(&self) -> Option<SaveRecord> {
        let board = self.board.as_ref()?;
        Some(SaveRecord {
            version: SAVE_VERSION,
            seed: board.seed(),
            rows: board.rows(),
            cols: board.cols(),
            moves: self.progress.moves,
            pairs_found: self.progress.pairs_found,
            score: self.score.score(),
            combo_count: self.score.combo(),
            matched_indices: self.progress.matched.clone(),
            in_progress: !self.progress.is_complete(),
        })
    }

    // === Internals ===

    /// Install a board wholesale; `restored` carries (score, combo) on resume
    fn start(&mut self, board: Board, progress: Progress, restored: Option<(u32, u32)>) {
        // Callbacks scheduled for the old board must never touch the new one
        self.scheduler.clear();
        self.resolver.clear();

        let mut events = vec![GameEvent::GameStart {
            pairs_found: progress.pairs_found,
            total_pairs: progress.total_pairs,
            moves: progress.moves,
        }];
        match restored {
            Some((score, combo)) => self.score.restore(score, combo, &mut events),
            None => self.score.reset(&mut events),
        }

        self.board = Some(board);
        self.progress = progress;

        let reveal = self.settings.reveal_duration();
        if reveal.is_zero() {
            self.phase = GamePhase::Playing;
            events.push(GameEvent::PreviewFinished);
        } else {
            self.phase = GamePhase::Preview;
            self.scheduler.schedule(reveal, Deferred::EndPreview);
        }

        self.bus.publish_all(&events);
    }

    fn run(&mut self, task: Deferred, events: &mut Vec<GameEvent>) {
        let Some(board) = self.board.as_mut() else {
            return;
        };

        match task {
            Deferred::EndPreview => {
                if self.phase == GamePhase::Preview {
                    self.phase = GamePhase::Playing;
                    events.push(GameEvent::PreviewFinished);
                }
            }
            Deferred::FlipBack { first, second } => {
                for i in [first, second] {
                    if let Some(card) = board.card_mut(i) {
                        let hidden = card.transition(CardState::FaceDown);
                        debug_assert!(hidden, "flip-back of card {i} that was not face up");
                    }
                }
                log::debug!("Cards {} and {} flipped back", first, second);
                events.push(GameEvent::CardsHidden { first, second });
            }
            Deferred::Remove { first, second } => {
                for i in [first, second] {
                    if let Some(card) = board.card_mut(i) {
                        let removed = card.transition(CardState::Removed);
                        debug_assert!(removed, "removal of card {i} that was not matched");
                    }
                }
                events.push(GameEvent::CardsRemoved { first, second });
            }
            Deferred::AnnounceLevelFinished => {
                log::info!("Level finished");
                events.push(GameEvent::LevelFinished);
            }
        }
    }
}
