//! Two-card turn resolution
//!
//! `Idle --select--> OneSelected --select--> (resolve) --> Idle`.
//! The selection buffer is emptied as soon as a pair resolves, whatever the
//! outcome, so the next selection always starts a new turn. Selecting a
//! card that is not face down is ignored without emitting anything.

use std::collections::BTreeSet;

use super::board::{Board, CardState};
use super::event::GameEvent;

/// Turn and pair counters of a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    /// Completed two-card turns
    pub moves: u32,
    pub pairs_found: u32,
    pub total_pairs: u32,
    /// Indices of every card resolved as part of a match
    pub matched: BTreeSet<usize>,
}

impl Progress {
    pub fn new(total_pairs: u32) -> Self {
        Self {
            total_pairs,
            ..Default::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total_pairs > 0 && self.pairs_found == self.total_pairs
    }
}

/// Resolver state as seen from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Idle,
    OneSelected(usize),
}

/// What a call to `select` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Not a legal selection; nothing changed
    Ignored,
    /// First card of a turn is face up
    Flipped,
    Matched {
        first: usize,
        second: usize,
        /// This match found the last pair
        level_complete: bool,
    },
    /// Both cards stay face up until the flip-back fires
    Mismatched { first: usize, second: usize },
}

#[derive(Debug, Clone, Default)]
pub struct TurnResolver {
    selection: Option<usize>,
}

impl TurnResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ResolverState {
        match self.selection {
            None => ResolverState::Idle,
            Some(index) => ResolverState::OneSelected(index),
        }
    }

    /// Forget any half-finished turn
    pub fn clear(&mut self) {
        self.selection = None;
    }

    /// Select the card at `index`, resolving the turn if it is the second
    pub fn select(
        &mut self,
        index: usize,
        board: &mut Board,
        progress: &mut Progress,
        flip_back_delay: f32,
        events: &mut Vec<GameEvent>,
    ) -> SelectOutcome {
        let Some(card) = board.card_mut(index) else {
            return SelectOutcome::Ignored;
        };
        if !card.is_selectable() {
            return SelectOutcome::Ignored;
        }

        card.transition(CardState::FaceUp);
        events.push(GameEvent::CardFlip { index });

        let Some(first) = self.selection.take() else {
            self.selection = Some(index);
            return SelectOutcome::Flipped;
        };
        // The first card is face up, so it cannot have been picked again
        debug_assert_ne!(first, index);

        progress.moves += 1;
        events.push(GameEvent::TurnFinished {
            moves: progress.moves,
        });

        let cards = board.cards();
        debug_assert_eq!(cards[first].state(), CardState::FaceUp);
        if cards[first].face != cards[index].face {
            events.push(GameEvent::TilesMismatch { flip_back_delay });
            return SelectOutcome::Mismatched {
                first,
                second: index,
            };
        }

        for i in [first, index] {
            if let Some(card) = board.card_mut(i) {
                let moved = card.transition(CardState::Matched);
                debug_assert!(moved, "matched card {i} was not face up");
            }
            progress.matched.insert(i);
        }
        progress.pairs_found += 1;
        debug_assert!(progress.pairs_found <= progress.total_pairs);
        events.push(GameEvent::TilesMatch {
            pairs_found: progress.pairs_found,
            total_pairs: progress.total_pairs,
        });

        SelectOutcome::Matched {
            first,
            second: index,
            level_complete: progress.is_complete(),
        }
    }
}
