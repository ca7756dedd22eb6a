//! Card and board model
//!
//! The board is a flat, row-major list of cards. A card's index is its
//! stable identity and is what gets persisted.

use serde::{Deserialize, Serialize};

use super::shuffle::{BoardGenerator, FaceId};
use crate::error::{GameError, Result};

/// Lifecycle of a single card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CardState {
    #[default]
    FaceDown,
    FaceUp,
    /// Resolved as half of a pair, removal still pending
    Matched,
    Removed,
}

/// A card on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub index: usize,
    pub face: FaceId,
    state: CardState,
}

impl Card {
    pub fn new(index: usize, face: FaceId) -> Self {
        Self {
            index,
            face,
            state: CardState::FaceDown,
        }
    }

    pub fn state(&self) -> CardState {
        self.state
    }

    /// Whether a player may pick this card
    pub fn is_selectable(&self) -> bool {
        self.state == CardState::FaceDown
    }

    /// Move to `next` if the lifecycle allows it. Returns false otherwise.
    pub fn transition(&mut self, next: CardState) -> bool {
        use CardState::*;
        let allowed = matches!(
            (self.state, next),
            (FaceDown, FaceUp) | (FaceUp, FaceDown) | (FaceUp, Matched) | (Matched, Removed)
        );
        if allowed {
            self.state = next;
        }
        allowed
    }

    /// Fast-forward a face-down card straight to removed (resume only)
    pub(crate) fn restore_removed(&mut self) {
        debug_assert_eq!(self.state, CardState::FaceDown);
        self.state = CardState::Removed;
    }
}

/// Validate grid dimensions and return the card count
pub fn card_count(rows: u32, cols: u32) -> Result<usize> {
    match rows.checked_mul(cols) {
        Some(n) if n >= 2 && n % 2 == 0 => Ok(n as usize),
        _ => Err(GameError::InvalidGridSize { rows, cols }),
    }
}

/// The full layout of a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: u32,
    cols: u32,
    seed: u64,
    cards: Vec<Card>,
}

impl Board {
    /// Deal a fresh board; all cards start face down
    pub fn deal(rows: u32, cols: u32, seed: u64, generator: &BoardGenerator) -> Result<Self> {
        let count = card_count(rows, cols)?;
        let faces = generator.generate((count / 2) as u32, seed)?;

        let cards = faces
            .into_iter()
            .enumerate()
            .map(|(index, face)| Card::new(index, face))
            .collect();

        Ok(Self {
            rows,
            cols,
            seed,
            cards,
        })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn total_pairs(&self) -> u32 {
        (self.cards.len() / 2) as u32
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub(crate) fn card_mut(&mut self, index: usize) -> Option<&mut Card> {
        self.cards.get_mut(index)
    }

    /// Index of the other card sharing `index`'s face
    pub fn partner_of(&self, index: usize) -> Option<usize> {
        let face = self.cards.get(index)?.face;
        self.cards
            .iter()
            .position(|c| c.face == face && c.index != index)
    }

    /// (row, col) of a card index
    pub fn position(&self, index: usize) -> (u32, u32) {
        let cols = self.cols as usize;
        ((index / cols) as u32, (index % cols) as u32)
    }
}
