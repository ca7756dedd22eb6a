//! The persisted form of an in-progress game
//!
//! Only what is needed to rebuild the board from its seed is stored:
//! dimensions, counters and the set of matched card indices.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::sim::{Board, BoardGenerator, Progress, card_count};

/// Current record format
pub const SAVE_VERSION: u32 = 1;

/// Serialized session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecord {
    pub version: u32,
    pub seed: u64,
    pub rows: u32,
    pub cols: u32,
    pub moves: u32,
    pub pairs_found: u32,
    pub score: u32,
    pub combo_count: u32,
    pub matched_indices: BTreeSet<usize>,
    /// False once the level has been finished
    pub in_progress: bool,
}

/// A board and counters rebuilt from a record
#[derive(Debug, Clone)]
pub struct RestoredGame {
    pub board: Board,
    pub progress: Progress,
    pub score: u32,
    pub combo: u32,
}

fn corrupt(msg: impl Into<String>) -> GameError {
    GameError::CorruptSave(msg.into())
}

impl SaveRecord {
    /// Rebuild the board from the seed and fast-forward matched cards to removed
    pub fn restore(&self, generator: &BoardGenerator) -> Result<RestoredGame> {
        if self.version != SAVE_VERSION {
            return Err(corrupt(format!("unknown version {}", self.version)));
        }

        let count = card_count(self.rows, self.cols)
            .map_err(|_| corrupt(format!("bad grid {}x{}", self.rows, self.cols)))?;
        let total_pairs = (count / 2) as u32;

        if let Some(&i) = self.matched_indices.iter().find(|&&i| i >= count) {
            return Err(corrupt(format!("matched index {i} out of range")));
        }
        if self.matched_indices.len() % 2 != 0 {
            return Err(corrupt("odd number of matched cards"));
        }
        if self.pairs_found as usize != self.matched_indices.len() / 2 {
            return Err(corrupt(format!(
                "{} pairs found but {} matched cards",
                self.pairs_found,
                self.matched_indices.len()
            )));
        }
        if self.pairs_found >= total_pairs {
            return Err(corrupt("finished level marked in progress"));
        }
        if self.moves < self.pairs_found {
            return Err(corrupt("fewer moves than pairs found"));
        }
        if self.combo_count > self.pairs_found {
            return Err(corrupt("combo longer than pairs found"));
        }

        let mut board = Board::deal(self.rows, self.cols, self.seed, generator)?;

        for &i in &self.matched_indices {
            let whole_pair = board
                .partner_of(i)
                .is_some_and(|p| self.matched_indices.contains(&p));
            if !whole_pair {
                return Err(corrupt(format!("matched card {i} without its pair")));
            }
        }
        for &i in &self.matched_indices {
            if let Some(card) = board.card_mut(i) {
                card.restore_removed();
            }
        }

        Ok(RestoredGame {
            board,
            progress: Progress {
                moves: self.moves,
                pairs_found: self.pairs_found,
                total_pairs,
                matched: self.matched_indices.clone(),
            },
            score: self.score,
            combo: self.combo_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::CardState;

    fn generator() -> BoardGenerator {
        BoardGenerator::new(32)
    }

    /// Record for a 4x4 seed-7 board with the pairs of cards 0 and 1 matched
    fn two_pair_record() -> SaveRecord {
        let board = Board::deal(4, 4, 7, &generator()).unwrap();
        let mut matched = BTreeSet::new();
        for i in [0, 1] {
            matched.insert(i);
            matched.insert(board.partner_of(i).unwrap());
        }
        // Cards 0 and 1 might be partners; top up with the next pair if so
        let mut next = 2;
        while matched.len() < 4 {
            if !matched.contains(&next) {
                matched.insert(next);
                matched.insert(board.partner_of(next).unwrap());
            }
            next += 1;
        }
        SaveRecord {
            version: SAVE_VERSION,
            seed: 7,
            rows: 4,
            cols: 4,
            moves: 5,
            pairs_found: 2,
            score: 4,
            combo_count: 2,
            matched_indices: matched,
            in_progress: true,
        }
    }

    #[test]
    fn test_restore_marks_matched_removed() {
        let record = two_pair_record();
        let restored = record.restore(&generator()).unwrap();
        let fresh = Board::deal(4, 4, 7, &generator()).unwrap();

        for (card, fresh_card) in restored.board.cards().iter().zip(fresh.cards()) {
            assert_eq!(card.face, fresh_card.face);
            let expected = if record.matched_indices.contains(&card.index) {
                CardState::Removed
            } else {
                CardState::FaceDown
            };
            assert_eq!(card.state(), expected);
        }
        assert_eq!(restored.progress.pairs_found, 2);
        assert_eq!(restored.progress.total_pairs, 8);
        assert_eq!(restored.progress.moves, 5);
        assert_eq!(restored.score, 4);
        assert_eq!(restored.combo, 2);
    }

    #[test]
    fn test_json_layout() {
        let record = two_pair_record();
        let json = serde_json::to_value(&record).unwrap();
        for key in [
            "seed",
            "rows",
            "cols",
            "moves",
            "pairsFound",
            "score",
            "comboCount",
            "matchedIndices",
            "inProgress",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json["matchedIndices"].is_array());
    }

    #[test]
    fn test_matched_order_does_not_matter() {
        let record = two_pair_record();
        let mut json = serde_json::to_value(&record).unwrap();
        let mut indices: Vec<usize> = record.matched_indices.iter().copied().collect();
        indices.reverse();
        json["matchedIndices"] = serde_json::json!(indices);
        let parsed: SaveRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
    }

    fn assert_corrupt(record: SaveRecord) {
        let err = record.restore(&generator()).unwrap_err();
        assert!(matches!(err, GameError::CorruptSave(_)), "got {err:?}");
    }

    #[test]
    fn test_odd_grid_is_corrupt() {
        assert_corrupt(SaveRecord {
            rows: 3,
            cols: 3,
            ..two_pair_record()
        });
        assert_corrupt(SaveRecord {
            rows: 0,
            ..two_pair_record()
        });
    }

    #[test]
    fn test_index_out_of_range_is_corrupt() {
        let mut record = two_pair_record();
        record.matched_indices.insert(16);
        record.matched_indices.insert(17);
        record.pairs_found = 3;
        assert_corrupt(record);
    }

    #[test]
    fn test_inconsistent_counters_are_corrupt() {
        let mut odd = two_pair_record();
        let first = *odd.matched_indices.iter().next().unwrap();
        odd.matched_indices.remove(&first);
        assert_corrupt(odd);

        assert_corrupt(SaveRecord {
            pairs_found: 3,
            ..two_pair_record()
        });
        assert_corrupt(SaveRecord {
            moves: 1,
            ..two_pair_record()
        });
        assert_corrupt(SaveRecord {
            combo_count: 3,
            ..two_pair_record()
        });
        assert_corrupt(SaveRecord {
            version: 99,
            ..two_pair_record()
        });
    }

    #[test]
    fn test_split_pairs_are_corrupt() {
        let board = Board::deal(4, 4, 7, &generator()).unwrap();
        // Two cards with different faces
        let a = 0;
        let b = (1..16)
            .find(|&i| board.cards()[i].face != board.cards()[a].face)
            .unwrap();
        assert_corrupt(SaveRecord {
            pairs_found: 1,
            combo_count: 0,
            matched_indices: [a, b].into_iter().collect(),
            ..two_pair_record()
        });
    }

    #[test]
    fn test_insufficient_faces_propagates() {
        let err = two_pair_record()
            .restore(&BoardGenerator::new(4))
            .unwrap_err();
        assert!(matches!(err, GameError::InsufficientFaces { .. }));
    }
}
