//! Seeded board generation
//!
//! Produces the face layout of a board from a seed. The swap loop draws
//! its partner index from the whole sequence on every step instead of the
//! shrinking suffix, so the result is not a uniform permutation. Saved
//! games are rebuilt from their seed, so the exact draw order must never
//! change.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Identifier of a card face; exactly two cards on a board share one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FaceId(pub u32);

/// Builds shuffled face sequences from a fixed pool of distinct faces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardGenerator {
    face_count: u32,
}

impl BoardGenerator {
    /// Generator drawing from `face_count` distinct faces (ids `0..face_count`)
    pub fn new(face_count: u32) -> Self {
        Self { face_count }
    }

    /// Number of distinct faces available
    pub fn face_count(&self) -> u32 {
        self.face_count
    }

    /// Generate `2 * pair_count` faces, each face appearing exactly twice
    pub fn generate(&self, pair_count: u32, seed: u64) -> Result<Vec<FaceId>> {
        if pair_count > self.face_count {
            return Err(GameError::InsufficientFaces {
                required: pair_count,
                available: self.face_count,
            });
        }

        // The first `pair_count` faces of the pool, duplicated for pairs
        let mut faces: Vec<FaceId> = (0..pair_count).map(FaceId).collect();
        faces.extend_from_within(..);

        let mut rng = Pcg32::seed_from_u64(seed);
        let len = faces.len() as u32;
        for i in 0..faces.len() {
            // u32 range keeps the draw sequence identical on 32 and 64 bit targets
            let j = rng.random_range(0..len) as usize;
            faces.swap(i, j);
        }

        Ok(faces)
    }
}
