//! Error types for the memory game engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    /// rows * cols is odd, zero, or overflows
    #[error("Invalid grid size {rows}x{cols}: card count must be even and at least 2")]
    InvalidGridSize { rows: u32, cols: u32 },

    #[error("Not enough card faces: {required} pairs required, {available} faces available")]
    InsufficientFaces { required: u32, available: u32 },

    #[error("Corrupt save: {0}")]
    CorruptSave(String),

    /// No resumable game is stored
    #[error("No saved game found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
