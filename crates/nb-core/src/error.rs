//! Error taxonomy for board documents and transforms.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while editing, loading, or saving a board.
#[derive(Debug, Error)]
pub enum BoardError {
    /// The bytes are not a valid serialized board document.
    #[error("failed to parse board document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A board file could not be read or written.
    #[error("I/O error on `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A transform with a zero, negative, or non-finite component was proposed.
    #[error(
        "invalid transform: offset ({offset_x}, {offset_y}), scale ({scale_x}, {scale_y}); \
         scales must be positive and all values finite"
    )]
    InvalidTransform {
        offset_x: f64,
        offset_y: f64,
        scale_x: f64,
        scale_y: f64,
    },

    /// A note position that is NaN or infinite, either supplied directly or
    /// produced by mapping through the canvas transform.
    #[error("invalid note position ({x}, {y}); coordinates must be finite")]
    InvalidPosition { x: f64, y: f64 },

    /// A note was addressed by z-order index past the end of the board.
    #[error("no note at index {index} (board has {count})")]
    NoteIndex { index: usize, count: usize },

    /// Editor configuration holds an unusable value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BoardError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;
