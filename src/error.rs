//! Construction errors. Gameplay itself never fails: rejected moves return `false`.

use crate::piece::Shape;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("grid must be at least 1x1, got {height} rows x {width} columns")]
    InvalidDimensions { height: usize, width: usize },
    #[error("shape {shape} needs a {side}-wide spawn area but the grid is {width} wide")]
    GridTooNarrow {
        shape: Shape,
        side: usize,
        width: usize,
    },
    #[error("unknown shape letter: {0:?}")]
    UnknownShape(char),
    #[error("no shapes selected")]
    EmptyShapeSet,
    #[error("gravity interval must stay above zero (base {base_ms} ms, minimum {min_ms} ms)")]
    InvalidGravity { base_ms: u64, min_ms: u64 },
    #[error("tile chance must be within 0..=1, got {0}")]
    InvalidChance(f64),
}
