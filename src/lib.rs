//! Tetris 2048: falling tetrominoes made of numbered tiles that merge like 2048.
//!
//! The library is the game core: [`Piece`] movement and rotation, the [`Grid`] with
//! its clear / merge / prune resolution cycle, and the tick-driven [`GameState`]
//! controller. It knows nothing about terminals; a front-end feeds it
//! [`InputEvent`]s and clock readings and draws what [`Grid::cells`] and
//! [`Piece::cells`] report.

pub mod cell;
pub mod error;
pub mod game;
pub mod grid;
pub mod piece;

pub use cell::{Cell, Position};
pub use error::GameError;
pub use game::{GameState, InputEvent, LandingReport, Phase};
pub use grid::{Grid, MergeOutcome, Resolution};
pub use piece::{Direction, Piece, Shape};

/// How a merge event is rewarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeScoring {
    /// Add the value the merge produced (2048 style).
    #[default]
    MergedValue,
    /// Add a fixed amount per merge.
    Flat(u32),
}

/// Points for each cleared row.
pub const ROW_CLEAR_POINTS: u32 = 100;

/// Options for a game session (board size, shapes, speed, tiles, scoring).
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    /// Shapes to draw from, uniformly. A single shape is handy for debugging.
    pub shapes: Vec<Shape>,
    /// Seed for the piece generator; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Gravity interval at zero cleared rows.
    pub base_tick_ms: u64,
    /// Interval reduction per cleared row.
    pub tick_step_ms: u64,
    /// Floor for the gravity interval; must be above zero.
    pub min_tick_ms: u64,
    /// Probability that a new tile is a 4 instead of a 2.
    pub four_chance: f64,
    pub merge_scoring: MergeScoring,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 12,
            height: 20,
            shapes: Shape::ALL.to_vec(),
            seed: None,
            base_tick_ms: 500,
            tick_step_ms: 25,
            min_tick_ms: 50,
            four_chance: 0.0,
            merge_scoring: MergeScoring::MergedValue,
        }
    }
}

impl GameConfig {
    /// Reject settings that would produce a degenerate board, piece or clock.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.width == 0 || self.height == 0 {
            return Err(GameError::InvalidDimensions {
                height: self.height,
                width: self.width,
            });
        }
        if self.shapes.is_empty() {
            return Err(GameError::EmptyShapeSet);
        }
        if let Some(&shape) = self.shapes.iter().find(|s| s.side() > self.width) {
            return Err(GameError::GridTooNarrow {
                shape,
                side: shape.side(),
                width: self.width,
            });
        }
        if self.min_tick_ms == 0 || self.min_tick_ms > self.base_tick_ms {
            return Err(GameError::InvalidGravity {
                base_ms: self.base_tick_ms,
                min_ms: self.min_tick_ms,
            });
        }
        if !(0.0..=1.0).contains(&self.four_chance) {
            return Err(GameError::InvalidChance(self.four_chance));
        }
        Ok(())
    }
}
