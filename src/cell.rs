//! Grid coordinates and the contents of a single slot.

/// Grid-relative coordinate. Row 0 is the bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub col: i32,
    pub row: i32,
}

impl Position {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    #[inline]
    pub const fn offset(self, dc: i32, dr: i32) -> Self {
        Self {
            col: self.col + dc,
            row: self.row + dr,
        }
    }
}

/// Single slot: either empty or a numbered tile (a power of two).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Tile(u32),
}

impl Cell {
    #[inline]
    pub fn is_occupied(self) -> bool {
        matches!(self, Self::Tile(_))
    }

    #[inline]
    pub fn value(self) -> Option<u32> {
        match self {
            Self::Empty => None,
            Self::Tile(v) => Some(v),
        }
    }

    /// Tile with twice the value; empty stays empty.
    pub fn doubled(self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Tile(v) => Self::Tile(v.saturating_mul(2)),
        }
    }
}
