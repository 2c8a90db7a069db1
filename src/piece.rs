//! Tetromino shapes and the active piece: translation, rotation with wall kick, collision.

use crate::cell::Position;
use crate::error::GameError;
use crate::grid::Grid;
use rand::Rng;
use std::fmt;

/// Value written into every tile of a freshly spawned piece.
pub const SPAWN_VALUE: u32 = 2;

/// The seven tetromino kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    I,
    O,
    Z,
    S,
    L,
    J,
    T,
}

impl Shape {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::Z, Self::S, Self::L, Self::J, Self::T];

    /// Side length of the square template.
    pub const fn side(self) -> usize {
        match self {
            Self::I => 4,
            Self::O => 2,
            Self::Z | Self::S | Self::L | Self::J | Self::T => 3,
        }
    }

    /// Occupied (col, row) slots in the template; row 0 is the template's top row.
    pub const fn offsets(self) -> &'static [(u8, u8); 4] {
        match self {
            Self::I => &[(1, 0), (1, 1), (1, 2), (1, 3)],
            Self::O => &[(0, 0), (1, 0), (0, 1), (1, 1)],
            Self::Z => &[(0, 0), (1, 0), (1, 1), (2, 1)],
            Self::S => &[(0, 1), (1, 1), (1, 0), (2, 0)],
            Self::L => &[(1, 0), (1, 1), (1, 2), (2, 2)],
            Self::J => &[(0, 2), (1, 0), (1, 1), (1, 2)],
            Self::T => &[(0, 1), (1, 1), (2, 1), (1, 2)],
        }
    }

    pub const fn letter(self) -> char {
        match self {
            Self::I => 'I',
            Self::O => 'O',
            Self::Z => 'Z',
            Self::S => 'S',
            Self::L => 'L',
            Self::J => 'J',
            Self::T => 'T',
        }
    }

    /// Parse a letter string such as `"IOT"` into a shape set (case-insensitive, deduplicated).
    pub fn parse_set(letters: &str) -> Result<Vec<Self>, GameError> {
        let mut set = Vec::with_capacity(Self::ALL.len());
        for c in letters.chars().filter(|c| !c.is_whitespace() && *c != ',') {
            let shape = Self::try_from(c)?;
            if !set.contains(&shape) {
                set.push(shape);
            }
        }
        if set.is_empty() {
            return Err(GameError::EmptyShapeSet);
        }
        Ok(set)
    }
}

impl TryFrom<char> for Shape {
    type Error = GameError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'I' => Ok(Self::I),
            'O' => Ok(Self::O),
            'Z' => Ok(Self::Z),
            'S' => Ok(Self::S),
            'L' => Ok(Self::L),
            'J' => Ok(Self::J),
            'T' => Ok(Self::T),
            _ => Err(GameError::UnknownShape(c)),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Unit translation requested for the active piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    /// (dcol, drow) for one step.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Down => (0, -1),
        }
    }
}

/// A tetromino: an n×n local matrix of tiles anchored at its bottom-left corner.
///
/// Absolute positions are never stored; they are derived from `anchor` and the
/// matrix every time they are needed, so a transform only has to touch those two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    shape: Shape,
    /// matrix[row][col]; row 0 is the top of the template.
    matrix: Vec<Vec<Option<u32>>>,
    anchor: Position,
}

impl Piece {
    /// Piece in its initial orientation with every tile holding `value`.
    pub fn new(shape: Shape, anchor: Position, value: u32) -> Self {
        Self::with_values(shape, anchor, [value; 4])
    }

    /// Piece in its initial orientation; `values` follow the order of [`Shape::offsets`].
    pub fn with_values(shape: Shape, anchor: Position, values: [u32; 4]) -> Self {
        let n = shape.side();
        let mut matrix = vec![vec![None; n]; n];
        for (&(col, row), value) in shape.offsets().iter().zip(values) {
            matrix[row as usize][col as usize] = Some(value);
        }
        Self {
            shape,
            matrix,
            anchor,
        }
    }

    /// New piece just above the grid's top edge at a random column in `[0, width - n]`.
    /// Each tile is a 4 with probability `four_chance`, otherwise a 2.
    pub fn spawn<R: Rng + ?Sized>(
        shape: Shape,
        grid: &Grid,
        rng: &mut R,
        four_chance: f64,
    ) -> Result<Self, GameError> {
        let n = shape.side();
        if n > grid.width() {
            return Err(GameError::GridTooNarrow {
                shape,
                side: n,
                width: grid.width(),
            });
        }
        let col = rng.gen_range(0..=grid.width() - n) as i32;
        let anchor = Position::new(col, grid.height() as i32);
        let mut values = [SPAWN_VALUE; 4];
        if four_chance > 0.0 {
            for v in &mut values {
                if rng.gen_bool(four_chance) {
                    *v = SPAWN_VALUE * 2;
                }
            }
        }
        Ok(Self::with_values(shape, anchor, values))
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[inline]
    pub fn anchor(&self) -> Position {
        self.anchor
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.matrix.len()
    }

    /// Every occupied tile as (absolute position, value).
    pub fn cells(&self) -> impl Iterator<Item = (Position, u32)> + '_ {
        let n = self.side() as i32;
        let anchor = self.anchor;
        self.matrix.iter().enumerate().flat_map(move |(row, line)| {
            line.iter().enumerate().filter_map(move |(col, slot)| {
                slot.map(|value| {
                    (
                        Position::new(anchor.col + col as i32, anchor.row + (n - 1) - row as i32),
                        value,
                    )
                })
            })
        })
    }

    /// Absolute row of the lowest tile.
    pub fn lowest_row(&self) -> i32 {
        self.cells().map(|(p, _)| p.row).min().unwrap_or(self.anchor.row)
    }

    /// True if one step in `direction` is legal. Never mutates.
    ///
    /// Horizontal: the walls always block; settled tiles only block tiles that are
    /// already inside the grid. Down: row 0 and settled tiles block, except for tiles
    /// more than one row above the top edge.
    pub fn can_move(&self, direction: Direction, grid: &Grid) -> bool {
        let width = grid.width() as i32;
        let height = grid.height() as i32;
        let (dc, _) = direction.delta();
        for (pos, _) in self.cells() {
            match direction {
                Direction::Left | Direction::Right => {
                    let target = pos.col + dc;
                    if target < 0 || target >= width {
                        return false;
                    }
                    if pos.row >= height {
                        continue;
                    }
                    if grid.is_occupied(pos.row, target) {
                        return false;
                    }
                }
                Direction::Down => {
                    if pos.row > height {
                        continue;
                    }
                    if pos.row <= 0 || grid.is_occupied(pos.row - 1, pos.col) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Move one step if legal. Returns whether the piece moved.
    pub fn try_move(&mut self, direction: Direction, grid: &Grid) -> bool {
        if !self.can_move(direction, grid) {
            return false;
        }
        let (dc, dr) = direction.delta();
        self.anchor = self.anchor.offset(dc, dr);
        true
    }

    /// Rotate 90° clockwise: local (row, col) goes to (col, n - 1 - row).
    ///
    /// Tiles pushed past a side wall are kicked back in by the smallest horizontal
    /// shift. The rotation is refused, leaving the piece untouched, when the piece
    /// would need kicking both ways, would reach below row 0, or would overlap a
    /// settled tile after the kick.
    pub fn rotate(&mut self, grid: &Grid) -> bool {
        let n = self.side();
        let mut rotated = vec![vec![None; n]; n];
        for (row, line) in self.matrix.iter().enumerate() {
            for (col, slot) in line.iter().enumerate() {
                if slot.is_some() {
                    rotated[col][n - 1 - row] = *slot;
                }
            }
        }
        let mut candidate = Self {
            shape: self.shape,
            matrix: rotated,
            anchor: self.anchor,
        };

        let width = grid.width() as i32;
        let (min_col, max_col) = candidate
            .cells()
            .fold((i32::MAX, i32::MIN), |(lo, hi), (p, _)| (lo.min(p.col), hi.max(p.col)));
        let push_right = (-min_col).max(0);
        let push_left = (max_col - (width - 1)).max(0);
        if push_right > 0 && push_left > 0 {
            return false;
        }
        candidate.anchor = candidate.anchor.offset(push_right - push_left, 0);

        if !candidate.fits(grid) {
            return false;
        }
        *self = candidate;
        true
    }

    /// Rows a hard drop would travel from the current position.
    pub fn drop_distance(&self, grid: &Grid) -> u32 {
        let mut probe = self.clone();
        let mut distance = 0;
        while probe.try_move(Direction::Down, grid) {
            distance += 1;
        }
        distance
    }

    /// All tiles within the side walls, at or above row 0, and off settled tiles.
    fn fits(&self, grid: &Grid) -> bool {
        let width = grid.width() as i32;
        self.cells().all(|(p, _)| {
            p.col >= 0 && p.col < width && p.row >= 0 && !grid.is_occupied(p.row, p.col)
        })
    }
}
