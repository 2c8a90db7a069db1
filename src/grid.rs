//! Settled board: placement of landed pieces and the clear / merge / prune resolution cycle.

use crate::cell::{Cell, Position};
use crate::error::GameError;
use crate::piece::Piece;

/// Result of [`Grid::merge_pairs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeOutcome {
    /// Number of merge events.
    pub merges: u32,
    /// Sum of the values produced by those merges.
    pub points: u32,
}

/// Totals of one run of the resolution cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    pub rows_cleared: u32,
    pub merges: u32,
    pub merge_points: u32,
    pub pruned: u32,
    /// Passes of clear → merge → prune, including the final idle pass.
    pub cycles: u32,
}

impl Resolution {
    /// True if any row was cleared or any tiles merged.
    pub fn did_work(&self) -> bool {
        self.rows_cleared > 0 || self.merges > 0
    }
}

/// Fixed-size board. Row 0 is the bottom row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    /// rows[row][col]; rows[0] is the bottom.
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(height: usize, width: usize) -> Result<Self, GameError> {
        if height == 0 || width == 0 {
            return Err(GameError::InvalidDimensions { height, width });
        }
        Ok(Self {
            width,
            height,
            rows: vec![vec![Cell::Empty; width]; height],
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, row: i32, col: i32) -> Option<(usize, usize)> {
        let (r, c) = (usize::try_from(row).ok()?, usize::try_from(col).ok()?);
        (r < self.height && c < self.width).then_some((r, c))
    }

    /// Cell at (row, col), or `None` outside the grid.
    #[inline]
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        self.index(row, col).map(|(r, c)| self.rows[r][c])
    }

    /// Write a cell; positions outside the grid are ignored.
    #[inline]
    pub fn set(&mut self, row: i32, col: i32, cell: Cell) {
        if let Some((r, c)) = self.index(row, col) {
            self.rows[r][c] = cell;
        }
    }

    /// False outside the grid, otherwise whether the cell holds a tile.
    #[inline]
    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        self.get(row, col).is_some_and(Cell::is_occupied)
    }

    /// Empty every cell (restart).
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(Cell::Empty);
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|c| c.is_occupied())
            .count()
    }

    /// Every settled tile as (position, value), bottom row first.
    pub fn cells(&self) -> impl Iterator<Item = (Position, u32)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, line)| {
            line.iter().enumerate().filter_map(move |(col, cell)| {
                cell.value()
                    .map(|v| (Position::new(col as i32, row as i32), v))
            })
        })
    }

    /// Largest tile on the board.
    pub fn max_tile(&self) -> Option<u32> {
        self.cells().map(|(_, v)| v).max()
    }

    /// Copy the landed piece's tiles into the grid.
    ///
    /// Returns true (game over) if any tile is still at or above the top edge; the
    /// tiles that did make it inside are written regardless.
    pub fn place(&mut self, piece: &Piece) -> bool {
        let height = self.height as i32;
        let mut game_over = false;
        for (pos, value) in piece.cells() {
            if pos.row >= height {
                game_over = true;
                continue;
            }
            self.set(pos.row, pos.col, Cell::Tile(value));
        }
        game_over
    }

    /// Remove every full row and pull the rows above down, in a single bottom-up pass.
    /// Returns the number of rows cleared.
    pub fn clear_full_rows(&mut self) -> u32 {
        let mut shift = 0usize;
        for row in 0..self.height {
            if self.rows[row].iter().all(|c| c.is_occupied()) {
                self.rows[row].fill(Cell::Empty);
                shift += 1;
            } else if shift > 0 {
                // Destination is either a cleared row or a slot already vacated by a move.
                self.rows.swap(row, row - shift);
            }
        }
        shift as u32
    }

    /// Perform the first vertical merge found scanning bottom-up, left-to-right.
    ///
    /// The lower tile doubles, the upper one is removed and the rest of the column
    /// drops by one. Returns the produced value.
    pub fn merge_once(&mut self) -> Option<u32> {
        for row in 0..self.height.saturating_sub(1) {
            for col in 0..self.width {
                let lower = self.rows[row][col];
                if !lower.is_occupied() || lower != self.rows[row + 1][col] {
                    continue;
                }
                let merged = lower.doubled();
                self.rows[row][col] = merged;
                for above in row + 1..self.height - 1 {
                    self.rows[above][col] = self.rows[above + 1][col];
                }
                self.rows[self.height - 1][col] = Cell::Empty;
                return merged.value();
            }
        }
        None
    }

    /// Merge vertical pairs until none is left, restarting the scan after each merge.
    pub fn merge_pairs(&mut self) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        while let Some(value) = self.merge_once() {
            outcome.merges += 1;
            outcome.points = outcome.points.saturating_add(value);
        }
        outcome
    }

    /// Remove tiles with no occupied orthogonal neighbour. Edges count as empty.
    /// Neighbours are judged on the board as it was before this pass.
    pub fn prune_unsupported(&mut self) -> u32 {
        const NEIGHBOURS_4: [(i32, i32); 4] = [(0, 1), (0, -1), (-1, 0), (1, 0)];
        let isolated: Vec<Position> = self
            .cells()
            .map(|(p, _)| p)
            .filter(|p| {
                !NEIGHBOURS_4
                    .iter()
                    .any(|&(dc, dr)| self.is_occupied(p.row + dr, p.col + dc))
            })
            .collect();
        for p in &isolated {
            self.set(p.row, p.col, Cell::Empty);
        }
        isolated.len() as u32
    }

    /// Run clear → merge → prune until a pass neither clears a row nor merges.
    ///
    /// Every productive pass removes at least one tile, so this stops after at most
    /// `occupied_count() + 1` passes.
    pub fn resolve(&mut self) -> Resolution {
        let mut res = Resolution::default();
        loop {
            res.cycles += 1;
            let cleared = self.clear_full_rows();
            let merged = self.merge_pairs();
            res.pruned += self.prune_unsupported();
            res.rows_cleared += cleared;
            res.merges += merged.merges;
            res.merge_points = res.merge_points.saturating_add(merged.points);
            if cleared == 0 && merged.merges == 0 {
                break;
            }
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Shape;

    /// Build a grid from rows given top row first; 0 is empty.
    fn grid_from(rows_top_down: &[&[u32]]) -> Grid {
        let height = rows_top_down.len();
        let width = rows_top_down[0].len();
        let mut g = Grid::new(height, width).unwrap();
        for (i, line) in rows_top_down.iter().enumerate() {
            let row = (height - 1 - i) as i32;
            for (col, &v) in line.iter().enumerate() {
                if v != 0 {
                    g.set(row, col as i32, Cell::Tile(v));
                }
            }
        }
        g
    }

    fn column(g: &Grid, col: i32) -> Vec<Option<u32>> {
        (0..g.height() as i32)
            .map(|row| g.get(row, col).and_then(Cell::value))
            .collect()
    }

    /// Reference clear: remove one full row at a time.
    fn clear_one_at_a_time(g: &mut Grid) -> u32 {
        let mut cleared = 0;
        while let Some(full) = g.rows.iter().position(|r| r.iter().all(|c| c.is_occupied())) {
            g.rows.remove(full);
            g.rows.push(vec![Cell::Empty; g.width]);
            cleared += 1;
        }
        cleared
    }

    #[test]
    fn test_new_rejects_zero_dimensions() {
        assert_eq!(
            Grid::new(0, 4),
            Err(GameError::InvalidDimensions {
                height: 0,
                width: 4
            })
        );
        assert!(Grid::new(4, 0).is_err());
        assert!(Grid::new(1, 1).is_ok());
    }

    #[test]
    fn test_is_occupied_out_of_bounds() {
        let mut g = Grid::new(3, 3).unwrap();
        g.set(0, 0, Cell::Tile(2));
        assert!(g.is_occupied(0, 0));
        assert!(!g.is_occupied(-1, 0));
        assert!(!g.is_occupied(0, 3));
        assert!(!g.is_occupied(3, 0));
        // Writes outside the grid are dropped.
        g.set(5, 5, Cell::Tile(2));
        assert_eq!(g.occupied_count(), 1);
    }

    #[test]
    fn test_clear_single_full_row() {
        let mut g = grid_from(&[
            &[0, 0, 0, 0],
            &[0, 0, 0, 0],
            &[0, 8, 0, 0],
            &[2, 2, 2, 2],
            &[0, 0, 0, 0],
            &[0, 0, 0, 0],
        ]);
        assert_eq!(g.clear_full_rows(), 1);
        let expected = grid_from(&[
            &[0, 0, 0, 0],
            &[0, 0, 0, 0],
            &[0, 0, 0, 0],
            &[0, 8, 0, 0],
            &[0, 0, 0, 0],
            &[0, 0, 0, 0],
        ]);
        assert_eq!(g, expected);
    }

    #[test]
    fn test_clear_matches_one_at_a_time() {
        let rows: &[&[u32]] = &[
            &[0, 4, 0, 0],
            &[2, 2, 2, 2],
            &[0, 0, 16, 0],
            &[4, 4, 4, 4],
            &[4, 4, 4, 4],
            &[8, 0, 0, 2],
            &[2, 4, 8, 16],
        ];
        let mut one_pass = grid_from(rows);
        let mut reference = grid_from(rows);
        assert_eq!(one_pass.clear_full_rows(), 4);
        assert_eq!(clear_one_at_a_time(&mut reference), 4);
        assert_eq!(one_pass, reference);
    }

    #[test]
    fn test_clear_nothing_full() {
        let mut g = grid_from(&[&[0, 2], &[2, 0]]);
        let before = g.clone();
        assert_eq!(g.clear_full_rows(), 0);
        assert_eq!(g, before);
    }

    #[test]
    fn test_merge_once_single_column() {
        // Bottom-to-top: 2, 2, 4.
        let mut g = grid_from(&[&[4], &[2], &[2]]);
        assert_eq!(g.merge_once(), Some(4));
        assert_eq!(column(&g, 0), vec![Some(4), Some(4), None]);
        assert_eq!(g.merge_once(), Some(8));
        assert_eq!(column(&g, 0), vec![Some(8), None, None]);
        assert_eq!(g.merge_once(), None);
    }

    #[test]
    fn test_merge_pairs_chains_to_fixed_point() {
        let mut g = grid_from(&[&[4], &[2], &[2]]);
        let outcome = g.merge_pairs();
        assert_eq!(
            outcome,
            MergeOutcome {
                merges: 2,
                points: 12
            }
        );
        assert_eq!(column(&g, 0), vec![Some(8), None, None]);
    }

    #[test]
    fn test_merge_ignores_horizontal_and_unequal() {
        let mut g = grid_from(&[&[0, 0, 0], &[4, 0, 0], &[2, 2, 8]]);
        assert_eq!(g.merge_pairs(), MergeOutcome::default());
    }

    #[test]
    fn test_merge_shifts_column_above() {
        let mut g = grid_from(&[&[16], &[8], &[4], &[4]]);
        let outcome = g.merge_pairs();
        // 4+4 → 8, then 8+8 → 16, then 16+16 → 32.
        assert_eq!(outcome.merges, 3);
        assert_eq!(outcome.points, 8 + 16 + 32);
        assert_eq!(column(&g, 0), vec![Some(32), None, None, None]);
    }

    #[test]
    fn test_prune_isolated_tile() {
        let mut g = grid_from(&[&[0, 0, 0], &[0, 2, 0], &[0, 0, 0]]);
        assert_eq!(g.prune_unsupported(), 1);
        assert_eq!(g.occupied_count(), 0);
    }

    #[test]
    fn test_prune_keeps_horizontal_pair() {
        let mut g = grid_from(&[&[0, 0, 0], &[0, 0, 0], &[2, 4, 0]]);
        assert_eq!(g.prune_unsupported(), 0);
        assert_eq!(g.occupied_count(), 2);
    }

    #[test]
    fn test_prune_diagonal_is_not_support() {
        let mut g = grid_from(&[&[0, 4], &[2, 0]]);
        assert_eq!(g.prune_unsupported(), 2);
        assert_eq!(g.occupied_count(), 0);
    }

    #[test]
    fn test_place_inside_grid() {
        let mut g = Grid::new(6, 4).unwrap();
        let piece = Piece::new(Shape::O, Position::new(1, 0), 2);
        assert!(!g.place(&piece));
        assert_eq!(g.occupied_count(), 4);
        assert_eq!(g.get(1, 2), Some(Cell::Tile(2)));
    }

    #[test]
    fn test_place_overflow_is_game_over() {
        let mut g = Grid::new(6, 4).unwrap();
        // O with its top row on row 6 == height.
        let piece = Piece::new(Shape::O, Position::new(0, 5), 2);
        assert!(g.place(&piece));
        // The two tiles inside still land.
        assert_eq!(g.occupied_count(), 2);
    }

    #[test]
    fn test_resolve_clear_then_merge_then_prune() {
        // Clearing the full bottom row drops the 4s onto each other: they merge into 8,
        // which then sits alone and is pruned. The 2 beside nothing is pruned too.
        let mut g = grid_from(&[
            &[0, 0, 0],
            &[4, 0, 0],
            &[4, 0, 2],
            &[2, 2, 2],
        ]);
        let res = g.resolve();
        assert_eq!(res.rows_cleared, 1);
        assert_eq!(res.merges, 1);
        assert_eq!(res.merge_points, 8);
        assert_eq!(res.pruned, 2);
        assert_eq!(res.cycles, 2);
        assert!(res.did_work());
        assert_eq!(g.occupied_count(), 0);
    }

    #[test]
    fn test_resolve_idle_grid_single_cycle() {
        let mut g = grid_from(&[&[0, 0], &[2, 4]]);
        let res = g.resolve();
        assert_eq!(res, Resolution {
            cycles: 1,
            ..Resolution::default()
        });
        assert!(!res.did_work());
        assert_eq!(g.occupied_count(), 2);
    }

    #[test]
    fn test_cells_and_max_tile() {
        let g = grid_from(&[&[0, 64], &[2, 0]]);
        let cells: Vec<_> = g.cells().collect();
        assert_eq!(
            cells,
            vec![(Position::new(0, 0), 2), (Position::new(1, 1), 64)]
        );
        assert_eq!(g.max_tile(), Some(64));
    }
}
