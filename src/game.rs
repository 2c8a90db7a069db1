//! Game controller: spawning, gravity ticks, input dispatch and scoring around the resolution cycle.

use crate::error::GameError;
use crate::grid::{Grid, Resolution};
use crate::piece::{Direction, Piece, Shape};
use crate::{GameConfig, MergeScoring, ROW_CLEAR_POINTS};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

/// Discrete input the core understands. Key codes are mapped by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Left,
    Right,
    Down,
    Rotate,
    HardDrop,
    Pause,
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Playing,
    Paused,
    GameOver,
}

/// What happened when the active piece landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LandingReport {
    pub resolution: Resolution,
    /// Score gained by this landing.
    pub points: u32,
    pub game_over: bool,
}

/// One game session: the board, the active piece and the counters.
#[derive(Debug)]
pub struct GameState {
    config: GameConfig,
    rng: SmallRng,
    grid: Grid,
    piece: Piece,
    next_shape: Shape,
    phase: Phase,
    score: u32,
    lines_cleared: u32,
    merges: u32,
    merge_score: u32,
    /// Consecutive landings whose resolution cleared or merged something.
    combo: u32,
    best_combo: u32,
    pieces_placed: u32,
    /// Time of the last gravity step; `None` until the first tick.
    last_gravity: Option<Instant>,
    last_landing: Option<LandingReport>,
}

impl GameState {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let mut rng = config
            .seed
            .map_or_else(SmallRng::from_entropy, SmallRng::seed_from_u64);
        let grid = Grid::new(config.height, config.width)?;
        let first = pick_shape(&mut rng, &config.shapes);
        let piece = Piece::spawn(first, &grid, &mut rng, config.four_chance)?;
        let next_shape = pick_shape(&mut rng, &config.shapes);
        Ok(Self {
            config,
            rng,
            grid,
            piece,
            next_shape,
            phase: Phase::Playing,
            score: 0,
            lines_cleared: 0,
            merges: 0,
            merge_score: 0,
            combo: 0,
            best_combo: 0,
            pieces_placed: 0,
            last_gravity: None,
            last_landing: None,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    pub fn next_shape(&self) -> Shape {
        self.next_shape
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn merges(&self) -> u32 {
        self.merges
    }

    pub fn merge_score(&self) -> u32 {
        self.merge_score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn best_combo(&self) -> u32 {
        self.best_combo
    }

    pub fn pieces_placed(&self) -> u32 {
        self.pieces_placed
    }

    pub fn last_landing(&self) -> Option<LandingReport> {
        self.last_landing
    }

    /// Current gravity period; shrinks with cleared rows but never below the configured floor.
    pub fn gravity_interval(&self) -> Duration {
        let ramp = u64::from(self.lines_cleared).saturating_mul(self.config.tick_step_ms);
        let ms = self
            .config
            .base_tick_ms
            .saturating_sub(ramp)
            .max(self.config.min_tick_ms);
        Duration::from_millis(ms)
    }

    /// Apply one input. Returns a report if the input made the piece land.
    ///
    /// While paused only `Pause` and `Restart` are accepted; after game over only `Restart`.
    pub fn handle(&mut self, event: InputEvent, now: Instant) -> Option<LandingReport> {
        match (self.phase, event) {
            (_, InputEvent::Restart) => {
                self.restart(now);
                None
            }
            (Phase::Playing, InputEvent::Pause) => {
                self.phase = Phase::Paused;
                None
            }
            (Phase::Paused, InputEvent::Pause) => {
                self.phase = Phase::Playing;
                // Gravity restarts its period on resume instead of firing straight away.
                self.last_gravity = Some(now);
                None
            }
            (Phase::Playing, InputEvent::Left) => {
                self.piece.try_move(Direction::Left, &self.grid);
                None
            }
            (Phase::Playing, InputEvent::Right) => {
                self.piece.try_move(Direction::Right, &self.grid);
                None
            }
            (Phase::Playing, InputEvent::Rotate) => {
                self.piece.rotate(&self.grid);
                None
            }
            (Phase::Playing, InputEvent::Down) => self.step_down(),
            (Phase::Playing, InputEvent::HardDrop) => {
                while self.piece.try_move(Direction::Down, &self.grid) {}
                Some(self.settle())
            }
            (Phase::Paused | Phase::GameOver, _) => None,
        }
    }

    /// Advance gravity if a full interval has passed since the last step.
    /// The first call only records the time.
    pub fn tick(&mut self, now: Instant) -> Option<LandingReport> {
        if self.phase != Phase::Playing {
            return None;
        }
        let last = *self.last_gravity.get_or_insert(now);
        if now.saturating_duration_since(last) < self.gravity_interval() {
            return None;
        }
        self.last_gravity = Some(now);
        self.step_down()
    }

    /// Discard the board and counters and start over with a fresh piece.
    pub fn restart(&mut self, now: Instant) {
        self.grid.clear();
        self.score = 0;
        self.lines_cleared = 0;
        self.merges = 0;
        self.merge_score = 0;
        self.combo = 0;
        self.best_combo = 0;
        self.pieces_placed = 0;
        self.last_landing = None;
        self.last_gravity = Some(now);
        self.phase = Phase::Playing;
        self.next_shape = pick_shape(&mut self.rng, &self.config.shapes);
        if self.spawn_next().is_err() {
            self.phase = Phase::GameOver;
        }
    }

    fn step_down(&mut self) -> Option<LandingReport> {
        if self.piece.try_move(Direction::Down, &self.grid) {
            None
        } else {
            Some(self.settle())
        }
    }

    /// Land the active piece, resolve the board and bring in the next piece.
    ///
    /// The new piece gets one forced step down; if even that fails it lands at
    /// once, which always ends the game since it is still above the top edge.
    fn settle(&mut self) -> LandingReport {
        let mut report = LandingReport::default();
        loop {
            self.pieces_placed += 1;
            if self.grid.place(&self.piece) {
                self.phase = Phase::GameOver;
                report.game_over = true;
                break;
            }
            let resolution = self.grid.resolve();
            report.points += self.record(resolution);
            report.resolution = merge_resolutions(report.resolution, resolution);

            if self.spawn_next().is_err() {
                self.phase = Phase::GameOver;
                report.game_over = true;
                break;
            }
            if self.piece.try_move(Direction::Down, &self.grid) {
                break;
            }
        }
        self.last_landing = Some(report);
        report
    }

    /// Fold a resolution into the counters. Returns the score gained.
    fn record(&mut self, resolution: Resolution) -> u32 {
        let before = self.score;
        self.lines_cleared += resolution.rows_cleared;
        self.merges += resolution.merges;
        self.merge_score += match self.config.merge_scoring {
            MergeScoring::MergedValue => resolution.merge_points,
            MergeScoring::Flat(points) => resolution.merges.saturating_mul(points),
        };
        self.score = self
            .lines_cleared
            .saturating_mul(ROW_CLEAR_POINTS)
            .saturating_add(self.merge_score);

        if resolution.did_work() {
            self.combo += 1;
            self.best_combo = self.best_combo.max(self.combo);
        } else {
            self.combo = 0;
        }
        self.score.saturating_sub(before)
    }

    fn spawn_next(&mut self) -> Result<(), GameError> {
        let shape = self.next_shape;
        self.piece = Piece::spawn(shape, &self.grid, &mut self.rng, self.config.four_chance)?;
        self.next_shape = pick_shape(&mut self.rng, &self.config.shapes);
        Ok(())
    }
}

/// Uniform pick from the active set, which `GameConfig::validate` keeps non-empty.
fn pick_shape<R: Rng + ?Sized>(rng: &mut R, shapes: &[Shape]) -> Shape {
    shapes[rng.gen_range(0..shapes.len())]
}

fn merge_resolutions(a: Resolution, b: Resolution) -> Resolution {
    Resolution {
        rows_cleared: a.rows_cleared + b.rows_cleared,
        merges: a.merges + b.merges,
        merge_points: a.merge_points.saturating_add(b.merge_points),
        pruned: a.pruned + b.pruned,
        cycles: a.cycles + b.cycles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, Position};

    fn small_config() -> GameConfig {
        GameConfig {
            width: 4,
            height: 6,
            shapes: vec![Shape::O],
            seed: Some(1),
            ..GameConfig::default()
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_new_spawns_above_grid() {
        let game = GameState::new(small_config()).unwrap();
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.piece().anchor().row, 6);
        assert_eq!(game.next_shape(), Shape::O);
        assert_eq!(game.grid().occupied_count(), 0);
    }

    #[test]
    fn test_pick_shape_stays_in_active_set() {
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(pick_shape(&mut rng, &[Shape::T]), Shape::T);
        let set = [Shape::I, Shape::S];
        let picks: Vec<Shape> = (0..64).map(|_| pick_shape(&mut rng, &set)).collect();
        assert!(picks.iter().all(|s| set.contains(s)));
        assert!(picks.contains(&Shape::I) && picks.contains(&Shape::S));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = GameConfig {
            height: 0,
            ..small_config()
        };
        assert!(matches!(
            GameState::new(config),
            Err(GameError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_gravity_waits_full_interval() {
        let mut game = GameState::new(small_config()).unwrap();
        let t0 = Instant::now();
        assert_eq!(game.tick(t0), None);
        assert_eq!(game.tick(t0 + ms(499)), None);
        assert_eq!(game.piece().anchor().row, 6);
        assert_eq!(game.tick(t0 + ms(500)), None);
        assert_eq!(game.piece().anchor().row, 5);
    }

    #[test]
    fn test_gravity_interval_ramp_has_floor() {
        let mut game = GameState::new(small_config()).unwrap();
        assert_eq!(game.gravity_interval(), ms(500));
        game.lines_cleared = 4;
        assert_eq!(game.gravity_interval(), ms(400));
        game.lines_cleared = 1_000;
        assert_eq!(game.gravity_interval(), ms(50));
    }

    #[test]
    fn test_pause_suspends_gravity_and_moves() {
        let mut game = GameState::new(small_config()).unwrap();
        let t0 = Instant::now();
        game.tick(t0);
        game.handle(InputEvent::Pause, t0);
        assert_eq!(game.phase(), Phase::Paused);
        let before = game.piece().clone();
        assert_eq!(game.tick(t0 + ms(5_000)), None);
        game.handle(InputEvent::Left, t0 + ms(5_000));
        game.handle(InputEvent::HardDrop, t0 + ms(5_000));
        assert_eq!(game.piece(), &before);

        game.handle(InputEvent::Pause, t0 + ms(6_000));
        assert_eq!(game.phase(), Phase::Playing);
        // Resume restarts the period.
        assert_eq!(game.tick(t0 + ms(6_100)), None);
        assert_eq!(game.piece(), &before);
        game.tick(t0 + ms(6_500));
        assert_eq!(game.piece().anchor().row, before.anchor().row - 1);
    }

    #[test]
    fn test_hard_drop_clears_row() {
        let mut game = GameState::new(small_config()).unwrap();
        let t0 = Instant::now();
        game.grid.set(0, 2, Cell::Tile(8));
        game.grid.set(0, 3, Cell::Tile(16));
        game.piece = Piece::new(Shape::O, Position::new(0, 6), 2);

        let report = game.handle(InputEvent::HardDrop, t0).unwrap();
        assert!(!report.game_over);
        assert_eq!(report.resolution.rows_cleared, 1);
        assert_eq!(report.points, 100);
        assert_eq!(game.lines_cleared(), 1);
        assert_eq!(game.score(), 100);
        assert_eq!(game.pieces_placed(), 1);
        assert_eq!(game.combo(), 1);
        // Upper half of the O dropped into row 0.
        assert_eq!(game.grid().get(0, 0), Some(Cell::Tile(2)));
        assert_eq!(game.grid().get(0, 1), Some(Cell::Tile(2)));
        assert_eq!(game.grid().occupied_count(), 2);
        assert_eq!(game.gravity_interval(), ms(475));
        // The replacement piece already took its forced step.
        assert_eq!(game.piece().anchor().row, 5);
    }

    #[test]
    fn test_landing_merges_score_merged_value() {
        let mut game = GameState::new(small_config()).unwrap();
        let t0 = Instant::now();
        game.grid.set(0, 0, Cell::Tile(2));
        game.piece = Piece::new(Shape::O, Position::new(0, 6), 2);

        let report = game.handle(InputEvent::HardDrop, t0).unwrap();
        assert_eq!(report.resolution.merges, 2);
        assert_eq!(game.merge_score(), 8);
        assert_eq!(game.score(), 8);
        assert_eq!(game.grid().get(0, 0), Some(Cell::Tile(4)));
        assert_eq!(game.grid().get(1, 0), Some(Cell::Tile(2)));
        assert_eq!(game.grid().get(1, 1), Some(Cell::Tile(4)));
        assert_eq!(game.grid().occupied_count(), 3);
    }

    #[test]
    fn test_flat_merge_scoring() {
        let config = GameConfig {
            merge_scoring: MergeScoring::Flat(10),
            ..small_config()
        };
        let mut game = GameState::new(config).unwrap();
        game.grid.set(0, 0, Cell::Tile(2));
        game.piece = Piece::new(Shape::O, Position::new(0, 6), 2);
        game.handle(InputEvent::HardDrop, Instant::now());
        assert_eq!(game.merge_score(), 20);
        assert_eq!(game.score(), 20);
    }

    #[test]
    fn test_combo_resets_on_idle_landing() {
        let config = GameConfig {
            width: 6,
            ..small_config()
        };
        let mut game = GameState::new(config).unwrap();
        let t0 = Instant::now();
        game.grid.set(0, 0, Cell::Tile(2));
        game.piece = Piece::new(Shape::O, Position::new(0, 6), 2);
        game.handle(InputEvent::HardDrop, t0);
        assert_eq!(game.combo(), 1);

        // Lands against the right wall with no equal values stacked: no merge, no clear.
        game.piece = Piece::with_values(Shape::O, Position::new(4, 6), [2, 4, 8, 16]);
        let report = game.handle(InputEvent::HardDrop, t0).unwrap();
        assert!(!report.resolution.did_work());
        assert_eq!(game.combo(), 0);
        assert_eq!(game.best_combo(), 1);
    }

    #[test]
    fn test_blocked_landing_above_top_is_game_over() {
        let mut game = GameState::new(small_config()).unwrap();
        let t0 = Instant::now();
        game.grid.set(4, 0, Cell::Tile(2));
        game.grid.set(4, 1, Cell::Tile(2));
        game.piece = Piece::new(Shape::O, Position::new(0, 5), 2);

        let report = game.handle(InputEvent::Down, t0).unwrap();
        assert!(report.game_over);
        assert_eq!(game.phase(), Phase::GameOver);

        // Only restart is accepted now.
        let before = game.piece().clone();
        assert_eq!(game.handle(InputEvent::Left, t0), None);
        assert_eq!(game.handle(InputEvent::Pause, t0), None);
        assert_eq!(game.tick(t0 + ms(10_000)), None);
        assert_eq!(game.piece(), &before);

        game.handle(InputEvent::Restart, t0);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.grid().occupied_count(), 0);
        assert_eq!(game.score(), 0);
        assert_eq!(game.pieces_placed(), 0);
        assert_eq!(game.last_landing(), None);
    }

    #[test]
    fn test_seeded_games_are_reproducible() {
        let config = GameConfig {
            seed: Some(42),
            ..GameConfig::default()
        };
        let mut a = GameState::new(config.clone()).unwrap();
        let mut b = GameState::new(config).unwrap();
        let t0 = Instant::now();
        for _ in 0..30 {
            a.handle(InputEvent::HardDrop, t0);
            b.handle(InputEvent::HardDrop, t0);
        }
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.piece(), b.piece());
        assert_eq!(a.score(), b.score());
        assert_eq!(a.phase(), b.phase());
    }
}
