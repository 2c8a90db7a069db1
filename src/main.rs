//! tetris2048 — falling tetrominoes whose numbered tiles merge like 2048, in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use tetris2048::{GameConfig, MergeScoring, Shape};

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.game_config()?;
    let theme = theme::Theme::for_palette(args.palette);
    let mut app = App::new(&args, config, theme)?;
    app.run()?;
    Ok(())
}

/// Tetris with 2048 tiles, in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "tetris2048",
    version,
    about = "Tetris where every block is a numbered tile. Full rows clear; equal tiles stacked vertically merge.",
    long_about = "tetris2048 drops tetrominoes made of 2048-style numbered tiles.\n\n\
        When a piece lands, full rows are cleared, vertically stacked equal tiles merge into \
        their sum, and tiles left without any neighbour fall away. This repeats until the board \
        settles. A cleared row is worth 100 points; merges add the merged value.\n\n\
        CONTROLS (normal):\n  Left/Right  Move    Up        Rotate    Down   Soft drop\n  Space/Enter Hard drop   P  Pause   R  Restart   Q / Esc  Quit\n\n\
        CONTROLS (vim):\n  h/l  Move    k or i  Rotate    j  Soft drop"
)]
pub struct Args {
    /// Playfield width in columns.
    #[arg(long, default_value = "12", value_name = "COLS")]
    pub width: usize,

    /// Playfield height in rows.
    #[arg(long, default_value = "20", value_name = "ROWS")]
    pub height: usize,

    /// Shapes to draw from, as letters (e.g. "IOT", or "I" to debug with a single shape).
    #[arg(long, default_value = "IOZSLJT", value_name = "LETTERS")]
    pub shapes: String,

    /// Seed for the piece generator (same seed, same pieces).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Gravity interval in ms at the start of a game.
    #[arg(long, default_value = "500", value_name = "MS")]
    pub tick_ms: u64,

    /// Gravity speed-up per cleared row, in ms.
    #[arg(long, default_value = "25", value_name = "MS")]
    pub tick_step_ms: u64,

    /// Fastest gravity interval in ms (must be above zero).
    #[arg(long, default_value = "50", value_name = "MS")]
    pub min_tick_ms: u64,

    /// Probability (0..=1) that a new tile is a 4 instead of a 2.
    #[arg(long, default_value = "0.0", value_name = "P")]
    pub four_chance: f64,

    /// Award a flat amount per merge instead of the merged value.
    #[arg(long, value_name = "POINTS")]
    pub merge_points: Option<u32>,

    /// Target render frames per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Disable the flash after rows clear or tiles merge.
    #[arg(long)]
    pub no_animation: bool,

    /// Skip the title screen and start immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Colour palette: normal, high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,
}

impl Args {
    /// Game options for the core; rejects settings the core would refuse.
    pub fn game_config(&self) -> Result<GameConfig> {
        let shapes = Shape::parse_set(&self.shapes)
            .with_context(|| format!("invalid --shapes {:?}", self.shapes))?;
        let config = GameConfig {
            width: self.width,
            height: self.height,
            shapes,
            seed: self.seed,
            base_tick_ms: self.tick_ms,
            tick_step_ms: self.tick_step_ms,
            min_tick_ms: self.min_tick_ms,
            four_chance: self.four_chance,
            merge_scoring: self
                .merge_points
                .map_or(MergeScoring::MergedValue, MergeScoring::Flat),
        };
        config.validate().context("invalid game options")?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
