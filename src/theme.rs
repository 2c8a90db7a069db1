//! Colours: board chrome plus one background per tile value (2, 4, 8, ... 2048 and beyond).

use crate::Palette;
use ratatui::style::Color;

/// Number of distinct tile colours; values past the last one reuse it.
const TILE_SHADES: usize = 12;

#[derive(Debug, Clone)]
pub struct Theme {
    /// Tile backgrounds for 2, 4, 8, ... (index = log2(value) - 1).
    pub tiles: [Color; TILE_SHADES],
    /// Text on small (2, 4) tiles.
    pub tile_fg_dark: Color,
    /// Text on every other tile.
    pub tile_fg_light: Color,
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, lines).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Ghost outline and secondary text.
    pub inactive_fg: Color,
}

impl Theme {
    /// The classic 2048 tile colours on a dark blue board.
    pub fn classic() -> Self {
        Self {
            tiles: [
                Color::Rgb(238, 230, 219), // 2
                Color::Rgb(236, 224, 200), // 4
                Color::Rgb(239, 178, 124), // 8
                Color::Rgb(243, 151, 104), // 16
                Color::Rgb(243, 125, 99),  // 32
                Color::Rgb(244, 96, 66),   // 64
                Color::Rgb(235, 206, 115), // 128
                Color::Rgb(237, 203, 103), // 256
                Color::Rgb(236, 200, 90),  // 512
                Color::Rgb(231, 194, 87),  // 1024
                Color::Rgb(232, 190, 78),  // 2048
                Color::Rgb(60, 58, 50),    // 4096+
            ],
            tile_fg_dark: Color::Rgb(119, 112, 101),
            tile_fg_light: Color::Rgb(255, 255, 255),
            bg: Color::Rgb(42, 69, 99),
            div_line: Color::Rgb(0, 100, 200),
            main_fg: Color::Rgb(171, 178, 191),
            title: Color::Rgb(229, 192, 123),
            inactive_fg: Color::Rgb(92, 99, 112),
        }
    }

    pub fn for_palette(palette: Palette) -> Self {
        let mut theme = Self::classic();
        theme.apply_palette(palette);
        theme
    }

    /// Override tile colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                // Saturated steps with black text throughout.
                self.tiles = [
                    Color::Rgb(255, 255, 255),
                    Color::Rgb(255, 255, 0),
                    Color::Rgb(255, 170, 0),
                    Color::Rgb(255, 85, 0),
                    Color::Rgb(255, 0, 0),
                    Color::Rgb(255, 0, 170),
                    Color::Rgb(170, 0, 255),
                    Color::Rgb(0, 85, 255),
                    Color::Rgb(0, 200, 255),
                    Color::Rgb(0, 255, 170),
                    Color::Rgb(0, 255, 0),
                    Color::Rgb(200, 200, 200),
                ];
                self.tile_fg_dark = Color::Black;
                self.tile_fg_light = Color::Black;
                self.bg = Color::Black;
                self.div_line = Color::White;
            }
            Palette::Colorblind => {
                // Blue / orange ramp, avoids red-green pairs.
                self.tiles = [
                    Color::Rgb(221, 236, 247),
                    Color::Rgb(187, 214, 238),
                    Color::Rgb(0, 119, 187),
                    Color::Rgb(0, 68, 136),
                    Color::Rgb(238, 119, 51),
                    Color::Rgb(204, 85, 0),
                    Color::Rgb(187, 187, 0),
                    Color::Rgb(153, 153, 51),
                    Color::Rgb(0, 153, 136),
                    Color::Rgb(0, 102, 102),
                    Color::Rgb(238, 51, 119),
                    Color::Rgb(51, 51, 51),
                ];
            }
        }
    }

    /// Background for a tile value.
    pub fn tile_color(&self, value: u32) -> Color {
        self.tiles[tile_shade(value)]
    }

    /// Text colour that reads on [`Self::tile_color`].
    pub fn tile_fg(&self, value: u32) -> Color {
        if value <= 4 {
            self.tile_fg_dark
        } else {
            self.tile_fg_light
        }
    }
}

/// 2 → 0, 4 → 1, ..., clamped to the last shade.
fn tile_shade(value: u32) -> usize {
    (value.max(2).ilog2() as usize - 1).min(TILE_SHADES - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_shade_index() {
        assert_eq!(tile_shade(2), 0);
        assert_eq!(tile_shade(4), 1);
        assert_eq!(tile_shade(2048), 10);
        assert_eq!(tile_shade(4096), 11);
        assert_eq!(tile_shade(1 << 20), 11);
    }

    #[test]
    fn test_small_tiles_use_dark_text() {
        let theme = Theme::classic();
        assert_eq!(theme.tile_fg(2), theme.tile_fg_dark);
        assert_eq!(theme.tile_fg(8), theme.tile_fg_light);
        assert_eq!(theme.tile_color(8), Color::Rgb(239, 178, 124));
    }

    #[test]
    fn test_palette_overrides_tiles() {
        let theme = Theme::for_palette(Palette::HighContrast);
        assert_eq!(theme.tile_color(2), Color::Rgb(255, 255, 255));
        assert_eq!(theme.bg, Color::Black);
    }
}
