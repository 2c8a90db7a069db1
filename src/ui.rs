//! Layout and drawing: title screen, board, ghost, next preview, stats, pause and game over.

use crate::app::Screen;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};
use tetris2048::{GameState, Phase, Position, Shape};

/// Terminal columns per grid cell; wide enough for "2048".
const CELL_WIDTH: u16 = 4;

const SIDEBAR_WIDTH: u16 = 24;

/// Length of the flash over the board after a landing that cleared or merged.
const LANDING_FLASH_MS: u32 = 250;

/// Board size in terminal cells including the border, saturating on huge boards.
fn board_outer_size(width: usize, height: usize) -> (u16, u16) {
    let width = u16::try_from(width).unwrap_or(u16::MAX);
    let height = u16::try_from(height).unwrap_or(u16::MAX);
    (
        width.saturating_mul(CELL_WIDTH).saturating_add(2),
        height.saturating_add(2),
    )
}

/// Draw the current screen. While `landing_flash` is set it is played over the board;
/// `flash_time` tracks the previous frame so the effect advances by real elapsed time.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    state: &GameState,
    theme: &Theme,
    area: Rect,
    landing_flash: &mut Option<Effect>,
    flash_time: &mut Option<Instant>,
    now: Instant,
) {
    match screen {
        Screen::Menu => draw_menu(frame, state, theme, area),
        Screen::Playing => {
            let board = draw_game(frame, state, theme, area);
            if let Some(effect) = landing_flash {
                let delta = flash_time
                    .map(|t| now.saturating_duration_since(t))
                    .unwrap_or(std::time::Duration::ZERO);
                let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
                *flash_time = Some(now);
                frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
            }
            match state.phase() {
                Phase::Playing => {}
                Phase::Paused => draw_pause_overlay(frame, theme, area),
                Phase::GameOver => draw_game_over(frame, state, theme, area),
            }
        }
    }
}

fn draw_menu(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let title_style = Style::default()
        .fg(theme.title)
        .add_modifier(Modifier::BOLD);
    let fg_style = Style::default().fg(theme.main_fg);
    let grid = state.grid();
    let shapes: String = state.config().shapes.iter().map(|s| s.letter()).collect();
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(" T E T R I S   2 0 4 8 ", title_style)),
        Line::from(""),
        Line::from(Span::styled("Full rows clear. Equal tiles stacked", fg_style)),
        Line::from(Span::styled("on top of each other merge.", fg_style)),
        Line::from(Span::styled("Lonely tiles fall away.", fg_style)),
        Line::from(""),
        Line::from(Span::styled(
            format!("Board {} x {}   Shapes {}", grid.width(), grid.height(), shapes),
            Style::default().fg(theme.inactive_fg),
        )),
        Line::from(""),
        Line::from(Span::styled("←/→ move  ↑ rotate  ↓ soft drop", fg_style)),
        Line::from(Span::styled("Space hard drop  P pause  R restart", fg_style)),
        Line::from(""),
        Line::from(Span::styled(
            " Enter — Start    Q — Quit ",
            Style::default().fg(Color::Black).bg(theme.title),
        )),
        Line::from(""),
    ];
    let popup = centered(area, 44, lines.len() as u16 + 2);
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line)),
        )
        .render(popup, frame.buffer_mut());
}

/// Fade from the highlight colour back to the board.
pub fn landing_flash(theme: &Theme) -> Effect {
    fx::fade_from(
        theme.title,
        theme.bg,
        (LANDING_FLASH_MS, Interpolation::Linear),
    )
}

/// Draw game: board + sidebar, centred in the full area. Returns the board rect.
fn draw_game(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) -> Rect {
    let (bw, bh) = board_outer_size(state.grid().width(), state.grid().height());
    let total_w = bw.saturating_add(SIDEBAR_WIDTH);

    let horiz_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(bh),
            Constraint::Fill(1),
        ])
        .split(horiz_chunks[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert_chunks[1]);

    draw_board(frame, state, theme, inner[0]);
    draw_sidebar(frame, state, theme, inner[1]);
    inner[0]
}

fn draw_board(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line))
        .title(Span::styled(" Tetris 2048 ", Style::default().fg(theme.title)));
    let board = block.inner(area);
    let buf = frame.buffer_mut();
    block.render(area, buf);
    buf.set_style(board, Style::default().bg(theme.bg));

    let grid = state.grid();
    let height = grid.height() as i32;
    let piece = state.piece();

    if state.phase() != Phase::GameOver {
        let drop = piece.drop_distance(grid) as i32;
        if drop > 0 {
            let ghost = Style::default().fg(theme.inactive_fg).bg(theme.bg);
            for (pos, _) in piece.cells() {
                put_cell(buf, board, height, pos.offset(0, -drop), "[  ]", ghost);
            }
        }
    }
    for (pos, value) in grid.cells() {
        put_tile(buf, board, height, pos, value, theme);
    }
    // Tiles still above the top edge are not drawn.
    for (pos, value) in piece.cells() {
        put_tile(buf, board, height, pos, value, theme);
    }
}

fn put_tile(buf: &mut Buffer, board: Rect, height: i32, pos: Position, value: u32, theme: &Theme) {
    let style = Style::default()
        .fg(theme.tile_fg(value))
        .bg(theme.tile_color(value))
        .add_modifier(Modifier::BOLD);
    put_cell(buf, board, height, pos, &tile_label(value), style);
}

/// Write `text` into the board slot for `pos`; positions off the board are skipped.
fn put_cell(buf: &mut Buffer, board: Rect, height: i32, pos: Position, text: &str, style: Style) {
    if pos.row < 0 || pos.row >= height || pos.col < 0 {
        return;
    }
    let x = i32::from(board.x) + pos.col * i32::from(CELL_WIDTH);
    let y = i32::from(board.y) + (height - 1 - pos.row);
    if x + i32::from(CELL_WIDTH) > i32::from(board.right()) || y >= i32::from(board.bottom()) {
        return;
    }
    buf.set_string(x as u16, y as u16, text, style);
}

/// Value centred in a cell; five-digit values and up are shown in k (1024s).
fn tile_label(value: u32) -> String {
    if value < 10_000 {
        format!("{:^4}", value)
    } else {
        format!("{:^4}", format!("{}k", value / 1024))
    }
}

fn draw_sidebar(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Next (border + title + 4 rows)
            Constraint::Length(9), // Stats
            Constraint::Length(5), // Last landing
            Constraint::Fill(1),
        ])
        .split(area);

    // --- Next ---
    let next_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" Next ", title_style));
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], frame.buffer_mut());
    draw_next_preview(frame.buffer_mut(), state.next_shape(), theme, next_inner);

    // --- Stats ---
    let stat = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label}: "), title_style),
            Span::styled(value, fg_style),
        ])
    };
    let stats_lines = vec![
        stat("Score", state.score().to_string()),
        stat("Lines", state.lines_cleared().to_string()),
        stat("Merges", state.merges().to_string()),
        stat(
            "Max tile",
            state
                .grid()
                .max_tile()
                .map_or_else(|| "-".to_string(), |v| v.to_string()),
        ),
        stat(
            "Combo",
            format!("x{} (best {})", state.combo(), state.best_combo()),
        ),
        stat("Pieces", state.pieces_placed().to_string()),
        stat(
            "Speed",
            format!("{} ms", state.gravity_interval().as_millis()),
        ),
    ];
    let stats_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" Stats ", title_style));
    Paragraph::new(Text::from(stats_lines))
        .block(stats_block)
        .render(chunks[1], frame.buffer_mut());

    // --- Last landing ---
    let landing_lines = match state.last_landing() {
        Some(report) => vec![
            stat(
                "Cleared",
                format!("{} (+{})", report.resolution.rows_cleared, report.points),
            ),
            stat(
                "Merged",
                format!(
                    "{} (+{})",
                    report.resolution.merges, report.resolution.merge_points
                ),
            ),
            stat("Pruned", report.resolution.pruned.to_string()),
        ],
        None => vec![Line::from(Span::styled(
            "Nothing landed yet",
            Style::default().fg(theme.inactive_fg),
        ))],
    };
    let landing_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" Last drop ", title_style));
    Paragraph::new(Text::from(landing_lines))
        .block(landing_block)
        .render(chunks[2], frame.buffer_mut());
}

/// Shape template as 2-wide blocks, top row first.
fn draw_next_preview(buf: &mut Buffer, shape: Shape, theme: &Theme, area: Rect) {
    let style = Style::default().bg(theme.tile_color(2));
    for &(col, row) in shape.offsets() {
        let x = area.x + u16::from(col) * 2 + 1;
        let y = area.y + u16::from(row);
        if x + 2 <= area.right() && y < area.bottom() {
            buf.set_string(x, y, "  ", style);
        }
    }
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 28, 6);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P — Resume    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let fg_style = Style::default().fg(theme.main_fg);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", state.score()), fg_style)),
        Line::from(Span::styled(
            format!(" Lines: {} ", state.lines_cleared()),
            fg_style,
        )),
        Line::from(Span::styled(format!(" Merges: {} ", state.merges()), fg_style)),
        Line::from(Span::styled(
            format!(" Best combo: {} ", state.best_combo()),
            fg_style,
        )),
        Line::from(""),
        Line::from(Span::styled(" R — Restart    Q — Quit ", fg_style)),
        Line::from(""),
    ];
    let popup = centered(area, 32, lines.len() as u16 + 2);
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Tetris 2048 ", Style::default().fg(theme.title))),
        )
        .render(popup, frame.buffer_mut());
}

/// Rect of at most `width` x `height` centred in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_label_fits_cell() {
        assert_eq!(tile_label(2), " 2  ");
        assert_eq!(tile_label(2048), "2048");
        assert_eq!(tile_label(16_384), "16k ");
        for v in [2, 64, 1024, 8192, 131_072] {
            assert_eq!(tile_label(v).chars().count(), CELL_WIDTH as usize);
        }
    }

    #[test]
    fn test_board_size_saturates() {
        assert_eq!(board_outer_size(12, 20), (50, 22));
        assert_eq!(board_outer_size(16_384, 65_534), (u16::MAX, u16::MAX));
        assert_eq!(board_outer_size(usize::MAX, 1), (u16::MAX, 3));
    }

    #[test]
    fn test_centered_clamps_to_area() {
        let area = Rect::new(0, 0, 10, 4);
        assert_eq!(centered(area, 20, 2), Rect::new(0, 1, 10, 2));
    }
}
