//! App: terminal init, main loop, tick and key handling.

use crate::Args;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use tetris2048::{GameConfig, GameState, InputEvent, LandingReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
}

pub struct App {
    theme: Theme,
    state: GameState,
    screen: Screen,
    frame_duration: Duration,
    no_animation: bool,
    /// Flash over the board after a productive landing (created when it lands).
    landing_flash: Option<Effect>,
    /// Last time the flash was advanced (for delta).
    flash_time: Option<Instant>,
}

impl App {
    pub fn new(args: &Args, config: GameConfig, theme: Theme) -> Result<Self> {
        let state = GameState::new(config).context("cannot start game")?;
        let screen = if args.no_menu {
            Screen::Playing
        } else {
            Screen::Menu
        };
        let frame_rate = if args.frame_rate.is_finite() && args.frame_rate > 0.0 {
            args.frame_rate
        } else {
            30.0
        };
        Ok(Self {
            theme,
            state,
            screen,
            frame_duration: Duration::from_secs_f64(1.0 / frame_rate),
            no_animation: args.no_animation,
            landing_flash: None,
            flash_time: None,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    self.screen,
                    &self.state,
                    &self.theme,
                    f.area(),
                    &mut self.landing_flash,
                    &mut self.flash_time,
                    now,
                );
            })?;
            if self.landing_flash.as_ref().is_some_and(Effect::done) {
                self.landing_flash = None;
                self.flash_time = None;
            }

            let timeout = self.frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let Event::Key(key) = event::read()? else {
                        continue;
                    };
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match (self.screen, key_to_action(key)) {
                        (_, Action::Quit) => return Ok(()),
                        (Screen::Menu, Action::Game(InputEvent::HardDrop)) => {
                            self.state.restart(Instant::now());
                            self.screen = Screen::Playing;
                        }
                        (Screen::Playing, Action::Game(input)) => {
                            let report = self.state.handle(input, Instant::now());
                            self.on_landing(report);
                        }
                        (Screen::Menu | Screen::Playing, _) => {}
                    }
                }
            }

            if self.screen == Screen::Playing {
                let report = self.state.tick(Instant::now());
                self.on_landing(report);
            }
        }
    }

    fn on_landing(&mut self, report: Option<LandingReport>) {
        let Some(report) = report else {
            return;
        };
        if report.resolution.did_work() && !self.no_animation {
            self.landing_flash = Some(crate::ui::landing_flash(&self.theme));
            self.flash_time = None;
        }
    }
}
