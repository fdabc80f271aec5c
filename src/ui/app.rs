//! Main UI Application
//!
//! Owns the running stage, turns key presses into inputs, and draws the
//! latest snapshot.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::data::StageTables;
use crate::ecs::Position;
use crate::game::{EngineState, Input, MoveOutcome, Snapshot, Stage, StageConfig, TurnEvent, CHEST_GLYPH, PLAYER_GLYPH};
use crate::world::Reveal;

/// Messages kept for the log panel
const MAX_MESSAGES: usize = 50;

/// Kinds of message, for coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageCategory {
    Combat,
    Item,
    System,
    Warning,
}

#[derive(Debug, Clone)]
pub struct GameMessage {
    pub text: String,
    pub category: MessageCategory,
}

/// Main UI application
pub struct App {
    stage: Stage,
    /// Options used to start a fresh stage on restart (seed dropped)
    config: StageConfig,
    tables: StageTables,
    snapshot: Snapshot,
    messages: Vec<GameMessage>,
}

impl App {
    pub fn new(config: StageConfig, tables: StageTables) -> Result<Self> {
        let stage = Stage::with_tables(config.clone(), &tables)?;
        let snapshot = stage.snapshot();
        let mut app = Self {
            stage,
            config,
            tables,
            snapshot,
            messages: Vec::new(),
        };
        app.announce_stage();
        Ok(app)
    }

    /// Handle a key press. Returns true when the program should exit.
    pub fn handle_input(&mut self, key: KeyEvent) -> Result<bool> {
        // Global quit shortcut
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        if self.stage.state().is_terminal() {
            return self.handle_stage_over_input(key);
        }

        let input = match key.code {
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => Input::Up,
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => Input::Down,
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => Input::Left,
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => Input::Right,
            KeyCode::Char('q') | KeyCode::Esc => Input::Quit,
            _ => return Ok(false),
        };

        let report = self.stage.step(input);
        if report.outcome == MoveOutcome::Rejected {
            log::trace!("Move {:?} rejected", input);
        }
        for event in &report.events {
            self.describe(event);
        }
        self.snapshot = report.snapshot;
        Ok(self.stage.state() == EngineState::Quit)
    }

    fn handle_stage_over_input(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('r') => {
                let mut config = self.config.clone();
                config.seed = None;
                self.stage = Stage::with_tables(config, &self.tables)?;
                self.snapshot = self.stage.snapshot();
                self.messages.clear();
                self.announce_stage();
                Ok(false)
            }
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => Ok(true),
            _ => Ok(false),
        }
    }

    fn announce_stage(&mut self) {
        let code = self
            .stage
            .config()
            .seed_code()
            .unwrap_or_else(|_| format!("seed {}", self.stage.seed().unwrap_or_default()));
        self.push(
            format!("Stage {} ({}). Find the treasure!", self.stage.stage_id().number(), code),
            MessageCategory::System,
        );
    }

    fn push(&mut self, text: String, category: MessageCategory) {
        self.messages.push(GameMessage { text, category });
        if self.messages.len() > MAX_MESSAGES {
            self.messages.remove(0);
        }
    }

    /// Turn an event into a log line
    fn describe(&mut self, event: &TurnEvent) {
        let (text, category) = match *event {
            TurnEvent::WallBroken { .. } => ("The sword smashes through the wall.".to_string(), MessageCategory::Item),
            TurnEvent::FlewOverWall { .. } => ("The pegasus carries you over the wall.".to_string(), MessageCategory::Item),
            TurnEvent::Revealed(Reveal::Monster(kind)) => (format!("You now know the {}.", kind.name()), MessageCategory::System),
            TurnEvent::Revealed(Reveal::Companion(kind)) => (format!("You meet {}.", kind.name()), MessageCategory::System),
            TurnEvent::BattleWon { kind, rarity, level, .. } => (
                format!("You defeat the {}. Level {}.", kind.def(rarity).name, level),
                MessageCategory::Combat,
            ),
            TurnEvent::BattleLost { kind, rarity } => (
                format!("The {} is too strong! You flee.", kind.def(rarity).name),
                MessageCategory::Warning,
            ),
            TurnEvent::BattleBuffSpent(buff) => (format!("{} wears off.", buff.name()), MessageCategory::Item),
            TurnEvent::ItemGained(buff) => (format!("You gain {}.", buff.name()), MessageCategory::Item),
            TurnEvent::Respawned { .. } => ("You wake up somewhere else.".to_string(), MessageCategory::Warning),
            TurnEvent::ChestUnlocked => ("Somewhere, a lock clicks open.".to_string(), MessageCategory::System),
            TurnEvent::TreasureSighted => ("You sense where the treasure lies.".to_string(), MessageCategory::System),
            TurnEvent::CompanionJoined(kind) => (format!("{} joins you.", kind.name()), MessageCategory::Item),
            TurnEvent::CaltropsScattered { cells } => (format!("{} caltrops scatter around.", cells), MessageCategory::Warning),
            TurnEvent::CaltropsStepped { damage } => (format!("Caltrops! You lose {} food.", damage), MessageCategory::Warning),
            TurnEvent::MonsterSpawned { .. } => ("Something stirs in the dark.".to_string(), MessageCategory::Warning),
            TurnEvent::StateChanged(EngineState::Won) => ("You open the treasure chest. Victory!".to_string(), MessageCategory::System),
            TurnEvent::StateChanged(EngineState::Dead) => ("You starve in the dark.".to_string(), MessageCategory::Warning),
            TurnEvent::StateChanged(_) => return,
        };
        self.push(text, category);
    }

    /// Render the current frame
    pub fn render(&self, frame: &mut Frame) {
        // Clear the entire screen first to prevent artifacts
        frame.render_widget(Clear, frame.area());

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(7)])
            .split(frame.area());
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(26)])
            .split(rows[0]);

        self.render_map(frame, columns[0]);
        self.render_sidebar(frame, columns[1]);
        self.render_messages(frame, rows[1]);

        if self.snapshot.state.is_terminal() && self.snapshot.state != EngineState::Quit {
            self.render_stage_over(frame);
        }
    }

    fn render_map(&self, frame: &mut Frame, area: Rect) {
        let snapshot = &self.snapshot;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Stage {} ", snapshot.stage))
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        // Center the camera on the player when the field does not fit
        let view_width = inner.width as i32;
        let view_height = inner.height as i32;
        let cam_x = camera_offset(snapshot.player.pos.x, view_width, snapshot.width);
        let cam_y = camera_offset(snapshot.player.pos.y, view_height, snapshot.height);

        let buf = frame.buffer_mut();
        for screen_y in 0..view_height.min(snapshot.height) {
            for screen_x in 0..view_width.min(snapshot.width) {
                let pos = Position::new(cam_x + screen_x, cam_y + screen_y);
                let (ch, fg) = self.cell_style(pos);

                let cell = &mut buf[(inner.x + screen_x as u16, inner.y + screen_y as u16)];
                cell.set_char(ch);
                cell.set_fg(fg);
            }
        }
    }

    fn cell_style(&self, pos: Position) -> (char, Color) {
        let glyph = self.snapshot.glyph_at(pos);
        let Some(cell) = self.snapshot.cell(pos) else {
            return (glyph, Color::Reset);
        };

        let fg = match glyph {
            PLAYER_GLYPH => Color::Rgb(255, 255, 255),
            CHEST_GLYPH if self.snapshot.chest_unlocked => Color::Rgb(255, 215, 0),
            CHEST_GLYPH => Color::Rgb(170, 140, 60),
            _ if cell.occupant.is_some() => Color::Rgb(230, 90, 90),
            _ => {
                let (r, g, b) = cell.kind.fg_color();
                Color::Rgb(r, g, b)
            }
        };
        let fg = if cell.lit || glyph == PLAYER_GLYPH { fg } else { dim(fg) };
        (glyph, fg)
    }

    fn render_sidebar(&self, frame: &mut Frame, area: Rect) {
        let player = &self.snapshot.player;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Status ")
            .border_style(Style::default().fg(Color::DarkGray));

        let food_color = if player.food * 5 <= player.max_food { Color::Red } else { Color::Green };
        let mut lines = vec![
            Line::from(vec![Span::raw("Level  "), Span::styled(player.level.to_string(), Style::default().add_modifier(Modifier::BOLD))]),
            Line::from(vec![Span::raw("Food   "), Span::styled(format!("{}/{}", player.food, player.max_food), Style::default().fg(food_color))]),
            Line::from(format!("Attack {}", player.attack)),
            Line::from(format!("Beats  {}", player.strongest_beatable.unwrap_or('-'))),
            Line::from(format!("Turn   {}", player.turn)),
            Line::from(""),
        ];
        for buff in &player.buffs {
            let (r, g, b) = buff.color();
            lines.push(Line::from(Span::styled(buff.name(), Style::default().fg(Color::Rgb(r, g, b)))));
        }
        if self.snapshot.chest_unlocked {
            lines.push(Line::from(Span::styled("Chest unlocked", Style::default().fg(Color::Yellow))));
        }

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_messages(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Messages ")
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(area);

        let messages: Vec<Line> = self
            .messages
            .iter()
            .rev()
            .take(inner.height as usize)
            .rev()
            .map(|msg| {
                let color = match msg.category {
                    MessageCategory::Combat => Color::Red,
                    MessageCategory::Item => Color::Yellow,
                    MessageCategory::System => Color::Cyan,
                    MessageCategory::Warning => Color::LightRed,
                };
                Line::from(Span::styled(msg.text.as_str(), Style::default().fg(color)))
            })
            .collect();

        frame.render_widget(Paragraph::new(messages).block(block), area);
    }

    fn render_stage_over(&self, frame: &mut Frame) {
        let area = centered_rect(40, 5, frame.area());
        let (title, color) = match self.snapshot.state {
            EngineState::Won => (" Victory ", Color::Yellow),
            _ => (" You Died ", Color::Red),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(color));
        let text = vec![
            Line::from(format!("Level {} after {} turns", self.snapshot.player.level, self.snapshot.player.turn)),
            Line::from(""),
            Line::from("[r] new stage   [q] quit"),
        ];

        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(text).block(block), area);
    }
}

/// Left/top map coordinate shown so that `focus` stays centered
fn camera_offset(focus: i32, view: i32, extent: i32) -> i32 {
    if extent <= view {
        0
    } else {
        (focus - view / 2).clamp(0, extent - view)
    }
}

fn dim(color: Color) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(r / 2, g / 2, b / 2),
        other => other,
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(area.x + (area.width - width) / 2, area.y + (area.height - height) / 2, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_offset() {
        assert_eq!(camera_offset(5, 100, 78), 0);
        assert_eq!(camera_offset(5, 40, 78), 0);
        assert_eq!(camera_offset(70, 40, 78), 38);
        assert_eq!(camera_offset(40, 40, 78), 20);
    }

    #[test]
    fn test_quit_key_ends_app() {
        let mut app = App::new(StageConfig::default().with_seed(2), StageTables::default()).unwrap();
        let quit = app.handle_input(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)).unwrap();
        assert!(quit);
    }
}
