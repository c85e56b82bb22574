//! Host input mapping
//!
//! Raw keyboard and pointer events are turned into template commands here,
//! gated by the current phase. Games re-check the phase when applying a
//! command, so a stale command is simply dropped.

use glam::Vec2;

use crate::config::Template;
use crate::sim::board::Coord;
use crate::sim::match3;
use crate::sim::state::Phase;

/// Keys the templates care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Enter,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// Printable key, lowercased
    Char(char),
    Other,
}

impl Key {
    /// Decode a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Self {
        match key {
            " " | "Spacebar" => Key::Space,
            "Enter" => Key::Enter,
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c.to_ascii_lowercase()),
                    _ => Key::Other,
                }
            }
        }
    }

    fn is_activation(self) -> bool {
        matches!(self, Key::Space | Key::Enter)
    }

    /// Arrow keys and WASD
    pub fn direction(self) -> Option<Direction> {
        match self {
            Key::ArrowUp | Key::Char('w') => Some(Direction::Up),
            Key::ArrowDown | Key::Char('s') => Some(Direction::Down),
            Key::ArrowLeft | Key::Char('a') => Some(Direction::Left),
            Key::ArrowRight | Key::Char('d') => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Input as delivered by the host surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    KeyDown(Key),
    /// Canvas-local pixel position
    PointerDown { x: f32, y: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// What a game is asked to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Leave the start screen
    Activate,
    /// Flap or jump
    Action,
    /// Whack-a-mole hit test at a canvas position
    Tap(Vec2),
    /// Match-3 cell pick (two adjacent picks make a swap)
    Select(Coord),
    /// Match-3 direct swap gesture
    Swap(Coord, Coord),
    Move(Direction),
    Reset,
}

/// Match-3 cell under a canvas position, if inside the grid
pub fn grid_cell_at(x: f32, y: f32) -> Option<Coord> {
    if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
        return None;
    }
    let col = (x / match3::GEM_SIZE).floor() as usize;
    let row = (y / match3::GEM_SIZE).floor() as usize;
    if row < match3::GRID_ROWS && col < match3::GRID_COLS {
        Some(Coord::new(row, col))
    } else {
        None
    }
}

/// Translate a host event for `template` in `phase`
pub fn map_input(template: Template, phase: Phase, event: &HostEvent) -> Option<Command> {
    if phase.is_busy() {
        return None;
    }

    let pointer = matches!(event, HostEvent::PointerDown { .. });
    let activation = pointer || matches!(event, HostEvent::KeyDown(k) if k.is_activation());

    match template {
        Template::FlappyBird | Template::SpeedRunner => {
            if !activation {
                return None;
            }
            match phase {
                Phase::Start => Some(Command::Activate),
                Phase::Playing => Some(Command::Action),
                Phase::GameOver => Some(Command::Reset),
                Phase::Swapping | Phase::Resolving => None,
            }
        }
        Template::WhackAMole => match (phase, event) {
            (Phase::Start, _) if activation => Some(Command::Activate),
            (Phase::Playing, HostEvent::PointerDown { x, y }) => Some(Command::Tap(Vec2::new(*x, *y))),
            (Phase::GameOver, HostEvent::PointerDown { .. }) => Some(Command::Reset),
            _ => None,
        },
        Template::Match3 => match (phase, event) {
            (Phase::Start, _) if activation => Some(Command::Activate),
            (Phase::Playing, HostEvent::PointerDown { x, y }) => grid_cell_at(*x, *y).map(Command::Select),
            (Phase::GameOver, HostEvent::PointerDown { .. }) => Some(Command::Reset),
            _ => None,
        },
        Template::CrossyRoad => match (phase, event) {
            (Phase::Start, HostEvent::KeyDown(_)) => Some(Command::Activate),
            (Phase::Playing, HostEvent::KeyDown(key)) => key.direction().map(Command::Move),
            (Phase::GameOver, HostEvent::KeyDown(Key::Char('r'))) => Some(Command::Reset),
            _ => None,
        },
    }
}
