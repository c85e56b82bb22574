//! Whack-a-mole: timed target elimination
//!
//! Moles pop out of a 3x3 grid of holes and retreat after a fixed lifetime.
//! A tap inside a mole scores one point; the round lasts thirty seconds of
//! game time.

use glam::Vec2;
use rand::Rng;

use super::collision::{Rect, point_in_circle};
use super::session::MiniGame;
use super::state::{Core, Phase, TickResult, reset_events};
use crate::assets::AssetKind;
use crate::config::Template;
use crate::consts::FRAMES_PER_SECOND;
use crate::input::Command;
use crate::params::{Parameters, spawn_interval};
use crate::renderer::{DrawList, Layer, colors};

pub const FIELD_W: f32 = 500.0;
pub const FIELD_H: f32 = 500.0;
pub const GRID: usize = 3;
pub const HOLE_SIZE: f32 = 100.0;
pub const MOLE_RADIUS: f32 = 40.0;
pub const MAX_MOLES: usize = 3;
/// Round length in seconds
pub const ROUND_SECONDS: u32 = 30;
/// Shortest lifetime a mole can have, in frames
const MIN_LIFETIME: u64 = 10;

/// Gap between holes (and between the outer holes and the edge)
pub fn hole_spacing() -> f32 {
    (FIELD_W - GRID as f32 * HOLE_SIZE) / (GRID as f32 + 1.0)
}

/// Top-left corner of a hole
pub fn hole_origin(row: usize, col: usize) -> Vec2 {
    let spacing = hole_spacing();
    Vec2::new(
        spacing + col as f32 * (HOLE_SIZE + spacing),
        spacing + row as f32 * (HOLE_SIZE + spacing),
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhackTuning {
    pub spawn_interval: u32,
    /// Frames a mole stays up
    pub lifetime: u64,
}

impl WhackTuning {
    pub fn from_params(p: &Parameters) -> Self {
        Self {
            spawn_interval: spawn_interval(120, 10, p.spawn_rate),
            lifetime: 100u64.saturating_sub(p.speed as u64 * 5).max(MIN_LIFETIME),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mole {
    pub row: usize,
    pub col: usize,
    pub center: Vec2,
    /// Frame at which the mole retreats
    pub expires_at: u64,
}

impl Mole {
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - MOLE_RADIUS,
            self.center.y - MOLE_RADIUS,
            MOLE_RADIUS * 2.0,
            MOLE_RADIUS * 2.0,
        )
    }
}

#[derive(Debug, Clone)]
pub struct WhackGame {
    pub tuning: WhackTuning,
    pub core: Core,
    pub moles: Vec<Mole>,
    /// Seconds left in the round
    pub time_left: u32,
}

impl WhackGame {
    pub fn new(tuning: WhackTuning, seed: u64) -> Self {
        Self {
            tuning,
            core: Core::new(seed),
            moles: Vec::new(),
            time_left: ROUND_SECONDS,
        }
    }

    fn occupied(&self, row: usize, col: usize) -> bool {
        self.moles.iter().any(|m| m.row == row && m.col == col)
    }

    /// Pop a mole out of a random free hole
    fn spawn_mole(&mut self) {
        let free: Vec<(usize, usize)> = (0..GRID)
            .flat_map(|row| (0..GRID).map(move |col| (row, col)))
            .filter(|(row, col)| !self.occupied(*row, *col))
            .collect();
        if free.is_empty() {
            return;
        }
        let (row, col) = free[self.core.rng.random_range(0..free.len())];
        let center = hole_origin(row, col) + Vec2::splat(HOLE_SIZE / 2.0);
        log::debug!("Mole up at ({}, {}) on frame {}", row, col, self.core.frame);
        self.moles.push(Mole {
            row,
            col,
            center,
            expires_at: self.core.frame + self.tuning.lifetime,
        });
    }

    fn whack(&mut self, point: Vec2) -> TickResult {
        let mut out = TickResult::default();
        let before = self.moles.len();
        self.moles.retain(|m| !point_in_circle(point, m.center, MOLE_RADIUS));
        let hits = (before - self.moles.len()) as u64;
        self.core.add_score(hits, &mut out);
        out
    }
}

impl MiniGame for WhackGame {
    fn template(&self) -> Template {
        Template::WhackAMole
    }

    fn core(&self) -> &Core {
        &self.core
    }

    fn apply(&mut self, command: Command) -> TickResult {
        match (self.core.phase, command) {
            (Phase::Start, Command::Activate) => self.core.activate(),
            (Phase::Playing, Command::Tap(point)) => self.whack(point),
            (Phase::GameOver, Command::Reset) => self.reset(),
            _ => TickResult::default(),
        }
    }

    fn tick(&mut self) -> TickResult {
        let mut out = TickResult::default();
        if self.core.phase != Phase::Playing {
            return out;
        }

        let frame = self.core.frame;
        if frame % self.tuning.spawn_interval as u64 == 0 && self.moles.len() < MAX_MOLES {
            self.spawn_mole();
        }
        self.moles.retain(|m| m.expires_at > frame);

        if frame > 0 && frame % FRAMES_PER_SECOND == 0 {
            self.time_left = self.time_left.saturating_sub(1);
            if self.time_left == 0 {
                self.core.finish(&mut out);
                return out;
            }
        }

        self.core.frame += 1;
        out
    }

    fn reset(&mut self) -> TickResult {
        let out = reset_events(self.core.phase);
        *self = Self::new(self.tuning, self.core.seed);
        out
    }

    fn render(&self, list: &mut DrawList) {
        let field = self.field();
        list.fill_rect(Layer::Background, field, colors::WHACK_GROUND);
        list.image(Layer::Background, AssetKind::Background, field);

        for row in 0..GRID {
            for col in 0..GRID {
                let origin = hole_origin(row, col);
                list.image(
                    Layer::Field,
                    AssetKind::Obstacle,
                    Rect::new(origin.x, origin.y, HOLE_SIZE, HOLE_SIZE),
                );
            }
        }

        for mole in &self.moles {
            list.image(Layer::Player, AssetKind::Player, mole.bounds());
        }

        list.hud_text(format!("Score: {}", self.core.score()), 10.0, 30.0, 30.0);
        list.hud_text(format!("Time: {}", self.time_left), FIELD_W - 120.0, 30.0, 30.0);
        match self.core.phase {
            Phase::Start => list.hud_text("Click to Start", FIELD_W / 2.0 - 100.0, FIELD_H / 2.0, 30.0),
            Phase::GameOver => {
                list.hud_text("Game Over!", FIELD_W / 2.0 - 80.0, FIELD_H / 2.0 - 20.0, 36.0);
                list.hud_text("Click to Restart", FIELD_W / 2.0 - 90.0, FIELD_H / 2.0 + 20.0, 24.0);
            }
            _ => {}
        }
    }

    fn entity_bounds(&self) -> Vec<Rect> {
        self.moles.iter().map(Mole::bounds).collect()
    }
}
