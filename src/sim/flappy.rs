//! Flappy-bird: vertical obstacle avoidance
//!
//! The bird falls under constant gravity and flaps upward on input. Pipe
//! pairs scroll in from the right with a gap at a random height.

use glam::Vec2;
use rand::Rng;

use super::collision::Rect;
use super::session::MiniGame;
use super::state::{Core, Phase, TickResult, reset_events};
use crate::assets::AssetKind;
use crate::config::Template;
use crate::input::Command;
use crate::params::{Parameters, spawn_interval};
use crate::renderer::{DrawList, Layer, colors};

pub const FIELD_W: f32 = 320.0;
pub const FIELD_H: f32 = 480.0;
pub const BIRD_START: Vec2 = Vec2::new(50.0, 150.0);
pub const BIRD_SIZE: Vec2 = Vec2::new(34.0, 24.0);
pub const PIPE_WIDTH: f32 = 52.0;
/// Vertical band kept clear of the gap top (50 px at each end)
const PIPE_MARGIN: f32 = 100.0;

/// Physical constants derived from the parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlappyTuning {
    /// Added to the bird's velocity every frame
    pub gravity: f32,
    /// Vertical opening between the pipes
    pub gap: f32,
    /// Pipe scroll speed, px per frame
    pub pipe_speed: f32,
    pub spawn_interval: u32,
    /// Velocity set by a flap
    pub flap_velocity: f32,
}

impl FlappyTuning {
    pub fn from_params(p: &Parameters) -> Self {
        Self {
            gravity: 0.05 * p.gravity as f32,
            gap: 25.0 + p.gap_size as f32 * 10.0,
            pipe_speed: p.speed as f32 / 2.0,
            spawn_interval: spawn_interval(250, 15, p.spawn_rate),
            flap_velocity: -2.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    pub pos: Vec2,
    /// Vertical velocity, px per frame (positive is down)
    pub velocity: f32,
}

impl Bird {
    pub fn rect(&self) -> Rect {
        Rect::from_pos(self.pos, BIRD_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub x: f32,
    /// Height of the top pipe (y of the gap's upper edge)
    pub gap_top: f32,
    /// Set once the bird has passed this pipe
    pub scored: bool,
}

impl Pipe {
    pub fn top_rect(&self) -> Rect {
        Rect::new(self.x, 0.0, PIPE_WIDTH, self.gap_top)
    }

    pub fn bottom_rect(&self, gap: f32) -> Rect {
        let y = self.gap_top + gap;
        Rect::new(self.x, y, PIPE_WIDTH, FIELD_H - y)
    }
}

#[derive(Debug, Clone)]
pub struct FlappyGame {
    pub tuning: FlappyTuning,
    pub core: Core,
    pub bird: Bird,
    pub pipes: Vec<Pipe>,
}

impl FlappyGame {
    pub fn new(tuning: FlappyTuning, seed: u64) -> Self {
        Self {
            tuning,
            core: Core::new(seed),
            bird: Bird {
                pos: BIRD_START,
                velocity: 0.0,
            },
            pipes: Vec::new(),
        }
    }

    fn flap(&mut self) {
        self.bird.velocity = self.tuning.flap_velocity;
    }

    fn spawn_pipe(&mut self) {
        let range = (FIELD_H - self.tuning.gap - PIPE_MARGIN).max(0.0);
        let gap_top = self.core.rng.random::<f32>() * range + PIPE_MARGIN / 2.0;
        log::debug!("Pipe spawned at frame {} (gap top {:.1})", self.core.frame, gap_top);
        self.pipes.push(Pipe {
            x: FIELD_W,
            gap_top,
            scored: false,
        });
    }

    fn out_of_bounds(&self) -> bool {
        let rect = self.bird.rect();
        rect.bottom() > FIELD_H || rect.y < 0.0
    }
}

impl MiniGame for FlappyGame {
    fn template(&self) -> Template {
        Template::FlappyBird
    }

    fn core(&self) -> &Core {
        &self.core
    }

    fn apply(&mut self, command: Command) -> TickResult {
        match (self.core.phase, command) {
            (Phase::Start, Command::Activate) => self.core.activate(),
            (Phase::Playing, Command::Action) => {
                self.flap();
                TickResult::default()
            }
            (Phase::GameOver, Command::Reset) => self.reset(),
            _ => TickResult::default(),
        }
    }

    fn tick(&mut self) -> TickResult {
        let mut out = TickResult::default();
        if self.core.phase != Phase::Playing {
            return out;
        }

        self.bird.velocity += self.tuning.gravity;
        self.bird.pos.y += self.bird.velocity;
        if self.out_of_bounds() {
            self.core.finish(&mut out);
            return out;
        }

        if self.core.frame % self.tuning.spawn_interval as u64 == 0 {
            self.spawn_pipe();
        }

        let bird = self.bird.rect();
        let mut hit = false;
        let mut passed = 0;
        for pipe in &mut self.pipes {
            pipe.x -= self.tuning.pipe_speed;
            if bird.overlaps(&pipe.top_rect()) || bird.overlaps(&pipe.bottom_rect(self.tuning.gap)) {
                hit = true;
            }
            if !pipe.scored && pipe.x + PIPE_WIDTH < bird.x {
                pipe.scored = true;
                passed += 1;
            }
        }
        self.core.add_score(passed, &mut out);
        self.pipes.retain(|p| p.x + PIPE_WIDTH > 0.0);

        if hit {
            self.core.finish(&mut out);
            return out;
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
        list.fill_rect(Layer::Background, field, colors::FLAPPY_SKY);
        list.image(Layer::Background, AssetKind::Background, field);

        for pipe in &self.pipes {
            list.image(Layer::Obstacles, AssetKind::Obstacle, pipe.top_rect());
            list.image(Layer::Obstacles, AssetKind::Obstacle, pipe.bottom_rect(self.tuning.gap));
        }

        list.image(Layer::Player, AssetKind::Player, self.bird.rect());

        let score = self.core.score();
        match self.core.phase {
            Phase::Start => list.hud_text("Tap to Start", FIELD_W / 2.0 - 80.0, FIELD_H / 2.0, 30.0),
            Phase::GameOver => {
                list.hud_text("Game Over", FIELD_W / 2.0 - 70.0, FIELD_H / 2.0 - 20.0, 30.0);
                list.hud_text(format!("Score: {}", score), FIELD_W / 2.0 - 50.0, FIELD_H / 2.0 + 20.0, 24.0);
            }
            _ => list.hud_text(score.to_string(), FIELD_W / 2.0, 50.0, 36.0),
        }
    }

    fn entity_bounds(&self) -> Vec<Rect> {
        let mut rects = vec![self.bird.rect()];
        for pipe in &self.pipes {
            rects.push(pipe.top_rect());
            rects.push(pipe.bottom_rect(self.tuning.gap));
        }
        rects
    }
}
