//! Speed-runner: side-scrolling jump-over-obstacles
//!
//! Obstacles of random height slide in along the ground; the score is the
//! distance run (one point per ten frames).

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

pub const FIELD_W: f32 = 640.0;
pub const FIELD_H: f32 = 360.0;
pub const PLAYER_SIZE: Vec2 = Vec2::new(40.0, 40.0);
pub const PLAYER_X: f32 = 50.0;
pub const OBSTACLE_WIDTH: f32 = 20.0;
const OBSTACLE_MIN_HEIGHT: f32 = 20.0;
const OBSTACLE_HEIGHT_RANGE: f32 = 30.0;
/// Frames per point of distance
const FRAMES_PER_POINT: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunnerTuning {
    /// Scroll speed, px per frame
    pub run_speed: f32,
    pub gravity: f32,
    /// Upward velocity of a jump
    pub jump_strength: f32,
    pub spawn_interval: u32,
}

impl RunnerTuning {
    pub fn from_params(p: &Parameters) -> Self {
        Self {
            run_speed: 1.0 + p.speed as f32,
            gravity: 0.1 * p.gravity as f32,
            jump_strength: 4.0 + p.speed as f32,
            spawn_interval: spawn_interval(200, 10, p.spawn_rate),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Runner {
    pub pos: Vec2,
    pub velocity: f32,
    pub grounded: bool,
}

impl Runner {
    fn on_ground() -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, FIELD_H - PLAYER_SIZE.y),
            velocity: 0.0,
            grounded: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos(self.pos, PLAYER_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Obstacle {
    pub fn rect(&self) -> Rect {
        Rect::from_pos(self.pos, self.size)
    }
}

#[derive(Debug, Clone)]
pub struct RunnerGame {
    pub tuning: RunnerTuning,
    pub core: Core,
    pub player: Runner,
    pub obstacles: Vec<Obstacle>,
    /// Background scroll offset in `(-FIELD_W, 0]`
    pub background_x: f32,
}

impl RunnerGame {
    pub fn new(tuning: RunnerTuning, seed: u64) -> Self {
        Self {
            tuning,
            core: Core::new(seed),
            player: Runner::on_ground(),
            obstacles: Vec::new(),
            background_x: 0.0,
        }
    }

    fn jump(&mut self) {
        if self.player.grounded {
            self.player.velocity = -self.tuning.jump_strength;
            self.player.grounded = false;
        }
    }

    fn integrate_player(&mut self) {
        let p = &mut self.player;
        p.velocity += self.tuning.gravity;
        p.pos.y += p.velocity;

        let floor = FIELD_H - PLAYER_SIZE.y;
        if p.pos.y >= floor {
            p.pos.y = floor;
            p.velocity = 0.0;
            p.grounded = true;
        }
        if p.pos.y < 0.0 {
            p.pos.y = 0.0;
            p.velocity = 0.0;
        }
    }

    fn spawn_obstacle(&mut self) {
        let height = self.core.rng.random::<f32>() * OBSTACLE_HEIGHT_RANGE + OBSTACLE_MIN_HEIGHT;
        log::debug!("Obstacle spawned at frame {} (height {:.1})", self.core.frame, height);
        self.obstacles.push(Obstacle {
            pos: Vec2::new(FIELD_W, FIELD_H - height),
            size: Vec2::new(OBSTACLE_WIDTH, height),
        });
    }
}

impl MiniGame for RunnerGame {
    fn template(&self) -> Template {
        Template::SpeedRunner
    }

    fn core(&self) -> &Core {
        &self.core
    }

    fn apply(&mut self, command: Command) -> TickResult {
        match (self.core.phase, command) {
            (Phase::Start, Command::Activate) => self.core.activate(),
            (Phase::Playing, Command::Action) => {
                self.jump();
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

        self.integrate_player();

        if self.core.frame % self.tuning.spawn_interval as u64 == 0 {
            self.spawn_obstacle();
        }

        let player = self.player.rect();
        let mut hit = false;
        for obstacle in &mut self.obstacles {
            obstacle.pos.x -= self.tuning.run_speed;
            hit |= player.overlaps(&obstacle.rect());
        }
        self.obstacles.retain(|o| o.pos.x + o.size.x > 0.0);

        if hit {
            self.core.finish(&mut out);
            return out;
        }

        self.background_x -= self.tuning.run_speed / 2.0;
        if self.background_x <= -FIELD_W {
            self.background_x = 0.0;
        }

        self.core.frame += 1;
        let distance = self.core.frame / FRAMES_PER_POINT;
        self.core.raise_score_to(distance, &mut out);
        out
    }

    fn reset(&mut self) -> TickResult {
        let out = reset_events(self.core.phase);
        *self = Self::new(self.tuning, self.core.seed);
        out
    }

    fn render(&self, list: &mut DrawList) {
        list.fill_rect(Layer::Background, self.field(), colors::RUNNER_SKY);
        // Two copies side by side for a seamless scroll
        for offset in [0.0, FIELD_W] {
            list.image(
                Layer::Background,
                AssetKind::Background,
                Rect::new(self.background_x + offset, 0.0, FIELD_W, FIELD_H),
            );
        }

        for obstacle in &self.obstacles {
            list.image(Layer::Obstacles, AssetKind::Obstacle, obstacle.rect());
        }
        list.image(Layer::Player, AssetKind::Player, self.player.rect());

        list.hud_text(format!("Score: {}", self.core.score()), 20.0, 30.0, 24.0);
        match self.core.phase {
            Phase::Start => list.hud_text("Tap to Run", FIELD_W / 2.0 - 70.0, FIELD_H / 2.0, 30.0),
            Phase::GameOver => {
                list.hud_text("Game Over", FIELD_W / 2.0 - 70.0, FIELD_H / 2.0 - 10.0, 30.0);
                list.hud_text("Tap to Restart", FIELD_W / 2.0 - 80.0, FIELD_H / 2.0 + 30.0, 20.0);
            }
            _ => {}
        }
    }

    fn entity_bounds(&self) -> Vec<Rect> {
        std::iter::once(self.player.rect())
            .chain(self.obstacles.iter().map(Obstacle::rect))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(params: Parameters) -> RunnerGame {
        let mut game = RunnerGame::new(RunnerTuning::from_params(&params), 11);
        game.apply(Command::Activate);
        game
    }

    #[test]
    fn test_tuning_formulas() {
        let t = RunnerTuning::from_params(&Parameters::new(5, 3, 5, 4));
        assert_eq!(t.run_speed, 6.0);
        assert!((t.gravity - 0.3).abs() < 1e-6);
        assert_eq!(t.jump_strength, 9.0);
        assert_eq!(t.spawn_interval, 160);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let mut game = playing(Parameters::default());
        game.apply(Command::Action);
        assert_eq!(game.player.velocity, -9.0);
        game.tick();
        let v = game.player.velocity;
        game.apply(Command::Action);
        assert_eq!(game.player.velocity, v);
    }

    #[test]
    fn test_lands_on_floor() {
        let mut game = playing(Parameters::default());
        game.apply(Command::Action);
        game.obstacles.clear();
        for _ in 0..200 {
            game.tick();
            game.obstacles.clear();
        }
        assert!(game.player.grounded);
        assert_eq!(game.player.pos.y, FIELD_H - PLAYER_SIZE.y);
    }

    #[test]
    fn test_ceiling_clamp() {
        let mut game = playing(Parameters::new(10, 1, 5, 4));
        game.player.pos.y = 2.0;
        game.player.velocity = -14.0;
        game.player.grounded = false;
        game.tick();
        assert_eq!(game.player.pos.y, 0.0);
        assert_eq!(game.player.velocity, 0.0);
    }

    #[test]
    fn test_score_is_distance() {
        let mut game = playing(Parameters::default());
        for _ in 0..25 {
            game.obstacles.clear();
            game.tick();
        }
        assert_eq!(game.core.frame, 25);
        assert_eq!(game.core.score(), 2);
    }

    #[test]
    fn test_obstacle_collision_ends_game() {
        let mut game = playing(Parameters::default());
        game.core.frame = 1;
        game.obstacles.push(Obstacle {
            pos: Vec2::new(PLAYER_X + 10.0, FIELD_H - 30.0),
            size: Vec2::new(OBSTACLE_WIDTH, 30.0),
        });
        game.tick();
        assert_eq!(game.core.phase, Phase::GameOver);
    }

    #[test]
    fn test_obstacles_rest_on_ground() {
        let mut game = playing(Parameters::default());
        game.tick();
        let o = &game.obstacles[0];
        assert_eq!(o.rect().bottom(), FIELD_H);
        assert!((20.0..50.0).contains(&o.size.y));
    }

    #[test]
    fn test_background_wraps() {
        let mut game = playing(Parameters::default());
        game.background_x = -FIELD_W + 1.0;
        game.core.frame = 1;
        game.tick();
        assert_eq!(game.background_x, 0.0);
    }
}
