//! Crossy-road: hop forward across lanes of traffic
//!
//! The world is a fixed stack of lanes generated up front from the seed.
//! Lane 0 is where the player starts; higher lanes are further ahead and
//! are drawn higher on screen. A smoothed camera follows the player.

use glam::Vec2;
use rand::Rng;

use super::collision::Rect;
use super::session::MiniGame;
use super::state::{Core, Phase, TickResult, reset_events};
use crate::assets::AssetKind;
use crate::config::Template;
use crate::input::{Command, Direction};
use crate::params::Parameters;
use crate::renderer::{DrawList, Layer, colors};

/// Tile edge in pixels
pub const TILE: f32 = 40.0;
pub const COLUMNS: usize = 11;
pub const VISIBLE_ROWS: usize = 15;
pub const LANE_COUNT: usize = 300;
/// Leading lanes that are always grass
const SAFE_LANES: usize = 3;
pub const START_COLUMN: usize = 5;
/// Rows of look-ahead kept below the player before the camera moves
const CAMERA_LEAD_ROWS: f32 = 3.0;
const CAMERA_SMOOTHING: f32 = 0.1;
const MAX_CARS_PER_LANE: u32 = 4;

pub const FIELD_W: f32 = COLUMNS as f32 * TILE;
pub const FIELD_H: f32 = VISIBLE_ROWS as f32 * TILE;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossyTuning {
    pub car_speed_min: f32,
    pub car_speed_max: f32,
    /// Chance that a lane past the safe zone is a road
    pub road_chance: f64,
}

impl CrossyTuning {
    pub fn from_params(p: &Parameters) -> Self {
        let speed = p.speed as f32;
        Self {
            car_speed_min: 0.5 + speed / 5.0,
            car_speed_max: 1.5 + speed / 3.0,
            road_chance: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneKind {
    Grass,
    Road,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub kind: LaneKind,
    /// +1 drives right, -1 drives left
    pub direction: f32,
    pub speed: f32,
    /// Car x positions (cars are one tile square)
    pub cars: Vec<f32>,
}

impl Lane {
    fn generate<R: Rng>(index: usize, tuning: &CrossyTuning, rng: &mut R) -> Self {
        let safe = index < SAFE_LANES || index == LANE_COUNT - 1;
        let kind = if !safe && rng.random_bool(tuning.road_chance) {
            LaneKind::Road
        } else {
            LaneKind::Grass
        };
        let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let speed = rng.random_range(tuning.car_speed_min..tuning.car_speed_max);

        let cars = match kind {
            LaneKind::Road => {
                let count = rng.random_range(1..=MAX_CARS_PER_LANE);
                (0..count).map(|_| rng.random::<f32>() * FIELD_W).collect()
            }
            LaneKind::Grass => Vec::new(),
        };

        Self {
            kind,
            direction,
            speed,
            cars,
        }
    }

    fn drive(&mut self) {
        for x in &mut self.cars {
            *x += self.speed * self.direction;
            if self.direction > 0.0 && *x > FIELD_W {
                *x = -TILE;
            } else if self.direction < 0.0 && *x < -TILE {
                *x = FIELD_W;
            }
        }
    }
}

/// World-space y of a lane's top edge (lane 0 at the bottom)
pub fn lane_world_y(index: usize) -> f32 {
    (LANE_COUNT - 1 - index) as f32 * TILE
}

#[derive(Debug, Clone)]
pub struct CrossyGame {
    pub tuning: CrossyTuning,
    pub core: Core,
    pub lanes: Vec<Lane>,
    pub column: usize,
    /// Lane index the player stands on
    pub lane: usize,
    /// Camera offset in pixels (grows as the player advances)
    pub camera: f32,
    /// Best score across resets
    pub best: u64,
}

impl CrossyGame {
    pub fn new(tuning: CrossyTuning, seed: u64) -> Self {
        let mut core = Core::new(seed);
        let lanes = (0..LANE_COUNT)
            .map(|i| Lane::generate(i, &tuning, &mut core.rng))
            .collect();
        Self {
            tuning,
            core,
            lanes,
            column: START_COLUMN,
            lane: 0,
            camera: 0.0,
            best: 0,
        }
    }

    fn step(&mut self, direction: Direction) -> TickResult {
        let mut out = TickResult::default();
        match direction {
            Direction::Up => {
                if self.lane + 1 < LANE_COUNT {
                    self.lane += 1;
                    self.core.add_score(1, &mut out);
                    self.best = self.best.max(self.core.score());
                }
            }
            Direction::Down => self.lane = self.lane.saturating_sub(1),
            Direction::Left => self.column = self.column.saturating_sub(1),
            Direction::Right => self.column = (self.column + 1).min(COLUMNS - 1),
        }
        out
    }

    fn player_x(&self) -> f32 {
        self.column as f32 * TILE
    }

    fn hit_by_car(&self) -> bool {
        let Some(lane) = self.lanes.get(self.lane) else {
            return false;
        };
        if lane.kind != LaneKind::Road {
            return false;
        }
        let player = Rect::new(self.player_x(), 0.0, TILE, TILE);
        lane.cars.iter().any(|x| player.overlaps(&Rect::new(*x, 0.0, TILE, TILE)))
    }

    /// Screen-space y of a lane's top edge
    fn screen_y(&self, index: usize) -> f32 {
        (VISIBLE_ROWS as f32 - 1.0 - index as f32) * TILE + self.camera
    }
}

impl MiniGame for CrossyGame {
    fn template(&self) -> Template {
        Template::CrossyRoad
    }

    fn core(&self) -> &Core {
        &self.core
    }

    fn apply(&mut self, command: Command) -> TickResult {
        match (self.core.phase, command) {
            (Phase::Start, Command::Activate) => self.core.activate(),
            (Phase::Playing, Command::Move(direction)) => self.step(direction),
            (Phase::GameOver, Command::Reset) => self.reset(),
            _ => TickResult::default(),
        }
    }

    fn tick(&mut self) -> TickResult {
        let mut out = TickResult::default();
        if self.core.phase != Phase::Playing {
            return out;
        }

        for lane in &mut self.lanes {
            lane.drive();
        }

        if self.hit_by_car() {
            self.core.finish(&mut out);
            return out;
        }

        let target = (self.lane as f32 - CAMERA_LEAD_ROWS).max(0.0) * TILE;
        self.camera += (target - self.camera) * CAMERA_SMOOTHING;

        self.core.frame += 1;
        out
    }

    /// Rebuild the world; the best score survives
    fn reset(&mut self) -> TickResult {
        let out = reset_events(self.core.phase);
        let best = self.best;
        *self = Self::new(self.tuning, self.core.seed);
        self.best = best;
        out
    }

    fn render(&self, list: &mut DrawList) {
        let first = (self.camera / TILE).floor().max(0.0) as usize;
        let last = (first + VISIBLE_ROWS + 1).min(LANE_COUNT);
        let visible = first..last;

        for index in visible.clone() {
            let rect = Rect::new(0.0, self.screen_y(index), FIELD_W, TILE);
            let color = match self.lanes[index].kind {
                LaneKind::Grass => colors::GRASS,
                LaneKind::Road => colors::ROAD,
            };
            list.fill_rect(Layer::Field, rect, color);
            if self.lanes[index].kind == LaneKind::Grass {
                list.image(Layer::Field, AssetKind::Background, rect);
            }
        }

        for index in visible {
            let y = self.screen_y(index);
            for x in &self.lanes[index].cars {
                list.image(Layer::Obstacles, AssetKind::Obstacle, Rect::new(*x, y, TILE, TILE));
            }
        }

        list.image(
            Layer::Player,
            AssetKind::Player,
            Rect::from_pos(Vec2::new(self.player_x(), self.screen_y(self.lane)), Vec2::splat(TILE)),
        );

        list.hud_text(format!("Score: {}", self.core.score()), 10.0, 30.0, 24.0);
        list.hud_text(format!("High: {}", self.best), FIELD_W - 110.0, 30.0, 24.0);
        match self.core.phase {
            Phase::Start => list.hud_text("Use Arrows to Move", FIELD_W / 2.0 - 120.0, FIELD_H / 2.0, 26.0),
            Phase::GameOver => {
                list.hud_text("Game Over!", FIELD_W / 2.0 - 80.0, FIELD_H / 2.0 - 20.0, 36.0);
                list.hud_text("Press 'R' to restart", FIELD_W / 2.0 - 110.0, FIELD_H / 2.0 + 20.0, 22.0);
            }
            _ => {}
        }
    }

    fn field(&self) -> Rect {
        Rect::new(0.0, 0.0, FIELD_W, LANE_COUNT as f32 * TILE)
    }

    /// Player and cars in world space
    fn entity_bounds(&self) -> Vec<Rect> {
        let mut rects = vec![Rect::new(self.player_x(), lane_world_y(self.lane), TILE, TILE)];
        for (index, lane) in self.lanes.iter().enumerate() {
            let y = lane_world_y(index);
            rects.extend(lane.cars.iter().map(|x| Rect::new(*x, y, TILE, TILE)));
        }
        rects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GameEvent;

    fn playing(seed: u64) -> CrossyGame {
        let mut game = CrossyGame::new(CrossyTuning::from_params(&Parameters::default()), seed);
        game.apply(Command::Activate);
        game
    }

    #[test]
    fn test_lane_generation() {
        let game = playing(3);
        assert_eq!(game.lanes.len(), LANE_COUNT);
        for lane in &game.lanes[..SAFE_LANES] {
            assert_eq!(lane.kind, LaneKind::Grass);
            assert!(lane.cars.is_empty());
        }
        assert_eq!(game.lanes[LANE_COUNT - 1].kind, LaneKind::Grass);
        for lane in game.lanes.iter().filter(|l| l.kind == LaneKind::Road) {
            assert!((1..=4).contains(&lane.cars.len()));
            assert!(lane.speed >= game.tuning.car_speed_min && lane.speed < game.tuning.car_speed_max);
        }
        assert!(game.lanes.iter().any(|l| l.kind == LaneKind::Road));
    }

    #[test]
    fn test_moves_and_scoring() {
        let mut game = playing(3);
        let out = game.apply(Command::Move(Direction::Up));
        assert_eq!(game.lane, 1);
        assert!(out.contains(&GameEvent::Scored { points: 1, total: 1 }));

        game.apply(Command::Move(Direction::Down));
        game.apply(Command::Move(Direction::Down));
        assert_eq!(game.lane, 0);
        assert_eq!(game.core.score(), 1);

        for _ in 0..20 {
            game.apply(Command::Move(Direction::Right));
        }
        assert_eq!(game.column, COLUMNS - 1);
        for _ in 0..20 {
            game.apply(Command::Move(Direction::Left));
        }
        assert_eq!(game.column, 0);
    }

    #[test]
    fn test_cars_wrap() {
        let mut lane = Lane {
            kind: LaneKind::Road,
            direction: 1.0,
            speed: 2.0,
            cars: vec![FIELD_W - 1.0],
        };
        lane.drive();
        assert_eq!(lane.cars[0], -TILE);

        lane.direction = -1.0;
        lane.cars[0] = -TILE - 0.5;
        lane.drive();
        assert_eq!(lane.cars[0], FIELD_W);
    }

    #[test]
    fn test_car_collision_ends_game() {
        let mut game = playing(3);
        game.lanes[1] = Lane {
            kind: LaneKind::Road,
            direction: 1.0,
            speed: 1.0,
            cars: vec![game.player_x() - 10.0],
        };
        game.apply(Command::Move(Direction::Up));
        game.tick();
        assert_eq!(game.core.phase, Phase::GameOver);
    }

    #[test]
    fn test_camera_follows() {
        let mut game = playing(5);
        for lane in &mut game.lanes {
            lane.kind = LaneKind::Grass;
            lane.cars.clear();
        }
        for _ in 0..10 {
            game.apply(Command::Move(Direction::Up));
        }
        for _ in 0..200 {
            game.tick();
        }
        assert!((game.camera - 7.0 * TILE).abs() < 1.0);
    }

    #[test]
    fn test_reset_keeps_best() {
        let mut game = playing(3);
        game.apply(Command::Move(Direction::Up));
        game.apply(Command::Move(Direction::Up));
        game.core.phase = Phase::GameOver;
        game.apply(Command::Reset);
        assert_eq!(game.core.phase, Phase::Start);
        assert_eq!(game.core.score(), 0);
        assert_eq!(game.lane, 0);
        assert_eq!(game.best, 2);
    }
}
