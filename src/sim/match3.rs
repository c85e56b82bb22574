//! Match-3: swap adjacent gems to line up three or more
//!
//! Swaps are validated by a full board rescan. A swap that matches nothing
//! is shown for a short pause (`Swapping`) and then undone. A committed swap
//! enters `Resolving`, which walks the cascade one stage at a time with a
//! pause between stages so the player can follow it.

use std::collections::BTreeSet;

use super::board::{Board, Coord, random_kind};
use super::collision::Rect;
use super::session::MiniGame;
use super::state::{Core, Phase, TickResult, reset_events};
use crate::assets::AssetKind;
use crate::config::Template;
use crate::input::Command;
use crate::params::Parameters;
use crate::renderer::{DrawList, Layer, colors};

pub const GRID_ROWS: usize = 8;
pub const GRID_COLS: usize = 8;
/// Cell edge in pixels
pub const GEM_SIZE: f32 = 50.0;
pub const POINTS_PER_GEM: u64 = 10;
/// Frames each swap-feedback or cascade stage stays on screen
pub const STAGE_PAUSE: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match3Tuning {
    pub type_count: u8,
    pub points_per_gem: u64,
    pub stage_pause: u32,
}

impl Match3Tuning {
    pub fn from_params(p: &Parameters) -> Self {
        Self {
            // round(speed / 2), halves rounding up
            type_count: 4 + (p.speed + 1) / 2,
            points_per_gem: POINTS_PER_GEM,
            stage_pause: STAGE_PAUSE,
        }
    }
}

/// Next step of a cascade in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Matched gems were removed; compact and refill next
    Removed,
    /// Board was refilled; rescan next
    Refilled,
}

#[derive(Debug, Clone)]
pub struct Match3Game {
    pub tuning: Match3Tuning,
    pub core: Core,
    pub board: Board,
    /// First pick of a two-tap swap
    pub selected: Option<Coord>,
    /// Swap awaiting revert while `Swapping`
    rejected: Option<(Coord, Coord)>,
    stage: Stage,
    /// Frames left before the next stage
    wait: u32,
}

impl Match3Game {
    pub fn new(tuning: Match3Tuning, seed: u64) -> Self {
        let mut core = Core::new(seed);
        let board = Board::generate(GRID_ROWS, GRID_COLS, tuning.type_count, &mut core.rng);
        Self::with_board(tuning, core, board)
    }

    /// Start from a prepared board
    pub fn with_board(tuning: Match3Tuning, core: Core, board: Board) -> Self {
        Self {
            tuning,
            core,
            board,
            selected: None,
            rejected: None,
            stage: Stage::Refilled,
            wait: 0,
        }
    }

    fn select(&mut self, coord: Coord) -> TickResult {
        if !self.board.contains(coord) {
            return TickResult::default();
        }
        match self.selected.take() {
            None => {
                self.selected = Some(coord);
                TickResult::default()
            }
            Some(first) if first == coord => TickResult::default(),
            Some(first) if first.is_adjacent(&coord) => self.try_swap(first, coord),
            // A non-adjacent second tap just drops the selection
            Some(_) => TickResult::default(),
        }
    }

    fn try_swap(&mut self, a: Coord, b: Coord) -> TickResult {
        let mut out = TickResult::default();
        self.selected = None;
        let Some(matches) = self.board.swap_and_scan(a, b) else {
            return out;
        };

        if matches.is_empty() {
            log::debug!("Swap {:?} <-> {:?} rejected", a, b);
            self.rejected = Some((a, b));
            self.wait = self.tuning.stage_pause;
            self.core.set_phase(Phase::Swapping, &mut out);
            if self.wait == 0 {
                self.revert(&mut out);
            }
        } else {
            self.core.set_phase(Phase::Resolving, &mut out);
            self.remove(&matches, &mut out);
            self.run_stages(&mut out);
        }
        out
    }

    fn revert(&mut self, out: &mut TickResult) {
        if let Some((a, b)) = self.rejected.take() {
            self.board.swap(a, b);
        }
        self.core.set_phase(Phase::Playing, out);
    }

    fn remove(&mut self, matches: &BTreeSet<Coord>, out: &mut TickResult) {
        let removed = self.board.remove(matches) as u64;
        log::debug!("Removed {} gems", removed);
        self.core.add_score(removed * self.tuning.points_per_gem, out);
        self.stage = Stage::Removed;
        self.wait = self.tuning.stage_pause;
    }

    /// Advance the cascade through every stage whose pause has elapsed
    fn run_stages(&mut self, out: &mut TickResult) {
        while self.core.phase == Phase::Resolving && self.wait == 0 {
            match self.stage {
                Stage::Removed => {
                    self.board.collapse();
                    let (rng, types) = (&mut self.core.rng, self.tuning.type_count);
                    self.board.refill(|_| random_kind(rng, types));
                    self.stage = Stage::Refilled;
                    self.wait = self.tuning.stage_pause;
                }
                Stage::Refilled => {
                    let matches = self.board.find_matches();
                    if matches.is_empty() {
                        self.settle(out);
                    } else {
                        self.remove(&matches, out);
                    }
                }
            }
        }
    }

    fn settle(&mut self, out: &mut TickResult) {
        self.core.set_phase(Phase::Playing, out);
        if !self.board.has_valid_move() {
            log::info!("No valid moves left");
            self.core.finish(out);
        }
    }
}

impl MiniGame for Match3Game {
    fn template(&self) -> Template {
        Template::Match3
    }

    fn core(&self) -> &Core {
        &self.core
    }

    fn apply(&mut self, command: Command) -> TickResult {
        match (self.core.phase, command) {
            (Phase::Start, Command::Activate) => self.core.activate(),
            (Phase::Playing, Command::Select(coord)) => self.select(coord),
            (Phase::Playing, Command::Swap(a, b)) => self.try_swap(a, b),
            (Phase::GameOver, Command::Reset) => self.reset(),
            _ => TickResult::default(),
        }
    }

    fn tick(&mut self) -> TickResult {
        let mut out = TickResult::default();
        match self.core.phase {
            Phase::Start | Phase::GameOver => return out,
            Phase::Playing => {}
            Phase::Swapping => {
                self.wait = self.wait.saturating_sub(1);
                if self.wait == 0 {
                    self.revert(&mut out);
                }
            }
            Phase::Resolving => {
                self.wait = self.wait.saturating_sub(1);
                self.run_stages(&mut out);
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
        list.fill_rect(Layer::Background, field, colors::BOARD);
        list.image(Layer::Background, AssetKind::Background, field);

        let types = self.tuning.type_count.max(1) as f32;
        for coord in self.board.coords() {
            if let Some(gem) = self.board.get(coord) {
                let hue = gem.kind as f32 * 360.0 / types;
                list.tinted_image(Layer::Obstacles, AssetKind::Obstacle, cell_rect(coord), Some(hue));
            }
        }

        if let Some(selected) = self.selected {
            for coord in self.board.connected(selected) {
                if coord != selected {
                    list.fill_rect(Layer::Player, cell_rect(coord), colors::CONNECTED);
                }
            }
            list.stroke_rect(Layer::Player, cell_rect(selected), colors::SELECTION, 4.0);
        }

        list.plain_text(format!("Score: {}", self.core.score()), 10.0, field.h - 10.0, 24.0);
        match self.core.phase {
            Phase::Start => list.hud_text("Tap to Start", field.w / 2.0 - 80.0, field.h / 2.0, 30.0),
            Phase::GameOver => {
                list.hud_text("No More Moves", field.w / 2.0 - 95.0, field.h / 2.0 - 20.0, 30.0);
                list.hud_text("Tap to Restart", field.w / 2.0 - 80.0, field.h / 2.0 + 20.0, 24.0);
            }
            _ => {}
        }
    }

    fn entity_bounds(&self) -> Vec<Rect> {
        self.board
            .coords()
            .filter(|c| self.board.get(*c).is_some())
            .map(cell_rect)
            .collect()
    }
}

/// Pixel rectangle of a grid cell
pub fn cell_rect(coord: Coord) -> Rect {
    Rect::new(
        coord.col as f32 * GEM_SIZE,
        coord.row as f32 * GEM_SIZE,
        GEM_SIZE,
        GEM_SIZE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::board::Gem;
    use crate::sim::state::GameEvent;

    fn tuning() -> Match3Tuning {
        Match3Tuning::from_params(&Parameters::default())
    }

    /// 8x8 board with no straight triple, except as arranged by the caller
    fn pattern_board() -> Board {
        let mut board = Board::empty(GRID_ROWS, GRID_COLS);
        board.refill(|c| 2 + ((c.row + 2 * c.col) % 3) as u8);
        board
    }

    fn playing_with(board: Board) -> Match3Game {
        let mut game = Match3Game::with_board(tuning(), Core::new(17), board);
        game.apply(Command::Activate);
        game
    }

    /// Row 0 reads 0 1 0 with another 0 directly below the 1
    fn swap_scenario() -> Match3Game {
        let mut board = pattern_board();
        for (coord, kind) in [
            (Coord::new(0, 0), 0),
            (Coord::new(0, 1), 1),
            (Coord::new(0, 2), 0),
            (Coord::new(1, 1), 0),
        ] {
            board.set(coord, Some(Gem { kind }));
        }
        assert!(board.find_matches().is_empty());
        playing_with(board)
    }

    #[test]
    fn test_type_count() {
        assert_eq!(Match3Tuning::from_params(&Parameters::new(1, 1, 1, 1)).type_count, 5);
        assert_eq!(Match3Tuning::from_params(&Parameters::new(4, 1, 1, 1)).type_count, 6);
        assert_eq!(Match3Tuning::from_params(&Parameters::new(5, 1, 1, 1)).type_count, 7);
        assert_eq!(Match3Tuning::from_params(&Parameters::new(10, 1, 1, 1)).type_count, 9);
    }

    #[test]
    fn test_pattern_board_is_stable() {
        assert!(pattern_board().find_matches().is_empty());
    }

    #[test]
    fn test_initial_board_is_match_free() {
        let game = Match3Game::new(tuning(), 99);
        assert!(game.board.is_full());
        assert!(game.board.find_matches().is_empty());
    }

    #[test]
    fn test_committed_swap() {
        let mut game = swap_scenario();
        let out = game.apply(Command::Swap(Coord::new(0, 1), Coord::new(1, 1)));
        assert_eq!(game.core.score(), 30);
        assert_eq!(game.core.phase, Phase::Resolving);
        assert!(out.contains(&GameEvent::Scored { points: 30, total: 30 }));
        for col in 0..3 {
            assert!(game.board.get(Coord::new(0, col)).is_none());
        }
    }

    #[test]
    fn test_two_tap_swap() {
        let mut game = swap_scenario();
        game.apply(Command::Select(Coord::new(0, 1)));
        assert_eq!(game.selected, Some(Coord::new(0, 1)));
        game.apply(Command::Select(Coord::new(1, 1)));
        assert_eq!(game.selected, None);
        assert_eq!(game.core.score(), 30);
    }

    #[test]
    fn test_non_adjacent_tap_clears_selection() {
        let mut game = swap_scenario();
        game.apply(Command::Select(Coord::new(0, 1)));
        game.apply(Command::Select(Coord::new(5, 5)));
        assert_eq!(game.selected, None);
        assert_eq!(game.core.phase, Phase::Playing);
    }

    #[test]
    fn test_resolving_rejects_input() {
        let mut game = swap_scenario();
        game.apply(Command::Swap(Coord::new(0, 1), Coord::new(1, 1)));
        let before = game.board.clone();
        let out = game.apply(Command::Swap(Coord::new(5, 5), Coord::new(5, 6)));
        assert!(out.is_empty());
        assert_eq!(game.board, before);
        assert_eq!(game.core.score(), 30);
    }

    #[test]
    fn test_cascade_settles_after_pauses() {
        let mut game = swap_scenario();
        game.apply(Command::Swap(Coord::new(0, 1), Coord::new(1, 1)));
        for _ in 0..STAGE_PAUSE {
            game.tick();
        }
        // Compacted and refilled after the first pause
        assert!(game.board.is_full());
        for _ in 0..(STAGE_PAUSE * 40) {
            game.tick();
            if game.core.phase != Phase::Resolving {
                break;
            }
        }
        assert_ne!(game.core.phase, Phase::Resolving);
        assert!(game.board.find_matches().is_empty());
        assert!(game.core.score() >= 30);
    }

    #[test]
    fn test_invalid_swap_reverts() {
        let mut game = playing_with(pattern_board());
        let before = game.board.clone();
        let (a, b) = (Coord::new(3, 3), Coord::new(3, 4));
        game.apply(Command::Swap(a, b));
        assert_eq!(game.core.phase, Phase::Swapping);
        assert_eq!(game.board.kind(a), before.kind(b));

        for _ in 0..STAGE_PAUSE {
            game.tick();
        }
        assert_eq!(game.core.phase, Phase::Playing);
        assert_eq!(game.board, before);
        assert_eq!(game.core.score(), 0);
    }

    #[test]
    fn test_non_adjacent_swap_ignored() {
        let mut game = swap_scenario();
        let before = game.board.clone();
        let out = game.apply(Command::Swap(Coord::new(0, 0), Coord::new(2, 2)));
        assert!(out.is_empty());
        assert_eq!(game.board, before);
        assert_eq!(game.core.phase, Phase::Playing);
    }

    #[test]
    fn test_no_valid_moves_ends_game() {
        // Seven kinds laid out diagonally; no single swap lines up three
        let mut board = Board::empty(GRID_ROWS, GRID_COLS);
        board.refill(|c| ((c.row * 4 + c.col) % 7) as u8);
        assert!(!board.has_valid_move());
        let mut game = Match3Game::with_board(tuning(), Core::new(1), board);
        game.core.phase = Phase::Resolving;
        game.stage = Stage::Refilled;
        game.wait = 1;
        game.tick();
        assert_eq!(game.core.phase, Phase::GameOver);
    }
}
