//! Game sessions
//!
//! A session owns exactly one running game. The five games share the
//! `MiniGame` contract; `GameSession` dispatches to them by template.

use super::collision::Rect;
use super::crossy::{CrossyGame, CrossyTuning};
use super::flappy::{FlappyGame, FlappyTuning};
use super::match3::{Match3Game, Match3Tuning};
use super::runner::{RunnerGame, RunnerTuning};
use super::state::{Core, Phase, TickResult};
use super::whack::{WhackGame, WhackTuning};
use crate::assets::LoadedAssets;
use crate::config::{GameManifest, Template};
use crate::input::{Command, HostEvent, map_input};
use crate::params::Parameters;
use crate::renderer::DrawList;

/// Behaviour shared by every template
pub trait MiniGame {
    fn template(&self) -> Template;

    fn core(&self) -> &Core;

    /// Apply a command; commands that do not fit the phase are ignored
    fn apply(&mut self, command: Command) -> TickResult;

    /// Advance one frame
    fn tick(&mut self) -> TickResult;

    /// Back to the initial state for the same seed
    fn reset(&mut self) -> TickResult;

    /// Describe the current frame (read-only)
    fn render(&self, list: &mut DrawList);

    /// Rectangles of every live entity, in field coordinates
    fn entity_bounds(&self) -> Vec<Rect>;

    /// Area entities live in
    fn field(&self) -> Rect {
        let (w, h) = self.template().canvas_size();
        Rect::new(0.0, 0.0, w as f32, h as f32)
    }
}

#[derive(Debug, Clone)]
enum Game {
    Flappy(FlappyGame),
    Runner(RunnerGame),
    Whack(WhackGame),
    Match3(Match3Game),
    Crossy(CrossyGame),
}

impl Game {
    fn build(template: Template, params: &Parameters, seed: u64) -> Self {
        match template {
            Template::FlappyBird => Game::Flappy(FlappyGame::new(FlappyTuning::from_params(params), seed)),
            Template::SpeedRunner => Game::Runner(RunnerGame::new(RunnerTuning::from_params(params), seed)),
            Template::WhackAMole => Game::Whack(WhackGame::new(WhackTuning::from_params(params), seed)),
            Template::Match3 => Game::Match3(Match3Game::new(Match3Tuning::from_params(params), seed)),
            Template::CrossyRoad => Game::Crossy(CrossyGame::new(CrossyTuning::from_params(params), seed)),
        }
    }

    fn as_dyn(&self) -> &dyn MiniGame {
        match self {
            Game::Flappy(g) => g,
            Game::Runner(g) => g,
            Game::Whack(g) => g,
            Game::Match3(g) => g,
            Game::Crossy(g) => g,
        }
    }

    fn as_dyn_mut(&mut self) -> &mut dyn MiniGame {
        match self {
            Game::Flappy(g) => g,
            Game::Runner(g) => g,
            Game::Whack(g) => g,
            Game::Match3(g) => g,
            Game::Crossy(g) => g,
        }
    }
}

/// One running game plus the parameters it was built from
#[derive(Debug, Clone)]
pub struct GameSession {
    params: Parameters,
    game: Game,
}

impl GameSession {
    pub fn new(template: Template, params: Parameters, seed: u64) -> Self {
        let params = params.clamped();
        log::info!(
            "New {} session (seed {}, speed {}, gravity {}, gap {}, spawn {})",
            template.id(),
            seed,
            params.speed,
            params.gravity,
            params.gap_size,
            params.spawn_rate
        );
        Self {
            params,
            game: Game::build(template, &params, seed),
        }
    }

    /// Session for a manifest; `fallback_seed` is used when it carries none
    pub fn from_manifest(manifest: &GameManifest, fallback_seed: u64) -> Self {
        Self::new(
            manifest.template,
            manifest.parameters,
            manifest.seed.unwrap_or(fallback_seed),
        )
    }

    pub fn game(&self) -> &dyn MiniGame {
        self.game.as_dyn()
    }

    pub fn template(&self) -> Template {
        self.game().template()
    }

    pub fn params(&self) -> Parameters {
        self.params
    }

    pub fn seed(&self) -> u64 {
        self.game().core().seed
    }

    pub fn phase(&self) -> Phase {
        self.game().core().phase
    }

    pub fn score(&self) -> u64 {
        self.game().core().score()
    }

    pub fn frame(&self) -> u64 {
        self.game().core().frame
    }

    pub fn apply(&mut self, command: Command) -> TickResult {
        self.game.as_dyn_mut().apply(command)
    }

    /// Map a host event for the current phase and apply it
    pub fn handle(&mut self, event: &HostEvent) -> TickResult {
        match map_input(self.template(), self.phase(), event) {
            Some(command) => self.apply(command),
            None => TickResult::default(),
        }
    }

    pub fn tick(&mut self) -> TickResult {
        self.game.as_dyn_mut().tick()
    }

    /// Run `n` ticks, collecting their events
    pub fn run(&mut self, n: u32) -> TickResult {
        let mut out = TickResult::default();
        for _ in 0..n {
            out.extend(self.tick());
        }
        out
    }

    pub fn reset(&mut self) -> TickResult {
        self.game.as_dyn_mut().reset()
    }

    /// New game with a different seed
    pub fn reseed(&mut self, seed: u64) -> TickResult {
        let out = super::state::reset_events(self.phase());
        let best = match &self.game {
            Game::Crossy(g) => Some(g.best),
            _ => None,
        };
        self.game = Game::build(self.template(), &self.params, seed);
        if let (Game::Crossy(g), Some(best)) = (&mut self.game, best) {
            g.best = best;
        }
        out
    }

    pub fn render(&self, loaded: LoadedAssets) -> DrawList {
        let mut list = DrawList::new(loaded);
        self.game().render(&mut list);
        list
    }

    pub fn entity_bounds(&self) -> Vec<Rect> {
        self.game().entity_bounds()
    }

    pub fn field(&self) -> Rect {
        self.game().field()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Direction, Key};
    use crate::sim::state::GameEvent;
    use proptest::prelude::*;

    /// Deterministic input script: an action every `every` frames
    fn drive(session: &mut GameSession, frames: u32, every: u32) {
        for frame in 0..frames {
            if frame % every == 0 {
                session.handle(&scripted_event(session.template(), frame));
            }
            session.tick();
        }
    }

    fn scripted_event(template: Template, frame: u32) -> HostEvent {
        match template {
            Template::CrossyRoad => HostEvent::KeyDown(if frame % 3 == 0 { Key::ArrowLeft } else { Key::ArrowUp }),
            Template::WhackAMole => HostEvent::PointerDown {
                x: 100.0 + (frame % 3) as f32 * 150.0,
                y: 100.0 + (frame % 5 % 3) as f32 * 150.0,
            },
            Template::Match3 => HostEvent::PointerDown {
                x: 25.0 + (frame % 8) as f32 * 50.0,
                y: 25.0 + (frame % 7) as f32 * 50.0,
            },
            _ => HostEvent::PointerDown { x: 10.0, y: 10.0 },
        }
    }

    fn template_strategy() -> impl Strategy<Value = Template> {
        prop::sample::select(Template::ALL.to_vec())
    }

    fn params_strategy() -> impl Strategy<Value = Parameters> {
        (1i64..=10, 1i64..=10, 1i64..=10, 1i64..=10).prop_map(|(s, g, gap, sr)| Parameters::new(s, g, gap, sr))
    }

    #[test]
    fn test_session_starts_in_start_phase() {
        for template in Template::ALL {
            let session = GameSession::new(template, Parameters::default(), 1);
            assert_eq!(session.phase(), Phase::Start);
            assert_eq!(session.score(), 0);
            assert_eq!(session.frame(), 0);
        }
    }

    #[test]
    fn test_start_phase_does_not_tick() {
        let mut session = GameSession::new(Template::FlappyBird, Parameters::default(), 1);
        session.run(30);
        assert_eq!(session.frame(), 0);
    }

    #[test]
    fn test_activation_starts_music() {
        let mut session = GameSession::new(Template::SpeedRunner, Parameters::default(), 1);
        let out = session.handle(&HostEvent::KeyDown(Key::Space));
        assert!(out.contains(&GameEvent::MusicStart));
        assert_eq!(session.phase(), Phase::Playing);
    }

    #[test]
    fn test_reset_stops_music() {
        let mut session = GameSession::new(Template::WhackAMole, Parameters::default(), 1);
        session.handle(&HostEvent::PointerDown { x: 1.0, y: 1.0 });
        let out = session.reset();
        assert!(out.contains(&GameEvent::MusicStop));
        assert!(out.contains(&GameEvent::PhaseChanged {
            from: Phase::Playing,
            to: Phase::Start
        }));
    }

    #[test]
    fn test_from_manifest_uses_manifest_seed() {
        let mut manifest = GameManifest::new(Template::Match3, Parameters::default());
        manifest.seed = Some(42);
        assert_eq!(GameSession::from_manifest(&manifest, 7).seed(), 42);
        manifest.seed = None;
        assert_eq!(GameSession::from_manifest(&manifest, 7).seed(), 7);
    }

    #[test]
    fn test_reseed_changes_world() {
        let mut session = GameSession::new(Template::CrossyRoad, Parameters::default(), 1);
        session.apply(Command::Activate);
        session.apply(Command::Move(Direction::Up));
        session.reseed(2);
        assert_eq!(session.seed(), 2);
        assert_eq!(session.phase(), Phase::Start);
        assert_eq!(session.score(), 0);
        let Game::Crossy(game) = &session.game else {
            panic!("expected crossy-road");
        };
        assert_eq!(game.best, 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_reset_is_idempotent(template in template_strategy(), params in params_strategy(), seed in any::<u64>(), frames in 0u32..300) {
            let mut session = GameSession::new(template, params, seed);
            session.apply(Command::Activate);
            drive(&mut session, frames, 7);

            session.reset();
            let first = session.render(LoadedAssets::all());
            let first_bounds = session.entity_bounds();
            session.reset();
            let second = session.render(LoadedAssets::all());

            prop_assert_eq!(session.phase(), Phase::Start);
            prop_assert_eq!(session.score(), 0);
            prop_assert_eq!(session.frame(), 0);
            prop_assert_eq!(first.items(), second.items());
            prop_assert_eq!(first_bounds, session.entity_bounds());

            // Crossy-road carries its best score across resets
            if template != Template::CrossyRoad {
                let fresh = GameSession::new(template, params, seed).render(LoadedAssets::all());
                prop_assert_eq!(fresh.items(), second.items());
            }
        }

        #[test]
        fn prop_score_never_decreases(template in template_strategy(), params in params_strategy(), seed in any::<u64>()) {
            let mut session = GameSession::new(template, params, seed);
            session.apply(Command::Activate);
            let mut last = 0;
            for frame in 0..600u32 {
                if session.phase() == Phase::GameOver {
                    break;
                }
                if frame % 11 == 0 {
                    session.handle(&scripted_event(template, frame));
                }
                let out = session.tick();
                prop_assert!(session.score() >= last);
                for event in &out.events {
                    if let GameEvent::Scored { points, .. } = event {
                        prop_assert!(*points > 0);
                    }
                }
                last = session.score();
            }
        }

        #[test]
        fn prop_entities_stay_in_bounds(template in template_strategy(), params in params_strategy(), seed in any::<u64>()) {
            let mut session = GameSession::new(template, params, seed);
            session.apply(Command::Activate);
            let field = session.field();
            for frame in 0..800u32 {
                if frame % 13 == 0 {
                    session.handle(&scripted_event(template, frame));
                }
                session.tick();
                for rect in session.entity_bounds() {
                    prop_assert!(rect.within_extended(&field), "{:?} escaped {:?}", rect, field);
                }
            }
        }

        #[test]
        fn prop_same_seed_same_game(template in template_strategy(), params in params_strategy(), seed in any::<u64>()) {
            let mut a = GameSession::new(template, params, seed);
            let mut b = GameSession::new(template, params, seed);
            a.apply(Command::Activate);
            b.apply(Command::Activate);
            drive(&mut a, 240, 9);
            drive(&mut b, 240, 9);
            prop_assert_eq!(a.score(), b.score());
            prop_assert_eq!(a.phase(), b.phase());
            let (list_a, list_b) = (a.render(LoadedAssets::all()), b.render(LoadedAssets::all()));
            prop_assert_eq!(list_a.items(), list_b.items());
        }

        #[test]
        fn prop_draw_order_is_layered(template in template_strategy(), seed in any::<u64>(), frames in 0u32..200) {
            let mut session = GameSession::new(template, Parameters::default(), seed);
            session.apply(Command::Activate);
            drive(&mut session, frames, 5);
            prop_assert!(session.render(LoadedAssets::all()).is_ordered());
            prop_assert!(session.render(LoadedAssets::none()).is_ordered());
        }
    }
}
