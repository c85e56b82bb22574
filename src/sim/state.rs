//! Shared game state types
//!
//! Every template owns a `Core` (phase, frame, score, seeded RNG) plus its
//! own entities. Resetting replaces the whole game value.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Discrete phase of a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the activating input
    Start,
    /// Active gameplay
    Playing,
    /// Match-3: rejected swap shown before it is reverted
    Swapping,
    /// Match-3: cascade in progress
    Resolving,
    /// Run ended, waiting for the reset input
    GameOver,
}

impl Phase {
    /// Input is not accepted at all in these phases
    pub fn is_busy(&self) -> bool {
        matches!(self, Phase::Swapping | Phase::Resolving)
    }
}

/// Side effects a host must act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Begin the looping music track
    MusicStart,
    /// Stop the music and rewind it to time zero
    MusicStop,
    PhaseChanged { from: Phase, to: Phase },
    Scored { points: u64, total: u64 },
    GameOver { score: u64 },
}

/// Outcome of a tick or command
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickResult {
    pub events: Vec<GameEvent>,
}

impl TickResult {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn extend(&mut self, other: TickResult) {
        self.events.extend(other.events);
    }

    pub fn contains(&self, event: &GameEvent) -> bool {
        self.events.contains(event)
    }
}

/// Phase, counters and randomness common to all templates
#[derive(Debug, Clone)]
pub struct Core {
    /// Seed the RNG was created from (reset reuses it)
    pub seed: u64,
    pub phase: Phase,
    /// Frames simulated while playing
    pub frame: u64,
    score: u64,
    pub rng: Pcg32,
}

impl Core {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            phase: Phase::Start,
            frame: 0,
            score: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Add points (the only way score changes outside of reset)
    pub fn add_score(&mut self, points: u64, out: &mut TickResult) {
        if points == 0 {
            return;
        }
        self.score += points;
        out.events.push(GameEvent::Scored {
            points,
            total: self.score,
        });
    }

    /// Raise the score to `total` if it is higher (derived scores)
    pub fn raise_score_to(&mut self, total: u64, out: &mut TickResult) {
        if total > self.score {
            let points = total - self.score;
            self.add_score(points, out);
        }
    }

    pub fn set_phase(&mut self, to: Phase, out: &mut TickResult) {
        if self.phase == to {
            return;
        }
        let from = self.phase;
        log::info!("Phase {:?} -> {:?} (frame {}, score {})", from, to, self.frame, self.score);
        self.phase = to;
        out.events.push(GameEvent::PhaseChanged { from, to });
    }

    /// `Start` -> `Playing`, starting the music
    pub fn activate(&mut self) -> TickResult {
        let mut out = TickResult::default();
        if self.phase == Phase::Start {
            self.set_phase(Phase::Playing, &mut out);
            out.events.push(GameEvent::MusicStart);
        }
        out
    }

    /// Terminal condition reached
    pub fn finish(&mut self, out: &mut TickResult) {
        if self.phase == Phase::GameOver {
            return;
        }
        self.set_phase(Phase::GameOver, out);
        out.events.push(GameEvent::GameOver { score: self.score });
    }
}

/// Events emitted by every reset
pub fn reset_events(from: Phase) -> TickResult {
    let mut out = TickResult::default();
    if from != Phase::Start {
        out.events.push(GameEvent::PhaseChanged {
            from,
            to: Phase::Start,
        });
    }
    out.events.push(GameEvent::MusicStop);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activate_only_from_start() {
        let mut core = Core::new(1);
        let out = core.activate();
        assert_eq!(core.phase, Phase::Playing);
        assert!(out.contains(&GameEvent::MusicStart));

        let out = core.activate();
        assert!(out.is_empty());
        assert_eq!(core.phase, Phase::Playing);
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut core = Core::new(1);
        core.activate();
        let mut out = TickResult::default();
        core.finish(&mut out);
        core.finish(&mut out);
        let game_overs = out
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_raise_score_never_lowers() {
        let mut core = Core::new(1);
        let mut out = TickResult::default();
        core.raise_score_to(5, &mut out);
        core.raise_score_to(3, &mut out);
        assert_eq!(core.score(), 5);
        assert_eq!(out.events.len(), 1);
    }
}
