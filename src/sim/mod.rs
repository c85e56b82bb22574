//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per frame, no wall-clock time
//! - Seeded RNG only
//! - No rendering backends or platform dependencies

pub mod board;
pub mod collision;
pub mod crossy;
pub mod flappy;
pub mod match3;
pub mod runner;
pub mod session;
pub mod state;
pub mod whack;

pub use board::{Board, CascadeReport, Coord, Gem};
pub use collision::{Rect, aabb_overlap, point_in_circle};
pub use session::{GameSession, MiniGame};
pub use state::{Core, GameEvent, Phase, TickResult};
