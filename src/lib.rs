//! Gamegen Engine - parameter-driven 2D mini-games for reskinnable templates
//!
//! Core modules:
//! - `sim`: Deterministic simulation (one game per template, match-3 board)
//! - `renderer`: Layered draw lists and the canvas backend
//! - `input`: Host event to game command mapping
//! - `params`: Difficulty parameters and their clamping
//! - `assets`: Asset references and load tracking
//! - `assembly`: Placeholder substitution for template page shells
//! - `config`: Game manifest loading
//! - `driver`: Fixed-step frame pacing
//! - `platform`: Browser glue and seeding

pub mod assembly;
pub mod assets;
#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod config;
pub mod driver;
pub mod input;
pub mod params;
pub mod platform;
pub mod renderer;
pub mod sim;

pub use assets::{AssetKind, AssetTable, LoadState};
pub use config::{GameManifest, Template};
pub use driver::FrameDriver;
pub use input::{Command, Direction, HostEvent, Key, map_input};
pub use params::Parameters;
pub use sim::{GameEvent, GameSession, Phase, TickResult};

/// Engine configuration constants
pub mod consts {
    /// Fixed simulation timestep (template formulas assume 60 frames per second)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Frames per second of game time (whack-a-mole countdown)
    pub const FRAMES_PER_SECOND: u64 = 60;

    /// Lower bound for any derived spawn interval, in frames
    pub const MIN_SPAWN_INTERVAL: u32 = 10;
}
