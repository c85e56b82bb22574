//! Difficulty parameters
//!
//! Four bounded scalars chosen in the editor (or by the AI assistant) and
//! consumed once per session to derive each template's physical constants.

use serde::{Deserialize, Deserializer, Serialize};

use crate::consts::MIN_SPAWN_INTERVAL;

/// Lowest accepted parameter level
pub const LEVEL_MIN: u8 = 1;
/// Highest accepted parameter level
pub const LEVEL_MAX: u8 = 10;

/// The four difficulty knobs, each in `[LEVEL_MIN, LEVEL_MAX]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    #[serde(default = "default_speed", deserialize_with = "speed_level")]
    pub speed: u8,
    #[serde(default = "default_gravity", deserialize_with = "gravity_level")]
    pub gravity: u8,
    #[serde(default = "default_gap_size", deserialize_with = "gap_size_level")]
    pub gap_size: u8,
    #[serde(default = "default_spawn_rate", deserialize_with = "spawn_rate_level")]
    pub spawn_rate: u8,
}

fn default_speed() -> u8 {
    5
}

fn default_gravity() -> u8 {
    3
}

fn default_gap_size() -> u8 {
    5
}

fn default_spawn_rate() -> u8 {
    4
}

impl Default for Parameters {
    /// Matches the editor's initial slider positions
    fn default() -> Self {
        Self {
            speed: default_speed(),
            gravity: default_gravity(),
            gap_size: default_gap_size(),
            spawn_rate: default_spawn_rate(),
        }
    }
}

impl Parameters {
    /// Build a parameter set, clamping every level into range
    pub fn new(speed: i64, gravity: i64, gap_size: i64, spawn_rate: i64) -> Self {
        Self {
            speed: clamp_level(speed),
            gravity: clamp_level(gravity),
            gap_size: clamp_level(gap_size),
            spawn_rate: clamp_level(spawn_rate),
        }
    }

    /// Same levels, re-clamped (for values built by struct literal)
    pub fn clamped(self) -> Self {
        Self::new(
            self.speed as i64,
            self.gravity as i64,
            self.gap_size as i64,
            self.spawn_rate as i64,
        )
    }
}

/// Clamp an arbitrary integer into `[LEVEL_MIN, LEVEL_MAX]`
pub fn clamp_level(value: i64) -> u8 {
    let clamped = value.clamp(LEVEL_MIN as i64, LEVEL_MAX as i64) as u8;
    if clamped as i64 != value {
        log::warn!("Parameter level {} out of range, clamped to {}", value, clamped);
    }
    clamped
}

/// Frames between spawns: `base - level * scale`, never below `MIN_SPAWN_INTERVAL`
pub fn spawn_interval(base: i32, scale: i32, level: u8) -> u32 {
    (base - level as i32 * scale).max(MIN_SPAWN_INTERVAL as i32) as u32
}

/// Lenient level decoding: numbers (int or float) and numeric strings are
/// clamped, anything else falls back to the parameter's default
fn lenient_level<'de, D>(deserializer: D, name: &str, fallback: u8) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let number = match &value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.round() as i64),
        _ => None,
    };
    Ok(match number {
        Some(n) => clamp_level(n),
        None => {
            log::warn!("Parameter {} is not numeric ({}), using {}", name, value, fallback);
            fallback
        }
    })
}

fn speed_level<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    lenient_level(d, "speed", default_speed())
}

fn gravity_level<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    lenient_level(d, "gravity", default_gravity())
}

fn gap_size_level<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    lenient_level(d, "gapSize", default_gap_size())
}

fn spawn_rate_level<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    lenient_level(d, "spawnRate", default_spawn_rate())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_out_of_range() {
        let p = Parameters::new(0, 11, -4, 5);
        assert_eq!(p.speed, 1);
        assert_eq!(p.gravity, 10);
        assert_eq!(p.gap_size, 1);
        assert_eq!(p.spawn_rate, 5);
    }

    #[test]
    fn test_struct_literal_reclamped() {
        let p = Parameters {
            speed: 0,
            gravity: 200,
            gap_size: 5,
            spawn_rate: 5,
        }
        .clamped();
        assert_eq!((p.speed, p.gravity), (1, 10));
    }

    #[test]
    fn test_spawn_interval_never_below_minimum() {
        assert_eq!(spawn_interval(250, 15, 5), 175);
        assert_eq!(spawn_interval(120, 10, 10), 20);
        assert_eq!(spawn_interval(50, 15, 10), MIN_SPAWN_INTERVAL);
        assert_eq!(spawn_interval(0, 0, 1), MIN_SPAWN_INTERVAL);
    }

    #[test]
    fn test_deserialize_lenient() {
        let p: Parameters = serde_json::from_str(
            r#"{"speed": 12, "gravity": "7", "gapSize": 2.6, "spawnRate": "fast"}"#,
        )
        .unwrap();
        assert_eq!(p.speed, 10);
        assert_eq!(p.gravity, 7);
        assert_eq!(p.gap_size, 3);
        assert_eq!(p.spawn_rate, 4);
    }

    #[test]
    fn test_deserialize_missing_fields_use_defaults() {
        let p: Parameters = serde_json::from_str(r#"{"speed": 2}"#).unwrap();
        assert_eq!(p, Parameters { speed: 2, ..Parameters::default() });
    }
}
