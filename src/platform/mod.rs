//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Seeding sessions whose manifest fixes no seed
//! - Manifest discovery, canvas lookup and image loading (web)

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Seed derived from the current time
#[cfg(target_arch = "wasm32")]
pub fn fallback_seed() -> u64 {
    js_sys::Date::now() as u64
}

/// Seed derived from the current time
#[cfg(not(target_arch = "wasm32"))]
pub fn fallback_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
