//! Asset references and load tracking
//!
//! The engine treats asset URIs as opaque. It only needs to know whether a
//! slot has finished loading so draws can be skipped until it has.

use serde::{Deserialize, Serialize};

/// Asset slots every template can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Player,
    Obstacle,
    Background,
    Music,
}

impl AssetKind {
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Player,
        AssetKind::Obstacle,
        AssetKind::Background,
        AssetKind::Music,
    ];

    fn index(self) -> usize {
        match self {
            AssetKind::Player => 0,
            AssetKind::Obstacle => 1,
            AssetKind::Background => 2,
            AssetKind::Music => 3,
        }
    }

    /// Image slots (music is the only non-visual asset)
    pub fn is_visual(self) -> bool {
        self != AssetKind::Music
    }
}

/// Load progress of one asset slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No URI was supplied for this slot
    #[default]
    Missing,
    /// Load requested, completion not yet signalled
    Pending,
    Loaded,
    Failed,
}

impl LoadState {
    /// Load completed one way or the other
    pub fn is_settled(self) -> bool {
        matches!(self, LoadState::Loaded | LoadState::Failed | LoadState::Missing)
    }
}

/// URIs supplied by the asset generator, keyed by slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRefs {
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default, alias = "obstacles")]
    pub obstacle: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub music: Option<String>,
}

impl AssetRefs {
    /// Normalized URI for a slot (None when absent or blank)
    pub fn get(&self, kind: AssetKind) -> Option<String> {
        let raw = match kind {
            AssetKind::Player => &self.player,
            AssetKind::Obstacle => &self.obstacle,
            AssetKind::Background => &self.background,
            AssetKind::Music => &self.music,
        };
        raw.as_deref().and_then(normalize_uri)
    }
}

/// Trim an asset URI and reject blanks and unreplaced `{{...}}` placeholders
pub fn normalize_uri(raw: &str) -> Option<String> {
    let uri = raw.trim();
    if uri.is_empty() || (uri.starts_with("{{") && uri.ends_with("}}")) {
        return None;
    }
    Some(uri.to_string())
}

/// Which slots can currently be drawn (copied into each draw list)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadedAssets([bool; 4]);

impl LoadedAssets {
    /// Every slot drawable (headless rendering, tests)
    pub fn all() -> Self {
        Self([true; 4])
    }

    pub fn none() -> Self {
        Self([false; 4])
    }

    pub fn contains(&self, kind: AssetKind) -> bool {
        self.0[kind.index()]
    }
}

/// Load state for all slots of one running game
#[derive(Debug, Clone, Default)]
pub struct AssetTable {
    uris: [Option<String>; 4],
    states: [LoadState; 4],
}

impl AssetTable {
    /// Register the supplied URIs; slots with a URI start out `Pending`
    pub fn new(refs: &AssetRefs) -> Self {
        let mut table = Self::default();
        for kind in AssetKind::ALL {
            if let Some(uri) = refs.get(kind) {
                table.uris[kind.index()] = Some(uri);
                table.states[kind.index()] = LoadState::Pending;
            } else {
                log::warn!("No {:?} asset supplied, draws will be skipped", kind);
            }
        }
        table
    }

    pub fn uri(&self, kind: AssetKind) -> Option<&str> {
        self.uris[kind.index()].as_deref()
    }

    pub fn state(&self, kind: AssetKind) -> LoadState {
        self.states[kind.index()]
    }

    pub fn is_loaded(&self, kind: AssetKind) -> bool {
        self.state(kind) == LoadState::Loaded
    }

    pub fn mark_loaded(&mut self, kind: AssetKind) {
        if self.state(kind) == LoadState::Pending {
            log::debug!("{:?} asset loaded", kind);
            self.states[kind.index()] = LoadState::Loaded;
        }
    }

    pub fn mark_failed(&mut self, kind: AssetKind) {
        if self.state(kind) == LoadState::Pending {
            log::warn!("{:?} asset failed to load: {:?}", kind, self.uri(kind));
            self.states[kind.index()] = LoadState::Failed;
        }
    }

    /// True once every required slot has settled (loaded, failed or missing)
    pub fn ready(&self, required: &[AssetKind]) -> bool {
        required.iter().all(|kind| self.state(*kind).is_settled())
    }

    pub fn loaded(&self) -> LoadedAssets {
        let mut mask = [false; 4];
        for kind in AssetKind::ALL {
            mask[kind.index()] = self.is_loaded(kind);
        }
        LoadedAssets(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs() -> AssetRefs {
        AssetRefs {
            player: Some("  https://cdn.example/bird.png ".into()),
            obstacle: Some("data:image/png;base64,AAAA".into()),
            background: Some("{{BACKGROUND_ASSET}}".into()),
            music: None,
        }
    }

    #[test]
    fn test_normalize_uri() {
        assert_eq!(normalize_uri(" a.png "), Some("a.png".to_string()));
        assert_eq!(normalize_uri("   "), None);
        assert_eq!(normalize_uri("{{MUSIC_ASSET}}"), None);
    }

    #[test]
    fn test_table_initial_states() {
        let table = AssetTable::new(&refs());
        assert_eq!(table.uri(AssetKind::Player), Some("https://cdn.example/bird.png"));
        assert_eq!(table.state(AssetKind::Player), LoadState::Pending);
        assert_eq!(table.state(AssetKind::Background), LoadState::Missing);
        assert_eq!(table.state(AssetKind::Music), LoadState::Missing);
    }

    #[test]
    fn test_ready_waits_for_pending() {
        let mut table = AssetTable::new(&refs());
        assert!(!table.ready(&[AssetKind::Player]));
        table.mark_failed(AssetKind::Player);
        assert!(table.ready(&[AssetKind::Player]));
        assert!(!table.is_loaded(AssetKind::Player));
    }

    #[test]
    fn test_settled_state_is_final() {
        let mut table = AssetTable::new(&refs());
        table.mark_loaded(AssetKind::Obstacle);
        table.mark_failed(AssetKind::Obstacle);
        assert_eq!(table.state(AssetKind::Obstacle), LoadState::Loaded);
        let mask = table.loaded();
        assert!(mask.contains(AssetKind::Obstacle));
        assert!(!mask.contains(AssetKind::Player));
    }
}
