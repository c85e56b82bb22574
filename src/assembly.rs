//! Template assembly
//!
//! A playable page is produced by literal `{{NAME}}` substitution into a
//! page shell. The shell embeds the game manifest as JSON; the engine reads
//! that back at startup and never sees a placeholder itself.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::assets::AssetKind;
use crate::config::{ConfigError, GameManifest};

/// Id of the `<script type="application/json">` element holding the manifest
pub const MANIFEST_ELEMENT_ID: &str = "gamegen-manifest";
/// Id of the game canvas in the page shell
pub const CANVAS_ELEMENT_ID: &str = "gameCanvas";

const PAGE_SHELL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{TITLE}}</title>
<style>
body { margin: 0; display: flex; justify-content: center; align-items: center; height: 100vh; background: {{PAGE_COLOR}}; }
canvas { display: block; }
</style>
</head>
<body data-template="{{TEMPLATE}}">
<canvas id="gameCanvas" width="{{CANVAS_WIDTH}}" height="{{CANVAS_HEIGHT}}"></canvas>
<script type="application/json" id="gamegen-manifest">
{"template":"{{TEMPLATE}}","seed":{{SEED}},"parameters":{"speed":{{SPEED}},"gravity":{{GRAVITY}},"gapSize":{{GAP_SIZE}},"spawnRate":{{SPAWN_RATE}}},"assets":{"player":"{{PLAYER_ASSET}}","obstacle":"{{OBSTACLE_ASSET}}","background":"{{BACKGROUND_ASSET}}","music":"{{MUSIC_ASSET}}"}}
</script>
<script type="module">
import init from "./gamegen_engine.js";
init();
</script>
</body>
</html>
"#;

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("placeholder {{{{{0}}}}} was left unresolved")]
    Unresolved(String),
    #[error("page has no #gamegen-manifest element")]
    MissingManifest,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Substitution tokens understood by the page shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Placeholder {
    Speed,
    Gravity,
    GapSize,
    SpawnRate,
    PlayerAsset,
    ObstacleAsset,
    BackgroundAsset,
    MusicAsset,
    Title,
    Template,
    Seed,
    CanvasWidth,
    CanvasHeight,
    PageColor,
}

impl Placeholder {
    pub const ALL: [Placeholder; 14] = [
        Placeholder::Speed,
        Placeholder::Gravity,
        Placeholder::GapSize,
        Placeholder::SpawnRate,
        Placeholder::PlayerAsset,
        Placeholder::ObstacleAsset,
        Placeholder::BackgroundAsset,
        Placeholder::MusicAsset,
        Placeholder::Title,
        Placeholder::Template,
        Placeholder::Seed,
        Placeholder::CanvasWidth,
        Placeholder::CanvasHeight,
        Placeholder::PageColor,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Placeholder::Speed => "SPEED",
            Placeholder::Gravity => "GRAVITY",
            Placeholder::GapSize => "GAP_SIZE",
            Placeholder::SpawnRate => "SPAWN_RATE",
            Placeholder::PlayerAsset => "PLAYER_ASSET",
            Placeholder::ObstacleAsset => "OBSTACLE_ASSET",
            Placeholder::BackgroundAsset => "BACKGROUND_ASSET",
            Placeholder::MusicAsset => "MUSIC_ASSET",
            Placeholder::Title => "TITLE",
            Placeholder::Template => "TEMPLATE",
            Placeholder::Seed => "SEED",
            Placeholder::CanvasWidth => "CANVAS_WIDTH",
            Placeholder::CanvasHeight => "CANVAS_HEIGHT",
            Placeholder::PageColor => "PAGE_COLOR",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// The literal token, e.g. `{{SPEED}}`
    pub fn token(&self) -> String {
        format!("{{{{{}}}}}", self.name())
    }

    fn for_asset(kind: AssetKind) -> Self {
        match kind {
            AssetKind::Player => Placeholder::PlayerAsset,
            AssetKind::Obstacle => Placeholder::ObstacleAsset,
            AssetKind::Background => Placeholder::BackgroundAsset,
            AssetKind::Music => Placeholder::MusicAsset,
        }
    }
}

/// Values to substitute, keyed by placeholder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings(BTreeMap<Placeholder, String>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, placeholder: Placeholder, value: impl Into<String>) -> &mut Self {
        self.0.insert(placeholder, value.into());
        self
    }

    pub fn get(&self, placeholder: Placeholder) -> Option<&str> {
        self.0.get(&placeholder).map(String::as_str)
    }

    /// Every placeholder the page shell uses, filled from a manifest
    ///
    /// Asset URIs are JSON-escaped since they land inside string literals of
    /// the embedded manifest. Missing assets become empty strings.
    pub fn from_manifest(manifest: &GameManifest) -> Self {
        let p = manifest.parameters.clamped();
        let (width, height) = manifest.template.canvas_size();
        let mut bindings = Self::new();
        bindings
            .set(Placeholder::Speed, p.speed.to_string())
            .set(Placeholder::Gravity, p.gravity.to_string())
            .set(Placeholder::GapSize, p.gap_size.to_string())
            .set(Placeholder::SpawnRate, p.spawn_rate.to_string())
            .set(Placeholder::Title, escape_html(manifest.template.title()))
            .set(Placeholder::Template, manifest.template.id())
            .set(
                Placeholder::Seed,
                manifest.seed.map_or_else(|| "null".to_string(), |s| s.to_string()),
            )
            .set(Placeholder::CanvasWidth, width.to_string())
            .set(Placeholder::CanvasHeight, height.to_string())
            .set(Placeholder::PageColor, manifest.template.page_color());

        for kind in AssetKind::ALL {
            let uri = manifest.assets.get(kind).unwrap_or_default();
            bindings.set(Placeholder::for_asset(kind), json_string_body(&uri));
        }
        bindings
    }
}

/// Replace every `{{NAME}}` token in `source` in a single pass
///
/// Inserted values are never rescanned, so a value may itself contain
/// token-shaped text. A token in `source` with no binding is an error.
pub fn substitute(source: &str, bindings: &Bindings) -> Result<String, AssemblyError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(open) = rest.find("{{") {
        let after = &rest[open + 2..];
        match token_name(after) {
            Some(name) => {
                let value = Placeholder::from_name(name)
                    .and_then(|p| bindings.get(p))
                    .ok_or_else(|| AssemblyError::Unresolved(name.to_string()))?;
                out.push_str(&rest[..open]);
                out.push_str(value);
                rest = &after[name.len() + 2..];
            }
            None => {
                out.push_str(&rest[..open + 1]);
                rest = &rest[open + 1..];
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// Produce the playable page for a manifest
pub fn assemble_page(manifest: &GameManifest) -> Result<String, AssemblyError> {
    let page = substitute(PAGE_SHELL, &Bindings::from_manifest(manifest))?;
    log::info!("Assembled {} page ({} bytes)", manifest.template.id(), page.len());
    Ok(page)
}

/// Read the manifest back out of an assembled page
pub fn manifest_from_page(page: &str) -> Result<GameManifest, AssemblyError> {
    let marker = format!("id=\"{}\">", MANIFEST_ELEMENT_ID);
    let start = page.find(&marker).ok_or(AssemblyError::MissingManifest)? + marker.len();
    let len = page[start..].find("</script>").ok_or(AssemblyError::MissingManifest)?;
    Ok(GameManifest::from_json(page[start..start + len].trim())?)
}

/// Name of the token starting right after a `{{` (uppercase letters, digits, underscores)
fn token_name(after: &str) -> Option<&str> {
    let close = after.find("}}")?;
    let name = &after[..close];
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
    valid.then_some(name)
}

/// Body of a JSON string literal, safe inside a `<script>` element
fn json_string_body(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].replace("</", "<\\/")
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
