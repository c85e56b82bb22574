//! Layered draw lists
//!
//! Games describe a frame as a list of draw commands; a backend replays it
//! on a real surface. Image commands for slots that have not loaded are
//! dropped here, so backends never see them.

use glam::Vec2;

use crate::assets::{AssetKind, LoadedAssets};
use crate::sim::collision::Rect;

/// RGBA color, components in 0..=1
pub type Color = [f32; 4];

/// Back-to-front draw order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Background,
    /// Holes, lanes and other field decoration
    Field,
    Obstacles,
    /// The controlled entity (or selection highlight)
    Player,
    Hud,
}

/// One drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Image {
        asset: AssetKind,
        rect: Rect,
        /// Hue rotation in degrees (match-3 gem variants)
        hue_rotate: Option<f32>,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        line_width: f32,
    },
    Text {
        text: String,
        pos: Vec2,
        size: f32,
        color: Color,
        /// Outline color and width
        outline: Option<(Color, f32)>,
    },
}

/// Frame description, in submission order
#[derive(Debug, Clone)]
pub struct DrawList {
    loaded: LoadedAssets,
    items: Vec<(Layer, DrawCmd)>,
}

impl DrawList {
    pub fn new(loaded: LoadedAssets) -> Self {
        Self {
            loaded,
            items: Vec::with_capacity(64),
        }
    }

    /// Draw an image slot; a no-op while the asset is not loaded
    pub fn image(&mut self, layer: Layer, asset: AssetKind, rect: Rect) {
        self.tinted_image(layer, asset, rect, None);
    }

    pub fn tinted_image(&mut self, layer: Layer, asset: AssetKind, rect: Rect, hue_rotate: Option<f32>) {
        if !self.loaded.contains(asset) {
            return;
        }
        self.items.push((
            layer,
            DrawCmd::Image {
                asset,
                rect,
                hue_rotate,
            },
        ));
    }

    pub fn fill_rect(&mut self, layer: Layer, rect: Rect, color: Color) {
        self.items.push((layer, DrawCmd::FillRect { rect, color }));
    }

    pub fn stroke_rect(&mut self, layer: Layer, rect: Rect, color: Color, line_width: f32) {
        self.items.push((
            layer,
            DrawCmd::StrokeRect {
                rect,
                color,
                line_width,
            },
        ));
    }

    /// HUD text with the templates' black outline
    pub fn hud_text(&mut self, text: impl Into<String>, x: f32, y: f32, size: f32) {
        self.items.push((
            Layer::Hud,
            DrawCmd::Text {
                text: text.into(),
                pos: Vec2::new(x, y),
                size,
                color: colors::TEXT,
                outline: Some((colors::TEXT_OUTLINE, 3.0)),
            },
        ));
    }

    /// HUD text without outline
    pub fn plain_text(&mut self, text: impl Into<String>, x: f32, y: f32, size: f32) {
        self.items.push((
            Layer::Hud,
            DrawCmd::Text {
                text: text.into(),
                pos: Vec2::new(x, y),
                size,
                color: colors::TEXT,
                outline: None,
            },
        ));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[(Layer, DrawCmd)] {
        &self.items
    }

    pub fn commands(&self) -> impl Iterator<Item = &DrawCmd> {
        self.items.iter().map(|(_, cmd)| cmd)
    }

    /// Layers never go backwards within a frame
    pub fn is_ordered(&self) -> bool {
        self.items.windows(2).all(|w| w[0].0 <= w[1].0)
    }

    /// Number of image draws for a slot (test helper for skip behaviour)
    pub fn image_count(&self, asset: AssetKind) -> usize {
        self.commands()
            .filter(|cmd| matches!(cmd, DrawCmd::Image { asset: a, .. } if *a == asset))
            .count()
    }

    /// All text strings in the frame
    pub fn texts(&self) -> Vec<&str> {
        self.commands()
            .filter_map(|cmd| match cmd {
                DrawCmd::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Colors for game elements
pub mod colors {
    use super::Color;

    pub const TEXT: Color = [1.0, 1.0, 1.0, 1.0];
    pub const TEXT_OUTLINE: Color = [0.0, 0.0, 0.0, 1.0];
    pub const SELECTION: Color = [1.0, 1.0, 1.0, 1.0];
    pub const CONNECTED: Color = [1.0, 1.0, 1.0, 0.35];
    pub const ROAD: Color = [0.267, 0.267, 0.267, 1.0]; // #444
    pub const GRASS: Color = [0.133, 0.545, 0.133, 1.0]; // #228B22
    pub const FLAPPY_SKY: Color = [0.439, 0.773, 0.808, 1.0]; // #70c5ce
    pub const RUNNER_SKY: Color = [0.067, 0.067, 0.067, 1.0];
    pub const WHACK_GROUND: Color = [0.133, 0.545, 0.133, 1.0];
    pub const BOARD: Color = [0.2, 0.2, 0.2, 1.0];

    /// CSS `rgba(...)` string for canvas backends
    pub fn css(color: Color) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            (color[0] * 255.0).round() as u8,
            (color[1] * 255.0).round() as u8,
            (color[2] * 255.0).round() as u8,
            color[3]
        )
    }
}
