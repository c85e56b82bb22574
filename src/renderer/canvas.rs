//! Canvas 2D backend
//!
//! Replays a `DrawList` on a `CanvasRenderingContext2d`. Images are the
//! elements created by the platform loader, one per visual asset slot.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::draw::{DrawCmd, DrawList, colors};
use crate::assets::AssetKind;

pub struct CanvasBackend {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    images: [Option<HtmlImageElement>; 3],
}

fn image_slot(kind: AssetKind) -> Option<usize> {
    match kind {
        AssetKind::Player => Some(0),
        AssetKind::Obstacle => Some(1),
        AssetKind::Background => Some(2),
        AssetKind::Music => None,
    }
}

impl CanvasBackend {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        ctx.set_image_smoothing_enabled(false);
        Ok(Self {
            canvas,
            ctx,
            images: [None, None, None],
        })
    }

    pub fn set_image(&mut self, kind: AssetKind, image: HtmlImageElement) {
        if let Some(slot) = image_slot(kind) {
            self.images[slot] = Some(image);
        }
    }

    fn image(&self, kind: AssetKind) -> Option<&HtmlImageElement> {
        image_slot(kind).and_then(|slot| self.images[slot].as_ref())
    }

    /// Clear the canvas and draw one frame
    pub fn draw(&self, list: &DrawList) {
        let ctx = &self.ctx;
        ctx.clear_rect(0.0, 0.0, self.canvas.width() as f64, self.canvas.height() as f64);

        for cmd in list.commands() {
            match cmd {
                DrawCmd::Image {
                    asset,
                    rect,
                    hue_rotate,
                } => {
                    let Some(image) = self.image(*asset) else {
                        continue;
                    };
                    if let Some(deg) = hue_rotate {
                        ctx.set_filter(&format!("hue-rotate({}deg)", deg));
                    }
                    ctx.draw_image_with_html_image_element_and_dw_and_dh(
                        image,
                        rect.x as f64,
                        rect.y as f64,
                        rect.w as f64,
                        rect.h as f64,
                    )
                    .ok();
                    if hue_rotate.is_some() {
                        ctx.set_filter("none");
                    }
                }
                DrawCmd::FillRect { rect, color } => {
                    ctx.set_fill_style_str(&colors::css(*color));
                    ctx.fill_rect(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
                }
                DrawCmd::StrokeRect {
                    rect,
                    color,
                    line_width,
                } => {
                    ctx.set_stroke_style_str(&colors::css(*color));
                    ctx.set_line_width(*line_width as f64);
                    ctx.stroke_rect(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
                }
                DrawCmd::Text {
                    text,
                    pos,
                    size,
                    color,
                    outline,
                } => {
                    ctx.set_font(&format!("{}px Arial", size));
                    if let Some((outline_color, width)) = outline {
                        ctx.set_stroke_style_str(&colors::css(*outline_color));
                        ctx.set_line_width(*width as f64);
                        ctx.stroke_text(text, pos.x as f64, pos.y as f64).ok();
                    }
                    ctx.set_fill_style_str(&colors::css(*color));
                    ctx.fill_text(text, pos.x as f64, pos.y as f64).ok();
                }
            }
        }
    }
}
