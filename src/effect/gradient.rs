// src/effect/gradient.rs

use super::{Effect, EffectRenderer, Property};
use crate::color::Rgba;
use crate::generator::canvas::{Mask, Page};
use crate::generator::{FontInfo, GlyphRect};

/// Repaints each glyph with a vertical gradient spanning the line height,
/// so every glyph samples the same gradient at the same line position.
#[derive(Debug)]
pub struct Gradient {
    props: [Property; 2],
}

impl Gradient {
    pub const TOP: &'static str = "top";
    pub const BOTTOM: &'static str = "bottom";

    pub fn new(top: Rgba, bottom: Rgba) -> Self {
        Self {
            props: [Property::color(Self::TOP, top), Property::color(Self::BOTTOM, bottom)],
        }
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::new(Rgba::WHITE, Rgba::opaque(128, 128, 128))
    }
}

impl Effect for Gradient {
    fn name(&self) -> &'static str {
        "gradient"
    }

    fn properties(&self) -> &[Property] {
        &self.props
    }

    fn properties_mut(&mut self) -> &mut [Property] {
        &mut self.props
    }

    fn create_renderer(&self) -> Box<dyn EffectRenderer> {
        Box::new(GradientRenderer {
            top: self.props[0].as_color(),
            bottom: self.props[1].as_color(),
            line: Vec::new(),
        })
    }

    fn create_new(&self) -> Box<dyn Effect> {
        Box::new(Gradient::default())
    }
}

struct GradientRenderer {
    top: Rgba,
    bottom: Rgba,
    /// One color per line row, built in `pre_page_render`.
    line: Vec<Rgba>,
}

impl EffectRenderer for GradientRenderer {
    fn pre_page_render(&mut self, _page: &mut Page, info: &FontInfo) {
        let rows = info.line_height.max(1) as usize;
        let span = (rows - 1).max(1) as f32;
        self.line = (0..rows)
            .map(|row| self.top.lerp(self.bottom, row as f32 / span))
            .collect();
    }

    fn post_glyph_render(
        &mut self,
        page: &mut Page,
        _info: &FontInfo,
        glyph: &GlyphRect,
        mask: &Mask,
    ) {
        let (Some(&first), Some(&last)) = (self.line.first(), self.line.last()) else {
            return;
        };
        let top = glyph.image_line_top();
        let line = &self.line;
        page.draw_mask_shaded(mask, glyph.image_x as i64, glyph.image_y as i64, |_, my| {
            let row = top + my as i32;
            if row < 0 {
                first
            } else {
                line.get(row as usize).copied().unwrap_or(last)
            }
        });
    }
}
