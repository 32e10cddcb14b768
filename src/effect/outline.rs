// src/effect/outline.rs

use super::{Effect, EffectRenderer, Property};
use crate::color::Rgba;
use crate::generator::canvas::{Mask, Page};
use crate::generator::{FontInfo, GlyphRect, Padding};

/// Draws a solid border of `width` pixels behind each glyph.
#[derive(Debug)]
pub struct Outline {
    props: [Property; 2],
}

impl Outline {
    pub const WIDTH: &'static str = "width";
    pub const COLOR: &'static str = "color";

    pub fn new(width: i32, color: Rgba) -> Self {
        Self {
            props: [
                Property::int(Self::WIDTH, width, 0, 64),
                Property::color(Self::COLOR, color),
            ],
        }
    }
}

impl Default for Outline {
    fn default() -> Self {
        Self::new(1, Rgba::BLACK)
    }
}

impl Effect for Outline {
    fn name(&self) -> &'static str {
        "outline"
    }

    fn properties(&self) -> &[Property] {
        &self.props
    }

    fn properties_mut(&mut self) -> &mut [Property] {
        &mut self.props
    }

    fn create_renderer(&self) -> Box<dyn EffectRenderer> {
        Box::new(OutlineRenderer {
            width: self.props[0].as_int().max(0) as usize,
            color: self.props[1].as_color(),
        })
    }

    fn create_new(&self) -> Box<dyn Effect> {
        Box::new(Outline::default())
    }
}

struct OutlineRenderer {
    width: usize,
    color: Rgba,
}

impl EffectRenderer for OutlineRenderer {
    fn padding(&self) -> Padding {
        Padding::uniform(self.width as u32)
    }

    fn pre_glyph_render(
        &mut self,
        page: &mut Page,
        _info: &FontInfo,
        glyph: &GlyphRect,
        mask: &Mask,
    ) {
        if self.width == 0 {
            return;
        }
        let border = mask.dilate(self.width);
        let w = self.width as i64;
        page.draw_mask(&border, glyph.image_x as i64 - w, glyph.image_y as i64 - w, self.color);
    }
}
