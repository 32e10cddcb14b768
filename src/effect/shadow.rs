// src/effect/shadow.rs

use super::{Effect, EffectRenderer, Property};
use crate::color::Rgba;
use crate::generator::canvas::{Mask, Page};
use crate::generator::{FontInfo, GlyphRect, Padding};

/// Draws an offset copy of each glyph behind it.
#[derive(Debug)]
pub struct Shadow {
    props: [Property; 3],
}

impl Shadow {
    pub const OFFSET_X: &'static str = "offset_x";
    pub const OFFSET_Y: &'static str = "offset_y";
    pub const COLOR: &'static str = "color";

    pub fn new(offset_x: i32, offset_y: i32, color: Rgba) -> Self {
        Self {
            props: [
                Property::int(Self::OFFSET_X, offset_x, -64, 64),
                Property::int(Self::OFFSET_Y, offset_y, -64, 64),
                Property::color(Self::COLOR, color),
            ],
        }
    }
}

impl Default for Shadow {
    fn default() -> Self {
        Self::new(1, 1, Rgba::new(0, 0, 0, 128))
    }
}

impl Effect for Shadow {
    fn name(&self) -> &'static str {
        "shadow"
    }

    fn properties(&self) -> &[Property] {
        &self.props
    }

    fn properties_mut(&mut self) -> &mut [Property] {
        &mut self.props
    }

    fn create_renderer(&self) -> Box<dyn EffectRenderer> {
        Box::new(ShadowRenderer {
            dx: self.props[0].as_int(),
            dy: self.props[1].as_int(),
            color: self.props[2].as_color(),
        })
    }

    fn create_new(&self) -> Box<dyn Effect> {
        Box::new(Shadow::default())
    }
}

struct ShadowRenderer {
    dx: i32,
    dy: i32,
    color: Rgba,
}

impl EffectRenderer for ShadowRenderer {
    fn padding(&self) -> Padding {
        Padding {
            top: (-self.dy).max(0) as u32,
            left: (-self.dx).max(0) as u32,
            bottom: self.dy.max(0) as u32,
            right: self.dx.max(0) as u32,
        }
    }

    fn pre_glyph_render(
        &mut self,
        page: &mut Page,
        _info: &FontInfo,
        glyph: &GlyphRect,
        mask: &Mask,
    ) {
        page.draw_mask(
            mask,
            glyph.image_x as i64 + self.dx as i64,
            glyph.image_y as i64 + self.dy as i64,
            self.color,
        );
    }
}
