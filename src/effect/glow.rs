// src/effect/glow.rs

use super::{Effect, EffectRenderer, Property};
use crate::color::Rgba;
use crate::generator::canvas::{Mask, Page};
use crate::generator::{FontInfo, GlyphRect, Padding};

/// Soft halo behind each glyph: the glyph grown by half the radius, then
/// box-blurred over the full radius.
#[derive(Debug)]
pub struct Glow {
    props: [Property; 2],
}

impl Glow {
    pub const RADIUS: &'static str = "radius";
    pub const COLOR: &'static str = "color";

    pub fn new(radius: i32, color: Rgba) -> Self {
        Self {
            props: [
                Property::int(Self::RADIUS, radius, 0, 32),
                Property::color(Self::COLOR, color),
            ],
        }
    }
}

impl Default for Glow {
    fn default() -> Self {
        Self::new(3, Rgba::new(255, 255, 160, 192))
    }
}

impl Effect for Glow {
    fn name(&self) -> &'static str {
        "glow"
    }

    fn properties(&self) -> &[Property] {
        &self.props
    }

    fn properties_mut(&mut self) -> &mut [Property] {
        &mut self.props
    }

    fn create_renderer(&self) -> Box<dyn EffectRenderer> {
        Box::new(GlowRenderer {
            radius: self.props[0].as_int().max(0) as usize,
            color: self.props[1].as_color(),
            scratch: Vec::new(),
        })
    }

    fn create_new(&self) -> Box<dyn Effect> {
        Box::new(Glow::default())
    }
}

struct GlowRenderer {
    radius: usize,
    color: Rgba,
    scratch: Vec<u32>,
}

impl EffectRenderer for GlowRenderer {
    fn padding(&self) -> Padding {
        Padding::uniform(self.radius as u32)
    }

    fn pre_glyph_render(
        &mut self,
        page: &mut Page,
        _info: &FontInfo,
        glyph: &GlyphRect,
        mask: &Mask,
    ) {
        if self.radius == 0 {
            return;
        }
        let grow = self.radius / 2;
        let mut halo = mask.dilate(grow).padded(self.radius - grow);
        halo.box_blur(self.radius, &mut self.scratch);
        let r = self.radius as i64;
        page.draw_mask(&halo, glyph.image_x as i64 - r, glyph.image_y as i64 - r, self.color);
    }
}
