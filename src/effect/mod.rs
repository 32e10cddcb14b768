// src/effect/mod.rs

//! Visual effects applied around glyph rasterization.
//!
//! An `Effect` holds user-editable parameters. For each generation pass it
//! produces an `EffectRenderer`, a snapshot of those parameters plus any
//! scratch state the pass needs. Editing the effect afterwards does not
//! affect renderers already handed to a pass.

pub mod glow;
pub mod gradient;
pub mod outline;
pub mod property;
pub mod shadow;

#[cfg(test)]
mod tests;

use crate::generator::canvas::{Mask, Page};
use crate::generator::{FontInfo, GlyphRect, Padding};
use log::warn;

pub use glow::Glow;
pub use gradient::Gradient;
pub use outline::Outline;
pub use property::{ChangeCallback, Property, PropertyError, PropertyKind, PropertyValue};
pub use shadow::Shadow;

/// Hooks run by the generator during one pass. All hooks default to doing
/// nothing.
pub trait EffectRenderer: Send {
    /// Margin this effect draws outside the glyph image.
    fn padding(&self) -> Padding {
        Padding::ZERO
    }

    fn pre_page_render(&mut self, _page: &mut Page, _info: &FontInfo) {}

    fn pre_glyph_render(
        &mut self,
        _page: &mut Page,
        _info: &FontInfo,
        _glyph: &GlyphRect,
        _mask: &Mask,
    ) {
    }

    fn post_glyph_render(
        &mut self,
        _page: &mut Page,
        _info: &FontInfo,
        _glyph: &GlyphRect,
        _mask: &Mask,
    ) {
    }

    fn post_page_render(&mut self, _page: &mut Page, _info: &FontInfo) {}
}

/// A configurable effect variant.
pub trait Effect: Send {
    fn name(&self) -> &'static str;

    fn properties(&self) -> &[Property];

    fn properties_mut(&mut self) -> &mut [Property];

    /// Renderer bound to one generation pass.
    fn create_renderer(&self) -> Box<dyn EffectRenderer>;

    /// A fresh instance of the same variant with default parameters.
    fn create_new(&self) -> Box<dyn Effect>;

    /// A new instance of the same variant carrying this one's current
    /// parameter values. Change callbacks are not carried over.
    fn make_copy(&self) -> Box<dyn Effect> {
        let mut copy = self.create_new();
        for (dst, src) in copy.properties_mut().iter_mut().zip(self.properties()) {
            if let Err(e) = dst.set_value(src.value()) {
                warn!("Effect: failed to copy property of '{}': {}", self.name(), e);
            }
        }
        copy
    }

    fn property(&self, name: &str) -> Option<&Property> {
        self.properties().iter().find(|p| p.name() == name)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        self.properties_mut()
            .iter_mut()
            .find(|p| p.name() == name)
            .ok_or_else(|| PropertyError::Unknown(name.to_string()))?
            .set_value(value)
    }
}

/// Renders glyphs unchanged.
#[derive(Debug, Default)]
pub struct Identity;

impl Identity {
    pub fn new() -> Self {
        Self
    }
}

impl EffectRenderer for Identity {}

impl Effect for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn properties(&self) -> &[Property] {
        &[]
    }

    fn properties_mut(&mut self) -> &mut [Property] {
        &mut []
    }

    fn create_renderer(&self) -> Box<dyn EffectRenderer> {
        Box::new(Identity)
    }

    fn create_new(&self) -> Box<dyn Effect> {
        Box::new(Identity)
    }
}

/// Renderers for every effect, in order.
pub fn create_renderers(effects: &[Box<dyn Effect>]) -> Vec<Box<dyn EffectRenderer>> {
    effects.iter().map(|e| e.create_renderer()).collect()
}
