// src/font/program.rs

//! Glyph rasterization primitives.
//!
//! `GlyphRasterizer` is the seam between atlas generation and whatever turns
//! a glyph index into coverage pixels. Two drivers exist:
//! - `FontdueRasterizer` renders outlines from the live font program.
//! - `HeadlessRasterizer` renders deterministic boxes sized from the point
//!   size alone, for previews and environments without a font program.

use super::tables::GlyphIndex;
use crate::error::GenerationError;
use bitflags::bitflags;
use log::trace;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

bitflags! {
    /// Font style flags. Styles requested beyond a font's native style are
    /// synthesized at rasterization time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct FontStyle: u8 {
        const BOLD   = 1 << 0;
        const ITALIC = 1 << 1;
    }
}

impl FontStyle {
    /// Native style implied by a `family,subfamily` display name.
    pub fn from_postscript_name(name: &str) -> Self {
        let mut style = FontStyle::empty();
        if let Some((_, subfamily)) = name.split_once(',') {
            if subfamily.contains("Bold") {
                style |= FontStyle::BOLD;
            }
            if subfamily.contains("Italic") {
                style |= FontStyle::ITALIC;
            }
        }
        style
    }
}

/// Vertical metrics of a font at one pixel size. `descent` is negative
/// below the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
}

impl LineMetrics {
    pub fn line_height(&self) -> f32 {
        self.ascent - self.descent + self.line_gap
    }
}

/// An 8-bit coverage mask for one glyph plus its placement relative to the
/// pen position. `ymin` is the offset of the bottom row from the baseline,
/// positive upwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphBitmap {
    pub width: usize,
    pub height: usize,
    pub coverage: Vec<u8>,
    pub xmin: i32,
    pub ymin: i32,
    pub advance: f32,
}

impl GlyphBitmap {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn at(&self, x: usize, y: usize) -> u8 {
        self.coverage[y * self.width + x]
    }

    /// Snaps coverage to 0 or 255 at 50%.
    pub fn threshold(&mut self) {
        for c in &mut self.coverage {
            *c = if *c >= 128 { 255 } else { 0 };
        }
    }

    /// Thickens strokes horizontally by `strength` pixels.
    fn embolden(&mut self, strength: usize) {
        if self.is_empty() || strength == 0 {
            return;
        }
        let width = self.width + strength;
        let mut out = vec![0u8; width * self.height];
        for y in 0..self.height {
            for x in 0..width {
                let lo = x.saturating_sub(strength);
                let hi = x.min(self.width - 1);
                if lo > hi {
                    continue;
                }
                let row = &self.coverage[y * self.width..(y + 1) * self.width];
                out[y * width + x] = row[lo..=hi].iter().copied().max().unwrap_or(0);
            }
        }
        self.width = width;
        self.coverage = out;
        self.advance += strength as f32;
    }

    /// Shears rows to the right in proportion to their height above the
    /// baseline.
    fn oblique(&mut self, slant: f32) {
        if self.is_empty() {
            return;
        }
        let shift_of = |row: usize| -> i32 {
            let above_baseline = self.ymin + (self.height - 1 - row) as i32;
            (above_baseline as f32 * slant).round() as i32
        };
        let shifts: Vec<i32> = (0..self.height).map(shift_of).collect();
        let min = shifts.iter().copied().min().unwrap_or(0);
        let max = shifts.iter().copied().max().unwrap_or(0);
        let width = self.width + (max - min) as usize;

        let mut out = vec![0u8; width * self.height];
        for (y, shift) in shifts.iter().enumerate() {
            let dx = (shift - min) as usize;
            let src = &self.coverage[y * self.width..(y + 1) * self.width];
            out[y * width + dx..y * width + dx + self.width].copy_from_slice(src);
        }
        self.width = width;
        self.coverage = out;
        self.xmin += min;
    }
}

/// Turns glyph indices into coverage masks at a pixel size.
pub trait GlyphRasterizer: Send + Sync {
    fn line_metrics(&self, px: f32) -> LineMetrics;

    fn rasterize(&self, glyph: GlyphIndex, px: f32, antialias: bool)
        -> Result<GlyphBitmap, GenerationError>;
}

const OBLIQUE_SLANT: f32 = 0.2;

/// Rasterizes glyph outlines from the live font program.
pub struct FontdueRasterizer {
    font: Arc<fontdue::Font>,
    synthetic: FontStyle,
}

impl FontdueRasterizer {
    /// `synthetic` lists the styles to fake on top of the outlines.
    pub fn new(font: Arc<fontdue::Font>, synthetic: FontStyle) -> Self {
        Self { font, synthetic }
    }
}

impl GlyphRasterizer for FontdueRasterizer {
    fn line_metrics(&self, px: f32) -> LineMetrics {
        match self.font.horizontal_line_metrics(px) {
            Some(m) => LineMetrics {
                ascent: m.ascent,
                descent: m.descent,
                line_gap: m.line_gap,
            },
            None => LineMetrics {
                ascent: px * 0.8,
                descent: -px * 0.2,
                line_gap: 0.0,
            },
        }
    }

    fn rasterize(
        &self,
        glyph: GlyphIndex,
        px: f32,
        antialias: bool,
    ) -> Result<GlyphBitmap, GenerationError> {
        let index = u16::try_from(glyph)
            .ok()
            .filter(|&g| g < self.font.glyph_count())
            .ok_or_else(|| GenerationError::Rasterization {
                glyph,
                reason: format!("font program has only {} glyphs", self.font.glyph_count()),
            })?;

        let (metrics, coverage) = self.font.rasterize_indexed(index, px);
        let mut bitmap = GlyphBitmap {
            width: metrics.width,
            height: metrics.height,
            coverage,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            advance: metrics.advance_width,
        };

        if self.synthetic.contains(FontStyle::BOLD) {
            bitmap.embolden(((px / 24.0).round() as usize).max(1));
        }
        if self.synthetic.contains(FontStyle::ITALIC) {
            bitmap.oblique(OBLIQUE_SLANT);
        }
        if !antialias {
            bitmap.threshold();
        }
        trace!(
            "FontdueRasterizer: glyph {} -> {}x{} at ({}, {})",
            glyph,
            bitmap.width,
            bitmap.height,
            bitmap.xmin,
            bitmap.ymin
        );
        Ok(bitmap)
    }
}

/// Renders every glyph as a solid box derived from the pixel size.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessRasterizer;

impl HeadlessRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl GlyphRasterizer for HeadlessRasterizer {
    fn line_metrics(&self, px: f32) -> LineMetrics {
        LineMetrics {
            ascent: (px * 0.8).round(),
            descent: -(px * 0.2).round(),
            line_gap: 0.0,
        }
    }

    fn rasterize(
        &self,
        _glyph: GlyphIndex,
        px: f32,
        _antialias: bool,
    ) -> Result<GlyphBitmap, GenerationError> {
        let width = ((px * 0.5).round() as usize).max(1);
        let height = ((px * 0.7).round() as usize).max(1);
        Ok(GlyphBitmap {
            width,
            height,
            coverage: vec![255; width * height],
            xmin: 0,
            ymin: 0,
            advance: (width + 1) as f32,
        })
    }
}
