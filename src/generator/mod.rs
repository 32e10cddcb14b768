// src/generator/mod.rs

//! Atlas generation: rasterize the selected glyphs, pack them into one page
//! and run the effect pipeline around every glyph and around the page.
//!
//! A pass runs in this order:
//!
//! ```text
//! pre_page_render (each effect)
//! for each glyph:
//!     pre_glyph_render (each effect) -> glyph fill -> post_glyph_render (each effect)
//! post_page_render (each effect)
//! ```
//!
//! Effects run in their declared order for both `pre_*` and `post_*` hooks.

pub mod canvas;
pub mod packer;
pub mod worker;


use crate::charset::CharSet;
use crate::color::Rgba;
use crate::effect::EffectRenderer;
use crate::error::{FontError, GenerationError};
use crate::font::{
    FontMetadata, FontdueRasterizer, GlyphBitmap, GlyphIndex, GlyphRasterizer, HeadlessRasterizer,
};
use canvas::{Mask, Page};
use log::{debug, info, trace};
use packer::ShelfPacker;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Margin around a glyph image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: u32,
    pub left: u32,
    pub bottom: u32,
    pub right: u32,
}

impl Padding {
    pub const ZERO: Padding = Padding::new(0, 0, 0, 0);

    pub const fn new(top: u32, left: u32, bottom: u32, right: u32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub const fn uniform(n: u32) -> Self {
        Self::new(n, n, n, n)
    }

    /// Component-wise maximum.
    pub fn max(self, other: Padding) -> Padding {
        Padding {
            top: self.top.max(other.top),
            left: self.left.max(other.left),
            bottom: self.bottom.max(other.bottom),
            right: self.right.max(other.right),
        }
    }

    pub fn horizontal(&self) -> u32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> u32 {
        self.top + self.bottom
    }
}

/// How the padding for a pass is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum PaddingMode {
    /// Component-wise maximum of what the active effects ask for.
    #[default]
    Automatic,
    /// A fixed padding regardless of effects.
    Manual(Padding),
}

impl PaddingMode {
    pub fn resolve(&self, effects: &[Box<dyn EffectRenderer>]) -> Padding {
        match self {
            PaddingMode::Manual(padding) => *padding,
            PaddingMode::Automatic => effects
                .iter()
                .map(|e| e.padding())
                .fold(Padding::ZERO, Padding::max),
        }
    }
}

/// Which rasterizer a generator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorMethod {
    /// Glyph outlines from the font program.
    #[default]
    Fontdue,
    /// Placeholder boxes; needs no font program.
    Headless,
}

impl GeneratorMethod {
    pub fn rasterizer(
        &self,
        font: &FontMetadata,
    ) -> Result<Box<dyn GlyphRasterizer>, GenerationError> {
        match self {
            GeneratorMethod::Fontdue => {
                let program = font
                    .program()
                    .ok_or_else(|| GenerationError::MissingFontProgram(font.name().to_string()))?;
                let synthetic = font.style().difference(font.native_style());
                Ok(Box::new(FontdueRasterizer::new(Arc::clone(program), synthetic)))
            }
            GeneratorMethod::Headless => Ok(Box::new(HeadlessRasterizer::new())),
        }
    }
}

/// Line metrics of a generated atlas, in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontInfo {
    pub size: f32,
    /// Pixels above the baseline.
    pub ascent: i32,
    /// Pixels below the baseline.
    pub descent: i32,
    pub line_height: i32,
    pub padding: Padding,
}

/// Placement of one codepoint's glyph in the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphRect {
    pub codepoint: u32,
    pub glyph: GlyphIndex,
    /// Cell in the atlas, padding included.
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// The glyph image inside the cell.
    pub image_x: u32,
    pub image_y: u32,
    pub image_width: u32,
    pub image_height: u32,
    /// Offset of the cell's top-left corner from the pen position, with `y`
    /// measured down from the top of the line.
    pub x_offset: i32,
    pub y_offset: i32,
    pub advance: i32,
}

impl GlyphRect {
    pub fn is_empty(&self) -> bool {
        self.image_width == 0 || self.image_height == 0
    }

    /// Distance from the top of the line to the first image row.
    pub fn image_line_top(&self) -> i32 {
        self.y_offset + (self.image_y - self.y) as i32
    }
}

/// Generates one atlas page for a font.
pub struct FontGenerator {
    font: FontMetadata,
    method: GeneratorMethod,
    fill: Rgba,
    page: Option<Page>,
    glyphs: Vec<GlyphRect>,
    info: Option<FontInfo>,
}

struct Prepared {
    glyph: GlyphIndex,
    codepoints: Vec<u32>,
    bitmap: GlyphBitmap,
    cell: Option<(u32, u32)>,
}

impl FontGenerator {
    pub fn new(font: FontMetadata, method: GeneratorMethod) -> Self {
        Self {
            font,
            method,
            fill: Rgba::WHITE,
            page: None,
            glyphs: Vec::new(),
            info: None,
        }
    }

    /// Color glyphs are filled with before `post_glyph_render`.
    pub fn set_fill(&mut self, fill: Rgba) {
        self.fill = fill;
    }

    pub fn font(&self) -> &FontMetadata {
        &self.font
    }

    pub fn method(&self) -> GeneratorMethod {
        self.method
    }

    /// Runs one generation pass. On failure the result of any previous
    /// successful pass is kept.
    pub fn generate(
        &mut self,
        width: u32,
        height: u32,
        charset: &CharSet,
        padding: Padding,
        effects: &mut [Box<dyn EffectRenderer>],
        antialias: bool,
    ) -> Result<(), FontError> {
        if width == 0 || height == 0 {
            return Err(GenerationError::InvalidTextureSize { width, height }.into());
        }
        let rasterizer = self.method.rasterizer(&self.font)?;
        let size = self.font.size();

        let mut prepared = self.collect_glyphs(charset);
        if prepared.is_empty() {
            return Err(GenerationError::EmptySelection.into());
        }
        debug!(
            "FontGenerator: {} glyphs selected for '{}' at {}",
            prepared.len(),
            self.font.name(),
            size
        );

        for p in &mut prepared {
            p.bitmap = rasterizer.rasterize(p.glyph, size, antialias)?;
        }

        let mut packer = ShelfPacker::new(width, height);
        let total = prepared.iter().filter(|p| !p.bitmap.is_empty()).count();
        let mut placed = 0;
        for p in prepared.iter_mut().filter(|p| !p.bitmap.is_empty()) {
            let cell_w = p.bitmap.width as u32 + padding.horizontal();
            let cell_h = p.bitmap.height as u32 + padding.vertical();
            p.cell = Some(
                packer
                    .place(cell_w, cell_h)
                    .ok_or(GenerationError::CapacityExceeded { placed, total })?,
            );
            placed += 1;
        }

        let metrics = rasterizer.line_metrics(size);
        let info = FontInfo {
            size,
            ascent: metrics.ascent.round() as i32,
            descent: (-metrics.descent).round() as i32,
            line_height: metrics.line_height().round() as i32,
            padding,
        };

        let mut page = Page::new(width, height);
        for effect in effects.iter_mut() {
            effect.pre_page_render(&mut page, &info);
        }

        let mut glyphs = Vec::new();
        for p in &prepared {
            let rect = Self::glyph_rect(p, &info);
            if !rect.is_empty() {
                let mask = Mask::from_bitmap(&p.bitmap);
                for effect in effects.iter_mut() {
                    effect.pre_glyph_render(&mut page, &info, &rect, &mask);
                }
                page.draw_mask(&mask, rect.image_x as i64, rect.image_y as i64, self.fill);
                for effect in effects.iter_mut() {
                    effect.post_glyph_render(&mut page, &info, &rect, &mask);
                }
            }
            trace!("FontGenerator: {:?}", rect);
            glyphs.extend(p.codepoints.iter().map(|&codepoint| GlyphRect { codepoint, ..rect }));
        }

        for effect in effects.iter_mut() {
            effect.post_page_render(&mut page, &info);
        }

        glyphs.sort_by_key(|g| g.codepoint);
        info!(
            "FontGenerator: generated {}x{} atlas with {} glyphs ({} codepoints)",
            width,
            height,
            prepared.len(),
            glyphs.len()
        );
        self.page = Some(page);
        self.glyphs = glyphs;
        self.info = Some(info);
        Ok(())
    }

    /// Selected codepoints grouped by glyph, in order of each glyph's first
    /// codepoint.
    fn collect_glyphs(&self, charset: &CharSet) -> Vec<Prepared> {
        let mut prepared: Vec<Prepared> = Vec::new();
        let mut by_glyph: HashMap<GlyphIndex, usize> = HashMap::new();

        let mut cp = None;
        while let Some(codepoint) = self.font.next_codepoint(cp) {
            cp = Some(codepoint);
            if !charset.is_included(codepoint) {
                continue;
            }
            let Some(glyph) = self.font.glyph_for_codepoint(codepoint) else {
                continue;
            };
            match by_glyph.get(&glyph) {
                Some(&idx) => prepared[idx].codepoints.push(codepoint),
                None => {
                    by_glyph.insert(glyph, prepared.len());
                    prepared.push(Prepared {
                        glyph,
                        codepoints: vec![codepoint],
                        bitmap: GlyphBitmap::default(),
                        cell: None,
                    });
                }
            }
        }
        prepared
    }

    fn glyph_rect(p: &Prepared, info: &FontInfo) -> GlyphRect {
        let advance = p.bitmap.advance.round() as i32;
        let first = p.codepoints.first().copied().unwrap_or_default();
        let Some((x, y)) = p.cell else {
            return GlyphRect {
                codepoint: first,
                glyph: p.glyph,
                x: 0,
                y: 0,
                width: 0,
                height: 0,
                image_x: 0,
                image_y: 0,
                image_width: 0,
                image_height: 0,
                x_offset: 0,
                y_offset: 0,
                advance,
            };
        };
        let pad = info.padding;
        let (w, h) = (p.bitmap.width as u32, p.bitmap.height as u32);
        GlyphRect {
            codepoint: first,
            glyph: p.glyph,
            x,
            y,
            width: w + pad.horizontal(),
            height: h + pad.vertical(),
            image_x: x + pad.left,
            image_y: y + pad.top,
            image_width: w,
            image_height: h,
            x_offset: p.bitmap.xmin - pad.left as i32,
            y_offset: info.ascent - (p.bitmap.ymin + h as i32) - pad.top as i32,
            advance,
        }
    }

    /// The generated page, if a pass has succeeded.
    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    pub fn font_info(&self) -> Option<&FontInfo> {
        self.info.as_ref()
    }

    /// One entry per generated codepoint, sorted by codepoint.
    pub fn glyphs(&self) -> &[GlyphRect] {
        &self.glyphs
    }

    pub fn glyph(&self, codepoint: u32) -> Option<&GlyphRect> {
        self.glyphs
            .binary_search_by_key(&codepoint, |g| g.codepoint)
            .ok()
            .map(|i| &self.glyphs[i])
    }

    /// Page pixels as `width * height * 4` bytes in BGRA order.
    pub fn texture_data(&self) -> Option<Vec<u8>> {
        self.page.as_ref().map(Page::to_bgra)
    }

    /// Writes BGRA page pixels into `out`. Returns `false` when there is no
    /// page yet or `out` is too small.
    pub fn write_texture_data(&self, out: &mut [u8]) -> bool {
        match &self.page {
            Some(page) if out.len() >= page.width() as usize * page.height() as usize * 4 => {
                page.write_bgra(out);
                true
            }
            _ => false,
        }
    }
}
