// src/generator/canvas.rs

//! The atlas page being drawn and the coverage masks drawn onto it.

use crate::color::Rgba;
use crate::font::GlyphBitmap;

/// An 8-bit coverage mask.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl Mask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn from_bitmap(bitmap: &GlyphBitmap) -> Self {
        Self {
            width: bitmap.width,
            height: bitmap.height,
            data: bitmap.coverage.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Copy with `border` empty pixels added on every side.
    pub fn padded(&self, border: usize) -> Mask {
        let mut out = Mask::new(self.width + 2 * border, self.height + 2 * border);
        for y in 0..self.height {
            let src = &self.data[y * self.width..(y + 1) * self.width];
            let start = (y + border) * out.width + border;
            out.data[start..start + self.width].copy_from_slice(src);
        }
        out
    }

    /// Grows coverage by `radius` pixels with a round structuring element.
    /// The result is `2 * radius` larger in each dimension.
    pub fn dilate(&self, radius: usize) -> Mask {
        let src = self.padded(radius);
        if radius == 0 {
            return src;
        }
        let r = radius as isize;
        let offsets: Vec<(isize, isize)> = (-r..=r)
            .flat_map(|dy| (-r..=r).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| dx * dx + dy * dy <= r * r)
            .collect();

        let mut out = Mask::new(src.width, src.height);
        for y in 0..src.height as isize {
            for x in 0..src.width as isize {
                let mut best = 0u8;
                for &(dx, dy) in &offsets {
                    let (sx, sy) = (x + dx, y + dy);
                    if sx < 0 || sy < 0 || sx >= src.width as isize || sy >= src.height as isize {
                        continue;
                    }
                    best = best.max(src.get(sx as usize, sy as usize));
                    if best == 255 {
                        break;
                    }
                }
                out.data[y as usize * out.width + x as usize] = best;
            }
        }
        out
    }

    /// Separable box blur of the given radius, in place. `scratch` is reused
    /// between calls to avoid reallocating.
    pub fn box_blur(&mut self, radius: usize, scratch: &mut Vec<u32>) {
        if radius == 0 || self.is_empty() {
            return;
        }
        let (w, h) = (self.width, self.height);
        let window = (2 * radius + 1) as u32;
        scratch.clear();
        scratch.resize(w * h, 0);

        // Horizontal pass into scratch.
        for y in 0..h {
            let row = &self.data[y * w..(y + 1) * w];
            for x in 0..w {
                let lo = x.saturating_sub(radius);
                let hi = (x + radius).min(w - 1);
                scratch[y * w + x] = row[lo..=hi].iter().map(|&v| v as u32).sum();
            }
        }
        // Vertical pass back into the mask.
        for x in 0..w {
            for y in 0..h {
                let lo = y.saturating_sub(radius);
                let hi = (y + radius).min(h - 1);
                let sum: u32 = (lo..=hi).map(|yy| scratch[yy * w + x]).sum();
                self.data[y * w + x] = (sum / (window * window)).min(255) as u8;
            }
        }
    }
}

/// One atlas page: `width x height` RGBA pixels, initially transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Page {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Composites `color` over the pixel at `(x, y)` with the given coverage.
    /// Coordinates outside the page are ignored.
    pub fn blend(&mut self, x: i64, y: i64, color: Rgba, coverage: u8) {
        if coverage == 0 || x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels[idx] = self.pixels[idx].over(color.with_coverage(coverage));
    }

    /// Draws `mask` with its top-left corner at `(x, y)` in a solid color.
    pub fn draw_mask(&mut self, mask: &Mask, x: i64, y: i64, color: Rgba) {
        self.draw_mask_shaded(mask, x, y, |_, _| color);
    }

    /// Draws `mask` with a per-pixel color chosen by `shade(mx, my)` in mask
    /// coordinates.
    pub fn draw_mask_shaded(
        &mut self,
        mask: &Mask,
        x: i64,
        y: i64,
        shade: impl Fn(usize, usize) -> Rgba,
    ) {
        for my in 0..mask.height {
            for mx in 0..mask.width {
                let coverage = mask.get(mx, my);
                if coverage != 0 {
                    self.blend(x + mx as i64, y + my as i64, shade(mx, my), coverage);
                }
            }
        }
    }

    /// Pixels as bytes in B, G, R, A order.
    pub fn to_bgra(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.pixels.len() * 4];
        self.write_bgra(&mut out);
        out
    }

    /// Writes pixels in B, G, R, A order into `out`, which must hold at least
    /// `width * height * 4` bytes.
    pub fn write_bgra(&self, out: &mut [u8]) {
        for (px, chunk) in self.pixels.iter().zip(out.chunks_exact_mut(4)) {
            chunk.copy_from_slice(&[px.b, px.g, px.r, px.a]);
        }
    }

    /// Pixels as bytes in R, G, B, A order.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| [p.r, p.g, p.b, p.a]).collect()
    }
}
