// src/generator/packer.rs

//! Row ("shelf") packing of glyph cells into a single page.

/// Places rectangles left to right, wrapping to a new row when the current
/// one has no room. Each row is as tall as its tallest cell.
#[derive(Debug, Clone)]
pub struct ShelfPacker {
    width: u32,
    height: u32,
    x: u32,
    y: u32,
    row_height: u32,
}

impl ShelfPacker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            x: 0,
            y: 0,
            row_height: 0,
        }
    }

    /// Top-left corner for a `w x h` cell, or `None` when the page is full.
    pub fn place(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if w > self.width || h > self.height {
            return None;
        }
        if self.x + w > self.width {
            self.y += self.row_height;
            self.x = 0;
            self.row_height = 0;
        }
        if self.y + h > self.height {
            return None;
        }
        let pos = (self.x, self.y);
        self.x += w;
        self.row_height = self.row_height.max(h);
        Some(pos)
    }
}
