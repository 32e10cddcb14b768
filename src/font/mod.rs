// src/font/mod.rs

//! TrueType font loading: table decoding, the parsed metadata model, Unicode
//! block coverage, and glyph rasterization drivers.

pub mod blocks;
pub mod metadata;
pub mod program;
pub mod reader;
pub mod tables;

#[cfg(test)]
pub(crate) mod test_font;


pub use blocks::UnicodeBlock;
pub use metadata::{CodepointSet, FontMetadata, KerningPair};
pub use program::{
    FontStyle, FontdueRasterizer, GlyphBitmap, GlyphRasterizer, HeadlessRasterizer, LineMetrics,
};
pub use tables::{GlyphIndex, KerningTable};
