// src/lib.rs

//! Turns TrueType fonts into bitmap glyph atlases.
//!
//! [`FontMetadata`] parses a font's `head`, `cmap`, `name` and `kern` tables.
//! [`FontGenerator`] rasterizes a [`CharSet`] of its glyphs into one page and
//! runs the [`effect`] pipeline around each glyph. Passes can run on a
//! background [`generator::worker::CoalescingWorker`].

pub mod charset;
pub mod color;
pub mod config;
pub mod effect;
pub mod error;
pub mod export;
pub mod font;
pub mod generator;

pub use charset::CharSet;
pub use color::Rgba;
pub use error::{FontError, GenerationError};
pub use font::{FontMetadata, FontStyle, KerningPair, UnicodeBlock};
pub use generator::{FontGenerator, FontInfo, GeneratorMethod, GlyphRect, Padding, PaddingMode};
