// src/error.rs

//! Error taxonomy for font loading and atlas generation.
//!
//! Load-time failures (`Malformed`, `Io`) abort construction of
//! `FontMetadata`. `Generation` failures abort a single atlas pass and never
//! touch a previously generated atlas.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a font or generating an atlas from it.
#[derive(Error, Debug)]
pub enum FontError {
    /// A mandatory table is missing, a table is truncated, or a subtable
    /// format is not supported.
    #[error("malformed font: {0}")]
    Malformed(String),

    /// The font file could not be read.
    #[error("failed to read font file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An atlas pass failed. Only that pass is affected.
    #[error("atlas generation failed: {0}")]
    Generation(#[from] GenerationError),
}

/// Reasons a single atlas generation pass can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("invalid texture size {width}x{height}")]
    InvalidTextureSize { width: u32, height: u32 },

    #[error("no glyphs selected by the character set")]
    EmptySelection,

    #[error("atlas page exhausted after placing {placed} of {total} glyphs")]
    CapacityExceeded { placed: usize, total: usize },

    #[error("no live font program loaded for '{0}'")]
    MissingFontProgram(String),

    #[error("failed to rasterize glyph {glyph}: {reason}")]
    Rasterization { glyph: u32, reason: String },
}

impl FontError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        FontError::Malformed(msg.into())
    }
}

pub type Result<T, E = FontError> = std::result::Result<T, E>;
