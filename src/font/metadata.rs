// src/font/metadata.rs

//! The immutable parsed view of a font file at one point size and style.

use super::blocks::UnicodeBlock;
use super::program::FontStyle;
use super::tables::{
    read_cmap, read_head, read_kern, read_name, CodepointMap, GlyphIndex, KerningTable,
    TableDirectory, Tag,
};
use crate::charset::CharSet;
use crate::error::{FontError, Result};
use log::{debug, info};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Sorted set of codepoints backed by a bitset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodepointSet {
    words: Vec<u64>,
}

impl CodepointSet {
    pub fn insert(&mut self, codepoint: u32) {
        let word = (codepoint / 64) as usize;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << (codepoint % 64);
    }

    pub fn contains(&self, codepoint: u32) -> bool {
        self.words
            .get((codepoint / 64) as usize)
            .is_some_and(|w| w & (1 << (codepoint % 64)) != 0)
    }

    /// Smallest member `>= from`.
    pub fn next_from(&self, from: u32) -> Option<u32> {
        let mut word = (from / 64) as usize;
        let mut bits = *self.words.get(word)? & (!0u64 << (from % 64));
        loop {
            if bits != 0 {
                return Some(word as u32 * 64 + bits.trailing_zeros());
            }
            word += 1;
            bits = *self.words.get(word)?;
        }
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }
}

/// A kerning adjustment between two codepoints, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct KerningPair {
    pub left: u32,
    pub right: u32,
    pub amount: i32,
}

/// Everything decoded from the font's tables. Shared between size/style
/// variants of the same file.
#[derive(Debug)]
struct ParsedTables {
    postscript_name: String,
    family_name: String,
    units_per_em: u16,
    native_style: FontStyle,
    codepoints: CodepointMap,
    kerning: KerningTable,
    defined: CodepointSet,
}

impl ParsedTables {
    fn parse(data: &[u8]) -> Result<Self> {
        let dir = TableDirectory::read(data)?;
        let head = dir.required(Tag::HEAD)?;
        let cmap = dir.required(Tag::CMAP)?;
        let name = dir.required(Tag::NAME)?;
        let kern = dir.optional(Tag::KERN)?;

        let units_per_em = read_head(head)?;
        let names = read_name(name)?;
        let codepoints = read_cmap(cmap)?;
        let mut kerning = match kern {
            Some(kern) => read_kern(kern)?,
            None => KerningTable::default(),
        };

        let before = kerning.len();
        kerning.retain_glyphs(|g| codepoints.contains_glyph(g));
        if kerning.len() != before {
            debug!(
                "FontMetadata: dropped {} kerning pairs for unmapped glyphs",
                before - kerning.len()
            );
        }

        let mut defined = CodepointSet::default();
        for cp in codepoints.mapped_codepoints() {
            defined.insert(cp);
        }

        let postscript_name = names.postscript_name();
        Ok(Self {
            native_style: FontStyle::from_postscript_name(&postscript_name),
            postscript_name,
            family_name: names.family,
            units_per_em,
            codepoints,
            kerning,
            defined,
        })
    }
}

/// Parsed font tables plus the live font program at a point size and style.
///
/// Cloning is cheap: the decoded tables and the font program are shared.
#[derive(Clone)]
pub struct FontMetadata {
    tables: Arc<ParsedTables>,
    program: Option<Arc<fontdue::Font>>,
    path: Option<PathBuf>,
    size: f32,
    style: FontStyle,
}

impl FontMetadata {
    /// Reads and parses a font file and loads its font program.
    pub fn from_file(path: impl AsRef<Path>, size: f32) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut metadata = Self::from_bytes(&data, size)?;
        metadata.path = Some(path.to_path_buf());
        Ok(metadata)
    }

    /// Parses font tables and loads the font program from memory.
    pub fn from_bytes(data: &[u8], size: f32) -> Result<Self> {
        let mut metadata = Self::parse_tables(data, size)?;
        let program = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(|e| FontError::malformed(format!("failed to load font program: {}", e)))?;
        metadata.program = Some(Arc::new(program));
        info!("FontMetadata: Loaded '{}'", metadata.name());
        Ok(metadata)
    }

    /// Parses the font tables only. The result has no font program and can
    /// only be rasterized with the headless generator method.
    pub fn parse_tables(data: &[u8], size: f32) -> Result<Self> {
        let tables = ParsedTables::parse(data)?;
        debug!(
            "FontMetadata: '{}' upem={} glyphs={} codepoints={} kerning pairs={}",
            tables.postscript_name,
            tables.units_per_em,
            tables.codepoints.glyph_count(),
            tables.defined.len(),
            tables.kerning.len()
        );
        Ok(Self {
            style: tables.native_style,
            tables: Arc::new(tables),
            program: None,
            path: None,
            size,
        })
    }

    pub fn name(&self) -> &str {
        &self.tables.postscript_name
    }

    pub fn family_name(&self) -> &str {
        &self.tables.family_name
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn units_per_em(&self) -> u16 {
        self.tables.units_per_em
    }

    pub fn style(&self) -> FontStyle {
        self.style
    }

    /// Style the font file itself provides.
    pub fn native_style(&self) -> FontStyle {
        self.tables.native_style
    }

    pub fn font_file(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn program(&self) -> Option<&Arc<fontdue::Font>> {
        self.program.as_ref()
    }

    pub fn raw_kerning(&self) -> &KerningTable {
        &self.tables.kerning
    }

    pub fn glyph_to_codepoints(&self) -> &BTreeMap<GlyphIndex, Vec<u32>> {
        self.tables.codepoints.glyph_to_codepoints()
    }

    pub fn glyph_for_codepoint(&self, codepoint: u32) -> Option<GlyphIndex> {
        self.tables.codepoints.glyph(codepoint)
    }

    pub fn defined_codepoints(&self) -> &CodepointSet {
        &self.tables.defined
    }

    /// Design units to pixels at the current size, rounding half up.
    pub fn convert_units(&self, units: i32) -> i32 {
        (units as f32 * self.size / self.tables.units_per_em as f32 + 0.5).floor() as i32
    }

    /// Expands glyph kerning to codepoint pairs accepted by `charset`.
    /// Pairs that round to zero pixels are dropped.
    pub fn kernings(&self, charset: &CharSet) -> Vec<KerningPair> {
        let mut out = Vec::new();
        for (left_glyph, row) in self.tables.kerning.iter() {
            let Some(lefts) = self.tables.codepoints.codepoints(left_glyph) else {
                continue;
            };
            for (&right_glyph, &units) in row {
                let Some(rights) = self.tables.codepoints.codepoints(right_glyph) else {
                    continue;
                };
                let amount = self.convert_units(units as i32);
                if amount == 0 {
                    continue;
                }
                for &left in lefts.iter().filter(|&&cp| charset.is_included(cp)) {
                    for &right in rights.iter().filter(|&&cp| charset.is_included(cp)) {
                        out.push(KerningPair { left, right, amount });
                    }
                }
            }
        }
        out
    }

    /// Next defined codepoint strictly after `after`; `None` starts the scan.
    pub fn next_codepoint(&self, after: Option<u32>) -> Option<u32> {
        let from = match after {
            None => 0,
            Some(cp) => cp.checked_add(1)?,
        };
        self.tables.defined.next_from(from)
    }

    /// Every defined codepoint in ascending order.
    pub fn codepoints(&self) -> impl Iterator<Item = u32> + '_ {
        std::iter::successors(self.next_codepoint(None), move |&cp| {
            self.next_codepoint(Some(cp))
        })
    }

    /// Unicode blocks with at least one defined codepoint.
    pub fn defined_blocks(&self) -> BTreeSet<&'static UnicodeBlock> {
        self.codepoints().filter_map(UnicodeBlock::of).collect()
    }

    /// Same font at another size, keeping the current style.
    pub fn derive_font(&self, size: f32) -> Self {
        self.derive_font_with_style(size, self.style)
    }

    /// Same font at another size and style. The parsed tables and the font
    /// program are shared, not re-read.
    pub fn derive_font_with_style(&self, size: f32, style: FontStyle) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            program: self.program.clone(),
            path: self.path.clone(),
            size,
            style,
        }
    }
}

impl fmt::Debug for FontMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontMetadata")
            .field("name", &self.tables.postscript_name)
            .field("units_per_em", &self.tables.units_per_em)
            .field("size", &self.size)
            .field("style", &self.style)
            .field("has_program", &self.program.is_some())
            .finish()
    }
}
