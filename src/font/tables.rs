// src/font/tables.rs

//! Decoders for the sfnt table directory and the `head`, `name`, `cmap` and
//! `kern` tables.
//!
//! Each decoder is a pure function over the raw bytes of one table. Only the
//! parts needed to build glyph/codepoint maps, kerning pairs and a display
//! name are decoded.

use super::reader::TableReader;
use crate::error::{FontError, Result};
use log::{debug, trace, warn};
use std::collections::BTreeMap;
use std::fmt;

/// Font-specific glyph identifier.
pub type GlyphIndex = u32;

/// Highest valid Unicode scalar value.
pub const MAX_CODEPOINT: u32 = 0x10_FFFF;

const SFNT_HEADER_LEN: usize = 12;
const TABLE_RECORD_LEN: usize = 16;

/// A 4-byte table tag such as `head` or `cmap`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const HEAD: Tag = Tag(*b"head");
    pub const CMAP: Tag = Tag(*b"cmap");
    pub const NAME: Tag = Tag(*b"name");
    pub const KERN: Tag = Tag(*b"kern");
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag('{}')", self)
    }
}

/// One entry of the sfnt table directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRecord {
    pub tag: Tag,
    pub offset: u32,
    pub length: u32,
}

/// The table directory of a font file together with the file bytes it indexes.
#[derive(Debug)]
pub struct TableDirectory<'a> {
    data: &'a [u8],
    records: Vec<TableRecord>,
}

impl<'a> TableDirectory<'a> {
    /// Reads the 12-byte sfnt header and one 16-byte record per table.
    pub fn read(data: &'a [u8]) -> Result<Self> {
        let r = TableReader::new(data);
        let num_tables = r.u16(4)? as usize;

        let mut records = Vec::with_capacity(num_tables);
        for i in 0..num_tables {
            let base = SFNT_HEADER_LEN + i * TABLE_RECORD_LEN;
            records.push(TableRecord {
                tag: Tag(r.tag(base)?),
                offset: r.u32(base + 8)?,
                length: r.u32(base + 12)?,
            });
        }
        trace!("TableDirectory: {} tables: {:?}", num_tables, records);

        Ok(Self { data, records })
    }

    pub fn records(&self) -> &[TableRecord] {
        &self.records
    }

    /// Returns the bytes of `tag`, or `None` when the font has no such table.
    pub fn optional(&self, tag: Tag) -> Result<Option<&'a [u8]>> {
        let Some(record) = self.records.iter().find(|r| r.tag == tag) else {
            return Ok(None);
        };
        let bytes = TableReader::new(self.data)
            .bytes(record.offset as usize, record.length as usize)
            .map_err(|_| {
                FontError::malformed(format!(
                    "'{}' table (offset {}, length {}) extends past end of file",
                    tag, record.offset, record.length
                ))
            })?;
        Ok(Some(bytes))
    }

    /// Returns the bytes of `tag`, failing when the table is absent.
    pub fn required(&self, tag: Tag) -> Result<&'a [u8]> {
        self.optional(tag)?
            .ok_or_else(|| FontError::malformed(format!("missing '{}' table", tag)))
    }
}

/// Reads `unitsPerEm` from the `head` table. Zero is rejected.
pub fn read_head(head: &[u8]) -> Result<u16> {
    let upem = TableReader::new(head).u16(18)?;
    if upem == 0 {
        return Err(FontError::malformed("'head' table has unitsPerEm = 0"));
    }
    Ok(upem)
}

// --- name ---

const NAME_ID_FAMILY: u16 = 1;
const NAME_ID_SUBFAMILY: u16 = 2;
const NAME_RECORD_LEN: usize = 12;

/// Family and subfamily strings from the `name` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontNames {
    pub family: String,
    pub subfamily: String,
}

impl FontNames {
    /// `family`, or `family,subfamily` unless the subfamily is empty,
    /// "Regular" or "Roman".
    pub fn postscript_name(&self) -> String {
        match self.subfamily.as_str() {
            "" | "Regular" | "Roman" => self.family.clone(),
            sub => format!("{},{}", self.family, sub),
        }
    }
}

/// Reads nameID 1 and 2 from Macintosh or Microsoft records with encoding 0
/// or 1. Later records overwrite earlier ones.
pub fn read_name(name: &[u8]) -> Result<FontNames> {
    let r = TableReader::new(name);
    let count = r.u16(2)? as usize;
    let storage = r.u16(4)? as usize;

    let mut names = FontNames::default();
    for i in 0..count {
        let rec = 6 + i * NAME_RECORD_LEN;
        let platform_id = r.u16(rec)?;
        let encoding_id = r.u16(rec + 2)?;
        if !matches!(platform_id, 1 | 3) || !matches!(encoding_id, 0 | 1) {
            continue;
        }

        let name_id = r.u16(rec + 6)?;
        if name_id != NAME_ID_FAMILY && name_id != NAME_ID_SUBFAMILY {
            continue;
        }
        let length = r.u16(rec + 8)? as usize;
        let offset = r.u16(rec + 10)? as usize;
        let text = decode_name_string(r.bytes(storage + offset, length)?);

        if name_id == NAME_ID_FAMILY {
            names.family = text;
        } else {
            names.subfamily = text;
        }
    }

    debug!("read_name: family={:?} subfamily={:?}", names.family, names.subfamily);
    Ok(names)
}

/// UTF-16BE when the first byte is zero, Latin-1 otherwise.
fn decode_name_string(bytes: &[u8]) -> String {
    match bytes.first() {
        None => String::new(),
        Some(0) => {
            if bytes.len() % 2 != 0 {
                warn!("read_name: odd-length UTF-16 name string, dropping last byte");
            }
            let units = bytes.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]]));
            char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect()
        }
        Some(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

// --- cmap ---

/// Bidirectional glyph/codepoint mapping built from a Unicode `cmap` subtable.
///
/// Glyph 0 is never registered. A codepoint maps to at most one glyph; a
/// glyph may map to several codepoints, kept in the order they were read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodepointMap {
    glyph_to_codepoints: BTreeMap<GlyphIndex, Vec<u32>>,
    codepoint_to_glyph: BTreeMap<u32, GlyphIndex>,
}

impl CodepointMap {
    pub fn insert(&mut self, glyph: GlyphIndex, codepoint: u32) {
        if glyph == 0 || self.codepoint_to_glyph.contains_key(&codepoint) {
            return;
        }
        self.codepoint_to_glyph.insert(codepoint, glyph);
        self.glyph_to_codepoints.entry(glyph).or_default().push(codepoint);
    }

    pub fn codepoints(&self, glyph: GlyphIndex) -> Option<&[u32]> {
        self.glyph_to_codepoints.get(&glyph).map(Vec::as_slice)
    }

    pub fn glyph(&self, codepoint: u32) -> Option<GlyphIndex> {
        self.codepoint_to_glyph.get(&codepoint).copied()
    }

    pub fn contains_glyph(&self, glyph: GlyphIndex) -> bool {
        self.glyph_to_codepoints.contains_key(&glyph)
    }

    pub fn glyph_to_codepoints(&self) -> &BTreeMap<GlyphIndex, Vec<u32>> {
        &self.glyph_to_codepoints
    }

    /// All mapped codepoints in ascending order.
    pub fn mapped_codepoints(&self) -> impl Iterator<Item = u32> + '_ {
        self.codepoint_to_glyph.keys().copied()
    }

    pub fn glyph_count(&self) -> usize {
        self.glyph_to_codepoints.len()
    }
}

const PLATFORM_WINDOWS: u16 = 3;
const ENCODING_UNICODE_BMP: u16 = 1;
const ENCODING_UNICODE_FULL: u16 = 10;

/// Decodes the first Windows Unicode subtable (BMP format 4 or full-repertoire
/// format 12). Subtables are not merged.
pub fn read_cmap(cmap: &[u8]) -> Result<CodepointMap> {
    let r = TableReader::new(cmap);
    let count = r.u16(2)? as usize;

    for i in 0..count {
        let rec = 4 + i * 8;
        let platform_id = r.u16(rec)?;
        let encoding_id = r.u16(rec + 2)?;
        if platform_id != PLATFORM_WINDOWS {
            continue;
        }
        let offset = r.u32(rec + 4)? as usize;

        let expected_format = match encoding_id {
            ENCODING_UNICODE_BMP => 4,
            ENCODING_UNICODE_FULL => 12,
            _ => continue,
        };
        let format = r.u16(offset)?;
        if format != expected_format {
            return Err(FontError::malformed(format!(
                "unsupported unicode cmap subtable format: {}",
                format
            )));
        }

        let mut map = CodepointMap::default();
        if format == 4 {
            read_cmap_format4(&r, offset, &mut map)?;
        } else {
            read_cmap_format12(&r, offset, &mut map)?;
        }
        debug!(
            "read_cmap: format {} subtable mapped {} glyphs",
            format,
            map.glyph_count()
        );
        return Ok(map);
    }

    Err(FontError::malformed("no unicode mapping table found"))
}

fn read_cmap_format4(r: &TableReader<'_>, base: usize, map: &mut CodepointMap) -> Result<()> {
    let seg_x2 = r.u16(base + 6)? as usize;

    for seg in (0..seg_x2).step_by(2) {
        let mut end = r.u16(base + 14 + seg)? as u32;
        let start = r.u16(base + 16 + seg_x2 + seg)? as u32;
        let delta = r.i16(base + 16 + seg_x2 * 2 + seg)? as i32;
        let range_offset_pos = base + 16 + seg_x2 * 3 + seg;
        let range_offset = r.u16(range_offset_pos)? as usize;

        // 0xFFFF terminates the last segment and is never a real character.
        if end == 0xFFFF {
            end -= 1;
        }
        if start > end {
            continue;
        }

        for codepoint in start..=end {
            let glyph = if range_offset == 0 {
                (codepoint as i32 + delta) & 0xFFFF
            } else {
                let pos = range_offset_pos + range_offset + 2 * (codepoint - start) as usize;
                match r.u16(pos)? {
                    0 => 0,
                    g => (g as i32 + delta) & 0xFFFF,
                }
            };
            map.insert(glyph as GlyphIndex, codepoint);
        }
    }
    Ok(())
}

fn read_cmap_format12(r: &TableReader<'_>, base: usize, map: &mut CodepointMap) -> Result<()> {
    let groups = r.u32(base + 12)? as usize;

    for group in 0..groups {
        let rec = base + 16 + group * 12;
        let start = r.u32(rec)?;
        let end = r.u32(rec + 4)?;
        let start_glyph = r.u32(rec + 8)?;

        if start > end || end > MAX_CODEPOINT {
            return Err(FontError::malformed(format!(
                "invalid cmap group {}: U+{:X}..U+{:X}",
                group, start, end
            )));
        }
        for codepoint in start..=end {
            map.insert(start_glyph.wrapping_add(codepoint - start), codepoint);
        }
    }
    Ok(())
}

// --- kern ---

/// Sparse `left glyph -> right glyph -> adjustment` table in design units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KerningTable {
    pairs: BTreeMap<GlyphIndex, BTreeMap<GlyphIndex, i16>>,
}

impl KerningTable {
    /// Records a pair. Zero adjustments are dropped.
    pub fn insert(&mut self, left: GlyphIndex, right: GlyphIndex, value: i16) {
        if value != 0 {
            self.pairs.entry(left).or_default().insert(right, value);
        }
    }

    pub fn get(&self, left: GlyphIndex, right: GlyphIndex) -> Option<i16> {
        self.pairs.get(&left).and_then(|row| row.get(&right)).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GlyphIndex, &BTreeMap<GlyphIndex, i16>)> {
        self.pairs.iter().map(|(&left, row)| (left, row))
    }

    /// Number of glyph pairs.
    pub fn len(&self) -> usize {
        self.pairs.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Drops every pair that references a glyph rejected by `keep`.
    pub fn retain_glyphs(&mut self, keep: impl Fn(GlyphIndex) -> bool) {
        self.pairs.retain(|&left, row| {
            if !keep(left) {
                return false;
            }
            row.retain(|&right, _| keep(right));
            !row.is_empty()
        });
    }
}

const KERN_COVERAGE_HORIZONTAL: u16 = 0x0001;
const KERN_COVERAGE_MINIMUM: u16 = 0x0002;
const KERN_SUBTABLE_HEADER_LEN: usize = 14;
const KERN_PAIR_LEN: usize = 6;

/// Decodes horizontal format-0 subtables of a Microsoft-style `kern` table.
///
/// Other subtable formats and the Apple table layout are skipped with a
/// warning.
pub fn read_kern(kern: &[u8]) -> Result<KerningTable> {
    let r = TableReader::new(kern);
    let version = r.u16(0)?;
    let mut table = KerningTable::default();

    if version != 0 {
        warn!("read_kern: unsupported kern table version {}, ignoring kerning", version);
        return Ok(table);
    }

    let count = r.u16(2)? as usize;
    let mut offset = 4usize;
    for _ in 0..count {
        if offset >= r.len() {
            warn!("read_kern: subtable directory runs past end of table");
            break;
        }
        let length = r.u16(offset + 2)? as usize;
        let coverage = r.u16(offset + 4)?;
        let format = coverage >> 8;
        let mut next = offset + length;

        let kind = coverage & (KERN_COVERAGE_HORIZONTAL | KERN_COVERAGE_MINIMUM);
        if kind == KERN_COVERAGE_HORIZONTAL {
            match format {
                0 => {
                    let num_pairs = r.u16(offset + 6)? as usize;
                    let pairs_at = offset + KERN_SUBTABLE_HEADER_LEN;
                    for pair in 0..num_pairs {
                        let p = pairs_at + pair * KERN_PAIR_LEN;
                        let left = r.u16(p)? as GlyphIndex;
                        let right = r.u16(p + 2)? as GlyphIndex;
                        table.insert(left, right, r.i16(p + 4)?);
                    }
                    // The 16-bit length field overflows for large pair lists.
                    next = pairs_at + num_pairs * KERN_PAIR_LEN;
                }
                _ => warn!(
                    "read_kern: unsupported kerning subtable format: {} (kern table version: {})",
                    format, version
                ),
            }
        }

        if next <= offset {
            warn!("read_kern: zero-length subtable, stopping");
            break;
        }
        offset = next;
    }

    debug!("read_kern: {} kerning pairs", table.len());
    Ok(table)
}
