// src/font/test_font.rs

//! Assembles minimal in-memory sfnt files for tests.

pub struct Segment {
    pub start: u16,
    pub end: u16,
    pub delta: i16,
    /// When set, glyphs come from the glyph-index array instead of the delta.
    pub glyph_ids: Option<Vec<u16>>,
}

impl Segment {
    pub fn delta(start: u16, end: u16, delta: i16) -> Self {
        Self { start, end, delta, glyph_ids: None }
    }

    pub fn indexed(start: u16, glyph_ids: Vec<u16>, delta: i16) -> Self {
        let end = start + glyph_ids.len() as u16 - 1;
        Self { start, end, delta, glyph_ids: Some(glyph_ids) }
    }
}

/// One entry of the outline tables: an advance and an optional filled
/// rectangle `[x_min, y_min, x_max, y_max]` in font units.
pub struct TestGlyph {
    pub advance: u16,
    pub rect: Option<[i16; 4]>,
}

impl TestGlyph {
    pub fn empty(advance: u16) -> Self {
        Self { advance, rect: None }
    }

    pub fn rect(advance: u16, x_min: i16, y_min: i16, x_max: i16, y_max: i16) -> Self {
        Self { advance, rect: Some([x_min, y_min, x_max, y_max]) }
    }

    fn lsb(&self) -> i16 {
        self.rect.map_or(0, |r| r[0])
    }

    /// Simple glyph with one clockwise contour, or nothing when empty.
    fn glyf_entry(&self) -> Vec<u8> {
        let Some([x0, y0, x1, y1]) = self.rect else {
            return Vec::new();
        };
        let mut out = Vec::new();
        put16(&mut out, 1);
        for v in [x0, y0, x1, y1] {
            put16(&mut out, v as u16);
        }
        put16(&mut out, 3);
        put16(&mut out, 0);
        // On-curve points, coordinates stored as i16 deltas.
        out.extend_from_slice(&[0x01; 4]);
        for dx in [x0, 0, x1 - x0, 0] {
            put16(&mut out, dx as u16);
        }
        for dy in [y0, y1 - y0, 0, y0 - y1] {
            put16(&mut out, dy as u16);
        }
        out
    }
}

pub const TEST_ASCENDER: i16 = 800;
pub const TEST_DESCENDER: i16 = -200;

pub struct TestFont {
    units_per_em: u16,
    glyphs: Vec<TestGlyph>,
    names: Vec<(u16, u16, u16, Vec<u8>)>,
    cmap_subtables: Vec<(u16, u16, Vec<u8>)>,
    kern_subtables: Vec<(u16, Vec<u8>)>,
    kern_raw: Option<Vec<u8>>,
    omit: Vec<[u8; 4]>,
}

impl Default for TestFont {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFont {
    pub fn new() -> Self {
        Self {
            units_per_em: 1000,
            glyphs: Vec::new(),
            names: Vec::new(),
            cmap_subtables: Vec::new(),
            kern_subtables: Vec::new(),
            kern_raw: None,
            omit: Vec::new(),
        }
    }

    pub fn units_per_em(mut self, upem: u16) -> Self {
        self.units_per_em = upem;
        self
    }

    /// Windows platform, UTF-16BE.
    pub fn name(mut self, name_id: u16, text: &str) -> Self {
        let bytes = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        self.names.push((3, 1, name_id, bytes));
        self
    }

    /// Macintosh platform, single-byte.
    pub fn mac_name(mut self, name_id: u16, text: &str) -> Self {
        let bytes = text.chars().map(|c| c as u8).collect();
        self.names.push((1, 0, name_id, bytes));
        self
    }

    pub fn raw_name(mut self, platform: u16, encoding: u16, name_id: u16, bytes: Vec<u8>) -> Self {
        self.names.push((platform, encoding, name_id, bytes));
        self
    }

    pub fn cmap_format4(self, segments: &[Segment]) -> Self {
        let body = format4(segments);
        self.cmap_subtable(3, 1, body)
    }

    pub fn cmap_format12(self, groups: &[(u32, u32, u32)]) -> Self {
        let mut body = Vec::new();
        put16(&mut body, 12);
        put16(&mut body, 0);
        put32(&mut body, 16 + 12 * groups.len() as u32);
        put32(&mut body, 0);
        put32(&mut body, groups.len() as u32);
        for &(start, end, glyph) in groups {
            put32(&mut body, start);
            put32(&mut body, end);
            put32(&mut body, glyph);
        }
        self.cmap_subtable(3, 10, body)
    }

    pub fn cmap_subtable(mut self, platform: u16, encoding: u16, body: Vec<u8>) -> Self {
        self.cmap_subtables.push((platform, encoding, body));
        self
    }

    /// Horizontal format-0 subtable.
    pub fn kern_pairs(self, pairs: &[(u16, u16, i16)]) -> Self {
        self.kern_format0(0x0001, pairs)
    }

    pub fn kern_format0(mut self, coverage: u16, pairs: &[(u16, u16, i16)]) -> Self {
        let mut body = Vec::new();
        put16(&mut body, pairs.len() as u16);
        put16(&mut body, 0);
        put16(&mut body, 0);
        put16(&mut body, 0);
        for &(left, right, value) in pairs {
            put16(&mut body, left);
            put16(&mut body, right);
            put16(&mut body, value as u16);
        }
        self.kern_subtables.push((coverage, body));
        self
    }

    pub fn kern_subtable(mut self, coverage: u16, body: Vec<u8>) -> Self {
        self.kern_subtables.push((coverage, body));
        self
    }

    pub fn kern_table(mut self, raw: Vec<u8>) -> Self {
        self.kern_raw = Some(raw);
        self
    }

    /// Adds `maxp`, `hhea`, `hmtx`, `loca` and `glyf` so the file carries a
    /// loadable font program. Glyph 0 is the first entry.
    pub fn outlines(mut self, glyphs: Vec<TestGlyph>) -> Self {
        self.glyphs = glyphs;
        self
    }

    pub fn without(mut self, tag: &[u8; 4]) -> Self {
        self.omit.push(*tag);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut tables: Vec<([u8; 4], Vec<u8>)> = vec![
            (*b"head", self.head()),
            (*b"cmap", self.cmap()),
            (*b"name", self.name_table()),
        ];
        if let Some(kern) = self.kern_table_bytes() {
            tables.push((*b"kern", kern));
        }
        if !self.glyphs.is_empty() {
            tables.extend(self.outline_tables());
        }
        tables.retain(|(tag, _)| !self.omit.contains(tag));
        // Readers binary-search the directory.
        tables.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = Vec::new();
        put32(&mut out, 0x0001_0000);
        put16(&mut out, tables.len() as u16);
        put16(&mut out, 0);
        put16(&mut out, 0);
        put16(&mut out, 0);

        let mut offset = 12 + 16 * tables.len();
        let mut data = Vec::new();
        for (tag, bytes) in &tables {
            out.extend_from_slice(tag);
            put32(&mut out, 0);
            put32(&mut out, offset as u32);
            put32(&mut out, bytes.len() as u32);
            data.extend_from_slice(bytes);
            while data.len() % 4 != 0 {
                data.push(0);
            }
            offset = 12 + 16 * tables.len() + data.len();
        }
        out.extend_from_slice(&data);
        out
    }

    fn head(&self) -> Vec<u8> {
        let mut head = vec![0u8; 54];
        head[18..20].copy_from_slice(&self.units_per_em.to_be_bytes());
        head
    }

    fn outline_tables(&self) -> Vec<([u8; 4], Vec<u8>)> {
        let count = self.glyphs.len() as u16;

        let mut maxp = Vec::new();
        put32(&mut maxp, 0x0000_5000);
        put16(&mut maxp, count);

        let mut hhea = vec![0u8; 36];
        hhea[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
        hhea[4..6].copy_from_slice(&TEST_ASCENDER.to_be_bytes());
        hhea[6..8].copy_from_slice(&TEST_DESCENDER.to_be_bytes());
        hhea[34..36].copy_from_slice(&count.to_be_bytes());

        let mut hmtx = Vec::new();
        let mut loca = Vec::new();
        let mut glyf = Vec::new();
        for glyph in &self.glyphs {
            put16(&mut hmtx, glyph.advance);
            put16(&mut hmtx, glyph.lsb() as u16);
            // Short loca format stores offsets divided by two.
            put16(&mut loca, (glyf.len() / 2) as u16);
            glyf.extend_from_slice(&glyph.glyf_entry());
        }
        put16(&mut loca, (glyf.len() / 2) as u16);

        vec![
            (*b"maxp", maxp),
            (*b"hhea", hhea),
            (*b"hmtx", hmtx),
            (*b"loca", loca),
            (*b"glyf", glyf),
        ]
    }

    fn cmap(&self) -> Vec<u8> {
        let mut out = Vec::new();
        put16(&mut out, 0);
        put16(&mut out, self.cmap_subtables.len() as u16);
        let mut offset = 4 + 8 * self.cmap_subtables.len();
        for (platform, encoding, body) in &self.cmap_subtables {
            put16(&mut out, *platform);
            put16(&mut out, *encoding);
            put32(&mut out, offset as u32);
            offset += body.len();
        }
        for (_, _, body) in &self.cmap_subtables {
            out.extend_from_slice(body);
        }
        out
    }

    fn name_table(&self) -> Vec<u8> {
        let mut out = Vec::new();
        put16(&mut out, 0);
        put16(&mut out, self.names.len() as u16);
        put16(&mut out, (6 + 12 * self.names.len()) as u16);
        let mut storage = Vec::new();
        for (platform, encoding, name_id, bytes) in &self.names {
            put16(&mut out, *platform);
            put16(&mut out, *encoding);
            put16(&mut out, 0);
            put16(&mut out, *name_id);
            put16(&mut out, bytes.len() as u16);
            put16(&mut out, storage.len() as u16);
            storage.extend_from_slice(bytes);
        }
        out.extend_from_slice(&storage);
        out
    }

    fn kern_table_bytes(&self) -> Option<Vec<u8>> {
        if let Some(raw) = &self.kern_raw {
            return Some(raw.clone());
        }
        if self.kern_subtables.is_empty() {
            return None;
        }
        let mut out = Vec::new();
        put16(&mut out, 0);
        put16(&mut out, self.kern_subtables.len() as u16);
        for (coverage, body) in &self.kern_subtables {
            put16(&mut out, 0);
            put16(&mut out, (6 + body.len()) as u16);
            put16(&mut out, *coverage);
            out.extend_from_slice(body);
        }
        Some(out)
    }
}

fn format4(segments: &[Segment]) -> Vec<u8> {
    let seg_count = segments.len() + 1;
    let mut ends = Vec::new();
    let mut starts = Vec::new();
    let mut deltas = Vec::new();
    let mut range_offsets = Vec::new();
    let mut glyph_array: Vec<u16> = Vec::new();

    for (i, seg) in segments.iter().enumerate() {
        ends.push(seg.end);
        starts.push(seg.start);
        deltas.push(seg.delta as u16);
        match &seg.glyph_ids {
            None => range_offsets.push(0),
            Some(ids) => {
                let words_to_array = (seg_count - i) + glyph_array.len();
                range_offsets.push((words_to_array * 2) as u16);
                glyph_array.extend_from_slice(ids);
            }
        }
    }
    ends.push(0xFFFF);
    starts.push(0xFFFF);
    deltas.push(1);
    range_offsets.push(0);

    let mut body = Vec::new();
    put16(&mut body, 4);
    put16(&mut body, (16 + 8 * seg_count + 2 * glyph_array.len()) as u16);
    put16(&mut body, 0);
    put16(&mut body, (seg_count * 2) as u16);
    put16(&mut body, 0);
    put16(&mut body, 0);
    put16(&mut body, 0);
    ends.iter().for_each(|&v| put16(&mut body, v));
    put16(&mut body, 0);
    starts.iter().for_each(|&v| put16(&mut body, v));
    deltas.iter().for_each(|&v| put16(&mut body, v));
    range_offsets.iter().for_each(|&v| put16(&mut body, v));
    glyph_array.iter().for_each(|&v| put16(&mut body, v));
    body
}

fn put16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

/// "Arial"/"Bold" font mapping 'A' to glyph 3 and kerning (3, 3) by 100
/// units at 1000 upem.
pub fn kerned_a() -> Vec<u8> {
    TestFont::new()
        .units_per_em(1000)
        .name(1, "Arial")
        .name(2, "Bold")
        .cmap_format4(&[Segment::delta(65, 65, 3 - 65)])
        .kern_pairs(&[(3, 3, 100)])
        .build()
}

/// "Square" font with a loadable program: 'A' maps to glyph 1, a 500-unit
/// square starting 100 units right of the pen with a 700-unit advance.
pub fn square_a() -> Vec<u8> {
    TestFont::new()
        .units_per_em(1000)
        .name(1, "Square")
        .cmap_format4(&[Segment::delta(65, 65, 1 - 65)])
        .outlines(vec![TestGlyph::empty(500), TestGlyph::rect(700, 100, 0, 600, 500)])
        .build()
}
