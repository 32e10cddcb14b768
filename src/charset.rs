// src/charset.rs

//! Character selection for atlas generation and kerning export.

use crate::font::UnicodeBlock;
use std::collections::BTreeSet;

/// Predicate over codepoints, assembled from Unicode blocks, codepoint
/// ranges and individual characters.
///
/// Cloning produces an independent snapshot; generation runs work on a clone
/// so later edits to the live set do not affect them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharSet {
    include_all: bool,
    ranges: Vec<(u32, u32)>,
    chars: BTreeSet<u32>,
}

impl CharSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every codepoint.
    pub fn all() -> Self {
        Self {
            include_all: true,
            ..Self::default()
        }
    }

    pub fn with_block(self, block: &UnicodeBlock) -> Self {
        self.with_range(block.start, block.end)
    }

    /// Adds the inclusive range `start..=end`.
    pub fn with_range(mut self, start: u32, end: u32) -> Self {
        self.add_range(start, end);
        self
    }

    pub fn with_chars(mut self, text: &str) -> Self {
        self.add_chars(text);
        self
    }

    pub fn add_range(&mut self, start: u32, end: u32) {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        self.ranges.push((start, end));
        self.ranges.sort_unstable();

        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(self.ranges.len());
        for &(s, e) in &self.ranges {
            match merged.last_mut() {
                Some(last) if s <= last.1.saturating_add(1) => last.1 = last.1.max(e),
                _ => merged.push((s, e)),
            }
        }
        self.ranges = merged;
    }

    pub fn add_chars(&mut self, text: &str) {
        self.chars.extend(text.chars().map(u32::from));
    }

    pub fn set_include_all(&mut self, include_all: bool) {
        self.include_all = include_all;
    }

    pub fn is_included(&self, codepoint: u32) -> bool {
        if self.include_all || self.chars.contains(&codepoint) {
            return true;
        }
        let idx = self.ranges.partition_point(|&(_, end)| end < codepoint);
        self.ranges.get(idx).is_some_and(|&(start, _)| start <= codepoint)
    }

    /// True when nothing can be included.
    pub fn is_empty(&self) -> bool {
        !self.include_all && self.ranges.is_empty() && self.chars.is_empty()
    }
}
