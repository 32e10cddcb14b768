// src/config.rs

//! Configuration for an atlas generation run.
//!
//! Every section can be omitted from the JSON file; missing fields take the
//! defaults below. Command-line flags are applied on top by the binary.

use crate::charset::CharSet;
use crate::color::Rgba;
use crate::effect::{Effect, Glow, Gradient, Identity, Outline, PropertyValue, Shadow};
use crate::font::{FontStyle, UnicodeBlock};
use crate::generator::{GeneratorMethod, PaddingMode};
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// --- Top-Level Configuration Structure ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub font: FontConfig,
    pub atlas: AtlasConfig,
    pub charset: CharSetConfig,
    /// Applied in order around every glyph.
    pub effects: Vec<EffectConfig>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Effects in declared order.
    pub fn build_effects(&self) -> Result<Vec<Box<dyn Effect>>> {
        self.effects.iter().map(EffectConfig::build).collect()
    }
}

// --- Font ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Pixel size glyphs are rendered at.
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        FontConfig {
            size: 32.0,
            bold: false,
            italic: false,
        }
    }
}

impl FontConfig {
    pub fn style(&self) -> FontStyle {
        let mut style = FontStyle::empty();
        style.set(FontStyle::BOLD, self.bold);
        style.set(FontStyle::ITALIC, self.italic);
        style
    }
}

// --- Atlas ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// `[width, height]` of the page in pixels.
    pub texture_size: [u32; 2],
    pub padding: PaddingMode,
    pub antialias: bool,
    pub method: GeneratorMethod,
    /// Color glyphs are filled with.
    pub fill: Rgba,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        AtlasConfig {
            texture_size: [512, 512],
            padding: PaddingMode::Automatic,
            antialias: true,
            method: GeneratorMethod::Fontdue,
            fill: Rgba::WHITE,
        }
    }
}

// --- Character Set ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharSetConfig {
    /// Every codepoint the font defines.
    pub all: bool,
    /// Unicode block names, e.g. `"Basic Latin"`.
    pub blocks: Vec<String>,
    /// Inclusive `[start, end]` codepoint ranges.
    pub ranges: Vec<[u32; 2]>,
    /// Literal characters.
    pub chars: String,
}

impl Default for CharSetConfig {
    fn default() -> Self {
        CharSetConfig {
            all: false,
            blocks: vec!["Basic Latin".to_string()],
            ranges: Vec::new(),
            chars: String::new(),
        }
    }
}

impl CharSetConfig {
    pub fn to_charset(&self) -> Result<CharSet> {
        let mut charset = CharSet::new();
        charset.set_include_all(self.all);
        for name in &self.blocks {
            let block = UnicodeBlock::by_name(name)
                .ok_or_else(|| anyhow!("Unknown Unicode block '{}'", name))?;
            charset.add_range(block.start, block.end);
        }
        for &[start, end] in &self.ranges {
            if start > end {
                bail!("Invalid codepoint range {:#x}..={:#x}", start, end);
            }
            charset.add_range(start, end);
        }
        charset.add_chars(&self.chars);
        Ok(charset)
    }
}

// --- Effects ---

fn default_width() -> i32 {
    1
}

fn default_offset() -> i32 {
    1
}

fn default_radius() -> i32 {
    3
}

fn default_black() -> Rgba {
    Rgba::BLACK
}

fn default_white() -> Rgba {
    Rgba::WHITE
}

/// One entry of the effect list, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EffectConfig {
    Identity,
    Outline {
        #[serde(default = "default_width")]
        width: i32,
        #[serde(default = "default_black")]
        color: Rgba,
    },
    Shadow {
        #[serde(default = "default_offset")]
        dx: i32,
        #[serde(default = "default_offset")]
        dy: i32,
        #[serde(default = "default_black")]
        color: Rgba,
    },
    Glow {
        #[serde(default = "default_radius")]
        radius: i32,
        #[serde(default = "default_white")]
        color: Rgba,
    },
    Gradient {
        #[serde(default = "default_white")]
        top: Rgba,
        #[serde(default = "default_black")]
        bottom: Rgba,
    },
}

impl EffectConfig {
    /// Builds the effect, rejecting parameters outside the effect's ranges.
    pub fn build(&self) -> Result<Box<dyn Effect>> {
        use PropertyValue::{Color, Int};

        let (mut effect, values): (Box<dyn Effect>, Vec<(&str, PropertyValue)>) = match *self {
            EffectConfig::Identity => (Box::new(Identity::new()), vec![]),
            EffectConfig::Outline { width, color } => (
                Box::new(Outline::default()),
                vec![(Outline::WIDTH, Int(width)), (Outline::COLOR, Color(color))],
            ),
            EffectConfig::Shadow { dx, dy, color } => (
                Box::new(Shadow::default()),
                vec![
                    (Shadow::OFFSET_X, Int(dx)),
                    (Shadow::OFFSET_Y, Int(dy)),
                    (Shadow::COLOR, Color(color)),
                ],
            ),
            EffectConfig::Glow { radius, color } => (
                Box::new(Glow::default()),
                vec![(Glow::RADIUS, Int(radius)), (Glow::COLOR, Color(color))],
            ),
            EffectConfig::Gradient { top, bottom } => (
                Box::new(Gradient::default()),
                vec![(Gradient::TOP, Color(top)), (Gradient::BOTTOM, Color(bottom))],
            ),
        };
        for (name, value) in values {
            effect
                .set_property(name, value)
                .with_context(|| format!("Invalid {} effect", effect.name()))?;
        }
        Ok(effect)
    }
}
