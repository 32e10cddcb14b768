// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use fontgen::config::Config;
use fontgen::effect::create_renderers;
use fontgen::export::{save_bmfont, save_png};
use fontgen::{FontGenerator, FontMetadata};
use log::{info, warn};
use std::path::PathBuf;

/// Generate a bitmap font atlas (PNG + BMFont descriptor) from a TrueType font.
#[derive(Parser, Debug)]
#[command(name = "fontgen", version, about)]
struct Cli {
    /// TrueType font file.
    font: PathBuf,

    /// Output path prefix; writes `<prefix>.png` and `<prefix>.fnt`.
    #[arg(short, long, required_unless_present = "list_blocks")]
    output: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pixel size, overriding the configuration.
    #[arg(short, long)]
    size: Option<f32>,

    /// Page size as WIDTHxHEIGHT, overriding the configuration.
    #[arg(short, long, value_parser = parse_texture_size)]
    texture_size: Option<(u32, u32)>,

    /// Disable antialiasing.
    #[arg(long)]
    no_aa: bool,

    /// Print the Unicode blocks the font covers and exit.
    #[arg(long)]
    list_blocks: bool,
}

fn parse_texture_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let parse = |v: &str| v.trim().parse::<u32>().map_err(|e| format!("'{}': {}", v, e));
    Ok((parse(w)?, parse(h)?))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(size) = cli.size {
        config.font.size = size;
    }
    if let Some((w, h)) = cli.texture_size {
        config.atlas.texture_size = [w, h];
    }
    if cli.no_aa {
        config.atlas.antialias = false;
    }

    let font = FontMetadata::from_file(&cli.font, config.font.size)
        .with_context(|| format!("Failed to load font {}", cli.font.display()))?;

    if cli.list_blocks {
        for block in font.defined_blocks() {
            println!("{:06X}..{:06X}  {}", block.start, block.end, block.name);
        }
        return Ok(());
    }

    let requested = config.font.style();
    let font = font.derive_font_with_style(config.font.size, requested | font.native_style());
    let charset = config.charset.to_charset()?;
    let effects = config.build_effects()?;
    let mut renderers = create_renderers(&effects);
    let padding = config.atlas.padding.resolve(&renderers);
    let [width, height] = config.atlas.texture_size;

    let mut generator = FontGenerator::new(font, config.atlas.method);
    generator.set_fill(config.atlas.fill);
    generator
        .generate(width, height, &charset, padding, &mut renderers, config.atlas.antialias)
        .context("Atlas generation failed")?;

    let Some(prefix) = cli.output else {
        warn!("No output prefix given, nothing written");
        return Ok(());
    };
    let png = prefix.with_extension("png");
    let fnt = prefix.with_extension("fnt");
    let page = generator.page().context("Generator produced no page")?;
    save_png(&png, page)?;

    let page_file = png
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let kernings = generator.font().kernings(&charset);
    save_bmfont(&fnt, &generator, &kernings, &page_file)?;

    info!(
        "Wrote {} glyphs from '{}' to {} and {}",
        generator.glyphs().len(),
        generator.font().name(),
        png.display(),
        fnt.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn texture_size_parses() {
        assert_eq!(parse_texture_size("256x128"), Ok((256, 128)));
        assert_eq!(parse_texture_size("64X64"), Ok((64, 64)));
        assert!(parse_texture_size("256").is_err());
        assert!(parse_texture_size("ax1").is_err());
    }

    #[test_log::test]
    fn cli_requires_output_unless_listing() {
        assert!(Cli::try_parse_from(["fontgen", "font.ttf"]).is_err());
        let cli = Cli::try_parse_from(["fontgen", "font.ttf", "--list-blocks"]).unwrap();
        assert!(cli.list_blocks);
        let args = ["fontgen", "font.ttf", "-o", "out/atlas", "-t", "128x64", "--no-aa"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.texture_size, Some((128, 64)));
        assert!(cli.no_aa);
    }
}
