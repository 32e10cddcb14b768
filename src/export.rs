// src/export.rs

//! Writes a generated atlas to disk: the page as PNG and the glyph table as
//! an AngelCode BMFont text descriptor.

use crate::error::FontError;
use crate::font::{FontStyle, KerningPair};
use crate::generator::canvas::Page;
use crate::generator::FontGenerator;
use anyhow::{anyhow, Context, Result};
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes the BMFont text descriptor for `generator`'s last atlas.
/// `page_file` is the name recorded for page 0. Kerning pairs between
/// codepoints missing from the atlas are left out.
pub fn write_bmfont<W: Write>(
    out: &mut W,
    generator: &FontGenerator,
    kernings: &[KerningPair],
    page_file: &str,
) -> io::Result<()> {
    let (Some(page), Some(info)) = (generator.page(), generator.font_info()) else {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "no atlas generated"));
    };
    let font = generator.font();
    let style = font.style();
    let pad = info.padding;

    write!(
        out,
        "info face=\"{}\" size={} bold={} italic={} ",
        font.family_name(),
        info.size.round() as i32,
        style.contains(FontStyle::BOLD) as u8,
        style.contains(FontStyle::ITALIC) as u8,
    )?;
    write!(out, "charset=\"\" unicode=1 stretchH=100 smooth=1 aa=1 ")?;
    writeln!(
        out,
        "padding={},{},{},{} spacing=0,0",
        pad.top, pad.right, pad.bottom, pad.left,
    )?;
    writeln!(
        out,
        "common lineHeight={} base={} scaleW={} scaleH={} pages=1 packed=0",
        info.line_height + pad.vertical() as i32,
        info.ascent,
        page.width(),
        page.height(),
    )?;
    writeln!(out, "page id=0 file=\"{}\"", page_file)?;

    let glyphs = generator.glyphs();
    writeln!(out, "chars count={}", glyphs.len())?;
    for g in glyphs {
        write!(
            out,
            "char id={} x={} y={} width={} height={} ",
            g.codepoint, g.x, g.y, g.width, g.height,
        )?;
        writeln!(
            out,
            "xoffset={} yoffset={} xadvance={} page=0 chnl=15",
            g.x_offset, g.y_offset, g.advance,
        )?;
    }

    let kept: Vec<&KerningPair> = kernings
        .iter()
        .filter(|k| generator.glyph(k.left).is_some() && generator.glyph(k.right).is_some())
        .collect();
    if !kept.is_empty() {
        writeln!(out, "kernings count={}", kept.len())?;
        for k in kept {
            writeln!(out, "kerning first={} second={} amount={}", k.left, k.right, k.amount)?;
        }
    }
    Ok(())
}

/// Writes the descriptor to `path`.
pub fn save_bmfont(
    path: impl AsRef<Path>,
    generator: &FontGenerator,
    kernings: &[KerningPair],
    page_file: &str,
) -> Result<(), FontError> {
    let path = path.as_ref();
    let io_err = |source| FontError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    write_bmfont(&mut out, generator, kernings, page_file).map_err(io_err)?;
    out.flush().map_err(io_err)?;
    info!("Export: wrote {}", path.display());
    Ok(())
}

/// Saves the page as an RGBA PNG.
pub fn save_png(path: impl AsRef<Path>, page: &Page) -> Result<()> {
    let path = path.as_ref();
    let image = image::RgbaImage::from_raw(page.width(), page.height(), page.to_rgba())
        .ok_or_else(|| anyhow!("Page buffer does not match {}x{}", page.width(), page.height()))?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Export: wrote {}", path.display());
    Ok(())
}
