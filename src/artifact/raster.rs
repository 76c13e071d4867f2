//! Raster strategy: the message drawn onto a fixed-pixel PNG canvas.
//!
//! A5 landscape at a 300 DPI equivalent (2480x1748), white background,
//! black text block aligned top-left inside fixed margins. Glyphs come
//! from the font8x8 bitmap tables scaled by an integer factor, so the
//! output is byte-for-byte reproducible.

use std::io::Cursor;

use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::{ImageFormat, Rgb, RgbImage};

use crate::artifact::BackArtifact;
use crate::artifact::document::wrap_text;
use crate::error::ArtifactError;

const CANVAS_WIDTH: u32 = 2480;
const CANVAS_HEIGHT: u32 = 1748;
const MARGIN_PX: u32 = 160;
/// Each 8x8 glyph cell is scaled 6x: 48px tall, roughly 12pt at 300 DPI.
const GLYPH_SCALE: u32 = 6;
const GLYPH_CELL: u32 = 8 * GLYPH_SCALE;
const LINE_SPACING: u32 = GLYPH_CELL + GLYPH_CELL / 2;

const INK: Rgb<u8> = Rgb([0x33, 0x33, 0x33]);
const PAPER: Rgb<u8> = Rgb([0xFF, 0xFF, 0xFF]);

pub fn render(message: &str) -> Result<BackArtifact, ArtifactError> {
    let mut canvas = RgbImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, PAPER);

    let chars_per_line = ((CANVAS_WIDTH - 2 * MARGIN_PX) / GLYPH_CELL) as usize;
    let mut y = MARGIN_PX;
    for line in wrap_text(message, chars_per_line) {
        if y + GLYPH_CELL > CANVAS_HEIGHT - MARGIN_PX {
            // Clip instead of drawing into the bottom margin
            break;
        }
        let mut x = MARGIN_PX;
        for ch in line.chars() {
            draw_glyph(&mut canvas, ch, x, y);
            x += GLYPH_CELL;
        }
        y += LINE_SPACING;
    }

    let mut png = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ArtifactError::Raster(e.to_string()))?;

    Ok(BackArtifact {
        bytes: png,
        media_type: "image/png".to_string(),
        filename: "back.png".to_string(),
    })
}

/// Draw one scaled glyph with its top-left corner at (x, y). Characters
/// outside the basic and Latin-1 tables render as a blank cell.
fn draw_glyph(canvas: &mut RgbImage, ch: char, x: u32, y: u32) {
    let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| LATIN_FONTS.get(ch)) else {
        return;
    };
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..8u32 {
            if bits & (1 << col) == 0 {
                continue;
            }
            let px = x + col * GLYPH_SCALE;
            let py = y + row as u32 * GLYPH_SCALE;
            for dy in 0..GLYPH_SCALE {
                for dx in 0..GLYPH_SCALE {
                    canvas.put_pixel(px + dx, py + dy, INK);
                }
            }
        }
    }
}
