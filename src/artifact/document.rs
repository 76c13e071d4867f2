//! Document strategy: the message laid out on a fixed-page-size PDF.
//!
//! A5 landscape, fixed margins, a small title label and the word-wrapped
//! message body, left-aligned in builtin Helvetica. Layout is a pure
//! function of the message; the only non-content bytes printpdf adds are
//! PDF metadata, which do not affect the rendered card.

use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::artifact::BackArtifact;
use crate::error::ArtifactError;

/// Conservative fit for 14pt Helvetica across the usable 170mm
/// (A5 landscape, 20mm margins).
const MAX_LINE_CHARS: usize = 68;

const TITLE: &str = "Postal";

pub fn render(message: &str) -> Result<BackArtifact, ArtifactError> {
    // A5 landscape
    let (doc, page, layer) = PdfDocument::new("postcard-back", Mm(210.0), Mm(148.0), "back");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ArtifactError::Document(e.to_string()))?;

    let layer = doc.get_page(page).get_layer(layer);

    // Text origin is bottom-left; start at the top margin and walk down,
    // one 8mm line at a time.
    let mut y = 148.0 - 20.0;
    layer.use_text(TITLE, 10.0, Mm(20.0), Mm(y), &font);
    y -= 12.0;

    for line in wrap_text(message, MAX_LINE_CHARS) {
        if y < 20.0 {
            // Message longer than the card; clip rather than overflow
            break;
        }
        layer.use_text(line, 14.0, Mm(20.0), Mm(y), &font);
        y -= 8.0;
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| ArtifactError::Document(e.to_string()))?;

    Ok(BackArtifact {
        bytes,
        media_type: "application/pdf".to_string(),
        filename: "back.pdf".to_string(),
    })
}

/// Greedy word wrap on whitespace, breaking words longer than a line.
/// Explicit newlines in the message are preserved.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word = word;
            // Hard-break words that cannot fit on any line
            while word.chars().count() > max_chars {
                let split: String = word.chars().take(max_chars).collect();
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                lines.push(split.clone());
                word = &word[split.len()..];
            }
            let needed = word.chars().count()
                + if current.is_empty() {
                    0
                } else {
                    current.chars().count() + 1
                };
            if !current.is_empty() && needed > max_chars {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
