//! Back-side artifact generation.
//!
//! The message on the back of the card can be rendered three ways — HTML
//! markup, a PDF document, or a rasterized PNG — selected by configuration.
//! A caller-supplied pre-rendered artifact bypasses rendering entirely.
//! Every strategy is deterministic: the same message yields the same
//! output, with nothing time- or randomness-dependent embedded.

mod document;
mod markup;
mod raster;

use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;
use crate::request::{DecodedImage, PostcardRequest, extension_for};

/// Rendering strategy for the back side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackStrategy {
    /// Fixed-size HTML page, message auto-escaped into the template.
    Markup,
    /// Fixed-page PDF, word-wrapped left-aligned text.
    Document,
    /// Fixed-pixel PNG, white background, top-left text block.
    Raster,
}

/// The rendered back side: raw bytes plus what to tell the provider
/// about them. Produced fresh per request, never cached or persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackArtifact {
    pub bytes: Vec<u8>,
    pub media_type: String,
    pub filename: String,
}

/// Renders the back artifact for a validated request.
#[derive(Debug, Clone)]
pub struct BackArtifactGenerator {
    strategy: BackStrategy,
}

impl BackArtifactGenerator {
    pub fn new(strategy: BackStrategy) -> Self {
        Self { strategy }
    }

    /// Produce the back artifact: the caller-supplied one if present,
    /// otherwise the configured renderer over `message`. The two branches
    /// are explicit; there is no silent fallback between strategies.
    pub fn generate(&self, request: &PostcardRequest) -> Result<BackArtifact, ArtifactError> {
        if let Some(pre) = &request.back {
            return Ok(presupplied(pre));
        }
        let message = request.message.as_deref().unwrap_or_default();
        self.render(message)
    }

    /// Render a message with the configured strategy.
    pub fn render(&self, message: &str) -> Result<BackArtifact, ArtifactError> {
        match self.strategy {
            BackStrategy::Markup => markup::render(message),
            BackStrategy::Document => document::render(message),
            BackStrategy::Raster => raster::render(message),
        }
    }
}

/// Wrap a caller-supplied artifact without re-rendering it.
fn presupplied(image: &DecodedImage) -> BackArtifact {
    BackArtifact {
        bytes: image.bytes.clone(),
        media_type: image.media_type.clone(),
        filename: format!("back.{}", extension_for(&image.media_type)),
    }
}
