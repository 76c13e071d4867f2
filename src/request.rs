//! Inbound request types and validation.
//!
//! Validation is a pure function of the raw body: no quota checks, no
//! rendering, no network. Everything downstream can assume a
//! [`PostcardRequest`] is structurally sound.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Hard ceiling on the decoded front image (5 MiB). The boundary is
/// inclusive: an image of exactly this size is accepted.
pub const MAX_FRONT_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Raw JSON body as received from the HTTP layer. Field names follow the
/// client contract, hence the camelCase renames.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPostcardRequest {
    /// Base64-encoded photo, optionally wrapped in a `data:` URL.
    pub front_image: Option<String>,
    /// Message text for the back side.
    pub message: Option<String>,
    /// Pre-rendered back artifact (base64, optionally a `data:` URL).
    /// Accepted in place of `message`.
    pub back_image: Option<String>,
    pub recipient_override: Option<RawRecipientOverride>,
    /// Opaque single-use token.
    pub access_code: Option<String>,
}

/// Recipient override as sent by the client. All five fields must be
/// present together; partial overrides are rejected, never padded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecipientOverride {
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// A fully resolved postal recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub firstname: String,
    pub lastname: String,
    pub address1: String,
    pub city: String,
    pub postcode: String,
    pub country: String,
}

impl Recipient {
    /// Build a recipient from a single display name plus address parts.
    /// The name splits on the first space: "Ana García" → ("Ana", "García").
    pub fn from_name(
        name: &str,
        street: &str,
        city: &str,
        postcode: &str,
        country: &str,
    ) -> Self {
        let mut parts = name.trim().splitn(2, ' ');
        let firstname = parts.next().unwrap_or_default().to_string();
        let lastname = parts.next().unwrap_or_default().to_string();
        Self {
            firstname,
            lastname,
            address1: street.to_string(),
            city: city.to_string(),
            postcode: postcode.to_string(),
            country: country.to_string(),
        }
    }
}

/// A binary payload decoded from the wire, with the media type either
/// declared by a `data:` URL prefix or sniffed from magic bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

/// A validated submission, ready for the pipeline.
#[derive(Debug, Clone)]
pub struct PostcardRequest {
    pub front: DecodedImage,
    pub message: Option<String>,
    pub back: Option<DecodedImage>,
    pub recipient_override: Option<Recipient>,
    pub access_code: Option<String>,
}

/// Validate a raw body into a [`PostcardRequest`].
///
/// Checks, in order: `frontImage` present and decodable, back content
/// present (`message` or `backImage`), front size within the ceiling,
/// recipient override complete if supplied.
pub fn validate(raw: &RawPostcardRequest) -> Result<PostcardRequest, ValidationError> {
    let front_encoded = match raw.front_image.as_deref() {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Err(ValidationError::MissingField("frontImage")),
    };

    let has_message = raw
        .message
        .as_deref()
        .is_some_and(|m| !m.trim().is_empty());
    let has_back = raw
        .back_image
        .as_deref()
        .is_some_and(|b| !b.trim().is_empty());
    if !has_message && !has_back {
        return Err(ValidationError::MissingBackContent);
    }

    let front = decode_image(front_encoded, "frontImage")?;
    if front.bytes.len() > MAX_FRONT_IMAGE_BYTES {
        return Err(ValidationError::ImageTooLarge {
            field: "frontImage",
            size: front.bytes.len(),
            max: MAX_FRONT_IMAGE_BYTES,
        });
    }

    let back = if has_back {
        Some(decode_image(raw.back_image.as_deref().unwrap_or(""), "backImage")?)
    } else {
        None
    };

    let recipient_override = match &raw.recipient_override {
        Some(o) => Some(resolve_override(o)?),
        None => None,
    };

    Ok(PostcardRequest {
        front,
        message: if has_message { raw.message.clone() } else { None },
        back,
        recipient_override,
        access_code: raw
            .access_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
    })
}

fn resolve_override(o: &RawRecipientOverride) -> Result<Recipient, ValidationError> {
    let filled = |s: &Option<String>| s.as_deref().is_some_and(|v| !v.trim().is_empty());
    if !(filled(&o.name)
        && filled(&o.street)
        && filled(&o.city)
        && filled(&o.postal_code)
        && filled(&o.country))
    {
        return Err(ValidationError::PartialRecipient);
    }
    Ok(Recipient::from_name(
        o.name.as_deref().unwrap_or(""),
        o.street.as_deref().unwrap_or("").trim(),
        o.city.as_deref().unwrap_or("").trim(),
        o.postal_code.as_deref().unwrap_or("").trim(),
        o.country.as_deref().unwrap_or("").trim(),
    ))
}

/// Decode a base64 image field, accepting either bare base64 or a
/// `data:<media-type>;base64,<payload>` URL.
///
/// The size gate uses the exact base64 length relationship
/// (`len / 4 * 3 - padding`) so the ceiling cannot be bypassed by a few
/// bytes, and so oversized payloads are refused without allocating the
/// decoded buffer first.
fn decode_image(encoded: &str, field: &'static str) -> Result<DecodedImage, ValidationError> {
    let (declared_type, payload) = split_data_url(encoded.trim());

    if payload.len() % 4 != 0 {
        return Err(ValidationError::InvalidEncoding {
            field,
            reason: "length is not a multiple of 4".to_string(),
        });
    }
    let padding = payload.bytes().rev().take_while(|&b| b == b'=').count();
    // Standard base64 carries at most two padding characters; more would
    // also underflow the length arithmetic below
    if padding > 2 {
        return Err(ValidationError::InvalidEncoding {
            field,
            reason: "too many padding characters".to_string(),
        });
    }
    let decoded_len = payload.len() / 4 * 3 - padding;
    if decoded_len > MAX_FRONT_IMAGE_BYTES {
        return Err(ValidationError::ImageTooLarge {
            field,
            size: decoded_len,
            max: MAX_FRONT_IMAGE_BYTES,
        });
    }

    let bytes = BASE64_STANDARD
        .decode(payload)
        .map_err(|e| ValidationError::InvalidEncoding {
            field,
            reason: e.to_string(),
        })?;

    let media_type = declared_type
        .map(str::to_string)
        .unwrap_or_else(|| sniff_media_type(&bytes).to_string());

    Ok(DecodedImage { bytes, media_type })
}

/// Split `data:image/png;base64,AAAA` into its declared media type and
/// payload. Returns `(None, input)` for bare base64.
fn split_data_url(s: &str) -> (Option<&str>, &str) {
    let Some(rest) = s.strip_prefix("data:") else {
        return (None, s);
    };
    match rest.split_once(";base64,") {
        Some((media_type, payload)) if !media_type.is_empty() => (Some(media_type), payload),
        Some((_, payload)) => (None, payload),
        None => (None, s),
    }
}

/// Sniff the media type from magic bytes; the provider wants an accurate
/// content type on the front part. JPEG is the historical default.
fn sniff_media_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(b"%PDF") {
        "application/pdf"
    } else if bytes.starts_with(b"<!DOCTYPE") || bytes.starts_with(b"<html") {
        "text/html"
    } else {
        "image/jpeg"
    }
}

/// File extension matching a media type, for provider part filenames.
pub fn extension_for(media_type: &str) -> &'static str {
    match media_type {
        "image/png" => "png",
        "application/pdf" => "pdf",
        "text/html" => "html",
        _ => "jpg",
    }
}
