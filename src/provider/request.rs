//! Outbound request construction.
//!
//! The provider contract drifted across deployments: some hosts take a
//! multipart form with binary parts, others a JSON body with base64
//! inlined; some authenticate with a query-string key, others with a
//! bearer header. All four combinations are configuration, not code.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret as _, SecretString};
use serde_json::json;

use crate::artifact::BackArtifact;
use crate::config::ProviderConfig;
use crate::error::Error;
use crate::request::{DecodedImage, Recipient, extension_for};

/// Where the API key goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPlacement {
    /// `?api_key=...` appended to the URL.
    QueryParam,
    /// `Authorization: Bearer ...` header.
    BearerHeader,
}

/// Body encoding of the outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireShape {
    /// Multipart form, artifacts as binary file parts.
    Multipart,
    /// Single JSON document, artifacts base64-inlined.
    Json,
}

/// A fully assembled outbound request, ready for [`super::ProviderClient`].
pub struct OutboundRequest {
    pub url: String,
    /// Set when auth goes in the header rather than the URL.
    pub bearer: Option<SecretString>,
    pub body: OutboundBody,
}

pub enum OutboundBody {
    Multipart(Form),
    Json(serde_json::Value),
}

/// Assembles provider requests from the configured wire shape and auth
/// placement.
pub struct ProviderRequestBuilder {
    config: ProviderConfig,
}

impl ProviderRequestBuilder {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    /// Build the outbound request carrying both artifacts and the
    /// recipient block.
    pub fn build(
        &self,
        recipient: &Recipient,
        front: &DecodedImage,
        back: &BackArtifact,
    ) -> Result<OutboundRequest, Error> {
        let url = self.endpoint_url();
        let bearer = match self.config.auth_placement {
            AuthPlacement::BearerHeader => Some(self.config.api_key.clone()),
            AuthPlacement::QueryParam => None,
        };

        let body = match self.config.wire_shape {
            WireShape::Multipart => OutboundBody::Multipart(self.multipart_body(recipient, front, back)?),
            WireShape::Json => OutboundBody::Json(self.json_body(recipient, front, back)),
        };

        Ok(OutboundRequest { url, bearer, body })
    }

    fn endpoint_url(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        let path = &self.config.create_path;
        match self.config.auth_placement {
            AuthPlacement::QueryParam => {
                format!("{base}{path}?api_key={}", self.config.api_key.expose_secret())
            }
            AuthPlacement::BearerHeader => format!("{base}{path}"),
        }
    }

    fn multipart_body(
        &self,
        recipient: &Recipient,
        front: &DecodedImage,
        back: &BackArtifact,
    ) -> Result<Form, Error> {
        let front_part = Part::bytes(front.bytes.clone())
            .file_name(format!("front.{}", extension_for(&front.media_type)))
            .mime_str(&front.media_type)
            .map_err(|e| Error::Internal(format!("front part mime: {e}")))?;
        let back_part = Part::bytes(back.bytes.clone())
            .file_name(back.filename.clone())
            .mime_str(&back.media_type)
            .map_err(|e| Error::Internal(format!("back part mime: {e}")))?;

        Ok(Form::new()
            .text("test", flag(self.config.test_mode))
            .text("size", self.config.page_size.clone())
            .text("post_unverified", flag(self.config.post_unverified))
            .text("recipient[firstname]", recipient.firstname.clone())
            .text("recipient[lastname]", recipient.lastname.clone())
            .text("recipient[address1]", recipient.address1.clone())
            .text("recipient[city]", recipient.city.clone())
            .text("recipient[postcode]", recipient.postcode.clone())
            .text("recipient[country]", recipient.country.clone())
            .part("front", front_part)
            .part("back", back_part))
    }

    fn json_body(
        &self,
        recipient: &Recipient,
        front: &DecodedImage,
        back: &BackArtifact,
    ) -> serde_json::Value {
        json!({
            "test": self.config.test_mode,
            "size": self.config.page_size,
            "post_unverified": self.config.post_unverified,
            "recipient": {
                "firstname": recipient.firstname,
                "lastname": recipient.lastname,
                "address1": recipient.address1,
                "city": recipient.city,
                "postcode": recipient.postcode,
                "country": recipient.country,
            },
            "front": BASE64_STANDARD.encode(&front.bytes),
            "front_content_type": front.media_type,
            "back": BASE64_STANDARD.encode(&back.bytes),
            "back_content_type": back.media_type,
        })
    }
}

/// Provider form fields are stringly-typed "1"/"0" flags.
fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}
