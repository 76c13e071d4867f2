//! HTTP client for the provider call.
//!
//! Returns the transport status and the raw body text without parsing:
//! HTML error pages and empty bodies are outcomes the normalizer has to
//! see, not crashes. The request timeout is set on the client; an
//! unbounded wait on the provider would hang the whole submission.

use std::time::Duration;

use secrecy::ExposeSecret as _;
use tracing::{debug, warn};

use crate::error::{Error, ProviderError};
use crate::provider::request::{OutboundBody, OutboundRequest};

/// Raw provider reply, untouched.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

pub struct ProviderClient {
    http: reqwest::Client,
}

impl ProviderClient {
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("http client: {e}")))?;
        Ok(Self { http })
    }

    /// POST the built request and hand back whatever came over the wire.
    pub async fn send(&self, request: OutboundRequest) -> Result<RawResponse, ProviderError> {
        let mut builder = self.http.post(&request.url);
        if let Some(bearer) = &request.bearer {
            builder = builder.bearer_auth(bearer.expose_secret());
        }
        builder = match request.body {
            OutboundBody::Multipart(form) => builder.multipart(form),
            OutboundBody::Json(value) => builder.json(&value),
        };

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "Provider request failed");
            ProviderError::Unreachable(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            warn!(error = %e, "Failed reading provider response body");
            ProviderError::Unreachable(e.to_string())
        })?;

        debug!(status, bytes = body.len(), "Provider responded");
        Ok(RawResponse { status, body })
    }
}
