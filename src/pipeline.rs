//! The submission pipeline.
//!
//! Fixed order, short-circuiting on the first failure:
//! validate → quota admission → back artifact → provider request →
//! provider call → normalize → commit quota. Validation and quota faults
//! fire before any rendering or network traffic; the sent counter moves
//! only after the provider confirms success. If the caller's future is
//! dropped mid-call, the quota permit is released on drop and nothing is
//! committed.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::artifact::BackArtifactGenerator;
use crate::config::{RecipientSource, ServiceConfig};
use crate::error::{Error, Result, ValidationError};
use crate::provider::{ProviderClient, ProviderRequestBuilder, normalize};
use crate::quota::{QuotaGuard, QuotaSnapshot};
use crate::request::{PostcardRequest, RawPostcardRequest, Recipient, validate};

/// Everything the caller needs for the success envelope.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub provider_id: Option<String>,
    pub status: Option<String>,
    pub raw: Value,
    pub quota: QuotaSnapshot,
}

pub struct SubmissionPipeline {
    config: ServiceConfig,
    quota: Arc<QuotaGuard>,
    generator: BackArtifactGenerator,
    builder: ProviderRequestBuilder,
    client: ProviderClient,
}

impl SubmissionPipeline {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let quota = QuotaGuard::new(config.max_sends);
        let generator = BackArtifactGenerator::new(config.back_strategy);
        let builder = ProviderRequestBuilder::new(config.provider.clone());
        let client = ProviderClient::new(config.provider.timeout)?;
        Ok(Self {
            config,
            quota,
            generator,
            builder,
            client,
        })
    }

    /// The shared quota state, for the liveness/info response.
    pub fn quota(&self) -> &Arc<QuotaGuard> {
        &self.quota
    }

    /// Run one submission end to end.
    pub async fn submit(&self, raw: &RawPostcardRequest) -> Result<SubmissionOutcome> {
        let request = validate(raw)?;
        let recipient = self.resolve_recipient(&request)?;

        let permit = self.quota.admit(request.access_code.as_deref())?;

        let back = self.generator.generate(&request)?;
        let outbound = self.builder.build(&recipient, &request.front, &back)?;

        let raw_response = self.client.send(outbound).await.inspect_err(|e| {
            warn!(error = %e, "Provider call failed, quota slot released");
        })?;
        let result = normalize(raw_response)?;

        let quota = permit.commit();
        info!(
            provider_id = result.provider_id.as_deref().unwrap_or("-"),
            sent = quota.sent,
            remaining = quota.remaining(),
            "Postcard submitted"
        );

        Ok(SubmissionOutcome {
            provider_id: result.provider_id,
            status: result.status,
            raw: result.raw,
            quota,
        })
    }

    /// Pick the recipient from exactly one source, per configuration.
    /// Never merges the configured default with a request override.
    fn resolve_recipient(&self, request: &PostcardRequest) -> Result<Recipient> {
        match self.config.recipient_source {
            RecipientSource::ConfigDefault => self
                .config
                .default_recipient
                .clone()
                .ok_or_else(|| Error::Internal("recipient source is config but none set".into())),
            RecipientSource::RequestOverride => request
                .recipient_override
                .clone()
                .ok_or(Error::Validation(ValidationError::MissingRecipient)),
        }
    }
}
