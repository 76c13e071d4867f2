//! Service configuration.
//!
//! Everything that historically drifted between deployments (provider host,
//! auth placement, wire shape, test mode, recipient source) is an explicit
//! setting here, loaded once from the environment at startup.

use std::time::Duration;

use secrecy::SecretString;

use crate::artifact::BackStrategy;
use crate::error::ConfigError;
use crate::provider::{AuthPlacement, WireShape};
use crate::request::Recipient;

/// Default global send cap per process lifetime.
pub const DEFAULT_MAX_SENDS: u32 = 300;

/// Where the postal recipient comes from. Never partially merged: one
/// source is authoritative for the whole address block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientSource {
    /// The configured default address is used; request overrides are ignored.
    ConfigDefault,
    /// The request must carry a complete `recipientOverride`.
    RequestOverride,
}

/// Print provider settings.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Region-specific API host, e.g. `https://api-eu1.stannp.com`.
    pub api_base: String,
    /// Postcard creation path on the host.
    pub create_path: String,
    pub api_key: SecretString,
    pub auth_placement: AuthPlacement,
    pub wire_shape: WireShape,
    /// Sandbox flag forwarded to the provider. Defaults to on so a fresh
    /// deployment cannot mail cards by accident.
    pub test_mode: bool,
    /// Physical page size token.
    pub page_size: String,
    /// Ask the provider to dispatch without address verification.
    pub post_unverified: bool,
    pub timeout: Duration,
}

/// Full service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub provider: ProviderConfig,
    pub max_sends: u32,
    pub back_strategy: BackStrategy,
    pub recipient_source: RecipientSource,
    /// Required when `recipient_source` is `ConfigDefault`.
    pub default_recipient: Option<Recipient>,
    pub bind_port: u16,
}

impl ServiceConfig {
    /// Build config from environment variables. `CARTERO_API_KEY` is the
    /// only hard requirement; everything else has a safe default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("CARTERO_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("CARTERO_API_KEY".to_string()))?;

        let api_base = std::env::var("CARTERO_API_BASE")
            .unwrap_or_else(|_| "https://api-eu1.stannp.com".to_string());
        let create_path = std::env::var("CARTERO_CREATE_PATH")
            .unwrap_or_else(|_| "/v1/postcards/create".to_string());

        let auth_placement = match env_or("CARTERO_AUTH", "query").as_str() {
            "query" => AuthPlacement::QueryParam,
            "header" => AuthPlacement::BearerHeader,
            other => {
                return Err(ConfigError::InvalidValue {
                    key: "CARTERO_AUTH".to_string(),
                    message: format!("expected 'query' or 'header', got '{other}'"),
                });
            }
        };

        let wire_shape = match env_or("CARTERO_WIRE", "multipart").as_str() {
            "multipart" => WireShape::Multipart,
            "json" => WireShape::Json,
            other => {
                return Err(ConfigError::InvalidValue {
                    key: "CARTERO_WIRE".to_string(),
                    message: format!("expected 'multipart' or 'json', got '{other}'"),
                });
            }
        };

        let back_strategy = match env_or("CARTERO_BACK_STRATEGY", "html").as_str() {
            "html" => BackStrategy::Markup,
            "pdf" => BackStrategy::Document,
            "png" => BackStrategy::Raster,
            other => {
                return Err(ConfigError::InvalidValue {
                    key: "CARTERO_BACK_STRATEGY".to_string(),
                    message: format!("expected 'html', 'pdf' or 'png', got '{other}'"),
                });
            }
        };

        let recipient_source = match env_or("CARTERO_RECIPIENT_SOURCE", "config").as_str() {
            "config" => RecipientSource::ConfigDefault,
            "request" => RecipientSource::RequestOverride,
            other => {
                return Err(ConfigError::InvalidValue {
                    key: "CARTERO_RECIPIENT_SOURCE".to_string(),
                    message: format!("expected 'config' or 'request', got '{other}'"),
                });
            }
        };

        let default_recipient = default_recipient_from_env();
        if recipient_source == RecipientSource::ConfigDefault && default_recipient.is_none() {
            return Err(ConfigError::MissingEnvVar(
                "CARTERO_RECIPIENT_NAME (and _STREET, _CITY, _POSTCODE)".to_string(),
            ));
        }

        let max_sends: u32 = std::env::var("CARTERO_MAX_SENDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_SENDS);

        let timeout_secs: u64 = std::env::var("CARTERO_PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let bind_port: u16 = std::env::var("CARTERO_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        Ok(Self {
            provider: ProviderConfig {
                api_base,
                create_path,
                api_key: SecretString::from(api_key),
                auth_placement,
                wire_shape,
                test_mode: env_flag("CARTERO_TEST_MODE", true),
                page_size: env_or("CARTERO_PAGE_SIZE", "A5"),
                post_unverified: env_flag("CARTERO_POST_UNVERIFIED", true),
                timeout: Duration::from_secs(timeout_secs),
            },
            max_sends,
            back_strategy,
            recipient_source,
            default_recipient,
            bind_port,
        })
    }
}

/// Default recipient from `CARTERO_RECIPIENT_*`. `None` unless the four
/// address fields are all set; country falls back to `ES`.
fn default_recipient_from_env() -> Option<Recipient> {
    let name = std::env::var("CARTERO_RECIPIENT_NAME").ok()?;
    let street = std::env::var("CARTERO_RECIPIENT_STREET").ok()?;
    let city = std::env::var("CARTERO_RECIPIENT_CITY").ok()?;
    let postcode = std::env::var("CARTERO_RECIPIENT_POSTCODE").ok()?;
    let country = std::env::var("CARTERO_RECIPIENT_COUNTRY").unwrap_or_else(|_| "ES".to_string());
    Some(Recipient::from_name(
        &name, &street, &city, &postcode, &country,
    ))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(v.trim(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}
