//! Normalization of provider replies.
//!
//! The provider answers with JSON carrying its own `success` flag on good
//! days, and with HTML error pages, empty bodies or bare strings on bad
//! ones. Everything funnels into one result/error taxonomy here; nothing
//! downstream ever touches the raw reply again except for diagnostics.

use serde_json::Value;

use crate::provider::client::RawResponse;

use crate::error::ProviderError;

/// Normalized successful submission.
#[derive(Debug, Clone)]
pub struct SubmissionResult {
    /// Provider-assigned identifier, when one was present in the reply.
    pub provider_id: Option<String>,
    /// Provider's own status string, e.g. "test" or "received".
    pub status: Option<String>,
    /// Full reply payload, passed through for diagnostics.
    pub raw: Value,
}

/// Map a raw reply to the internal taxonomy.
///
/// Unparseable body → `MalformedResponse`; parsed but non-2xx transport
/// status or `success: false` → `Rejected` with the provider's own
/// diagnostic; otherwise a [`SubmissionResult`].
pub fn normalize(raw: RawResponse) -> Result<SubmissionResult, ProviderError> {
    let parsed: Value = serde_json::from_str(&raw.body).map_err(|_| {
        ProviderError::MalformedResponse {
            status: raw.status,
            snippet: snippet(&raw.body),
        }
    })?;

    let transport_ok = (200..300).contains(&raw.status);
    let provider_ok = parsed
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(transport_ok);

    if !transport_ok || !provider_ok {
        return Err(ProviderError::Rejected {
            status: raw.status,
            detail: rejection_detail(&parsed),
        });
    }

    Ok(SubmissionResult {
        provider_id: extract_id(&parsed),
        status: parsed
            .pointer("/data/status")
            .and_then(Value::as_str)
            .map(str::to_string),
        raw: parsed,
    })
}

/// The provider's own message, wherever it put it this time.
fn rejection_detail(parsed: &Value) -> String {
    for path in ["/error", "/data/error", "/message"] {
        if let Some(detail) = parsed.pointer(path).and_then(Value::as_str) {
            return detail.to_string();
        }
    }
    parsed.to_string()
}

/// `data.id` as a string; the provider has returned both numbers and
/// strings here.
fn extract_id(parsed: &Value) -> Option<String> {
    match parsed.pointer("/data/id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn snippet(body: &str) -> String {
    const MAX: usize = 200;
    if body.is_empty() {
        return "<empty body>".to_string();
    }
    body.chars().take(MAX).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn reply(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_success_with_numeric_id() {
        let body = json!({"success": true, "data": {"id": 98765, "status": "test"}}).to_string();
        let result = normalize(reply(200, &body)).expect("success");
        assert_eq!(result.provider_id.as_deref(), Some("98765"));
        assert_eq!(result.status.as_deref(), Some("test"));
        assert_eq!(result.raw["success"], true);
    }

    #[test]
    fn test_success_with_string_id() {
        let body = json!({"success": true, "data": {"id": "pc_abc"}}).to_string();
        let result = normalize(reply(200, &body)).expect("success");
        assert_eq!(result.provider_id.as_deref(), Some("pc_abc"));
        assert!(result.status.is_none());
    }

    #[test]
    fn test_success_without_id_is_still_success() {
        let body = json!({"success": true}).to_string();
        let result = normalize(reply(200, &body)).expect("success");
        assert!(result.provider_id.is_none());
    }

    #[test]
    fn test_html_error_page_is_malformed() {
        let err = normalize(reply(200, "<html><body>502 Bad Gateway</body></html>"))
            .expect_err("malformed");
        assert!(matches!(
            err,
            ProviderError::MalformedResponse { status: 200, ref snippet } if snippet.contains("<html>")
        ));
    }

    #[test]
    fn test_empty_body_is_malformed() {
        let err = normalize(reply(200, "")).expect_err("malformed");
        assert!(matches!(
            err,
            ProviderError::MalformedResponse { ref snippet, .. } if snippet == "<empty body>"
        ));
    }

    #[test]
    fn test_provider_success_false_is_rejected() {
        let body = json!({"success": false, "error": "invalid postcode"}).to_string();
        let err = normalize(reply(200, &body)).expect_err("rejected");
        assert!(matches!(
            err,
            ProviderError::Rejected { status: 200, ref detail } if detail == "invalid postcode"
        ));
    }

    #[test]
    fn test_non_2xx_with_json_body_is_rejected() {
        let body = json!({"error": "api key invalid"}).to_string();
        let err = normalize(reply(401, &body)).expect_err("rejected");
        assert!(matches!(
            err,
            ProviderError::Rejected { status: 401, ref detail } if detail == "api key invalid"
        ));
    }

    #[test]
    fn test_rejection_without_known_field_passes_whole_body() {
        let body = json!({"weird": "shape"}).to_string();
        let err = normalize(reply(500, &body)).expect_err("rejected");
        assert!(matches!(
            err,
            ProviderError::Rejected { ref detail, .. } if detail.contains("weird")
        ));
    }

    #[test]
    fn test_success_flag_true_but_transport_failure_is_rejected() {
        // A cached or proxied body can claim success while the transport says no
        let body = json!({"success": true}).to_string();
        let err = normalize(reply(502, &body)).expect_err("rejected");
        assert!(matches!(err, ProviderError::Rejected { status: 502, .. }));
    }
}
