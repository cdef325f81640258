//! HTTP plumbing shared by the provider adapters.
//!
//! Request validation, option clamping, and the mapping of transport and
//! HTTP failures into [`GatewayError`]. Everything except [`send_json`] is a
//! pure function.

use bookwright_application::ports::llm_gateway::{GatewayError, GenerationOptions};
use bookwright_domain::ProviderKind;
use bookwright_domain::util::truncate_str;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

/// Longest provider error text carried into an error message.
const MAX_ERROR_BODY: usize = 300;

/// Reject requests that must never reach the network.
pub(crate) fn check_request(
    kind: ProviderKind,
    prompt: &str,
    options: &GenerationOptions<'_>,
) -> Result<(), GatewayError> {
    if prompt.trim().is_empty() {
        return Err(GatewayError::InvalidRequest("prompt is empty".to_string()));
    }
    let credential_kind = options.credential.provider();
    if credential_kind != kind {
        return Err(GatewayError::InvalidRequest(format!(
            "credential for {} used with the {} adapter",
            credential_kind, kind
        )));
    }
    if options.credential.secret().is_empty() {
        return Err(GatewayError::AuthenticationFailed(format!(
            "empty {} API key",
            kind
        )));
    }
    Ok(())
}

/// Clamp `max_tokens` into `1..=limit`.
pub(crate) fn clamp_max_tokens(requested: u32, limit: u32) -> u32 {
    requested.clamp(1, limit.max(1))
}

/// Clamp `temperature` into `0.0..=max`. NaN becomes 0.
pub(crate) fn clamp_temperature(requested: f32, max: f32) -> f32 {
    if requested.is_nan() {
        0.0
    } else {
        requested.clamp(0.0, max)
    }
}

/// Send a JSON request and decode a JSON success body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    kind: ProviderKind,
    request: RequestBuilder,
) -> Result<T, GatewayError> {
    let response = request
        .send()
        .await
        .map_err(|e| classify_transport(kind, &e))?;
    let status = response.status();
    let retry_after = parse_retry_after(response.headers(), Utc::now());
    let body = response
        .text()
        .await
        .map_err(|e| classify_transport(kind, &e))?;

    if !status.is_success() {
        debug!(provider = %kind, status = status.as_u16(), "Provider returned an error status");
        return Err(classify_status(kind, status, retry_after, &body));
    }
    if body.trim().is_empty() {
        return Err(GatewayError::MalformedResponse(format!(
            "{} returned an empty body",
            kind
        )));
    }
    serde_json::from_str(&body).map_err(|e| {
        GatewayError::MalformedResponse(format!("{} response could not be decoded: {}", kind, e))
    })
}

/// Map a non-success HTTP status to exactly one error kind.
pub(crate) fn classify_status(
    kind: ProviderKind,
    status: StatusCode,
    retry_after: Option<Duration>,
    body: &str,
) -> GatewayError {
    let message = format!("{} {}: {}", kind, status.as_u16(), error_message(body));
    match status.as_u16() {
        401 | 403 => GatewayError::AuthenticationFailed(message),
        429 => GatewayError::RateLimited {
            retry_after: retry_after.or_else(|| parse_retry_hint(body)),
            message,
        },
        408 | 504 => GatewayError::Timeout(message),
        400 | 404 | 413 | 422 => GatewayError::InvalidRequest(message),
        _ => GatewayError::ProviderUnavailable(message),
    }
}

/// Map a reqwest transport failure.
pub(crate) fn classify_transport(kind: ProviderKind, error: &reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout(format!("{} request timed out", kind))
    } else if error.is_decode() {
        GatewayError::MalformedResponse(format!("{} response could not be read: {}", kind, error))
    } else {
        // Connection refused, DNS, TLS and anything unrecognized.
        GatewayError::ProviderUnavailable(format!("{} request failed: {}", kind, error))
    }
}

/// `Retry-After` as delta-seconds or an HTTP date relative to `now`.
pub(crate) fn parse_retry_after(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(seconds) = value.parse::<f64>() {
        return delay_from_secs(seconds);
    }
    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    (at - now).to_std().ok()
}

static RETRY_HINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:retry|try again)[^0-9]{0,24}(\d+(?:\.\d+)?)\s*(ms|s)\b")
        .expect("valid regex for retry hint")
});

/// Retry hint embedded in an error body.
///
/// Understands Gemini's `error.details[].retryDelay` (`"30s"`) and free-text
/// hints such as OpenAI's "Please try again in 20s".
pub(crate) fn parse_retry_hint(body: &str) -> Option<Duration> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(details) = value
            .get("error")
            .and_then(|e| e.get("details"))
            .and_then(|d| d.as_array())
    {
        for detail in details {
            if let Some(delay) = detail
                .get("retryDelay")
                .or_else(|| detail.get("retry_delay"))
                .and_then(parse_delay_value)
            {
                return Some(delay);
            }
        }
    }

    let caps = RETRY_HINT_RE.captures(body)?;
    let amount: f64 = caps.get(1)?.as_str().parse().ok()?;
    match caps.get(2)?.as_str().to_lowercase().as_str() {
        "ms" => delay_from_secs(amount / 1000.0),
        _ => delay_from_secs(amount),
    }
}

fn parse_delay_value(value: &serde_json::Value) -> Option<Duration> {
    if let Some(seconds) = value.as_u64() {
        return Some(Duration::from_secs(seconds));
    }
    let seconds: f64 = value.as_str()?.trim().trim_end_matches('s').parse().ok()?;
    delay_from_secs(seconds)
}

/// Negative, NaN and out-of-range values are no hint at all.
fn delay_from_secs(seconds: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(seconds).ok()
}

/// Human-readable part of an error body: `error.message` when the body is
/// the usual JSON envelope, otherwise the (truncated) raw text.
pub(crate) fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message").or(Some(e)))
                .and_then(|m| m.as_str().map(str::to_string))
        });
    match from_json {
        Some(message) => message,
        None if body.trim().is_empty() => "no details".to_string(),
        None => truncate_str(body.trim(), MAX_ERROR_BODY).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookwright_domain::{GenerationErrorKind, ProviderCredential};
    use reqwest::header::HeaderValue;

    fn kind_of(status: u16) -> GenerationErrorKind {
        classify_status(
            ProviderKind::OpenAi,
            StatusCode::from_u16(status).unwrap(),
            None,
            "",
        )
        .kind()
    }

    #[test]
    fn test_status_classification_table() {
        use GenerationErrorKind::*;
        let table = [
            (400, InvalidRequest),
            (401, AuthenticationFailed),
            (403, AuthenticationFailed),
            (404, InvalidRequest),
            (408, Timeout),
            (413, InvalidRequest),
            (422, InvalidRequest),
            (429, RateLimited),
            (500, ProviderUnavailable),
            (502, ProviderUnavailable),
            (503, ProviderUnavailable),
            (504, Timeout),
            (529, ProviderUnavailable),
            (418, ProviderUnavailable),
        ];
        for (status, expected) in table {
            assert_eq!(kind_of(status), expected, "status {}", status);
        }
    }

    #[test]
    fn test_rate_limit_prefers_header() {
        let body = r#"{"error": {"message": "Please try again in 20s."}}"#;
        let error = classify_status(
            ProviderKind::OpenAi,
            StatusCode::TOO_MANY_REQUESTS,
            Some(Duration::from_secs(3)),
            body,
        );
        assert_eq!(error.retry_after(), Some(Duration::from_secs(3)));

        let error = classify_status(ProviderKind::OpenAi, StatusCode::TOO_MANY_REQUESTS, None, body);
        assert_eq!(error.retry_after(), Some(Duration::from_secs(20)));
        assert!(error.to_string().contains("Please try again in 20s."));
    }

    #[test]
    fn test_retry_after_header_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        assert_eq!(
            parse_retry_after(&headers, Utc::now()),
            Some(Duration::from_secs(7))
        );
    }

    #[test]
    fn test_retry_after_header_http_date() {
        let now = DateTime::parse_from_rfc2822("Wed, 21 Oct 2015 07:28:00 GMT")
            .unwrap()
            .with_timezone(&Utc);
        let mut headers = HeaderMap::new();
        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:30 GMT"),
        );
        assert_eq!(
            parse_retry_after(&headers, now),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_retry_after_header_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));
        assert_eq!(parse_retry_after(&headers, Utc::now()), None);
        assert_eq!(parse_retry_after(&HeaderMap::new(), Utc::now()), None);
    }

    #[test]
    fn test_gemini_retry_delay_detail() {
        let body = r#"{
            "error": {
                "code": 429,
                "message": "Resource has been exhausted",
                "details": [
                    {"@type": "type.googleapis.com/google.rpc.QuotaFailure"},
                    {"@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "31s"}
                ]
            }
        }"#;
        assert_eq!(parse_retry_hint(body), Some(Duration::from_secs(31)));
    }

    #[test]
    fn test_free_text_retry_hint() {
        assert_eq!(
            parse_retry_hint("Rate limit reached. Please try again in 1.5s."),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(
            parse_retry_hint("try again in 250ms"),
            Some(Duration::from_millis(250))
        );
        assert_eq!(parse_retry_hint("slow down"), None);
    }

    #[test]
    fn test_retry_after_header_out_of_range() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("1e300"));
        assert_eq!(parse_retry_after(&headers, Utc::now()), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("-5"));
        assert_eq!(parse_retry_after(&headers, Utc::now()), None);
    }

    #[test]
    fn test_retry_hint_out_of_range_is_ignored() {
        let huge = format!("Please try again in {}s.", "9".repeat(400));
        assert_eq!(parse_retry_hint(&huge), None);

        let gemini = r#"{"error": {"details": [{"retryDelay": "1e300s"}]}}"#;
        assert_eq!(parse_retry_hint(gemini), None);

        let error = classify_status(
            ProviderKind::Gemini,
            StatusCode::TOO_MANY_REQUESTS,
            None,
            &huge,
        );
        assert_eq!(error.kind(), GenerationErrorKind::RateLimited);
        assert_eq!(error.retry_after(), None);
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error": {"type": "x", "message": "invalid x-api-key"}}"#),
            "invalid x-api-key"
        );
        assert_eq!(error_message(r#"{"error": "quota"}"#), "quota");
        assert_eq!(error_message(""), "no details");
        assert_eq!(error_message(&"e".repeat(1000)).len(), MAX_ERROR_BODY);
    }

    #[test]
    fn test_check_request() {
        let credential = ProviderCredential::new(ProviderKind::Anthropic, "key");
        let options = GenerationOptions::new(&credential, 100, 0.5);

        assert!(check_request(ProviderKind::Anthropic, "hello", &options).is_ok());

        let err = check_request(ProviderKind::Anthropic, "   ", &options).unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::InvalidRequest);

        let err = check_request(ProviderKind::OpenAi, "hello", &options).unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::InvalidRequest);
        assert!(!err.to_string().contains("key"));
    }

    #[test]
    fn test_clamping() {
        assert_eq!(clamp_max_tokens(0, 4096), 1);
        assert_eq!(clamp_max_tokens(10_000, 4096), 4096);
        assert_eq!(clamp_max_tokens(3000, 4096), 3000);
        assert_eq!(clamp_temperature(1.7, 1.0), 1.0);
        assert_eq!(clamp_temperature(-0.3, 2.0), 0.0);
        assert_eq!(clamp_temperature(0.7, 2.0), 0.7);
        assert_eq!(clamp_temperature(f32::NAN, 2.0), 0.0);
    }
}
