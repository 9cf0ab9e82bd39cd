// HTTP response -> ServiceError mapping

use changeset_core::port::{ServiceError, ServiceErrorKind};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Error body the services return on failure
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "errorcode", alias = "errorCode")]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Network failure before any response arrived
pub(crate) fn transport(context: &str, e: reqwest::Error) -> ServiceError {
    ServiceError::transport(format!("{}: {}", context, e))
}

/// Pass successful responses through, map everything else
pub(crate) async fn check(response: Response, context: &str) -> Result<Response, ServiceError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(parse_error_response(response, context).await)
    }
}

/// Decode a JSON response body
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    context: &str,
) -> Result<T, ServiceError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| transport(context, e))?;
    serde_json::from_slice(&body)
        .map_err(|e| ServiceError::decode(format!("{}: invalid response body: {}", context, e)))
}

pub(crate) async fn parse_error_response(response: Response, context: &str) -> ServiceError {
    let status = response.status();

    let retry_after_secs = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok());

    let body = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<ErrorBody>(&body).ok();
    let code = parsed.as_ref().and_then(|b| b.code.clone());
    let detail = parsed
        .and_then(|b| b.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    map_status(status, retry_after_secs, code, format!("{}: {}", context, detail))
}

fn map_status(
    status: StatusCode,
    retry_after_secs: Option<u64>,
    code: Option<String>,
    message: String,
) -> ServiceError {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceErrorKind::Unauthorized,
        StatusCode::NOT_FOUND => ServiceErrorKind::NotFound,
        StatusCode::TOO_MANY_REQUESTS => ServiceErrorKind::RateLimited { retry_after_secs },
        _ => ServiceErrorKind::Unknown {
            status: status.as_u16(),
            code,
        },
    };
    ServiceError::new(kind, message)
}
