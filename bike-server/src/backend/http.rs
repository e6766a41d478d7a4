//! Shared HTTP plumbing for API-backed backends.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use super::error::{BackendError, BackendLoadError};

/// Build an HTTP client that asks for JSON and gives up after `timeout_secs`.
pub(crate) fn json_client(timeout_secs: u64) -> Result<reqwest::Client, BackendLoadError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;

    Ok(client)
}

/// GET `url` and return the body, mapping error statuses to [`BackendError::Api`].
pub(crate) async fn get_text(http: &reqwest::Client, url: &str) -> Result<String, BackendError> {
    let response = http.get(url).send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BackendError::Api {
            status: status.as_u16(),
            message: body.chars().take(500).collect(),
        });
    }

    Ok(response.text().await?)
}

/// Parse a JSON body, keeping a prefix of the body in the error for diagnostics.
pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, BackendError> {
    serde_json::from_str(body).map_err(|e| BackendError::Json {
        message: format!("{e} (body: {})", body.chars().take(200).collect::<String>()),
    })
}
