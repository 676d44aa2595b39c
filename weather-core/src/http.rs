//! Shared HTTP plumbing for the remote services.

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::{config::HttpSettings, error::FetchError};

/// Build the client every service shares, with connect/read timeouts applied.
pub fn build_client(settings: &HttpSettings) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(settings.connect_timeout())
        .timeout(settings.request_timeout())
        .user_agent(settings.user_agent.as_str())
        .build()
}

/// Send `request` and return the body bytes of a successful response.
pub(crate) async fn fetch_bytes(
    request: RequestBuilder,
    message: &str,
) -> Result<Vec<u8>, FetchError> {
    let transport = |source| FetchError::Transport { message: message.to_string(), source };

    let res = request.send().await.map_err(transport)?;
    let status = res.status();
    let body = res.bytes().await.map_err(transport)?;

    if !status.is_success() {
        return Err(FetchError::Status {
            message: message.to_string(),
            status,
            body: truncate_body(&String::from_utf8_lossy(&body)),
        });
    }

    Ok(body.to_vec())
}

/// Send `request` and decode a successful JSON response, ignoring unknown fields.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    message: &str,
) -> Result<T, FetchError> {
    let body = fetch_bytes(request, message).await?;

    serde_json::from_slice(&body)
        .map_err(|source| FetchError::Decode { message: message.to_string(), source })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
