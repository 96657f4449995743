use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, SongFinderError};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

/// Build an HTTP client. `timeout` bounds the whole request including the
/// body, `connect_timeout` only the connection.
pub fn http_client(connect_timeout: Duration, timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(connect_timeout.min(timeout))
        .build()?;
    Ok(client)
}

/// Get default headers for requests
fn get_default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers
}

fn map_send_error(url: &str, e: reqwest::Error) -> SongFinderError {
    if e.is_timeout() {
        SongFinderError::RequestTimeout(url.to_string())
    } else {
        SongFinderError::NetworkError(e)
    }
}

fn check_status(url: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SongFinderError::HttpError {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

/// Execute HTTP request with error handling
async fn execute_request(
    client: &reqwest::Client,
    method: reqwest::Method,
    url: &str,
    headers: HeaderMap,
) -> Result<reqwest::Response> {
    let mut request_headers = get_default_headers();
    request_headers.extend(headers);

    debug!(%method, url, "sending request");
    let response = client
        .request(method, url)
        .headers(request_headers)
        .send()
        .await
        .map_err(|e| map_send_error(url, e))?;

    check_status(url, response)
}

/// Download and parse JSON response from URL
pub async fn download_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
) -> Result<T> {
    let response = execute_request(client, reqwest::Method::GET, url, headers).await?;
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(SongFinderError::from)
}

/// Download binary data from URL
pub async fn download_binary(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
) -> Result<Vec<u8>> {
    let response = execute_request(client, reqwest::Method::GET, url, headers).await?;
    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}

/// Execute POST request with JSON body and custom headers
pub async fn post_json<T: DeserializeOwned, B: Serialize>(
    client: &reqwest::Client,
    url: &str,
    body: &B,
    headers: HeaderMap,
) -> Result<T> {
    let mut request_headers = get_default_headers();
    request_headers.extend(headers);

    debug!(url, "posting json");
    let response = client
        .post(url)
        .headers(request_headers)
        .json(body)
        .send()
        .await
        .map_err(|e| map_send_error(url, e))?;

    let response = check_status(url, response)?;
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(SongFinderError::from)
}
