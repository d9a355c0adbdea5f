//! Shared HTTP plumbing for the enrichment clients.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{EnrichError, EnrichResult};

/// Build a blocking client with the given per-request timeout.
pub fn build_client(timeout: Duration) -> EnrichResult<Client> {
    let client = Client::builder()
        .user_agent(concat!("hitparade/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Map a non-success status to the matching [`EnrichError`].
pub fn check_status(source_name: &str, response: Response) -> EnrichResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = format!("{} {}", status, response.url());
    Err(match status {
        StatusCode::TOO_MANY_REQUESTS => EnrichError::RateLimited {
            source_name: source_name.to_string(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => EnrichError::Auth {
            source_name: source_name.to_string(),
            message,
        },
        StatusCode::NOT_FOUND => EnrichError::NotFound {
            entity: response.url().path().to_string(),
            source_name: source_name.to_string(),
        },
        _ => EnrichError::Http {
            source_name: source_name.to_string(),
            status: Some(status.as_u16()),
            message,
        },
    })
}

/// Decode a JSON body, reporting failures as parse errors.
pub fn json<T: DeserializeOwned>(source_name: &str, response: Response) -> EnrichResult<T> {
    response.json().map_err(|e| EnrichError::Parse {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })
}

/// Decode a text body, reporting failures as parse errors.
pub fn text(source_name: &str, response: Response) -> EnrichResult<String> {
    response.text().map_err(|e| EnrichError::Parse {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })
}
