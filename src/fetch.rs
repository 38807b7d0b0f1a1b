use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::error::FetchError;

// Source exports are small; 30s covers slow spreadsheet hosts.
const REQUEST_TIMEOUT_SECS: u64 = 30;
const BODY_SNIPPET_MAX: usize = 220;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// Download one team's CSV export. No retries: a failure skips the team.
pub fn fetch_csv(url: &str) -> Result<String, FetchError> {
    let client = http_client().map_err(FetchError::Client)?;
    let resp = client.get(url).send().map_err(|source| FetchError::Network {
        url: url.to_string(),
        source,
    })?;
    let status = resp.status();
    let body = resp.text().map_err(|source| FetchError::Network {
        url: url.to_string(),
        source,
    })?;
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
            body: body_snippet(&body),
        });
    }
    Ok(body)
}

/// Single-line body excerpt for error messages.
pub(crate) fn body_snippet(body: &str) -> String {
    body.trim()
        .replace('\n', " ")
        .replace('\r', " ")
        .chars()
        .take(BODY_SNIPPET_MAX)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::body_snippet;

    #[test]
    fn body_snippet_flattens_and_truncates() {
        let flattened = body_snippet("  line one\r\nline two  ");
        assert_eq!(flattened, "line one  line two");

        let long = "x".repeat(500);
        assert_eq!(body_snippet(&long).len(), 220);
    }
}
