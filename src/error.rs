use thiserror::Error;

/// The source text has no usable header row, so no columns can be resolved.
#[derive(Debug, Error)]
#[error("malformed input: no header row")]
pub struct MalformedInputError;

/// Failure downloading one team's CSV source. Non-fatal to the overall
/// run: the team is skipped and remaining teams continue.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http client unavailable: {0}")]
    Client(anyhow::Error),

    #[error("request for {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("http {status} fetching {url}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Failure of the replace-all upload. Fatal to the run; no retries.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("no records to publish")]
    NoData,

    #[error("failed clearing existing rows: {0}")]
    DeleteFailed(anyhow::Error),

    #[error("upload aborted after {uploaded} of {total} records")]
    PartialUpload { uploaded: usize, total: usize },
}
