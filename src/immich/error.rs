use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImmichError {
    #[error("API key contains characters that are not valid in an HTTP header")]
    InvalidApiKey,
    #[error("Base URL cannot be extended with API paths: {0}")]
    InvalidBaseUrl(String),
    #[error("HTTP {status} from {endpoint}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },
    #[error("Malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unexpected response from {endpoint}: {reason}")]
    UnexpectedResponse { endpoint: String, reason: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ImmichError {
    pub(crate) fn decode(endpoint: &str, source: serde_json::Error) -> Self {
        Self::Decode {
            endpoint: endpoint.to_owned(),
            source,
        }
    }
}
