use anyhow::anyhow;
use reqwest::StatusCode;
use std::error::Error as StdError;
use std::io::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransportFailure {
    TimedOut,
    Refused,
    Connect,
    Other,
}

/// Walks the source chain looking for an io error of `kind` or a message
/// containing `needle`.
fn chain_mentions(err: &(dyn StdError + 'static), kind: ErrorKind, needle: &str) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == kind
        {
            return true;
        }
        if source.to_string().to_ascii_lowercase().contains(needle) {
            return true;
        }
        current = source.source();
    }
    false
}

fn classify(err: &reqwest::Error) -> TransportFailure {
    if err.is_timeout() || chain_mentions(err, ErrorKind::TimedOut, "timed out") {
        TransportFailure::TimedOut
    } else if err.is_connect()
        && chain_mentions(err, ErrorKind::ConnectionRefused, "connection refused")
    {
        TransportFailure::Refused
    } else if err.is_connect() {
        TransportFailure::Connect
    } else {
        TransportFailure::Other
    }
}

pub(crate) fn model_api_request_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: u64,
) -> anyhow::Error {
    match classify(&err) {
        TransportFailure::TimedOut => anyhow!(
            "Model request timed out after {}s while calling '{}'. \
             Increase MODEL_TIMEOUT_SECS or try again later.",
            timeout_secs,
            api_url
        ),
        TransportFailure::Refused => anyhow!(
            "Connection refused by model API at '{}'. \
             Check that MODEL_BASE_URL points at an OpenAI-compatible endpoint.",
            api_url
        ),
        TransportFailure::Connect => anyhow!(
            "Failed to connect to model API at '{}'. \
             Check MODEL_BASE_URL and network connectivity.",
            api_url
        ),
        TransportFailure::Other => anyhow!("Failed to call model API at '{}': {}", api_url, err),
    }
}

pub(crate) fn model_api_status_error(status: StatusCode, body: &str) -> anyhow::Error {
    if status == StatusCode::UNAUTHORIZED {
        return anyhow!(
            "Model request failed with status {}: {} (check OPENAI_API_KEY)",
            status,
            body
        );
    }
    anyhow!("Model request failed with status {}: {}", status, body)
}
