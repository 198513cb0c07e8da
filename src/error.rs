use thiserror::Error;

/// Errors surfaced to the host at mount time. These are the only errors the
/// control ever raises to the caller; everything on the fetch path degrades
/// to an empty result instead.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// The host region cannot hold the control (zero width or height).
    #[error("host region is not attachable (zero-sized)")]
    InvalidHost,
}

/// Errors on the suggestion/detail fetch path.
///
/// Callers catch these at the point of use, log them, and hide the results
/// list. A failed request is not retried until the user types again or
/// refocuses the control.
#[derive(Debug, Error)]
pub enum SuggestError {
    /// The backend client could not be initialized (missing credential,
    /// client build failure). Stays failed for the widget lifetime.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// Transport-level failure (DNS, TLS, timeout, body read).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response decoded but did not carry the expected payload.
    #[error("malformed response: {0}")]
    Malformed(String),
}
