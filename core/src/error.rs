//! Error types for the geocoding client core.
//!
//! # Design
//! `QuotaOrAccess` gets a dedicated variant because callers need to tell
//! "stop issuing calls, the account is out of quota or blocked" apart from an
//! ordinary failed request. Every other non-200 API status lands in `Api` with
//! the numeric code and the upstream message, if any.

use thiserror::Error;

/// Name used as the prefix of API status messages.
pub const API_NAME: &str = "OpenCage";

pub type Result<T> = std::result::Result<T, GeocodeError>;

/// Errors returned while building requests or interpreting responses.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// No API key was supplied and none could be found in the environment.
    #[error("no API key found: set the {env_var} environment variable or pass `{parameter}`")]
    MissingCredential {
        env_var: String,
        parameter: &'static str,
    },

    /// The caller supplied structurally invalid request parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The response body was missing or did not have the expected shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Status 402 or 403: quota exhausted or access denied.
    #[error("{}", status_message(*code, message.as_deref()))]
    QuotaOrAccess { code: u16, message: Option<String> },

    /// Any other non-200 API status.
    #[error("{}", status_message(*code, message.as_deref()))]
    Api { code: u16, message: Option<String> },

    /// The transport could not complete the HTTP round-trip.
    #[error("transport error: {0}")]
    Transport(String),
}

impl GeocodeError {
    /// True when no further calls should be made with the same credentials.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GeocodeError::QuotaOrAccess { .. })
    }

    /// The API status code, for failures classified from a response payload.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GeocodeError::QuotaOrAccess { code, .. } | GeocodeError::Api { code, .. } => {
                Some(*code)
            }
            _ => None,
        }
    }
}

/// `"<API name> error <code>: <message>"`, or without the suffix when the
/// upstream message is absent or blank.
pub(crate) fn status_message(code: u16, message: Option<&str>) -> String {
    match message.map(str::trim).filter(|m| !m.is_empty()) {
        Some(msg) => format!("{API_NAME} error {code}: {msg}"),
        None => format!("{API_NAME} error {code}"),
    }
}
