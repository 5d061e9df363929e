//! Crate-wide error hierarchy for the GitHub adapter.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type GithubAdapterResult<T> = Result<T, GithubAdapterError>;

/// Root error type for the adapter crate.
#[derive(Debug, Error)]
pub enum GithubAdapterError {
    /// Transport-level failure (DNS, connect, timeout, reset).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Non-200 response from the token-exchange endpoint. Carries the
    /// provider's own error payload verbatim.
    #[error("oauth exchange rejected by provider: {0}")]
    OAuthExchange(serde_json::Value),

    /// Non-2xx response from an API endpoint outside the exchange.
    #[error("api error: status {status}")]
    Api {
        status: u16,
        payload: serde_json::Value,
    },

    /// Body could not be decoded as JSON where JSON was required.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A request was prepared without a current access token.
    #[error("no access token set for configuration '{0}'")]
    MissingAccessToken(String),

    /// Scope verification rejected a call before it was sent.
    #[error("scope '{scope}' not granted to configuration '{configuration}'")]
    MissingScope {
        scope: String,
        configuration: String,
    },

    /// Configuration problems (unknown name, missing env var).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Input validation errors (malformed exchange payloads, bad fields).
    #[error("validation error: {0}")]
    Validation(String),
}

/// Transport boundary errors, independent of the concrete HTTP client.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without an HTTP status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// The descriptor could not be turned into a request (bad host, bad URL).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The response could not be read off the wire.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Configuration and setup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration registered under the requested name.
    #[error("unknown configuration '{0}'")]
    UnknownConfiguration(String),

    /// Required environment variable absent or empty.
    #[error("missing environment variable '{0}'")]
    MissingEnv(String),
}

// ===== Mapping from reqwest::Error into TransportError =====

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return TransportError::Timeout;
        }
        if e.is_builder() || e.is_request() {
            return TransportError::InvalidRequest(e.to_string());
        }
        if e.is_body() || e.is_decode() {
            return TransportError::InvalidResponse(e.to_string());
        }
        TransportError::Network(e.to_string())
    }
}
