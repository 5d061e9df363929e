//! GitHub adapter for a generic bot host.
//!
//! This crate owns the provider-specific protocol logic and nothing else:
//!   * the OAuth2 authorization-code handshake (authorize URL, code
//!     extraction, token exchange, bootstrap identity resolution)
//!   * per-request credential injection and the identifying `User-Agent`
//!   * rate-limit introspection from response headers
//!   * the typed `User` view over the identity payload.
//!
//! Raw HTTP I/O sits behind the [`Transport`] trait; queuing, retries,
//! credential persistence and configuration loading remain host concerns.
//! Every operation is an async method on [`GithubAdapter`], the session
//! object holding the selected configuration, the current access token and
//! the scope-verification flag.

mod adapter;
mod config;
mod errors;
mod oauth;
mod rate_limit;
mod request;
mod transport;

pub mod models;

pub use adapter::{GithubAdapter, USER_AGENT};
pub use config::{ConfigSet, DEFAULT_SCOPES, GithubConfig, GithubDefaults};
pub use errors::{ConfigError, GithubAdapterError, GithubAdapterResult, TransportError};
pub use oauth::{
    AUTHORIZE_PATH, AccessTokenData, Authorization, EXCHANGE_PATH, extract_authorization_code,
};
pub use rate_limit::{RateLimitSnapshot, remaining_requests};
pub use request::RequestDescriptor;
pub use transport::{HttpTransport, Transport, TransportResponse};
