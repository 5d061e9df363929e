//! OAuth2 authorization-code handshake.
//!
//! Four discrete phases, each its own call:
//!   1. authorize-URL construction (pure, no network)
//!   2. authorization-code extraction from the redirect
//!   3. code-for-token exchange against the web host
//!   4. bootstrap identity resolution with the new token.
//!
//! `authorize_from_redirect` composes phases 2-4 into one pipeline.

use std::collections::HashMap;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::adapter::GithubAdapter;
use crate::config::DEFAULT_SCOPES;
use crate::errors::{GithubAdapterError, GithubAdapterResult};
use crate::request::RequestDescriptor;
use crate::transport::Transport;

pub const AUTHORIZE_PATH: &str = "login/oauth/authorize";
pub const EXCHANGE_PATH: &str = "login/oauth/access_token";

/// Token-exchange response.
///
/// Every field is optional: after a failed exchange the provider returns an
/// error object instead, and the projections simply read `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenData {
    access_token: Option<String>,
    token_type: Option<String>,
    scope: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, Value>,
}

impl AccessTokenData {
    /// Raw token value, when the exchange succeeded.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Token type reported by the provider, usually `bearer`.
    pub fn token_type(&self) -> Option<&str> {
        self.token_type.as_deref()
    }

    /// Scopes the provider actually granted, comma-separated.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Provider-specific fields outside the standard triple.
    pub fn extra(&self) -> &serde_json::Map<String, Value> {
        &self.extra
    }
}

/// Outcome of a completed handshake: the exchanged token plus the login it
/// resolved to.
#[derive(Debug, Clone)]
pub struct Authorization {
    pub token: AccessTokenData,
    pub login: Option<String>,
}

/// Pulls the `code` query parameter out of a redirected request.
///
/// Accepts absolute URLs and origin-relative request targets. `None` means
/// the authorization was denied or the redirect is malformed; callers must
/// not treat it as retryable.
pub fn extract_authorization_code(redirect_url: &str) -> Option<String> {
    let url = match Url::parse(redirect_url) {
        Ok(url) => url,
        Err(_) => Url::parse("http://localhost")
            .ok()?
            .join(redirect_url)
            .ok()?,
    };

    url.query_pairs()
        .find(|(name, _)| name == "code")
        .map(|(_, value)| value.into_owned())
}

impl<T: Transport> GithubAdapter<T> {
    /// Builds the URL the user must visit to authorize the application.
    ///
    /// Pure string construction. Scope resolution order: `scopes` argument,
    /// configuration scopes, default scope list. Scopes are comma-joined
    /// with commas rendered as `%20`, as the provider expects.
    pub fn authorize_url(&self, scopes: Option<&str>) -> String {
        let scopes = self.scopes_for_authorize(scopes);
        format!(
            "https://{}/{}?redirect_uri={}&client_id={}&scope={}",
            self.defaults.web_hostname,
            AUTHORIZE_PATH,
            urlencoding::encode(&self.config.callback_uri),
            self.config.client_id,
            scopes.replace(',', "%20"),
        )
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// Goes straight through the transport: no credential injection, the
    /// session has no token yet. A 200 body decodes as [`AccessTokenData`];
    /// any other status returns the provider's own error payload verbatim
    /// inside [`GithubAdapterError::OAuthExchange`].
    pub async fn request_access_token(&self, code: &str) -> GithubAdapterResult<AccessTokenData> {
        let form: HashMap<String, String> = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.config.callback_uri.as_str()),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

        let descriptor = RequestDescriptor::post(EXCHANGE_PATH)
            .with_hostname(self.defaults.web_hostname.clone())
            .with_header("Accept", "application/json")
            .with_form(form);

        debug!(client_id = %self.config.client_id, "exchanging authorization code");
        let response = self.transport.execute(descriptor).await?;

        if response.status == 200 {
            Ok(serde_json::from_str(&response.body)?)
        } else {
            let payload: Value = serde_json::from_str(&response.body)?;
            Err(GithubAdapterError::OAuthExchange(payload))
        }
    }

    /// Resolves the login behind a freshly exchanged token.
    ///
    /// Installs the token as current and looks up `me` with scope
    /// verification bypassed for exactly this call: granted scopes are
    /// unknown until the host records them, and identity resolution must
    /// succeed regardless. The bypass is threaded as a parameter rather
    /// than toggled on the session, so the flag keeps its pre-call value
    /// on success, on error, and when the in-flight future is dropped.
    pub async fn user_for_new_access_token(
        &mut self,
        token_data: &AccessTokenData,
    ) -> GithubAdapterResult<Option<String>> {
        let token = token_data.access_token().ok_or_else(|| {
            GithubAdapterError::Validation(
                "exchange response carried no access_token".to_string(),
            )
        })?;
        self.set_current_access_token(token.to_string());

        let user = self.identity_lookup(false).await?;
        Ok(user.login().map(str::to_string))
    }

    /// Full handshake pipeline from a redirected request: extract the code,
    /// exchange it, resolve the identity.
    ///
    /// `Ok(None)` means the redirect carried no code (denied or malformed);
    /// every other failure propagates as an error.
    pub async fn authorize_from_redirect(
        &mut self,
        redirect_url: &str,
    ) -> GithubAdapterResult<Option<Authorization>> {
        let Some(code) = extract_authorization_code(redirect_url) else {
            info!("redirect carried no authorization code");
            return Ok(None);
        };

        let token = self.request_access_token(&code).await?;
        let login = self.user_for_new_access_token(&token).await?;
        info!(
            configuration = %self.config.name,
            login = login.as_deref().unwrap_or("<unresolved>"),
            "authorization completed"
        );
        Ok(Some(Authorization { token, login }))
    }

    fn scopes_for_authorize<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .filter(|s| !s.is_empty())
            .or(self.config.scopes.as_deref())
            .unwrap_or(DEFAULT_SCOPES)
    }
}
