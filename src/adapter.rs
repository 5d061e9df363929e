//! Session object for one GitHub account: current credentials, scope
//! verification, request preparation and the identity endpoint.
//!
//! All mutable session state (current access token, verification flag)
//! lives here and changes only through `&mut self`, so a handshake in
//! progress cannot race with other calls on the same session.

use serde_json::Value;
use tracing::debug;

use crate::config::{DEFAULT_SCOPES, GithubConfig, GithubDefaults};
use crate::errors::{GithubAdapterError, GithubAdapterResult};
use crate::models::User;
use crate::rate_limit;
use crate::request::RequestDescriptor;
use crate::transport::{HttpTransport, Transport, TransportResponse};

/// Identifier sent with every prepared request.
pub const USER_AGENT: &str = "RMasterBot - RMBGithub";

/// Adapter session bound to one selected configuration and one transport.
#[derive(Debug)]
pub struct GithubAdapter<T: Transport = HttpTransport> {
    pub(crate) config: GithubConfig,
    pub(crate) defaults: GithubDefaults,
    pub(crate) transport: T,
    pub(crate) access_token: Option<String>,
    pub(crate) verify_scopes_before_call: bool,
}

impl GithubAdapter<HttpTransport> {
    /// Opens a session over the default HTTPS transport.
    pub fn from_config(config: GithubConfig) -> GithubAdapterResult<Self> {
        let transport = HttpTransport::new()?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> GithubAdapter<T> {
    /// Opens a session over a host-supplied transport.
    ///
    /// An access token persisted on the configuration becomes the current
    /// token immediately.
    pub fn with_transport(config: GithubConfig, transport: T) -> Self {
        let access_token = config.access_token.clone();
        Self {
            config,
            defaults: GithubDefaults::default(),
            transport,
            access_token,
            verify_scopes_before_call: true,
        }
    }

    /// Overrides provider constants, mainly for self-hosted deployments.
    pub fn with_defaults(mut self, defaults: GithubDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn configuration(&self) -> &GithubConfig {
        &self.config
    }

    pub fn defaults(&self) -> &GithubDefaults {
        &self.defaults
    }

    pub fn current_access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Installs `token` as the credential for subsequent prepared requests.
    /// Persistence stays with the host.
    pub fn set_current_access_token(&mut self, token: impl Into<String>) {
        self.access_token = Some(token.into());
    }

    pub fn verify_scopes_before_call(&self) -> bool {
        self.verify_scopes_before_call
    }

    pub fn set_verify_scopes_before_call(&mut self, verify: bool) {
        self.verify_scopes_before_call = verify;
    }

    /// Completes a descriptor for sending: scope check, credential in the
    /// query map, identifying `User-Agent` header.
    ///
    /// Only the two injected keys are (re)written; sibling entries in the
    /// query and header maps survive.
    pub fn prepare_request(&self, descriptor: &mut RequestDescriptor) -> GithubAdapterResult<()> {
        self.prepare_with_verification(descriptor, self.verify_scopes_before_call)
    }

    /// Preparation with the scope check decided by the caller instead of
    /// session state. The bootstrap identity lookup passes `false` here;
    /// the session flag itself never toggles, so a call dropped mid-flight
    /// cannot leave verification disabled.
    pub(crate) fn prepare_with_verification(
        &self,
        descriptor: &mut RequestDescriptor,
        verify_scopes: bool,
    ) -> GithubAdapterResult<()> {
        if verify_scopes {
            self.verify_required_scopes(descriptor)?;
        }

        let token = self
            .access_token
            .as_deref()
            .ok_or_else(|| GithubAdapterError::MissingAccessToken(self.config.name.clone()))?;

        descriptor
            .query
            .insert("access_token".to_string(), token.to_string());
        descriptor
            .headers
            .insert("User-Agent".to_string(), USER_AGENT.to_string());
        Ok(())
    }

    /// Prepares the descriptor, fills in the default API host, and hands it
    /// to the transport. No retries; failures bubble verbatim.
    pub async fn send(
        &self,
        descriptor: RequestDescriptor,
    ) -> GithubAdapterResult<TransportResponse> {
        self.send_with_verification(descriptor, self.verify_scopes_before_call)
            .await
    }

    pub(crate) async fn send_with_verification(
        &self,
        mut descriptor: RequestDescriptor,
        verify_scopes: bool,
    ) -> GithubAdapterResult<TransportResponse> {
        self.prepare_with_verification(&mut descriptor, verify_scopes)?;
        if descriptor.hostname.is_none() {
            descriptor.hostname = Some(self.defaults.hostname.clone());
        }
        if descriptor.port.is_none() {
            descriptor.port = Some(self.defaults.port);
        }
        debug!(method = %descriptor.method, path = %descriptor.path, "sending prepared request");
        Ok(self.transport.execute(descriptor).await?)
    }

    /// `GET user`: resolves the identity behind the current access token.
    pub async fn me(&self) -> GithubAdapterResult<User> {
        self.identity_lookup(self.verify_scopes_before_call).await
    }

    pub(crate) async fn identity_lookup(&self, verify_scopes: bool) -> GithubAdapterResult<User> {
        let descriptor = RequestDescriptor::get("user").with_required_scope("user");
        let response = self
            .send_with_verification(descriptor, verify_scopes)
            .await?;
        if !(200..300).contains(&response.status) {
            // Error pages are not always JSON; keep the raw body so the
            // status is never hidden behind a decode failure.
            let payload = serde_json::from_str(&response.body)
                .unwrap_or_else(|_| Value::String(response.body.clone()));
            return Err(GithubAdapterError::Api {
                status: response.status,
                payload,
            });
        }
        Ok(User::new(serde_json::from_str(&response.body)?))
    }

    /// Remaining request quota reported on a completed response.
    pub fn remaining_requests_from_response(&self, response: &TransportResponse) -> Option<u64> {
        rate_limit::remaining_requests(response)
    }

    /// Scopes treated as granted when checking a descriptor. Falls back to
    /// the default scope list when the configuration names none, matching
    /// the authorize-URL fallback.
    fn granted_scopes(&self) -> Vec<&str> {
        let configured = self.config.granted_scopes();
        if configured.is_empty() {
            DEFAULT_SCOPES.split(',').collect()
        } else {
            configured
        }
    }

    fn verify_required_scopes(&self, descriptor: &RequestDescriptor) -> GithubAdapterResult<()> {
        if descriptor.required_scopes.is_empty() {
            return Ok(());
        }
        let granted = self.granted_scopes();
        for required in &descriptor.required_scopes {
            if !granted.contains(&required.as_str()) {
                return Err(GithubAdapterError::MissingScope {
                    scope: required.clone(),
                    configuration: self.config.name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransportError;
    use crate::transport::mock::MockTransport;
    use reqwest::Method;

    fn config() -> GithubConfig {
        GithubConfig {
            name: "main".to_string(),
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            access_token: Some("tok".to_string()),
            callback_uri: "http://localhost:8080/callback".to_string(),
            scopes: None,
        }
    }

    fn adapter_with(transport: MockTransport) -> GithubAdapter<MockTransport> {
        GithubAdapter::with_transport(config(), transport)
    }

    #[test]
    fn prepare_injects_credential_and_user_agent() {
        let adapter = adapter_with(MockTransport::new());
        let mut d = RequestDescriptor::get("user");
        adapter.prepare_request(&mut d).unwrap();

        assert_eq!(d.query.get("access_token").unwrap(), "tok");
        assert_eq!(d.headers.get("User-Agent").unwrap(), USER_AGENT);
    }

    #[test]
    fn prepare_keeps_sibling_entries() {
        let adapter = adapter_with(MockTransport::new());
        let mut d = RequestDescriptor::get("user")
            .with_query("per_page", "10")
            .with_header("Accept", "application/json");
        adapter.prepare_request(&mut d).unwrap();

        assert_eq!(d.query.get("per_page").unwrap(), "10");
        assert_eq!(d.query.get("access_token").unwrap(), "tok");
        assert_eq!(d.headers.get("Accept").unwrap(), "application/json");
        assert_eq!(d.headers.get("User-Agent").unwrap(), USER_AGENT);
    }

    #[test]
    fn prepare_without_token_fails() {
        let mut cfg = config();
        cfg.access_token = None;
        let adapter = GithubAdapter::with_transport(cfg, MockTransport::new());
        let mut d = RequestDescriptor::get("user");

        assert!(matches!(
            adapter.prepare_request(&mut d),
            Err(GithubAdapterError::MissingAccessToken(name)) if name == "main"
        ));
    }

    #[test]
    fn scope_verification_rejects_ungranted_scope() {
        let mut cfg = config();
        cfg.scopes = Some("gist".to_string());
        let adapter = GithubAdapter::with_transport(cfg, MockTransport::new());
        let mut d = RequestDescriptor::get("user").with_required_scope("user");

        assert!(matches!(
            adapter.prepare_request(&mut d),
            Err(GithubAdapterError::MissingScope { scope, .. }) if scope == "user"
        ));
    }

    #[test]
    fn scope_verification_can_be_disabled() {
        let mut cfg = config();
        cfg.scopes = Some("gist".to_string());
        let mut adapter = GithubAdapter::with_transport(cfg, MockTransport::new());
        adapter.set_verify_scopes_before_call(false);

        let mut d = RequestDescriptor::get("user").with_required_scope("user");
        adapter.prepare_request(&mut d).unwrap();
        assert_eq!(d.query.get("access_token").unwrap(), "tok");
    }

    #[test]
    fn default_scope_list_covers_unconfigured_accounts() {
        // No scopes on the configuration: verification falls back to the
        // full default list, so `user` is accepted.
        let adapter = adapter_with(MockTransport::new());
        let mut d = RequestDescriptor::get("user").with_required_scope("user");
        adapter.prepare_request(&mut d).unwrap();
    }

    #[tokio::test]
    async fn send_fills_default_host_and_delegates() {
        let adapter = adapter_with(MockTransport::returning(200, "{}"));
        adapter.send(RequestDescriptor::get("user")).await.unwrap();

        let seen = adapter.transport.seen_requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].hostname.as_deref(), Some("api.github.com"));
        assert_eq!(seen[0].port, Some(443));
        assert_eq!(seen[0].query.get("access_token").unwrap(), "tok");
    }

    #[tokio::test]
    async fn me_decodes_user_model() {
        let adapter = adapter_with(MockTransport::returning(
            200,
            r#"{"id":583231,"name":"The Octocat","login":"octocat"}"#,
        ));
        let user = adapter.me().await.unwrap();
        assert_eq!(user.login(), Some("octocat"));
        assert_eq!(user.id(), Some(583231));

        let seen = adapter.transport.seen_requests();
        assert_eq!(seen[0].method, Method::GET);
        assert_eq!(seen[0].path, "user");
    }

    #[tokio::test]
    async fn me_surfaces_api_errors_with_payload() {
        let adapter = adapter_with(MockTransport::returning(
            401,
            r#"{"message":"Bad credentials"}"#,
        ));
        match adapter.me().await {
            Err(GithubAdapterError::Api { status, payload }) => {
                assert_eq!(status, 401);
                assert_eq!(payload["message"], "Bad credentials");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn me_keeps_status_when_error_body_is_not_json() {
        // Gateway error pages come back as HTML/plain text; the status
        // must not be hidden behind a decode failure.
        let adapter = adapter_with(MockTransport::returning(502, "Bad Gateway"));
        match adapter.me().await {
            Err(GithubAdapterError::Api { status, payload }) => {
                assert_eq!(status, 502);
                assert_eq!(payload, Value::String("Bad Gateway".to_string()));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_errors_bubble_unwrapped() {
        let adapter = adapter_with(MockTransport::failing(TransportError::Timeout));
        assert!(matches!(
            adapter.me().await,
            Err(GithubAdapterError::Transport(TransportError::Timeout))
        ));
    }
}
