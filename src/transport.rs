//! Transport boundary between the adapter and the host's HTTP stack.
//!
//! The adapter never performs I/O itself: every network-bound operation
//! hands a completed [`RequestDescriptor`] to a [`Transport`] and awaits
//! the response. [`HttpTransport`] is the production implementation; hosts
//! (and tests) can substitute their own.

use std::collections::HashMap;
use std::future::Future;

use reqwest::Url;
use tracing::debug;

use crate::errors::TransportError;
use crate::request::RequestDescriptor;

/// Completed-response view handed back by a transport.
///
/// Header names are lowercased so extractors can index them directly.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl TransportResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Performs the HTTP call described by a descriptor.
///
/// Implementations must invoke the request exactly once and never retry;
/// failures surface verbatim to the caller.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        descriptor: RequestDescriptor,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// Default transport over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    scheme: String,
}

impl HttpTransport {
    /// Constructs an HTTPS transport with a shared client.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(TransportError::from)?;
        Ok(Self {
            client,
            scheme: "https".to_string(),
        })
    }

    /// Overrides the URL scheme. Plain `http` is only useful against local
    /// test servers.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    fn build_url(&self, d: &RequestDescriptor) -> Result<Url, TransportError> {
        let host = d
            .hostname
            .as_deref()
            .ok_or_else(|| TransportError::InvalidRequest("descriptor has no hostname".to_string()))?;

        let mut url = Url::parse(&format!("{}://{}", self.scheme, host))
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        if let Some(port) = d.port {
            url.set_port(Some(port))
                .map_err(|_| TransportError::InvalidRequest(format!("cannot set port on {url}")))?;
        }
        url.set_path(d.path.trim_start_matches('/'));
        for (name, value) in &d.query {
            url.query_pairs_mut().append_pair(name, value);
        }
        Ok(url)
    }
}

impl Transport for HttpTransport {
    async fn execute(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<TransportResponse, TransportError> {
        let url = self.build_url(&descriptor)?;
        debug!(method = %descriptor.method, %url, "executing request");

        let mut request = self.client.request(descriptor.method.clone(), url);
        for (name, value) in &descriptor.headers {
            request = request.header(name, value);
        }
        if let Some(form) = &descriptor.form {
            request = request.form(form);
        }

        let response = request.send().await.map_err(TransportError::from)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_ascii_lowercase(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response.text().await.map_err(TransportError::from)?;

        debug!(status, bytes = body.len(), "response received");
        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory transport used by adapter and handshake tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::{Transport, TransportResponse};
    use crate::errors::TransportError;
    use crate::request::RequestDescriptor;

    pub(crate) struct MockTransport {
        responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
        pub(crate) seen: Mutex<Vec<RequestDescriptor>>,
    }

    impl MockTransport {
        pub(crate) fn new() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn returning(status: u16, body: &str) -> Self {
            Self::new().then_status(status, body)
        }

        pub(crate) fn then_status(self, status: u16, body: &str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(Ok(TransportResponse {
                    status,
                    headers: Default::default(),
                    body: body.to_string(),
                }));
            self
        }

        pub(crate) fn failing(error: TransportError) -> Self {
            let mock = Self::new();
            mock.responses.lock().unwrap().push_back(Err(error));
            mock
        }

        pub(crate) fn seen_requests(&self) -> Vec<RequestDescriptor> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Transport for MockTransport {
        async fn execute(
            &self,
            descriptor: RequestDescriptor,
        ) -> Result<TransportResponse, TransportError> {
            self.seen.lock().unwrap().push(descriptor);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(TransportError::InvalidResponse(
                        "mock transport exhausted".to_string(),
                    ))
                })
        }
    }
}
