//! Logical request descriptors handed to the transport collaborator.

use std::collections::HashMap;

use reqwest::Method;

/// A short-lived description of one HTTP call.
///
/// Built by an endpoint method, completed in place by the preparer
/// (credentials, identifying headers, default host), then consumed by the
/// transport. Header and query maps start empty so injected entries never
/// displace anything the endpoint set itself.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Host override; `None` resolves to the adapter's default API host.
    pub hostname: Option<String>,
    /// Port override; `None` resolves to 443.
    pub port: Option<u16>,
    /// Path relative to the host, without a leading slash.
    pub path: String,
    pub headers: HashMap<String, String>,
    pub query: HashMap<String, String>,
    /// Form-encoded body, if any.
    pub form: Option<HashMap<String, String>>,
    /// Scopes this call needs; checked by the preparer unless verification
    /// is bypassed.
    pub required_scopes: Vec<String>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            hostname: None,
            port: None,
            path: path.into(),
            headers: HashMap::new(),
            query: HashMap::new(),
            form: None,
            required_scopes: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_form(mut self, form: HashMap<String, String>) -> Self {
        self.form = Some(form);
        self
    }

    pub fn with_required_scope(mut self, scope: impl Into<String>) -> Self {
        self.required_scopes.push(scope.into());
        self
    }
}
