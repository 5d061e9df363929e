//! User model: the `GET user` payload.

use serde_json::Value;

/// Immutable view over a decoded user payload.
///
/// No validation happens at construction; absent or mistyped fields simply
/// read as `None`.
#[derive(Debug, Clone)]
pub struct User {
    json: Value,
}

impl User {
    pub fn new(json: Value) -> Self {
        Self { json }
    }

    /// The raw decoded payload.
    pub fn json(&self) -> &Value {
        &self.json
    }

    pub fn id(&self) -> Option<u64> {
        self.json.get("id").and_then(Value::as_u64)
    }

    pub fn name(&self) -> Option<&str> {
        self.json.get("name").and_then(Value::as_str)
    }

    pub fn login(&self) -> Option<&str> {
        self.json.get("login").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accessors_read_decoded_fields() {
        let user = User::new(json!({
            "id": 583231,
            "name": "The Octocat",
            "login": "octocat"
        }));
        assert_eq!(user.id(), Some(583231));
        assert_eq!(user.name(), Some("The Octocat"));
        assert_eq!(user.login(), Some("octocat"));
        assert_eq!(user.json()["login"], "octocat");
    }

    #[test]
    fn malformed_payload_reads_as_none() {
        let user = User::new(json!({"id": "not-a-number"}));
        assert_eq!(user.id(), None);
        assert_eq!(user.name(), None);
        assert_eq!(user.login(), None);

        let null_user = User::new(Value::Null);
        assert_eq!(null_user.login(), None);
    }
}
