use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The externally visible representation of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Identity {
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: String,
}

impl Identity {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            display_name: display_name.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// A stored user: the identity plus the secret it is looked up by.
///
/// Records deserialize from the same shape the memory backend is configured
/// with (`username`, `email`, `display_name`, `password`). The password is
/// never serialized and never printed.
#[derive(Clone, Deserialize, Serialize)]
pub struct CredentialRecord {
    #[serde(flatten)]
    identity: Identity,
    #[serde(skip_serializing)]
    password: String,
}

impl CredentialRecord {
    pub fn new(identity: Identity, password: impl Into<String>) -> Self {
        Self {
            identity,
            password: password.into(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn into_identity(self) -> Identity {
        self.identity
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("identity", &self.identity)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Claims carried by an issued token.
///
/// `exp` is an absolute expiry in nanoseconds since the unix epoch.
#[derive(Debug, Serialize)]
pub(crate) struct Claims {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) display_name: String,
    pub(crate) iss: String,
    pub(crate) exp: i64,
}

/// A token payload as it comes off the wire, before each field is checked.
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    pub(crate) username: Option<Value>,
    pub(crate) email: Option<Value>,
    pub(crate) display_name: Option<Value>,
    pub(crate) exp: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_debug_hides_password() {
        let record = CredentialRecord::new(Identity::new("hugo", "", ""), "hunter2");
        let printed = format!("{:?}", record);
        assert!(printed.contains("hugo"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn record_deserializes_flat_and_never_serializes_password() {
        let record: CredentialRecord = serde_json::from_str(
            r#"{"username":"test","email":"t@example.com","display_name":"Test","password":"pw"}"#,
        )
        .unwrap();
        assert_eq!(record.identity().username(), "test");
        assert_eq!(record.identity().email(), "t@example.com");
        assert_eq!(record.password(), "pw");

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["display_name"], "Test");
    }
}
