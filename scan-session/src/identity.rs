//! Authenticated principal record.

use serde::{Deserialize, Serialize};

/// Name shown when the provider has no display name for the user.
pub const FALLBACK_DISPLAY_NAME: &str = "Developer";

/// An authenticated principal supplied by the external identity provider.
///
/// The store owns the current identity; consumers receive clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable identifier assigned by the provider
    pub uid: String,
    /// Human-readable name, when the provider has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Contact address, when the provider has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    /// Create an identity with only a stable identifier.
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            email: None,
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Name to greet the user with.
    pub fn greeting_name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => FALLBACK_DISPLAY_NAME,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_name_fallback() {
        let anonymous = Identity::new("uid-1");
        assert_eq!(anonymous.greeting_name(), "Developer");

        let blank = Identity::new("uid-2").with_display_name("   ");
        assert_eq!(blank.greeting_name(), "Developer");

        let named = Identity::new("uid-3").with_display_name("Ada");
        assert_eq!(named.greeting_name(), "Ada");
    }

    #[test]
    fn test_optional_fields_skipped() {
        let json = serde_json::to_string(&Identity::new("uid-1")).unwrap();
        assert_eq!(json, r#"{"uid":"uid-1"}"#);

        let parsed: Identity =
            serde_json::from_str(r#"{"uid":"u","display_name":"Ada"}"#).unwrap();
        assert_eq!(parsed.display_name.as_deref(), Some("Ada"));
        assert!(parsed.email.is_none());
    }
}
