// common/src/models/session.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bearer token issued by the certificate API.
///
/// The value is opaque to the portal: it is stored in a cookie, echoed back
/// as `Authorization: Bearer <token>` and never decoded. Claims such as
/// expiry are left to the API, which rejects stale tokens on use.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token, treating blank values as no token at all
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Keep tokens out of logs
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_is_absent() {
        assert!(SessionToken::new("").is_none());
        assert!(SessionToken::new("   ").is_none());
    }

    #[test]
    fn test_bearer_header_value() {
        let token = SessionToken::new("abc.def.ghi").unwrap();
        assert_eq!(token.bearer(), "Bearer abc.def.ghi");
        assert_eq!(token.as_str(), "abc.def.ghi");
    }

    #[test]
    fn test_debug_hides_value() {
        let token = SessionToken::new("secret-jwt").unwrap();
        assert!(!format!("{:?}", token).contains("secret-jwt"));
    }
}
