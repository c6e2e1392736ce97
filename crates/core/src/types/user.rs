//! User identities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::UserId;

/// Display name given to every anonymous identity.
pub const GUEST_DISPLAY_NAME: &str = "Guest User";

/// A user known to CalorieQuest, either an anonymous guest or someone
/// verified by an external identity provider.
///
/// The external subject id is kept server-side: it is skipped when the
/// identity is serialized into a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(rename = "user_id")]
    pub id: UserId,
    pub email: Option<Email>,
    pub display_name: String,
    pub is_guest: bool,
    pub created_at: DateTime<Utc>,
    /// Subject id assigned by the external provider; `None` for guests.
    #[serde(skip_serializing, default)]
    pub external_id: Option<String>,
}

impl UserIdentity {
    /// Mint a fresh anonymous identity timestamped now.
    #[must_use]
    pub fn guest() -> Self {
        Self {
            id: UserId::generate(),
            email: None,
            display_name: GUEST_DISPLAY_NAME.to_string(),
            is_guest: true,
            created_at: Utc::now(),
            external_id: None,
        }
    }

    /// Mint a fresh identity bound to an external subject id.
    #[must_use]
    pub fn external(
        external_id: impl Into<String>,
        email: Option<Email>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId::generate(),
            email,
            display_name: display_name.into(),
            is_guest: false,
            created_at: Utc::now(),
            external_id: Some(external_id.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_identity() {
        let guest = UserIdentity::guest();
        assert!(guest.is_guest);
        assert!(guest.email.is_none());
        assert!(guest.external_id.is_none());
        assert_eq!(guest.display_name, GUEST_DISPLAY_NAME);
        assert_ne!(guest.id, UserIdentity::guest().id);
    }

    #[test]
    fn test_external_identity() {
        let email = Email::parse("diner@example.com").unwrap();
        let user = UserIdentity::external("google-123", Some(email), "Diner");
        assert!(!user.is_guest);
        assert_eq!(user.external_id.as_deref(), Some("google-123"));
    }

    #[test]
    fn test_serialization_hides_external_id() {
        let user = UserIdentity::external("google-123", None, "Diner");
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["user_id"], user.id.as_str());
        assert_eq!(json["is_guest"], false);
        assert!(json["email"].is_null());
        assert!(json.get("external_id").is_none());
    }
}
