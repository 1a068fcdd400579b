//! Wire DTOs and transport errors for the client/backend boundary.
//!
//! DESIGN
//! ======
//! `User` uses the backend's field names on the wire (`full_name`,
//! `is_superuser`) so the persisted identity record, the profile endpoint's
//! response, and `/auth/me` all share one serialized shape.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by the authenticated transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request exceeded the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// The backend rejected the credential; the session has been invalidated.
    #[error("unauthorized: {body}")]
    Unauthorized { body: String },

    /// The backend returned any other non-success status.
    #[error("API response error: status {status}")]
    Status { status: u16, body: String },

    /// A success body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl TransportError {
    /// HTTP status carried by this error, if the backend answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() { Self::Timeout(e.to_string()) } else { Self::Request(e.to_string()) }
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// Identity record of the signed-in user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(rename = "full_name", default)]
    pub display_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(rename = "is_superuser", default)]
    pub is_privileged: bool,
}

fn default_true() -> bool {
    true
}

impl User {
    /// Overlay every field present in `patch`.
    pub fn merge(&mut self, patch: UserPatch) {
        if let Some(id) = patch.id {
            self.id = id;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(display_name) = patch.display_name {
            self.display_name = display_name;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(is_privileged) = patch.is_privileged {
            self.is_privileged = is_privileged;
        }
    }

    /// Name to show in greetings: display name, falling back to email.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// Partial identity fields, used both for profile-update requests and for
/// merging profile responses into the stored user.
///
/// `display_name` distinguishes an absent field (`None`) from an explicit
/// `null` (`Some(None)`), which clears the name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        rename = "full_name",
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(rename = "is_superuser", default, skip_serializing_if = "Option::is_none")]
    pub is_privileged: Option<bool>,
}

impl UserPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<User> for UserPatch {
    fn from(user: User) -> Self {
        Self {
            id: Some(user.id),
            email: Some(user.email),
            display_name: Some(user.display_name),
            is_active: Some(user.is_active),
            is_privileged: Some(user.is_privileged),
        }
    }
}

/// A field that is present, even as `null`, becomes `Some(_)`.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// AUTH ENDPOINTS
// =============================================================================

/// Body for `POST /auth/test-login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Success body of the credential exchange.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user_id: i64,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl LoginResponse {
    /// Map the login payload into an identity record.
    ///
    /// The endpoint only authenticates active users, and `role == "admin"`
    /// marks a privileged account.
    #[must_use]
    pub fn to_user(&self) -> User {
        User {
            id: self.user_id,
            email: self.email.clone(),
            display_name: self.name.clone(),
            is_active: true,
            is_privileged: self.role.as_deref() == Some("admin"),
        }
    }
}

/// Body for `POST /auth/register`.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
    pub full_name: Option<&'a str>,
}
