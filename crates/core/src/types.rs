use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

fn default_role() -> String {
    "user".to_string()
}

/// Profile of the authenticated user as returned by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Absent for accounts created through phone OTP
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub avatar_seed: Option<String>,
    #[serde(default)]
    pub avatar_style: Option<String>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            email: None,
            phone_number: None,
            role: default_role(),
            avatar_seed: None,
            avatar_style: None,
        }
    }
}

impl User {
    /// Name shown in the dashboard header
    pub fn display_name(&self) -> &str {
        self.email
            .as_deref()
            .or(self.phone_number.as_deref())
            .unwrap_or("unknown")
    }
}

/// Server-tracked record of one authenticated client instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    /// `None` when the service sent no timestamp or one that is not RFC 3339
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub revoked_at: Option<DateTime<Utc>>,
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
        .map(|parsed| parsed.with_timezone(&Utc)))
}

impl Session {
    /// Check if the session is still active (revoked_at is None)
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }
}
