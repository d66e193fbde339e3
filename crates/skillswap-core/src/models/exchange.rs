//! Exchange request models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{SkillSummary, UserProfile};

/// Lifecycle of an exchange request. Serialized lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum ExchangeStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
    /// Withdrawn by the requester
    Cancelled,
}

impl ExchangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeStatus::Pending => "pending",
            ExchangeStatus::Accepted => "accepted",
            ExchangeStatus::Rejected => "rejected",
            ExchangeStatus::Completed => "completed",
            ExchangeStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the skill owner may move a request into this status.
    /// Cancelling is the requester's withdraw, not an answer.
    pub fn is_response(&self) -> bool {
        !matches!(self, ExchangeStatus::Cancelled)
    }
}

impl fmt::Display for ExchangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExchangeStatus {
    type Err = String;

    /// Case-insensitive, so "Accepted" from older clients still parses.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ExchangeStatus::Pending),
            "accepted" => Ok(ExchangeStatus::Accepted),
            "rejected" => Ok(ExchangeStatus::Rejected),
            "completed" => Ok(ExchangeStatus::Completed),
            "cancelled" | "canceled" => Ok(ExchangeStatus::Cancelled),
            other => Err(format!(
                "Invalid status '{}'. Must be one of: pending, accepted, rejected, completed, cancelled",
                other
            )),
        }
    }
}

/// An exchange request as listed by `/exchanges/`.
///
/// The listing endpoint returns loosely-shaped dicts, so everything past the
/// ids is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ExchangeRequest {
    pub id: i64,
    pub skill_id: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub requester_id: Option<i64>,
    #[serde(default)]
    pub skill_owner_id: Option<i64>,
    #[serde(default, deserialize_with = "status_lenient")]
    pub status: Option<ExchangeStatus>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub skill: Option<SkillSummary>,
    #[serde(default)]
    pub requester: Option<UserProfile>,
    #[serde(default)]
    pub skill_owner: Option<UserProfile>,
}

fn status_lenient<'de, D>(deserializer: D) -> Result<Option<ExchangeStatus>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

impl ExchangeRequest {
    /// Whether `user` owns the requested skill and may accept or reject.
    pub fn is_incoming_for(&self, user: &UserProfile) -> bool {
        self.skill_owner_id == Some(user.id)
    }

    pub fn skill_title(&self) -> &str {
        self.skill.as_ref().map(|s| s.title.as_str()).unwrap_or("(unknown skill)")
    }

    pub fn status_display(&self) -> &'static str {
        self.status.map(|s| s.as_str()).unwrap_or("unknown")
    }
}

/// Body for `POST /exchanges/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewExchangeRequest {
    pub skill_id: i64,
    pub message: String,
}

impl NewExchangeRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.skill_id <= 0 {
            return Err("A skill must be selected".to_string());
        }
        if self.message.trim().is_empty() {
            return Err("Please tell the owner what you would like to learn".to_string());
        }
        Ok(())
    }
}

/// Body for `PUT /exchanges/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: ExchangeStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_any_case() {
        assert_eq!("Accepted".parse::<ExchangeStatus>(), Ok(ExchangeStatus::Accepted));
        assert_eq!("rejected".parse::<ExchangeStatus>(), Ok(ExchangeStatus::Rejected));
        assert!("maybe".parse::<ExchangeStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let body = serde_json::to_value(StatusUpdate { status: ExchangeStatus::Accepted }).expect("serialize");
        assert_eq!(body, serde_json::json!({"status": "accepted"}));
    }

    #[test]
    fn test_parse_request_with_legacy_status() {
        let json = r#"{"id": 2, "skill_id": 5, "message": "hi", "requester_id": 1,
            "skill_owner_id": 3, "status": "Accepted", "created_at": "2024-04-04T09:00:00"}"#;
        let request: ExchangeRequest = serde_json::from_str(json).expect("request should parse");
        assert_eq!(request.status, Some(ExchangeStatus::Accepted));
        assert_eq!(request.skill_title(), "(unknown skill)");
    }

    #[test]
    fn test_parse_request_with_unknown_status() {
        let json = r#"{"id": 2, "skill_id": 5, "status": "archived"}"#;
        let request: ExchangeRequest = serde_json::from_str(json).expect("request should parse");
        assert_eq!(request.status, None);
        assert_eq!(request.status_display(), "unknown");
    }

    #[test]
    fn test_parse_withdrawn_request() {
        let json = r#"{"id": 1, "skill_id": 3, "status": "cancelled"}"#;
        let request: ExchangeRequest = serde_json::from_str(json).expect("request should parse");
        assert_eq!(request.status, Some(ExchangeStatus::Cancelled));
        assert_eq!(request.status_display(), "cancelled");
        assert!(!ExchangeStatus::Cancelled.is_response());
        assert!(ExchangeStatus::Accepted.is_response());
    }

    #[test]
    fn test_parse_listing_with_nested_skill() {
        let json = r#"{"id": 4, "skill_id": 3, "requester_id": 2, "skill_owner_id": 1,
            "message": "teach me", "status": "pending", "created_at": "2024-05-01T10:00:00",
            "updated_at": null,
            "requester": {"id": 2, "username": "bob", "email": "bob@example.com", "full_name": "Bob"},
            "skill": {"id": 3, "title": "Guitar", "category": "Music", "proficiency_level": "Expert"},
            "skill_owner": {"id": 1, "username": "alice", "email": "alice@example.com", "full_name": "Alice"}}"#;
        let request: ExchangeRequest = serde_json::from_str(json).expect("request should parse");
        assert_eq!(request.skill_title(), "Guitar");
        assert_eq!(request.skill.map(|s| s.category), Some("Music".to_string()));
    }

    #[test]
    fn test_new_request_validation() {
        let ok = NewExchangeRequest { skill_id: 5, message: "hi".to_string() };
        assert!(ok.validate().is_ok());
        let blank = NewExchangeRequest { skill_id: 5, message: "  ".to_string() };
        assert!(blank.validate().is_err());
        let no_skill = NewExchangeRequest { skill_id: 0, message: "hi".to_string() };
        assert!(no_skill.validate().is_err());
    }
}
