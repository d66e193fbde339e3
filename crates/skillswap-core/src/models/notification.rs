use serde::{Deserialize, Serialize};

/// A notification addressed to the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Notification {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub related_id: Option<i64>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Response of `/notifications/unread-count`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UnreadCount {
    #[serde(alias = "count")]
    pub unread_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_notification() {
        let json = r#"{"id": 1, "user_id": 2, "title": "New request", "message": "bob wants Guitar",
            "type": "exchange_request", "related_id": 11, "is_read": false, "created_at": "2024-02-02T12:00:00"}"#;
        let n: Notification = serde_json::from_str(json).expect("notification should parse");
        assert_eq!(n.kind, "exchange_request");
        assert!(!n.is_read);
    }

    #[test]
    fn test_parse_unread_count_alias() {
        let a: UnreadCount = serde_json::from_str(r#"{"unread_count": 3}"#).expect("parse");
        let b: UnreadCount = serde_json::from_str(r#"{"count": 4}"#).expect("parse");
        assert_eq!(a.unread_count, 3);
        assert_eq!(b.unread_count, 4);
    }
}
