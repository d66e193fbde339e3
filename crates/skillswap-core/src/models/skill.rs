//! Skill listing models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::UserProfile;

/// Highest skill value the backend accepts.
pub const MAX_SKILL_VALUE: i32 = 1000;

/// A skill offered by a user, as returned by `/skills/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Skill {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub proficiency_level: String,
    #[serde(default)]
    pub value: Option<i32>,
    pub user_id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub owner: Option<UserProfile>,
}

fn default_active() -> bool {
    true
}

impl Skill {
    /// Whether this skill belongs to the given user.
    pub fn is_owned_by(&self, user: &UserProfile) -> bool {
        self.user_id == user.id
    }

    /// Owner name for display, or "Unknown" when the record has no owner.
    pub fn owner_display(&self) -> &str {
        self.owner
            .as_ref()
            .map(|o| o.display_name())
            .unwrap_or("Unknown")
    }
}

/// The skill fields nested in an exchange listing. No owner id here; use
/// `ExchangeRequest::skill_owner_id` for ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SkillSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub proficiency_level: String,
}

/// Proficiency levels accepted by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Proficiency {
    pub const ALL: [Proficiency; 4] = [
        Proficiency::Beginner,
        Proficiency::Intermediate,
        Proficiency::Advanced,
        Proficiency::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Proficiency::Beginner => "Beginner",
            Proficiency::Intermediate => "Intermediate",
            Proficiency::Advanced => "Advanced",
            Proficiency::Expert => "Expert",
        }
    }
}

impl fmt::Display for Proficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Proficiency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Proficiency::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                "Proficiency level must be one of: Beginner, Intermediate, Advanced, Expert"
                    .to_string()
            })
    }
}

/// Body for `POST /skills/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewSkill {
    pub title: String,
    pub description: String,
    pub category: String,
    pub proficiency_level: Proficiency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
}

impl NewSkill {
    /// Mirror of the backend's create-skill checks so bad input never
    /// leaves the client.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Skill title cannot be empty".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("Skill description cannot be empty".to_string());
        }
        if self.category.trim().is_empty() {
            return Err("Skill category cannot be empty".to_string());
        }
        validate_value(self.value)
    }
}

/// Body for `PUT /skills/{id}`. Only present fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SkillUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proficiency_level: Option<Proficiency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl SkillUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.proficiency_level.is_none()
            && self.value.is_none()
            && self.is_active.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err("Nothing to update".to_string());
        }
        let blank = |field: &Option<String>| field.as_deref().is_some_and(|s| s.trim().is_empty());
        if blank(&self.title) {
            return Err("Skill title cannot be empty".to_string());
        }
        if blank(&self.description) {
            return Err("Skill description cannot be empty".to_string());
        }
        if blank(&self.category) {
            return Err("Skill category cannot be empty".to_string());
        }
        validate_value(self.value)
    }
}

fn validate_value(value: Option<i32>) -> Result<(), String> {
    match value {
        Some(v) if !(0..=MAX_SKILL_VALUE).contains(&v) => {
            Err(format!("Skill value must be between 0 and {}", MAX_SKILL_VALUE))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_skill() -> NewSkill {
        NewSkill {
            title: "Sourdough baking".to_string(),
            description: "Starter care, shaping, scoring".to_string(),
            category: "Cooking".to_string(),
            proficiency_level: Proficiency::Advanced,
            value: Some(40),
        }
    }

    #[test]
    fn test_parse_skill_listing() {
        let json = r#"[{"id": 3, "title": "Guitar", "description": "Chords", "category": "Music",
            "proficiency_level": "Beginner", "value": null, "user_id": 9,
            "created_at": "2024-03-02T18:22:11", "is_active": true,
            "owner": {"id": 9, "username": "carol", "full_name": "Carol", "email": "c@x.io", "bio": null,
                      "created_at": "2024-01-01T00:00:00", "is_active": true}}]"#;
        let skills: Vec<Skill> = serde_json::from_str(json).expect("listing should parse");
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].owner_display(), "Carol");
        assert_eq!(skills[0].value, None);
    }

    #[test]
    fn test_is_owned_by() {
        let skill: Skill =
            serde_json::from_str(r#"{"id": 1, "title": "Chess", "user_id": 4}"#).expect("skill should parse");
        let mut me = UserProfile {
            id: 4,
            username: "dave".to_string(),
            full_name: String::new(),
            email: String::new(),
            bio: None,
        };
        assert!(skill.is_owned_by(&me));
        me.id = 5;
        assert!(!skill.is_owned_by(&me));
        assert_eq!(skill.owner_display(), "Unknown");
    }

    #[test]
    fn test_proficiency_from_str() {
        assert_eq!("expert".parse::<Proficiency>(), Ok(Proficiency::Expert));
        assert_eq!(" Beginner ".parse::<Proficiency>(), Ok(Proficiency::Beginner));
        assert!("guru".parse::<Proficiency>().is_err());
    }

    #[test]
    fn test_new_skill_validation() {
        assert!(new_skill().validate().is_ok());

        let mut s = new_skill();
        s.title = " ".to_string();
        assert_eq!(s.validate().unwrap_err(), "Skill title cannot be empty");

        let mut s = new_skill();
        s.category.clear();
        assert_eq!(s.validate().unwrap_err(), "Skill category cannot be empty");

        let mut s = new_skill();
        s.value = Some(1001);
        assert!(s.validate().is_err());
        s.value = Some(-1);
        assert!(s.validate().is_err());
        s.value = Some(1000);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_new_skill_serializes_proficiency_as_name() {
        let body = serde_json::to_value(new_skill()).expect("serialize");
        assert_eq!(body["proficiency_level"], "Advanced");
        assert_eq!(body["value"], 40);
    }

    #[test]
    fn test_skill_update_only_sends_present_fields() {
        let update = SkillUpdate {
            title: Some("Chess openings".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
        let body = serde_json::to_value(&update).expect("serialize");
        assert_eq!(body, serde_json::json!({"title": "Chess openings"}));
        assert!(SkillUpdate::default().validate().is_err());
    }
}
