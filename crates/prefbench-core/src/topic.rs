use serde::{Deserialize, Serialize};
use std::fmt;

/// Topic identifiers appear as numbers or strings in hand-written topic files.
/// Any other JSON value is carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicId {
    Number(u64),
    Text(String),
    Other(serde_json::Value),
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Other(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPreferences {
    pub focus: String,
    pub dislikes_statement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylisticPreferences {
    pub tone: String,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub content: ContentPreferences,
    pub stylistic: StylisticPreferences,
}

/// One conversation subject with the preference profile the simulated user holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
    pub preferences: Preferences,
    pub initial_user_prompt: String,
}

impl Preferences {
    /// Bullet list used in the simulated user's and the judge's system prompts.
    pub fn bullet_list(&self) -> String {
        format!(
            "- Content Focus: {}\n- Content Dislikes: {}\n- Tone: {}\n- Format: {}",
            self.content.focus,
            self.content.dislikes_statement,
            self.stylistic.tone,
            self.stylistic.format
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPIC_JSON: &str = r#"{
        "id": 7,
        "name": "Hiking",
        "preferences": {
            "content": {"focus": "trail difficulty", "dislikes_statement": "gear ads"},
            "stylistic": {"tone": "casual", "format": "bullet points"}
        },
        "initial_user_prompt": "Tell me about hiking trails"
    }"#;

    #[test]
    fn test_parse_numeric_id() {
        let topic: Topic = serde_json::from_str(TOPIC_JSON).unwrap();
        assert_eq!(topic.id, TopicId::Number(7));
        assert_eq!(topic.id.to_string(), "7");
        assert_eq!(topic.preferences.stylistic.format, "bullet points");
    }

    #[test]
    fn test_parse_string_id() {
        let json = TOPIC_JSON.replace("\"id\": 7", "\"id\": \"hike-01\"");
        let topic: Topic = serde_json::from_str(&json).unwrap();
        assert_eq!(topic.id, TopicId::Text("hike-01".into()));
    }

    #[test]
    fn test_missing_preferences_rejected() {
        let json = r#"{"id": 1, "name": "x", "initial_user_prompt": "y"}"#;
        assert!(serde_json::from_str::<Topic>(json).is_err());
    }

    #[test]
    fn test_bullet_list() {
        let topic: Topic = serde_json::from_str(TOPIC_JSON).unwrap();
        let list = topic.preferences.bullet_list();
        assert!(list.starts_with("- Content Focus: trail difficulty\n"));
        assert!(list.ends_with("- Format: bullet points"));
    }

    #[test]
    fn test_unusual_ids_pass_through() {
        for (raw, shown) in [("-1", "-1"), ("1.5", "1.5"), ("null", "null")] {
            let json = TOPIC_JSON.replacen("\"id\": 7", &format!("\"id\": {raw}"), 1);
            let topic: Topic = serde_json::from_str(&json).unwrap();
            assert!(matches!(topic.id, TopicId::Other(_)));
            assert_eq!(topic.id.to_string(), shown);
            let back = serde_json::to_value(&topic).unwrap();
            assert_eq!(back["id"], serde_json::from_str::<serde_json::Value>(raw).unwrap());
        }
    }
}
