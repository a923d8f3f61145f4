use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type ChatId = i64;
pub type MessageId = i64;

/// A user record as returned by the users endpoint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Only present on contact rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_online: Option<bool>,
}

impl User {
    pub fn online(&self) -> bool {
        self.is_online.unwrap_or(false)
    }
}

/// Kind of a chat thread
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ChatKind {
    #[default]
    Direct,
    Group,
    Community,
    Other(String),
}

impl ChatKind {
    pub fn as_str(&self) -> &str {
        match self {
            ChatKind::Direct => "direct",
            ChatKind::Group => "group",
            ChatKind::Community => "community",
            ChatKind::Other(kind) => kind,
        }
    }

    /// Cycle through the kinds a user can create
    pub fn next(&self) -> ChatKind {
        match self {
            ChatKind::Direct => ChatKind::Group,
            ChatKind::Group => ChatKind::Community,
            _ => ChatKind::Direct,
        }
    }
}

impl From<&str> for ChatKind {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "direct" | "private" => ChatKind::Direct,
            "group" => ChatKind::Group,
            "community" | "channel" => ChatKind::Community,
            other => ChatKind::Other(other.to_string()),
        }
    }
}

/// A chat record as returned by `get_chats`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unread_count: Option<i64>,
}

impl Chat {
    pub fn kind(&self) -> ChatKind {
        ChatKind::from(self.kind.as_str())
    }

    pub fn unread(&self) -> i64 {
        self.unread_count.unwrap_or(0)
    }
}

/// A message record as returned by `get_messages`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub created_at: String,
    pub user_id: UserId,
    pub author: String,
}

/// Partial user update; absent fields are left untouched by the backend
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.phone.is_none() && self.bio.is_none() && self.avatar_url.is_none()
    }
}

/// Editable copy of the profile fields
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileForm {
    pub username: String,
    pub phone: String,
    pub bio: String,
    pub avatar_url: String,
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        ProfileForm {
            username: user.username.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            bio: user.bio.clone().unwrap_or_default(),
            avatar_url: user.avatar_url.clone().unwrap_or_default(),
        }
    }

    /// Fields that differ from `original`
    pub fn diff(&self, original: &User) -> ProfileUpdate {
        fn changed(edited: &str, current: Option<&str>) -> Option<String> {
            if edited != current.unwrap_or_default() {
                Some(edited.to_string())
            } else {
                None
            }
        }

        ProfileUpdate {
            username: changed(&self.username, Some(original.username.as_str())),
            phone: changed(&self.phone, original.phone.as_deref()),
            bio: changed(&self.bio, original.bio.as_deref()),
            avatar_url: changed(&self.avatar_url, original.avatar_url.as_deref()),
        }
    }
}

/// Render a backend timestamp as `HH:MM`, falling back to the raw text
pub fn format_time(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%H:%M").to_string();
    }
    for pattern in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format("%H:%M").to_string();
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_kind_parsing() {
        assert_eq!(ChatKind::from("group"), ChatKind::Group);
        assert_eq!(ChatKind::from(""), ChatKind::Direct);
        assert_eq!(ChatKind::from("Community"), ChatKind::Community);
        assert_eq!(ChatKind::from("bot"), ChatKind::Other("bot".into()));
    }

    #[test]
    fn test_chat_deserializes_backend_row() {
        let json = r#"{"id": 3, "name": "Team", "type": "group", "avatar_url": null,
            "last_message": "hi", "last_message_time": "2024-05-01 12:45:10.123456", "unread_count": 2}"#;
        let chat: Chat = serde_json::from_str(json).unwrap();
        assert_eq!(chat.kind(), ChatKind::Group);
        assert_eq!(chat.unread(), 2);
        assert_eq!(chat.avatar_url, None);
    }

    #[test]
    fn test_profile_diff_only_changed_fields() {
        let user = User {
            id: 1,
            username: "anna".into(),
            phone: Some("+79990001122".into()),
            bio: None,
            avatar_url: None,
            created_at: None,
            is_online: None,
        };
        let mut form = ProfileForm::from_user(&user);
        assert!(form.diff(&user).is_empty());

        form.bio = "hello".into();
        let update = form.diff(&user);
        assert_eq!(update.bio.as_deref(), Some("hello"));
        assert!(update.username.is_none());

        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, serde_json::json!({"bio": "hello"}));
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time("2024-05-01 12:45:10.123456"), "12:45");
        assert_eq!(format_time("2024-05-01T08:05:00+03:00"), "08:05");
        assert_eq!(format_time("yesterday"), "yesterday");
    }
}
