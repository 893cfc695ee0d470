use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{de_id, de_timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    New,
    Read,
    Replied,
    Archived,
}

impl MessageStatus {
    pub const ALL: [MessageStatus; 4] = [
        MessageStatus::New,
        MessageStatus::Read,
        MessageStatus::Replied,
        MessageStatus::Archived,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageStatus::New => "new",
            MessageStatus::Read => "read",
            MessageStatus::Replied => "replied",
            MessageStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s.trim().to_lowercase())
    }

    pub fn label(self) -> &'static str {
        match self {
            MessageStatus::New => "New",
            MessageStatus::Read => "Read",
            MessageStatus::Replied => "Replied",
            MessageStatus::Archived => "Archived",
        }
    }
}

impl Default for MessageStatus {
    fn default() -> Self {
        MessageStatus::New
    }
}

/// Status filter of the admin message list; `All` omits the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFilter {
    All,
    Only(MessageStatus),
}

impl MessageFilter {
    /// Anything unrecognised falls back to `All`.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(MessageStatus::parse)
            .map(MessageFilter::Only)
            .unwrap_or(MessageFilter::All)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageFilter::All => "all",
            MessageFilter::Only(s) => s.as_str(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContactMessage {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(default)]
    pub status: MessageStatus,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub replied_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ContactMessage {
    /// First 150 characters of the message for the list view.
    pub fn preview(&self) -> String {
        let text = self.message.trim();
        if text.chars().count() <= 150 {
            return text.to_string();
        }
        let cut: String = text.chars().take(150).collect();
        format!("{}...", cut.trim_end())
    }
}
