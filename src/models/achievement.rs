use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{de_id, de_timestamp};

pub const DEFAULT_TITLE: &str = "Achievement";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Achievement {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Achievement {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_TITLE)
    }
}
