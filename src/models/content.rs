use serde::{Deserialize, Serialize};

use super::de_id;

pub const TAGLINE_PREFIX: &str = "💡";

/// Singleton row with the home page texts.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SiteContent {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vision: Option<String>,
    #[serde(default)]
    pub mission: Option<String>,
}

impl SiteContent {
    pub fn tagline_display(&self) -> Option<String> {
        let tagline = self.tagline.as_deref()?.trim();
        if tagline.is_empty() {
            return None;
        }
        if tagline.starts_with(TAGLINE_PREFIX) {
            Some(tagline.to_string())
        } else {
            Some(format!("{} {}", TAGLINE_PREFIX, tagline))
        }
    }
}
