use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{de_id, de_timestamp};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Activity {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}
