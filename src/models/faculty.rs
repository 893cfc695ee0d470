use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{de_id, de_timestamp};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Faculty {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}
