use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{de_id, de_opt_i64, de_timestamp};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Leader {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    pub position: String,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub display_order: Option<i64>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}
