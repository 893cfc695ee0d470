pub mod achievement;
pub mod activity;
pub mod contact;
pub mod content;
pub mod faculty;
pub mod gallery;
pub mod leader;
pub mod message;
pub mod stats;
pub mod student;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Ids arrive as numbers (singleton rows) or strings (uuid rows).
pub(crate) fn de_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v = Value::deserialize(d)?;
    crate::store::id_string(&v).ok_or_else(|| serde::de::Error::custom(format!("invalid id: {}", v)))
}

/// Timestamps with or without an offset; offset-less values are taken as UTC.
pub(crate) fn de_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&raw, fmt) {
            return Ok(Some(naive.and_utc()));
        }
    }
    Err(serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

/// Integer columns that may come back as floats or numeric strings.
pub(crate) fn de_opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

pub(crate) fn de_opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

pub(crate) fn de_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => matches!(s.as_str(), "true" | "1" | "on"),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "de_id")]
        id: String,
        #[serde(default, deserialize_with = "de_timestamp")]
        at: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "de_bool")]
        flag: bool,
    }

    #[test]
    fn lenient_decoding() {
        let p: Probe = serde_json::from_value(json!({"id": 1, "at": "2024-03-01T10:00:00.5+05:30", "flag": 1})).unwrap();
        assert_eq!(p.id, "1");
        assert_eq!(p.at.unwrap().to_rfc3339(), "2024-03-01T04:30:00.500+00:00");
        assert!(p.flag);

        let p: Probe = serde_json::from_value(json!({"id": "abc", "at": "2024-03-01T10:00:00.123456"})).unwrap();
        assert_eq!(p.id, "abc");
        assert!(p.at.is_some());
        assert!(!p.flag);

        let p: Probe = serde_json::from_value(json!({"id": "x", "at": null})).unwrap();
        assert!(p.at.is_none());
    }

    #[test]
    fn missing_id_is_an_error() {
        assert!(serde_json::from_value::<Probe>(json!({"id": null})).is_err());
    }
}
