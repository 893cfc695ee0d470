use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{de_bool, de_id, de_opt_f64, de_opt_i64, de_timestamp};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Student {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub roll_number: Option<String>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub year: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub semester: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub cgpa: Option<f64>,
    #[serde(default, deserialize_with = "de_bool")]
    pub is_topper: bool,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Student {
    /// CGPA with two decimals, "N/A" when not recorded.
    pub fn cgpa_display(&self) -> String {
        match self.cgpa {
            Some(c) => format!("{:.2}", c),
            None => "N/A".to_string(),
        }
    }

    /// "3rd Year", or an empty string when the year is missing.
    pub fn year_label(&self) -> String {
        match self.year {
            Some(y) if y > 0 => format!("{}{} Year", y, ordinal_suffix(y)),
            _ => String::new(),
        }
    }

    /// Record plus the display strings templates need.
    pub fn view(&self) -> Value {
        let mut v = json!(self);
        if let Value::Object(map) = &mut v {
            map.insert("cgpa_display".into(), json!(self.cgpa_display()));
            map.insert("year_label".into(), json!(self.year_label()));
        }
        v
    }
}

fn ordinal_suffix(n: i64) -> &'static str {
    match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(cgpa: Option<f64>, year: Option<i64>) -> Student {
        Student {
            id: "s1".into(),
            name: "Asha Rao".into(),
            roll_number: Some("AI21".into()),
            year,
            semester: None,
            cgpa,
            is_topper: false,
            photo_url: None,
            created_at: None,
        }
    }

    #[test]
    fn cgpa_has_two_decimals() {
        assert_eq!(student(Some(8.7), Some(3)).cgpa_display(), "8.70");
        assert_eq!(student(Some(9.456), Some(3)).cgpa_display(), "9.46");
        assert_eq!(student(None, Some(3)).cgpa_display(), "N/A");
    }

    #[test]
    fn year_labels() {
        assert_eq!(student(None, Some(1)).year_label(), "1st Year");
        assert_eq!(student(None, Some(2)).year_label(), "2nd Year");
        assert_eq!(student(None, Some(3)).year_label(), "3rd Year");
        assert_eq!(student(None, Some(4)).year_label(), "4th Year");
        assert_eq!(student(None, None).year_label(), "");
    }

    #[test]
    fn view_adds_display_fields() {
        let v = student(Some(8.7), Some(3)).view();
        assert_eq!(v["cgpa_display"], json!("8.70"));
        assert_eq!(v["name"], json!("Asha Rao"));
    }
}
