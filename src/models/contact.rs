use serde::{Deserialize, Serialize};

use super::de_id;

/// Singleton row with the department's contact details.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ContactInfo {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub alternate_email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub office_hours: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ContactLine {
    pub icon: &'static str,
    pub label: &'static str,
    pub value: String,
    pub href: Option<String>,
}

impl ContactInfo {
    /// Lines for the public contact block, skipping empty fields.
    pub fn lines(&self) -> Vec<ContactLine> {
        let mut out = Vec::new();
        let mut push = |icon, label, value: &Option<String>, href: Option<String>| {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                out.push(ContactLine { icon, label, value: v.to_string(), href });
            }
        };
        push("📍", "Address", &self.address, None);
        push("📞", "Phone", &self.phone, self.phone.as_ref().map(|p| format!("tel:{}", p.replace(' ', ""))));
        push("✉️", "Email", &self.email, self.email.as_ref().map(|e| format!("mailto:{}", e.trim())));
        push(
            "✉️",
            "Alternate Email",
            &self.alternate_email,
            self.alternate_email.as_ref().map(|e| format!("mailto:{}", e.trim())),
        );
        push("🌐", "Website", &self.website, self.website.as_ref().map(|w| w.trim().to_string()));
        push("🕒", "Office Hours", &self.office_hours, None);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_skip_empty_fields() {
        let info = ContactInfo {
            id: "1".into(),
            address: Some("Bidar".into()),
            phone: Some("+91 80 1234".into()),
            email: Some("aiml@example.edu".into()),
            alternate_email: Some("".into()),
            website: None,
            office_hours: Some("9-5".into()),
        };
        let lines = info.lines();
        let labels: Vec<&str> = lines.iter().map(|l| l.label).collect();
        assert_eq!(labels, vec!["Address", "Phone", "Email", "Office Hours"]);
        assert_eq!(lines[1].href.as_deref(), Some("tel:+91801234"));
        assert_eq!(lines[2].href.as_deref(), Some("mailto:aiml@example.edu"));
    }
}
