use serde_json::json;

use super::{require, row_from, text_or_null, EditContext, EditorError, RecordEditor};
use crate::store::{Entity, Row};

const REQUIRED: &str = "Please fill in all required fields (Address, Phone, Email)!";

#[derive(Debug, Clone, Default)]
pub struct ContactInfoInput {
    pub address: String,
    pub phone: String,
    pub email: String,
    pub alternate_email: String,
    pub website: String,
    pub office_hours: String,
}

pub struct ContactInfoEditor;

impl RecordEditor for ContactInfoEditor {
    const ENTITY: Entity = Entity::ContactInfo;

    type Input = ContactInfoInput;

    fn validate(input: &ContactInfoInput, _ctx: &EditContext<'_>) -> Result<Row, EditorError> {
        let address = require(&input.address, REQUIRED)?;
        let phone = require(&input.phone, REQUIRED)?;
        let email = require(&input.email, REQUIRED)?;
        Ok(row_from(json!({
            "address": address,
            "phone": phone,
            "email": email,
            "alternate_email": text_or_null(&input.alternate_email),
            "website": text_or_null(&input.website),
            "office_hours": text_or_null(&input.office_hours),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn required_and_optional_fields() {
        let ctx = EditContext { editing: false, default_department: "AIML" };
        let mut input = ContactInfoInput {
            address: "Bidar".into(),
            phone: "123".into(),
            ..Default::default()
        };
        assert_eq!(
            ContactInfoEditor::validate(&input, &ctx),
            Err(EditorError::Validation(REQUIRED.into()))
        );
        input.email = "aiml@example.edu".into();
        input.website = " ".into();
        let row = ContactInfoEditor::validate(&input, &ctx).unwrap();
        assert_eq!(row["website"], Value::Null);
        assert_eq!(row["email"], json!("aiml@example.edu"));
    }
}
