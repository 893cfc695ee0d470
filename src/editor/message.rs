use std::sync::OnceLock;

use regex::Regex;
use serde_json::json;

use super::{require, row_from, EditContext, EditorError, RecordEditor};
use crate::models::message::MessageStatus;
use crate::store::{Entity, Row};

/// Submission of the public contact form.
#[derive(Debug, Clone, Default)]
pub struct ContactMessageInput {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub struct ContactMessageEditor;

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .map_or(false, |re| re.is_match(email))
}

impl RecordEditor for ContactMessageEditor {
    const ENTITY: Entity = Entity::ContactMessages;

    type Input = ContactMessageInput;

    fn validate(input: &ContactMessageInput, _ctx: &EditContext<'_>) -> Result<Row, EditorError> {
        let name = require(&input.name, "Please fill in all fields.")?;
        let email = require(&input.email, "Please fill in all fields.")?;
        let message = require(&input.message, "Please fill in all fields.")?;
        if !is_valid_email(&email) {
            return Err(EditorError::Validation("Please enter a valid email address.".into()));
        }
        Ok(row_from(json!({
            "name": name,
            "email": email,
            "message": message,
            "status": MessageStatus::New.as_str(),
        })))
    }
}
