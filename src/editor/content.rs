use serde_json::json;

use super::{row_from, text_or_null, EditContext, EditorError, RecordEditor};
use crate::store::{Entity, Row};

#[derive(Debug, Clone, Default)]
pub struct ContentInput {
    pub tagline: String,
    pub description: String,
    pub vision: String,
    pub mission: String,
}

pub struct ContentEditor;

impl RecordEditor for ContentEditor {
    const ENTITY: Entity = Entity::Content;

    type Input = ContentInput;

    fn validate(input: &ContentInput, _ctx: &EditContext<'_>) -> Result<Row, EditorError> {
        Ok(row_from(json!({
            "tagline": text_or_null(&input.tagline),
            "description": text_or_null(&input.description),
            "vision": text_or_null(&input.vision),
            "mission": text_or_null(&input.mission),
        })))
    }
}
