use serde_json::json;

use super::{require, row_from, EditContext, EditorError, RecordEditor, UploadPolicy};
use crate::media::{Bucket, Upload};
use crate::store::{Entity, Row};

#[derive(Debug, Clone, Default)]
pub struct ActivityInput {
    pub title: String,
    pub description: String,
    pub image: Option<Upload>,
}

pub struct ActivityEditor;

impl RecordEditor for ActivityEditor {
    const ENTITY: Entity = Entity::Activities;
    const UPLOAD: UploadPolicy = UploadPolicy::Required;
    const BUCKET: Option<Bucket> = Some(Bucket::ActivityImages);
    const IMAGE_FIELD: &'static str = "image_url";

    type Input = ActivityInput;

    fn validate(input: &ActivityInput, _ctx: &EditContext<'_>) -> Result<Row, EditorError> {
        let title = require(&input.title, "Please fill in all required fields!")?;
        let description = require(&input.description, "Please fill in all required fields!")?;
        Ok(row_from(json!({ "title": title, "description": description })))
    }

    fn upload(input: &ActivityInput) -> Option<&Upload> {
        input.image.as_ref()
    }
}
