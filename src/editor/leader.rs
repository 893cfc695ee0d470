use serde_json::json;

use super::{non_empty, require, row_from, EditContext, EditorError, RecordEditor, UploadPolicy};
use crate::media::{Bucket, Upload};
use crate::store::{Entity, Row};

#[derive(Debug, Clone, Default)]
pub struct LeaderInput {
    pub name: String,
    pub position: String,
    pub display_order: String,
    pub photo: Option<Upload>,
}

pub struct LeaderEditor;

impl RecordEditor for LeaderEditor {
    const ENTITY: Entity = Entity::Leadership;
    const UPLOAD: UploadPolicy = UploadPolicy::Required;
    const BUCKET: Option<Bucket> = Some(Bucket::LeadershipPhotos);
    const FILE_MISSING: &'static str = "Please select a photo!";

    type Input = LeaderInput;

    fn validate(input: &LeaderInput, _ctx: &EditContext<'_>) -> Result<Row, EditorError> {
        let name = require(&input.name, "Please fill in all required fields!")?;
        let position = require(&input.position, "Please fill in all required fields!")?;
        // blank order sorts first
        let display_order = match non_empty(&input.display_order) {
            None => 1,
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| EditorError::Validation("Display order must be a positive number!".into()))?,
        };
        Ok(row_from(json!({
            "name": name,
            "position": position,
            "display_order": display_order,
        })))
    }

    fn upload(input: &LeaderInput) -> Option<&Upload> {
        input.photo.as_ref()
    }
}
