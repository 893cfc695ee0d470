use serde_json::json;

use super::{non_empty, row_from, EditContext, EditorError, RecordEditor, UploadPolicy};
use crate::media::{Bucket, Upload};
use crate::models::achievement::DEFAULT_TITLE;
use crate::store::{Entity, Row};

#[derive(Debug, Clone, Default)]
pub struct AchievementInput {
    pub title: String,
    pub image: Option<Upload>,
}

pub struct AchievementEditor;

impl RecordEditor for AchievementEditor {
    const ENTITY: Entity = Entity::Achievements;
    const UPLOAD: UploadPolicy = UploadPolicy::Required;
    const BUCKET: Option<Bucket> = Some(Bucket::AchievementImages);
    const IMAGE_FIELD: &'static str = "image_url";

    type Input = AchievementInput;

    fn validate(input: &AchievementInput, _ctx: &EditContext<'_>) -> Result<Row, EditorError> {
        let title = non_empty(&input.title).unwrap_or_else(|| DEFAULT_TITLE.to_string());
        Ok(row_from(json!({ "title": title })))
    }

    fn upload(input: &AchievementInput) -> Option<&Upload> {
        input.image.as_ref()
    }
}
