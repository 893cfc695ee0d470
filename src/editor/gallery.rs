use serde_json::json;

use super::{row_from, text_or_null, EditContext, EditorError, RecordEditor, UploadPolicy};
use crate::media::{Bucket, Upload};
use crate::store::{Entity, Row};

#[derive(Debug, Clone, Default)]
pub struct GalleryInput {
    pub caption: String,
    pub description: String,
    pub image: Option<Upload>,
}

pub struct GalleryEditor;

impl RecordEditor for GalleryEditor {
    const ENTITY: Entity = Entity::Gallery;
    const UPLOAD: UploadPolicy = UploadPolicy::Required;
    const BUCKET: Option<Bucket> = Some(Bucket::GalleryImages);
    const IMAGE_FIELD: &'static str = "image_url";

    type Input = GalleryInput;

    fn validate(input: &GalleryInput, _ctx: &EditContext<'_>) -> Result<Row, EditorError> {
        Ok(row_from(json!({
            "caption": text_or_null(&input.caption),
            "description": text_or_null(&input.description),
        })))
    }

    fn upload(input: &GalleryInput) -> Option<&Upload> {
        input.image.as_ref()
    }
}
