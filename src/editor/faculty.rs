use serde_json::json;

use super::{non_empty, require, row_from, EditContext, EditorError, RecordEditor, UploadPolicy};
use crate::media::{Bucket, Upload};
use crate::store::{Entity, Row};

#[derive(Debug, Clone, Default)]
pub struct FacultyInput {
    pub name: String,
    pub role: String,
    pub department: String,
    pub photo: Option<Upload>,
}

pub struct FacultyEditor;

impl RecordEditor for FacultyEditor {
    const ENTITY: Entity = Entity::Faculty;
    const UPLOAD: UploadPolicy = UploadPolicy::Optional;
    const BUCKET: Option<Bucket> = Some(Bucket::FacultyPhotos);

    type Input = FacultyInput;

    fn validate(input: &FacultyInput, ctx: &EditContext<'_>) -> Result<Row, EditorError> {
        let name = require(&input.name, "Please enter faculty name!")?;
        let role = require(&input.role, "Please select a role!")?;
        let department = non_empty(&input.department).unwrap_or_else(|| ctx.default_department.to_string());
        Ok(row_from(json!({
            "name": name,
            "role": role,
            "department": department,
        })))
    }

    fn upload(input: &FacultyInput) -> Option<&Upload> {
        input.photo.as_ref()
    }
}
