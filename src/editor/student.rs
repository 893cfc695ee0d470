use serde_json::json;

use super::{non_empty, require, row_from, EditContext, EditorError, RecordEditor, UploadPolicy};
use crate::media::{Bucket, Upload};
use crate::store::{Entity, Row};

const REQUIRED: &str = "Please fill in all required fields!";

#[derive(Debug, Clone, Default)]
pub struct StudentInput {
    pub name: String,
    pub roll_number: String,
    pub year: String,
    pub semester: String,
    pub cgpa: String,
    pub is_topper: bool,
    pub photo: Option<Upload>,
}

pub struct StudentEditor;

impl RecordEditor for StudentEditor {
    const ENTITY: Entity = Entity::Students;
    const UPLOAD: UploadPolicy = UploadPolicy::Optional;
    const BUCKET: Option<Bucket> = Some(Bucket::StudentPhotos);

    type Input = StudentInput;

    fn validate(input: &StudentInput, _ctx: &EditContext<'_>) -> Result<Row, EditorError> {
        let name = require(&input.name, REQUIRED)?;
        let roll_number = require(&input.roll_number, REQUIRED)?;
        let year = require(&input.year, REQUIRED)?;
        let cgpa = require(&input.cgpa, REQUIRED)?;

        let year = year
            .parse::<i64>()
            .ok()
            .filter(|y| (1..=4).contains(y))
            .ok_or_else(|| EditorError::Validation("Please select a valid year!".into()))?;
        let cgpa = cgpa
            .parse::<f64>()
            .ok()
            .filter(|c| c.is_finite())
            .ok_or_else(|| EditorError::Validation("Please enter a valid CGPA!".into()))?;
        if !(0.0..=10.0).contains(&cgpa) {
            return Err(EditorError::Validation("CGPA must be between 0 and 10!".into()));
        }
        let semester = match non_empty(&input.semester) {
            None => None,
            Some(s) => Some(
                s.parse::<i64>()
                    .ok()
                    .filter(|s| (1..=8).contains(s))
                    .ok_or_else(|| EditorError::Validation("Please select a valid semester!".into()))?,
            ),
        };

        Ok(row_from(json!({
            "name": name,
            "roll_number": roll_number,
            "year": year,
            "semester": semester,
            "cgpa": cgpa,
            "is_topper": input.is_topper,
        })))
    }

    fn upload(input: &StudentInput) -> Option<&Upload> {
        input.photo.as_ref()
    }
}
