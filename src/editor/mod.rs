//! Record editors: validate a submitted form, upload its image if any, then
//! insert, update or upsert the row and drop the entity's cached list.
//!
//! Every function here is blocking; route handlers call them through
//! [`Backend::run`](crate::backend::Backend::run).

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::backend::Backend;
use crate::media::{Bucket, Upload};
use crate::store::{decode, row_id, Entity, Row, SINGLETON_ID};

pub mod achievement;
pub mod activity;
pub mod contact;
pub mod content;
pub mod faculty;
pub mod gallery;
pub mod leader;
pub mod message;
pub mod student;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Missing or malformed input, caught before any backend call.
    Validation(String),
    /// The table service refused or failed the call.
    Backend(String),
    /// A mandatory image could not be stored.
    Upload(String),
    NotFound(String),
    Unexpected(String),
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::Validation(m) | EditorError::NotFound(m) | EditorError::Backend(m) => {
                write!(f, "{}", m)
            }
            EditorError::Upload(m) => write!(f, "Error uploading image: {}", m),
            EditorError::Unexpected(m) => write!(f, "Unexpected error: {}", m),
        }
    }
}

impl std::error::Error for EditorError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPolicy {
    /// No file field.
    None,
    /// A failed upload is reported as a warning; the record is saved without it.
    Optional,
    /// A file is mandatory when creating; a failed upload aborts the save.
    Required,
}

/// What a validator may need besides the form itself.
#[derive(Debug, Clone, Copy)]
pub struct EditContext<'a> {
    pub editing: bool,
    pub default_department: &'a str,
}

pub trait RecordEditor {
    const ENTITY: Entity;
    const UPLOAD: UploadPolicy = UploadPolicy::None;
    const BUCKET: Option<Bucket> = None;
    const IMAGE_FIELD: &'static str = "photo_url";
    const FILE_MISSING: &'static str = "Please select an image!";

    type Input;

    /// Trimmed, type-checked row payload; never touches the backend.
    fn validate(input: &Self::Input, ctx: &EditContext<'_>) -> Result<Row, EditorError>;

    fn upload(_input: &Self::Input) -> Option<&Upload> {
        None
    }
}

/// Outcome of a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved {
    pub id: String,
    pub created: bool,
    /// Non-fatal problems, e.g. an optional photo that failed to upload.
    pub warnings: Vec<String>,
}

/// Validate, upload, then insert (no `edit_id`), update (`edit_id`) or
/// upsert (singletons).
pub fn submit<E: RecordEditor>(
    backend: &Backend,
    input: &E::Input,
    edit_id: Option<&str>,
) -> Result<Saved, EditorError> {
    let entity = E::ENTITY;
    let edit_id = edit_id.map(str::trim).filter(|id| !id.is_empty());
    let ctx = EditContext {
        editing: edit_id.is_some(),
        default_department: &backend.default_department,
    };

    let mut row = E::validate(input, &ctx)?;
    let mut warnings = Vec::new();

    let file = E::upload(input).filter(|f| !f.is_empty());
    if E::UPLOAD == UploadPolicy::Required && !ctx.editing && file.is_none() {
        return Err(EditorError::Validation(E::FILE_MISSING.to_string()));
    }

    if let (Some(file), Some(bucket)) = (file, E::BUCKET) {
        match backend.media.upload(bucket, file) {
            Ok(url) => {
                row.insert(E::IMAGE_FIELD.to_string(), json!(url));
            }
            Err(e) if E::UPLOAD == UploadPolicy::Optional => {
                log::warn!("{} upload to {} failed: {}", entity.table(), bucket.name(), e);
                warnings.push(format!("Error uploading photo: {}. Proceeding without photo.", e));
            }
            Err(e) => {
                log::error!("{} upload to {} failed: {}", entity.table(), bucket.name(), e);
                return Err(EditorError::Upload(e));
            }
        }
    }

    let saved = if entity.is_singleton() {
        row.insert("id".to_string(), json!(SINGLETON_ID));
        let stored = backend.store.upsert(entity, &row).map_err(|e| backend_error(entity, "saving", e))?;
        Saved {
            id: row_id(&stored).unwrap_or_else(|| SINGLETON_ID.to_string()),
            created: false,
            warnings,
        }
    } else if let Some(id) = edit_id {
        match backend.store.update(entity, id, &row) {
            Ok(Some(_)) => Saved { id: id.to_string(), created: false, warnings },
            Ok(None) => return Err(not_found(entity)),
            Err(e) => return Err(backend_error(entity, "updating", e)),
        }
    } else {
        let stored = backend.store.insert(entity, &row).map_err(|e| backend_error(entity, "adding", e))?;
        Saved {
            id: row_id(&stored).unwrap_or_default(),
            created: true,
            warnings,
        }
    };

    backend.cache.invalidate(entity);
    log::info!(
        "{} {} {}",
        entity.table(),
        saved.id,
        if saved.created { "created" } else { "saved" }
    );
    Ok(saved)
}

/// Delete by id, but only ids present in the last fetched list.
pub fn remove(backend: &Backend, entity: Entity, id: &str) -> Result<(), EditorError> {
    if cached_row(backend, entity, id)?.is_none() {
        return Err(not_found(entity));
    }
    backend
        .store
        .delete(entity, id)
        .map_err(|e| backend_error(entity, "deleting", e))?;
    backend.cache.invalidate(entity);
    log::info!("{} {} deleted", entity.table(), id);
    Ok(())
}

/// Record for the edit form, taken from the cached list.
pub fn find_cached<T: DeserializeOwned>(
    backend: &Backend,
    entity: Entity,
    id: &str,
) -> Result<T, EditorError> {
    let row = cached_row(backend, entity, id)?.ok_or_else(|| not_found(entity))?;
    decode(row).map_err(EditorError::Unexpected)
}

/// Look `id` up in the cache, loading the list first when it was never
/// fetched or has been invalidated since.
pub(crate) fn cached_row(backend: &Backend, entity: Entity, id: &str) -> Result<Option<Row>, EditorError> {
    if backend.cache.rows(entity).is_none() {
        crate::listing::load(backend, entity)
            .into_result()
            .map_err(EditorError::Backend)?;
    }
    Ok(backend.cache.get_by_id(entity, id))
}

pub(crate) fn not_found(entity: Entity) -> EditorError {
    EditorError::NotFound(format!("{} not found!", entity.noun()))
}

pub(crate) fn backend_error(entity: Entity, action: &str, e: String) -> EditorError {
    log::error!("Error {} {}: {}", action, entity.table(), e);
    EditorError::Backend(format!("Error {} {}: {}", action, entity.noun().to_lowercase(), e))
}

// ── Field helpers ───────────────────────────────────────

/// Trimmed value, `None` when blank.
pub(crate) fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Trimmed string, or JSON null when blank.
pub(crate) fn text_or_null(s: &str) -> Value {
    non_empty(s).map(Value::String).unwrap_or(Value::Null)
}

pub(crate) fn require(s: &str, message: &str) -> Result<String, EditorError> {
    non_empty(s).ok_or_else(|| EditorError::Validation(message.to_string()))
}

pub(crate) fn row_from(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}
