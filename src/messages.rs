//! Operator workflow over contact messages: new → read, any → replied
//! (stamps `replied_at`), any → archived (confirmed), free-text notes.

use serde_json::json;

use crate::backend::Backend;
use crate::editor::{self, backend_error, not_found, text_or_null, EditorError};
use crate::listing::{self, Listing};
use crate::models::message::{ContactMessage, MessageFilter, MessageStatus};
use crate::store::{decode, now_timestamp, Entity, Order, Query, Row};

const ENTITY: Entity = Entity::ContactMessages;

/// Newest first, optionally restricted to one status.
pub fn list(backend: &Backend, filter: MessageFilter) -> Listing {
    let mut query = Query::new().order(Order::desc("created_at"));
    if let MessageFilter::Only(status) = filter {
        query = query.eq("status", status.as_str());
    }
    listing::load_with(backend, ENTITY, &query)
}

pub fn get(backend: &Backend, id: &str) -> Result<ContactMessage, EditorError> {
    editor::find_cached(backend, ENTITY, id)
}

/// Only a `new` message becomes `read`; other states are left alone.
pub fn mark_read(backend: &Backend, id: &str) -> Result<MessageStatus, EditorError> {
    let message = get(backend, id)?;
    if message.status != MessageStatus::New {
        return Ok(message.status);
    }
    apply(backend, id, json!({ "status": MessageStatus::Read.as_str() }))
}

pub fn mark_replied(backend: &Backend, id: &str) -> Result<MessageStatus, EditorError> {
    get(backend, id)?;
    apply(
        backend,
        id,
        json!({
            "status": MessageStatus::Replied.as_str(),
            "replied_at": now_timestamp(),
        }),
    )
}

pub fn archive(backend: &Backend, id: &str, confirmed: bool) -> Result<MessageStatus, EditorError> {
    if !confirmed {
        return Err(EditorError::Validation(
            "Please confirm that this message should be archived.".into(),
        ));
    }
    get(backend, id)?;
    apply(backend, id, json!({ "status": MessageStatus::Archived.as_str() }))
}

pub fn save_notes(backend: &Backend, id: &str, notes: &str) -> Result<(), EditorError> {
    get(backend, id)?;
    apply(backend, id, json!({ "admin_notes": text_or_null(notes) }))?;
    Ok(())
}

pub fn delete(backend: &Backend, id: &str) -> Result<(), EditorError> {
    editor::remove(backend, ENTITY, id)
}

fn apply(backend: &Backend, id: &str, patch: serde_json::Value) -> Result<MessageStatus, EditorError> {
    let patch: Row = editor::row_from(patch);
    let updated = backend
        .store
        .update(ENTITY, id, &patch)
        .map_err(|e| backend_error(ENTITY, "updating", e))?
        .ok_or_else(|| not_found(ENTITY))?;
    backend.cache.invalidate(ENTITY);
    let message: ContactMessage = decode(updated).map_err(EditorError::Unexpected)?;
    log::info!("message {} is now {}", id, message.status.as_str());
    Ok(message.status)
}
