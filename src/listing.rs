use serde::de::DeserializeOwned;

use crate::backend::Backend;
use crate::store::{decode, Entity, Query, Row};

/// Rows for a list page. On a failed fetch `error` is set and `rows` holds
/// whatever was cached from the previous successful load.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub rows: Vec<Row>,
    pub error: Option<String>,
}

impl Listing {
    pub fn into_result(self) -> Result<Vec<Row>, String> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.rows),
        }
    }

    /// Decoded rows; malformed rows are logged and skipped.
    pub fn typed<T: DeserializeOwned>(&self) -> Vec<T> {
        self.rows
            .iter()
            .cloned()
            .filter_map(|row| match decode(row) {
                Ok(v) => Some(v),
                Err(e) => {
                    log::warn!("Skipping row: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// Fetch an entity's list in its default order and cache it.
pub fn load(backend: &Backend, entity: Entity) -> Listing {
    load_with(backend, entity, &Query::new().order(entity.default_order()))
}

/// A filtered fetch never replaces the cached full list, which id lookups
/// depend on; on failure it falls back to the matching cached rows.
pub fn load_with(backend: &Backend, entity: Entity, query: &Query) -> Listing {
    let filtered = !query.filters.is_empty();
    match backend.store.select(entity, query) {
        Ok(rows) => {
            if !filtered {
                backend.cache.put(entity, rows.clone());
            }
            Listing { rows, error: None }
        }
        Err(e) => {
            log::error!("Error loading {}: {}", entity.table(), e);
            let rows = backend
                .cache
                .rows(entity)
                .unwrap_or_default()
                .into_iter()
                .filter(|row| {
                    query
                        .filters
                        .iter()
                        .all(|(column, value)| row.get(column) == Some(value))
                })
                .collect();
            Listing {
                rows,
                error: Some(format!("Error loading {}: {}", entity.table().replace('_', " "), e)),
            }
        }
    }
}
