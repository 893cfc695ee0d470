use std::collections::HashMap;
use std::sync::RwLock;

use crate::store::{row_id, Entity, Row};

/// Last fetched list per entity, kept so edit and delete can find a record
/// by id without another round trip. Dropped after every mutation.
#[derive(Default)]
pub struct ListCache {
    lists: RwLock<HashMap<Entity, Vec<Row>>>,
}

impl ListCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, entity: Entity, rows: Vec<Row>) {
        if let Ok(mut lists) = self.lists.write() {
            lists.insert(entity, rows);
        }
    }

    /// `None` when the list was never loaded or was invalidated.
    pub fn rows(&self, entity: Entity) -> Option<Vec<Row>> {
        self.lists.read().ok()?.get(&entity).cloned()
    }

    pub fn get_by_id(&self, entity: Entity, id: &str) -> Option<Row> {
        let lists = self.lists.read().ok()?;
        lists
            .get(&entity)?
            .iter()
            .find(|row| row_id(row).as_deref() == Some(id))
            .cloned()
    }

    pub fn invalidate(&self, entity: Entity) {
        if let Ok(mut lists) = self.lists.write() {
            lists.remove(&entity);
        }
    }
}
