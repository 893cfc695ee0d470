use std::sync::Arc;

use serde_json::Value;

use super::{Entity, Query, Row, Store};
use crate::hosted::{apply_query, match_id, parse_content_range, HostedClient};

/// Store backed by the hosted service's REST table API.
pub struct HostedStore {
    client: Arc<HostedClient>,
}

impl HostedStore {
    pub fn new(client: Arc<HostedClient>) -> Self {
        Self { client }
    }

    fn rows(value: Value, what: &str) -> Result<Vec<Row>, String> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|v| match v {
                    Value::Object(map) => Ok(map),
                    other => Err(format!("{}: expected an object, got {}", what, other)),
                })
                .collect(),
            Value::Object(map) => Ok(vec![map]),
            other => Err(format!("{}: expected an array, got {}", what, other)),
        }
    }

    fn first(rows: Vec<Row>, what: &str) -> Result<Row, String> {
        rows.into_iter()
            .next()
            .ok_or_else(|| format!("{}: empty response", what))
    }
}

impl Store for HostedStore {
    fn backend_name(&self) -> &'static str {
        "hosted"
    }

    /// Tables are provisioned on the service; verify they answer.
    fn run_migrations(&self) -> Result<(), String> {
        for entity in Entity::ALL {
            let mut url = self.client.table_url(entity)?;
            apply_query(&mut url, &Query::new().limit(1));
            self.client
                .send(self.client.get(url), &format!("Table {}", entity.table()))?;
        }
        Ok(())
    }

    fn select(&self, entity: Entity, query: &Query) -> Result<Vec<Row>, String> {
        query.check(entity)?;
        let mut url = self.client.table_url(entity)?;
        apply_query(&mut url, query);
        let what = format!("Select {}", entity.table());
        let body: Value = self
            .client
            .send(self.client.get(url), &what)?
            .json()
            .map_err(|e| format!("{} JSON parse error: {}", what, e))?;
        Self::rows(body, &what)
    }

    fn insert(&self, entity: Entity, row: &Row) -> Result<Row, String> {
        let url = self.client.table_url(entity)?;
        let what = format!("Insert into {}", entity.table());
        let req = self
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .json(&vec![row]);
        let body: Value = self
            .client
            .send(req, &what)?
            .json()
            .map_err(|e| format!("{} JSON parse error: {}", what, e))?;
        Self::first(Self::rows(body, &what)?, &what)
    }

    fn update(&self, entity: Entity, id: &str, patch: &Row) -> Result<Option<Row>, String> {
        let mut url = self.client.table_url(entity)?;
        match_id(&mut url, id);
        let what = format!("Update {}", entity.table());
        let req = self
            .client
            .patch(url)
            .header("Prefer", "return=representation")
            .json(patch);
        let body: Value = self
            .client
            .send(req, &what)?
            .json()
            .map_err(|e| format!("{} JSON parse error: {}", what, e))?;
        Ok(Self::rows(body, &what)?.into_iter().next())
    }

    fn delete(&self, entity: Entity, id: &str) -> Result<(), String> {
        let mut url = self.client.table_url(entity)?;
        match_id(&mut url, id);
        self.client
            .send(self.client.delete(url), &format!("Delete from {}", entity.table()))?;
        Ok(())
    }

    fn upsert(&self, entity: Entity, row: &Row) -> Result<Row, String> {
        if super::row_id(row).is_none() {
            return Err(format!("upsert into {} requires an id", entity.table()));
        }
        let url = self.client.table_url(entity)?;
        let what = format!("Upsert into {}", entity.table());
        let req = self
            .client
            .post(url)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&vec![row]);
        let body: Value = self
            .client
            .send(req, &what)?
            .json()
            .map_err(|e| format!("{} JSON parse error: {}", what, e))?;
        Self::first(Self::rows(body, &what)?, &what)
    }

    fn count(&self, entity: Entity) -> Result<i64, String> {
        let mut url = self.client.table_url(entity)?;
        url.query_pairs_mut().append_pair("select", "id");
        let what = format!("Count {}", entity.table());
        let resp = self.client.send(
            self.client.head(url).header("Prefer", "count=exact"),
            &what,
        )?;
        resp.headers()
            .get("content-range")
            .and_then(|h| h.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| format!("{}: missing Content-Range total", what))
    }
}
