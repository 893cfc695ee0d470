use rusqlite::types::Value as SqlValue;
use rusqlite::params_from_iter;
use serde_json::{json, Value};

use super::{now_timestamp, row_id, ColumnKind, Entity, Query, Row, Store};
use crate::db::DbPool;

/// SQLite-backed implementation of the Store trait.
/// Used for local development and offline deployments; mirrors the hosted
/// service's table semantics (server-assigned ids, `created_at` on insert).
pub struct SqliteStore {
    pub pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn new_at(path: &str) -> Result<Self, String> {
        let pool = crate::db::init_pool_at(path)?;
        Ok(Self { pool })
    }

    fn column_list(entity: Entity) -> String {
        entity
            .columns()
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn query_rows(&self, entity: Entity, sql: &str, params: Vec<SqlValue>) -> Result<Vec<Row>, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        let mut stmt = conn.prepare(sql).map_err(|e| e.to_string())?;
        let columns = entity.columns();
        let rows = stmt
            .query_map(params_from_iter(params), |r| {
                let mut out = Row::new();
                for (i, c) in columns.iter().enumerate() {
                    let raw: SqlValue = r.get(i)?;
                    out.insert(c.name.to_string(), from_sql(c.kind, raw));
                }
                Ok(out)
            })
            .map_err(|e| e.to_string())?;
        rows.collect::<Result<Vec<_>, _>>().map_err(|e| e.to_string())
    }

    fn find(&self, entity: Entity, id: &str) -> Result<Option<Row>, String> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            Self::column_list(entity),
            entity.table()
        );
        let rows = self.query_rows(entity, &sql, vec![SqlValue::Text(id.to_string())])?;
        Ok(rows.into_iter().next())
    }

    /// Convert every field of `row` to its SQL value, rejecting unknown columns.
    fn bind(entity: Entity, row: &Row) -> Result<Vec<(String, SqlValue)>, String> {
        row.iter()
            .map(|(name, value)| {
                let column = entity.column(name).ok_or_else(|| {
                    format!(
                        "column '{}' does not exist on table '{}'",
                        name,
                        entity.table()
                    )
                })?;
                Ok((name.clone(), to_sql(column.kind, name, value)?))
            })
            .collect()
    }

    /// Fill in the fields the hosted service assigns server-side.
    fn with_server_defaults(entity: Entity, row: &Row) -> Row {
        let mut row = row.clone();
        if row_id(&row).is_none() {
            row.insert("id".into(), json!(uuid::Uuid::new_v4().to_string()));
        }
        if entity.has_created_at() && row.get("created_at").map_or(true, Value::is_null) {
            row.insert("created_at".into(), json!(now_timestamp()));
        }
        row
    }
}

impl Store for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn run_migrations(&self) -> Result<(), String> {
        crate::db::run_migrations(&self.pool).map_err(|e| e.to_string())
    }

    fn select(&self, entity: Entity, query: &Query) -> Result<Vec<Row>, String> {
        query.check(entity)?;
        let mut sql = format!("SELECT {} FROM {}", Self::column_list(entity), entity.table());
        let mut params = Vec::with_capacity(query.filters.len());
        for (i, (name, value)) in query.filters.iter().enumerate() {
            // check() guarantees the column exists
            let kind = entity.column(name).map(|c| c.kind).unwrap_or(ColumnKind::Text);
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(&format!("{} = ?{}", name, i + 1));
            params.push(to_sql(kind, name, value)?);
        }
        if let Some(order) = &query.order {
            let dir = order.direction.keyword();
            sql.push_str(&format!(" ORDER BY {} {}, rowid {}", order.column, dir, dir));
        }
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        self.query_rows(entity, &sql, params)
    }

    fn insert(&self, entity: Entity, row: &Row) -> Result<Row, String> {
        let row = Self::with_server_defaults(entity, row);
        let bound = Self::bind(entity, &row)?;
        let id = row_id(&row).ok_or("insert without id")?;

        let names: Vec<&str> = bound.iter().map(|(n, _)| n.as_str()).collect();
        let placeholders: Vec<String> = (1..=bound.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            entity.table(),
            names.join(", "),
            placeholders.join(", ")
        );
        {
            let conn = self.pool.get().map_err(|e| e.to_string())?;
            conn.execute(&sql, params_from_iter(bound.into_iter().map(|(_, v)| v)))
                .map_err(|e| e.to_string())?;
        }
        self.find(entity, &id)?
            .ok_or_else(|| format!("inserted {} row {} not found", entity.table(), id))
    }

    fn update(&self, entity: Entity, id: &str, patch: &Row) -> Result<Option<Row>, String> {
        let mut patch = patch.clone();
        patch.remove("id");
        if patch.is_empty() {
            return self.find(entity, id);
        }
        let bound = Self::bind(entity, &patch)?;
        let sets: Vec<String> = bound
            .iter()
            .enumerate()
            .map(|(i, (n, _))| format!("{} = ?{}", n, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            entity.table(),
            sets.join(", "),
            bound.len() + 1
        );
        let mut params: Vec<SqlValue> = bound.into_iter().map(|(_, v)| v).collect();
        params.push(SqlValue::Text(id.to_string()));

        let changed = {
            let conn = self.pool.get().map_err(|e| e.to_string())?;
            conn.execute(&sql, params_from_iter(params))
                .map_err(|e| e.to_string())?
        };
        if changed == 0 {
            return Ok(None);
        }
        self.find(entity, id)
    }

    fn delete(&self, entity: Entity, id: &str) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", entity.table()),
            [id],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn upsert(&self, entity: Entity, row: &Row) -> Result<Row, String> {
        let id = row_id(row).ok_or_else(|| format!("upsert into {} requires an id", entity.table()))?;
        let row = Self::with_server_defaults(entity, row);
        let bound = Self::bind(entity, &row)?;

        let names: Vec<&str> = bound.iter().map(|(n, _)| n.as_str()).collect();
        let placeholders: Vec<String> = (1..=bound.len()).map(|i| format!("?{}", i)).collect();
        let merges: Vec<String> = names
            .iter()
            .filter(|n| **n != "id" && **n != "created_at")
            .map(|n| format!("{} = excluded.{}", n, n))
            .collect();
        let conflict = if merges.is_empty() {
            "DO NOTHING".to_string()
        } else {
            format!("DO UPDATE SET {}", merges.join(", "))
        };
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT(id) {}",
            entity.table(),
            names.join(", "),
            placeholders.join(", "),
            conflict
        );
        {
            let conn = self.pool.get().map_err(|e| e.to_string())?;
            conn.execute(&sql, params_from_iter(bound.into_iter().map(|(_, v)| v)))
                .map_err(|e| e.to_string())?;
        }
        self.find(entity, &id)?
            .ok_or_else(|| format!("upserted {} row {} not found", entity.table(), id))
    }

    fn count(&self, entity: Entity) -> Result<i64, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", entity.table()),
            [],
            |r| r.get(0),
        )
        .map_err(|e| e.to_string())
    }
}

fn mismatch(column: &str, value: &Value) -> String {
    format!("invalid value for column '{}': {}", column, value)
}

fn to_sql(kind: ColumnKind, column: &str, value: &Value) -> Result<SqlValue, String> {
    match (kind, value) {
        (_, Value::Null) => Ok(SqlValue::Null),
        (ColumnKind::Bool, Value::Bool(b)) => Ok(SqlValue::Integer(*b as i64)),
        (ColumnKind::Bool, Value::Number(n)) => Ok(SqlValue::Integer((n.as_f64() != Some(0.0)) as i64)),
        (ColumnKind::Integer, Value::Number(n)) => n
            .as_i64()
            .map(SqlValue::Integer)
            .ok_or_else(|| mismatch(column, value)),
        (ColumnKind::Integer, Value::String(s)) => s
            .trim()
            .parse()
            .map(SqlValue::Integer)
            .map_err(|_| mismatch(column, value)),
        (ColumnKind::Real, Value::Number(n)) => n
            .as_f64()
            .map(SqlValue::Real)
            .ok_or_else(|| mismatch(column, value)),
        (ColumnKind::Real, Value::String(s)) => s
            .trim()
            .parse()
            .map(SqlValue::Real)
            .map_err(|_| mismatch(column, value)),
        (ColumnKind::Id, Value::Number(n)) => Ok(SqlValue::Text(n.to_string())),
        (ColumnKind::Id | ColumnKind::Text | ColumnKind::Timestamp, Value::String(s)) => {
            Ok(SqlValue::Text(s.clone()))
        }
        _ => Err(mismatch(column, value)),
    }
}

fn from_sql(kind: ColumnKind, value: SqlValue) -> Value {
    match (kind, value) {
        (_, SqlValue::Null) => Value::Null,
        (ColumnKind::Bool, SqlValue::Integer(i)) => Value::Bool(i != 0),
        (ColumnKind::Real, SqlValue::Integer(i)) => json!(i as f64),
        (_, SqlValue::Integer(i)) => json!(i),
        (_, SqlValue::Real(f)) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        (_, SqlValue::Text(s)) => Value::String(s),
        (_, SqlValue::Blob(_)) => Value::Null,
    }
}
