use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

pub mod hosted;
pub mod sqlite;

/// One record as the backend returns it: column name to JSON value.
pub type Row = Map<String, Value>;

/// Identifier of the singleton rows (site content, contact info).
pub const SINGLETON_ID: i64 = 1;

// ── Tables ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Faculty,
    Students,
    Leadership,
    Activities,
    Achievements,
    Gallery,
    Content,
    ContactInfo,
    ContactMessages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Id,
    Text,
    Integer,
    Real,
    Bool,
    Timestamp,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn col(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind }
}

use ColumnKind::*;

const FACULTY_COLUMNS: &[Column] = &[
    col("id", Id),
    col("name", Text),
    col("role", Text),
    col("department", Text),
    col("photo_url", Text),
    col("created_at", Timestamp),
];

const STUDENT_COLUMNS: &[Column] = &[
    col("id", Id),
    col("name", Text),
    col("roll_number", Text),
    col("year", Integer),
    col("semester", Integer),
    col("cgpa", Real),
    col("is_topper", Bool),
    col("photo_url", Text),
    col("created_at", Timestamp),
];

const LEADERSHIP_COLUMNS: &[Column] = &[
    col("id", Id),
    col("name", Text),
    col("position", Text),
    col("display_order", Integer),
    col("photo_url", Text),
    col("created_at", Timestamp),
];

const ACTIVITY_COLUMNS: &[Column] = &[
    col("id", Id),
    col("title", Text),
    col("description", Text),
    col("image_url", Text),
    col("created_at", Timestamp),
];

const ACHIEVEMENT_COLUMNS: &[Column] = &[
    col("id", Id),
    col("title", Text),
    col("image_url", Text),
    col("created_at", Timestamp),
];

const GALLERY_COLUMNS: &[Column] = &[
    col("id", Id),
    col("image_url", Text),
    col("caption", Text),
    col("description", Text),
    col("created_at", Timestamp),
];

const CONTENT_COLUMNS: &[Column] = &[
    col("id", Id),
    col("tagline", Text),
    col("description", Text),
    col("vision", Text),
    col("mission", Text),
];

const CONTACT_INFO_COLUMNS: &[Column] = &[
    col("id", Id),
    col("address", Text),
    col("phone", Text),
    col("email", Text),
    col("alternate_email", Text),
    col("website", Text),
    col("office_hours", Text),
];

const MESSAGE_COLUMNS: &[Column] = &[
    col("id", Id),
    col("name", Text),
    col("email", Text),
    col("message", Text),
    col("status", Text),
    col("admin_notes", Text),
    col("replied_at", Timestamp),
    col("created_at", Timestamp),
];

impl Entity {
    pub const ALL: [Entity; 9] = [
        Entity::Faculty,
        Entity::Students,
        Entity::Leadership,
        Entity::Activities,
        Entity::Achievements,
        Entity::Gallery,
        Entity::Content,
        Entity::ContactInfo,
        Entity::ContactMessages,
    ];

    pub fn table(self) -> &'static str {
        match self {
            Entity::Faculty => "faculty",
            Entity::Students => "students",
            Entity::Leadership => "leadership",
            Entity::Activities => "activities",
            Entity::Achievements => "achievements",
            Entity::Gallery => "gallery",
            Entity::Content => "content",
            Entity::ContactInfo => "contact_info",
            Entity::ContactMessages => "contact_messages",
        }
    }

    /// Human noun used in user-facing messages.
    pub fn noun(self) -> &'static str {
        match self {
            Entity::Faculty => "Faculty member",
            Entity::Students => "Student",
            Entity::Leadership => "Leader",
            Entity::Activities => "Activity",
            Entity::Achievements => "Achievement",
            Entity::Gallery => "Image",
            Entity::Content => "Content",
            Entity::ContactInfo => "Contact info",
            Entity::ContactMessages => "Message",
        }
    }

    pub fn is_singleton(self) -> bool {
        matches!(self, Entity::Content | Entity::ContactInfo)
    }

    pub fn columns(self) -> &'static [Column] {
        match self {
            Entity::Faculty => FACULTY_COLUMNS,
            Entity::Students => STUDENT_COLUMNS,
            Entity::Leadership => LEADERSHIP_COLUMNS,
            Entity::Activities => ACTIVITY_COLUMNS,
            Entity::Achievements => ACHIEVEMENT_COLUMNS,
            Entity::Gallery => GALLERY_COLUMNS,
            Entity::Content => CONTENT_COLUMNS,
            Entity::ContactInfo => CONTACT_INFO_COLUMNS,
            Entity::ContactMessages => MESSAGE_COLUMNS,
        }
    }

    pub fn column(self, name: &str) -> Option<Column> {
        self.columns().iter().copied().find(|c| c.name == name)
    }

    pub fn has_created_at(self) -> bool {
        self.column("created_at").is_some()
    }

    /// Ordering used by the admin list views.
    pub fn default_order(self) -> Order {
        match self {
            Entity::Leadership => Order::asc("display_order"),
            Entity::Content | Entity::ContactInfo => Order::asc("id"),
            _ => Order::desc("created_at"),
        }
    }
}

// ── Queries ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

impl Order {
    pub fn asc(column: &str) -> Self {
        Order { column: column.to_string(), direction: Direction::Asc }
    }

    pub fn desc(column: &str) -> Self {
        Order { column: column.to_string(), direction: Direction::Desc }
    }
}

/// Equality filters + one ordering column + optional limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order: Option<Order>,
    pub limit: Option<u32>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push((column.to_string(), value.into()));
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }

    /// Rejects columns the table does not have.
    pub fn check(&self, entity: Entity) -> Result<(), String> {
        let names = self
            .filters
            .iter()
            .map(|(c, _)| c.as_str())
            .chain(self.order.iter().map(|o| o.column.as_str()));
        for name in names {
            if entity.column(name).is_none() {
                return Err(format!(
                    "column '{}' does not exist on table '{}'",
                    name,
                    entity.table()
                ));
            }
        }
        Ok(())
    }
}

// ── Store trait ─────────────────────────────────────────

/// Table access to the backend. Implementations: `HostedStore` (REST calls to
/// the hosted service) and `SqliteStore` (local rusqlite/r2d2 backend).
///
/// Every call is a single request; there is no retry and no transaction.
pub trait Store: Send + Sync {
    fn backend_name(&self) -> &'static str;

    fn run_migrations(&self) -> Result<(), String>;

    fn select(&self, entity: Entity, query: &Query) -> Result<Vec<Row>, String>;

    /// First row of a singleton table, `None` when the table is empty.
    fn select_single(&self, entity: Entity) -> Result<Option<Row>, String> {
        let rows = self.select(entity, &Query::new().order(Order::asc("id")).limit(1))?;
        Ok(rows.into_iter().next())
    }

    /// Insert one row and return it as stored (with its server-assigned id).
    fn insert(&self, entity: Entity, row: &Row) -> Result<Row, String>;

    /// Patch the row with `id`. `Ok(None)` when no row matched.
    fn update(&self, entity: Entity, id: &str, patch: &Row) -> Result<Option<Row>, String>;

    fn delete(&self, entity: Entity, id: &str) -> Result<(), String>;

    /// Insert or merge by `id`; the row must carry an id.
    fn upsert(&self, entity: Entity, row: &Row) -> Result<Row, String>;

    fn count(&self, entity: Entity) -> Result<i64, String>;
}

// ── Typed helpers ───────────────────────────────────────

pub fn decode<T: DeserializeOwned>(row: Row) -> Result<T, String> {
    serde_json::from_value(Value::Object(row)).map_err(|e| format!("Malformed row: {}", e))
}

pub fn decode_all<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, String> {
    rows.into_iter().map(decode).collect()
}

pub fn fetch<T: DeserializeOwned>(
    store: &dyn Store,
    entity: Entity,
    query: &Query,
) -> Result<Vec<T>, String> {
    decode_all(store.select(entity, query)?)
}

pub fn fetch_single<T: DeserializeOwned>(store: &dyn Store, entity: Entity) -> Result<Option<T>, String> {
    store.select_single(entity)?.map(decode).transpose()
}

/// Row ids come back as numbers from some tables and strings from others.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn row_id(row: &Row) -> Option<String> {
    row.get("id").and_then(id_string)
}

/// Timestamp format written by this application (RFC 3339, UTC, microseconds).
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::sqlite::SqliteStore;
    use serde_json::json;

    /// Fresh in-memory SqliteStore with migrations applied.
    fn test_store() -> SqliteStore {
        let manager = r2d2_sqlite::SqliteConnectionManager::memory();
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .build(manager)
            .expect("Failed to create in-memory pool");
        let store = SqliteStore::new(pool);
        store.run_migrations().expect("migrations failed");
        store
    }

    fn row(v: Value) -> Row {
        v.as_object().cloned().unwrap()
    }

    fn student(name: &str, cgpa: f64, topper: bool) -> Row {
        row(json!({
            "name": name,
            "roll_number": format!("R-{}", name),
            "year": 3,
            "cgpa": cgpa,
            "is_topper": topper,
        }))
    }

    // ── Schema ──────────────────────────────────────────────────────

    #[test]
    fn test_every_table_has_an_id() {
        for e in Entity::ALL {
            assert_eq!(e.column("id").map(|c| c.kind), Some(ColumnKind::Id), "{}", e.table());
        }
    }

    #[test]
    fn test_default_orders() {
        assert_eq!(Entity::Leadership.default_order(), Order::asc("display_order"));
        assert_eq!(Entity::Faculty.default_order(), Order::desc("created_at"));
        assert!(Entity::Content.is_singleton());
        assert!(!Entity::Gallery.is_singleton());
    }

    #[test]
    fn test_query_check_rejects_unknown_column() {
        let q = Query::new().eq("colour", "red");
        assert!(q.check(Entity::Faculty).unwrap_err().contains("colour"));
        let q = Query::new().order(Order::desc("cgpa"));
        assert!(q.check(Entity::Students).is_ok());
        assert!(q.check(Entity::Faculty).is_err());
    }

    #[test]
    fn test_id_string_accepts_numbers_and_strings() {
        assert_eq!(id_string(&json!(1)), Some("1".to_string()));
        assert_eq!(id_string(&json!("abc")), Some("abc".to_string()));
        assert_eq!(id_string(&json!("")), None);
        assert_eq!(id_string(&Value::Null), None);
    }

    // ── SQLite behaviour ────────────────────────────────────────────

    #[test]
    fn test_insert_assigns_id_and_created_at() {
        let s = test_store();
        let stored = s
            .insert(Entity::Faculty, &row(json!({"name": "Dr. Rao", "role": "Professor"})))
            .unwrap();
        assert!(row_id(&stored).is_some());
        assert!(stored.get("created_at").and_then(|v| v.as_str()).is_some());
        assert_eq!(stored.get("department"), Some(&Value::Null));
    }

    #[test]
    fn test_insert_rejects_unknown_column() {
        let s = test_store();
        let err = s
            .insert(Entity::Faculty, &row(json!({"name": "X", "role": "Y", "salary": 5})))
            .unwrap_err();
        assert!(err.contains("salary"));
        assert_eq!(s.count(Entity::Faculty).unwrap(), 0);
    }

    #[test]
    fn test_bool_and_real_round_trip_types() {
        let s = test_store();
        let stored = s.insert(Entity::Students, &student("Asha", 8.7, true)).unwrap();
        assert_eq!(stored.get("is_topper"), Some(&json!(true)));
        assert_eq!(stored.get("cgpa").and_then(|v| v.as_f64()), Some(8.7));
        assert_eq!(stored.get("year"), Some(&json!(3)));
        assert_eq!(stored.get("semester"), Some(&Value::Null));
    }

    #[test]
    fn test_topper_query_filters_orders_and_limits() {
        let s = test_store();
        for (name, cgpa, topper) in [
            ("a", 7.1, true),
            ("b", 9.4, true),
            ("c", 9.9, false),
            ("d", 8.2, true),
            ("e", 9.0, true),
        ] {
            s.insert(Entity::Students, &student(name, cgpa, topper)).unwrap();
        }
        let q = Query::new()
            .eq("is_topper", true)
            .order(Order::desc("cgpa"))
            .limit(3);
        let rows = s.select(Entity::Students, &q).unwrap();
        let names: Vec<&str> = rows.iter().filter_map(|r| r["name"].as_str()).collect();
        assert_eq!(names, vec!["b", "e", "d"]);
    }

    #[test]
    fn test_leadership_ordered_by_display_order() {
        let s = test_store();
        for (name, order) in [("Dean", 3), ("Principal", 1), ("HOD", 2)] {
            s.insert(
                Entity::Leadership,
                &row(json!({"name": name, "position": "P", "display_order": order})),
            )
            .unwrap();
        }
        let rows = s
            .select(Entity::Leadership, &Query::new().order(Entity::Leadership.default_order()))
            .unwrap();
        let orders: Vec<i64> = rows.iter().filter_map(|r| r["display_order"].as_i64()).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn test_update_and_missing_update() {
        let s = test_store();
        let stored = s
            .insert(Entity::Faculty, &row(json!({"name": "A", "role": "Lecturer"})))
            .unwrap();
        let id = row_id(&stored).unwrap();
        let updated = s
            .update(Entity::Faculty, &id, &row(json!({"role": "Professor"})))
            .unwrap()
            .unwrap();
        assert_eq!(updated["role"], json!("Professor"));
        assert_eq!(updated["name"], json!("A"));
        assert!(s
            .update(Entity::Faculty, "no-such-id", &row(json!({"role": "X"})))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_delete_and_count() {
        let s = test_store();
        let a = s
            .insert(Entity::Gallery, &row(json!({"image_url": "/a.png"})))
            .unwrap();
        s.insert(Entity::Gallery, &row(json!({"image_url": "/b.png"})))
            .unwrap();
        assert_eq!(s.count(Entity::Gallery).unwrap(), 2);
        s.delete(Entity::Gallery, &row_id(&a).unwrap()).unwrap();
        assert_eq!(s.count(Entity::Gallery).unwrap(), 1);
    }

    #[test]
    fn test_upsert_singleton_merges() {
        let s = test_store();
        assert!(s.select_single(Entity::Content).unwrap().is_none());
        s.upsert(
            Entity::Content,
            &row(json!({"id": SINGLETON_ID, "tagline": "Learn", "vision": "V"})),
        )
        .unwrap();
        s.upsert(Entity::Content, &row(json!({"id": SINGLETON_ID, "tagline": "Build"})))
            .unwrap();
        assert_eq!(s.count(Entity::Content).unwrap(), 1);
        let single = s.select_single(Entity::Content).unwrap().unwrap();
        assert_eq!(single["tagline"], json!("Build"));
        assert_eq!(single["vision"], json!("V"));
        assert_eq!(row_id(&single), Some("1".to_string()));
    }

    #[test]
    fn test_upsert_requires_id() {
        let s = test_store();
        assert!(s.upsert(Entity::ContactInfo, &row(json!({"phone": "1"}))).is_err());
    }

    #[test]
    fn test_status_filter() {
        let s = test_store();
        for status in ["new", "read", "new"] {
            s.insert(
                Entity::ContactMessages,
                &row(json!({"name": "n", "email": "e@x.io", "message": "m", "status": status})),
            )
            .unwrap();
        }
        let rows = s
            .select(Entity::ContactMessages, &Query::new().eq("status", "new"))
            .unwrap();
        assert_eq!(rows.len(), 2);
    }
}
