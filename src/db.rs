use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

pub type DbPool = Pool<SqliteConnectionManager>;

pub fn init_pool_at(path: &str) -> Result<DbPool, String> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
    }
    let manager = SqliteConnectionManager::file(path);
    let pool = Pool::builder()
        .max_size(10)
        .build(manager)
        .map_err(|e| e.to_string())?;

    // WAL for concurrent readers while an editor writes
    let conn = pool.get().map_err(|e| e.to_string())?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")
        .map_err(|e| e.to_string())?;

    Ok(pool)
}

/// Local mirror of the hosted service's tables. Ids are text so that uuid
/// ids and the numeric singleton id `1` share one column type.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS faculty (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            role TEXT NOT NULL,
            department TEXT,
            photo_url TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS students (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            roll_number TEXT,
            year INTEGER NOT NULL,
            semester INTEGER,
            cgpa REAL,
            is_topper INTEGER NOT NULL DEFAULT 0,
            photo_url TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS leadership (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            position TEXT NOT NULL,
            display_order INTEGER NOT NULL DEFAULT 1,
            photo_url TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS activities (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            image_url TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS achievements (
            id TEXT PRIMARY KEY,
            title TEXT,
            image_url TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS gallery (
            id TEXT PRIMARY KEY,
            image_url TEXT NOT NULL,
            caption TEXT,
            description TEXT,
            created_at TEXT NOT NULL
        );

        -- Singleton rows (id = '1')
        CREATE TABLE IF NOT EXISTS content (
            id TEXT PRIMARY KEY,
            tagline TEXT,
            description TEXT,
            vision TEXT,
            mission TEXT
        );

        CREATE TABLE IF NOT EXISTS contact_info (
            id TEXT PRIMARY KEY,
            address TEXT,
            phone TEXT,
            email TEXT,
            alternate_email TEXT,
            website TEXT,
            office_hours TEXT
        );

        CREATE TABLE IF NOT EXISTS contact_messages (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            message TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'new',
            admin_notes TEXT,
            replied_at TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_students_topper ON students(is_topper, cgpa);
        CREATE INDEX IF NOT EXISTS idx_messages_status ON contact_messages(status, created_at);
        ",
    )?;

    Ok(())
}
