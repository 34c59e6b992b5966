use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use std::path::Path;

fn build_sqlite_url(path: &Path) -> String {
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    format!("sqlite://{}{}?mode=rwc", prefix, normalized)
}

/// Opens (creating if needed) the SQLite file and bootstraps the schema
pub async fn initialize_database(db_file: &Path) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    let db_url = build_sqlite_url(&absolute_path);
    tracing::info!("Opening database {}", absolute_path.display());

    let mut options = ConnectOptions::new(db_url);
    options.sqlx_logging(false);
    let conn = Database::connect(options).await?;

    ensure_schema(&conn).await?;
    Ok(conn)
}

/// Single-connection in-memory database, used by tests
pub async fn connect_in_memory() -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let conn = Database::connect(options).await?;
    ensure_schema(&conn).await?;
    Ok(conn)
}

const SCHEMA: &[(&str, &str)] = &[
    (
        "a001_stock_item",
        r#"
        CREATE TABLE IF NOT EXISTS a001_stock_item (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            quantity REAL NOT NULL DEFAULT 0,
            unit TEXT NOT NULL,
            cost REAL NOT NULL DEFAULT 0,
            price REAL NOT NULL DEFAULT 0,
            low_stock_threshold REAL NOT NULL,
            category TEXT NOT NULL DEFAULT '',
            supplier TEXT NOT NULL DEFAULT '',
            expiry TEXT,
            shop_kind TEXT NOT NULL,
            branches TEXT NOT NULL DEFAULT '[]',
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a002_employee_loan",
        r#"
        CREATE TABLE IF NOT EXISTS a002_employee_loan (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            employee_code TEXT NOT NULL,
            principal REAL NOT NULL,
            outstanding REAL NOT NULL,
            monthly_installment REAL NOT NULL DEFAULT 0,
            status TEXT NOT NULL,
            start_date TEXT NOT NULL,
            branch TEXT NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a003_rental_contract",
        r#"
        CREATE TABLE IF NOT EXISTS a003_rental_contract (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            shop_kind TEXT NOT NULL,
            branch TEXT NOT NULL,
            monthly_rent REAL NOT NULL DEFAULT 0,
            deposit REAL NOT NULL DEFAULT 0,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            status TEXT NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a004_fuel_sale",
        r#"
        CREATE TABLE IF NOT EXISTS a004_fuel_sale (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            sale_date TEXT NOT NULL,
            branch TEXT NOT NULL,
            fuel_type TEXT NOT NULL,
            liters REAL NOT NULL,
            amount REAL NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
];

/// Creates missing tables (minimal schema bootstrap)
pub async fn ensure_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    for (table, ddl) in SCHEMA {
        let exists = conn
            .query_all(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type='table' AND name = ?;",
                [(*table).into()],
            ))
            .await?;
        if exists.is_empty() {
            tracing::info!("Creating {} table", table);
            conn.execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                ddl.to_string(),
            ))
            .await?;
        }
    }
    Ok(())
}
