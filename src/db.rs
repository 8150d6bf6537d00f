// ==========================================
// 商品目录导入系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键级联删除依赖 foreign_keys）
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供目录库 schema 建表（幂等）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 默认目录库路径
///
/// 优先级: 环境变量 CATALOG_IMPORT_DB_PATH → 用户数据目录 → 当前目录
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var("CATALOG_IMPORT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./catalog_import.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("catalog-import");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("catalog_import.db");
        }
    }

    path.to_string_lossy().to_string()
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 初始化目录库 schema（IF NOT EXISTS，可重复执行）
///
/// 说明：
/// - 商品独占规格/属性值/图片/分类关联（ON DELETE CASCADE）
/// - 分类、规格选项、属性、运输/税务类别为共享参考数据，不随商品删除
/// - 名称列使用 NOCASE，按名称查找时大小写不敏感
pub fn init_catalog_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS shipping_categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL COLLATE NOCASE
        );

        CREATE TABLE IF NOT EXISTS tax_categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL COLLATE NOCASE
        );

        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            price REAL NOT NULL DEFAULT 0,
            weight REAL,
            height REAL,
            width REAL,
            depth REAL,
            available_on TEXT NOT NULL,
            shipping_category_id INTEGER REFERENCES shipping_categories(id),
            tax_category_id INTEGER REFERENCES tax_categories(id),
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS variants (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            sku TEXT UNIQUE,
            price REAL NOT NULL DEFAULT 0,
            is_master INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS taxonomies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL COLLATE NOCASE
        );

        CREATE TABLE IF NOT EXISTS taxons (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            taxonomy_id INTEGER NOT NULL REFERENCES taxonomies(id),
            parent_id INTEGER REFERENCES taxons(id),
            name TEXT NOT NULL COLLATE NOCASE
        );

        CREATE TABLE IF NOT EXISTS products_taxons (
            product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            taxon_id INTEGER NOT NULL REFERENCES taxons(id),
            PRIMARY KEY (product_id, taxon_id)
        );

        CREATE TABLE IF NOT EXISTS option_types (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL COLLATE NOCASE,
            presentation TEXT NOT NULL COLLATE NOCASE
        );

        CREATE TABLE IF NOT EXISTS option_values (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            option_type_id INTEGER NOT NULL REFERENCES option_types(id),
            name TEXT NOT NULL COLLATE NOCASE,
            presentation TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS variants_option_values (
            variant_id INTEGER NOT NULL REFERENCES variants(id) ON DELETE CASCADE,
            option_value_id INTEGER NOT NULL REFERENCES option_values(id),
            PRIMARY KEY (variant_id, option_value_id)
        );

        CREATE TABLE IF NOT EXISTS properties (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL COLLATE NOCASE,
            presentation TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS product_properties (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            property_id INTEGER NOT NULL REFERENCES properties(id),
            value TEXT NOT NULL,
            UNIQUE (product_id, property_id)
        );

        CREATE TABLE IF NOT EXISTS images (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            file_name TEXT NOT NULL,
            content BLOB NOT NULL,
            byte_size INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS import_runs (
            run_id TEXT PRIMARY KEY,
            file_name TEXT,
            file_path TEXT NOT NULL,
            status TEXT NOT NULL,
            message TEXT NOT NULL,
            fatal_error TEXT,
            total_rows INTEGER NOT NULL DEFAULT 0,
            created_rows INTEGER NOT NULL DEFAULT 0,
            updated_rows INTEGER NOT NULL DEFAULT 0,
            skipped_rows INTEGER NOT NULL DEFAULT 0,
            failed_rows INTEGER NOT NULL DEFAULT 0,
            deleted_preexisting INTEGER NOT NULL DEFAULT 0,
            started_at TEXT NOT NULL,
            finished_at TEXT NOT NULL,
            elapsed_ms INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS import_row_outcomes (
            run_id TEXT NOT NULL REFERENCES import_runs(run_id) ON DELETE CASCADE,
            seq_no INTEGER NOT NULL,
            line INTEGER NOT NULL,
            kind TEXT NOT NULL,
            message TEXT NOT NULL,
            product_id INTEGER,
            PRIMARY KEY (run_id, seq_no)
        );

        CREATE INDEX IF NOT EXISTS idx_taxons_name ON taxons(name);
        CREATE INDEX IF NOT EXISTS idx_product_properties_property
            ON product_properties(property_id, value);
        CREATE INDEX IF NOT EXISTS idx_images_product ON images(product_id, position);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), None);
        init_catalog_schema(&conn).unwrap();
        init_catalog_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_default_db_path() {
        let path = default_db_path();
        assert!(path.ends_with(".db"));
    }
}
