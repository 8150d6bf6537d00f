// ==========================================
// 商品目录导入系统 - 导入运行记录 Repository
// ==========================================
// 职责: 存档每次导入运行的报告与逐行结果（审计轨迹）
// 表: import_runs, import_row_outcomes
// ==========================================

use crate::domain::import::{ImportOutcome, ImportRunRecord, ImportSummary, RunReport};
use crate::domain::types::{OutcomeKind, ProductId, RunStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ImportRunRepository Trait
// ==========================================
pub trait ImportRunRepository {
    /// 存档运行报告（含全部逐行结果）
    fn record_run(&self, report: &RunReport) -> RepositoryResult<()>;

    fn get_run(&self, run_id: &str) -> RepositoryResult<Option<ImportRunRecord>>;

    /// 最近的运行（按开始时间倒序）
    fn list_recent_runs(&self, limit: usize) -> RepositoryResult<Vec<ImportRunRecord>>;

    /// 某次运行的逐行结果（按处理顺序）
    fn list_outcomes(&self, run_id: &str) -> RepositoryResult<Vec<ImportOutcome>>;
}

// ==========================================
// SqliteImportRunRepository
// ==========================================
pub struct SqliteImportRunRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteImportRunRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_run(row: &Row) -> rusqlite::Result<ImportRunRecord> {
        let status: String = row.get(3)?;
        Ok(ImportRunRecord {
            run_id: row.get(0)?,
            file_name: row.get(1)?,
            file_path: row.get(2)?,
            status: RunStatus::from_str(&status),
            message: row.get(4)?,
            fatal_error: row.get(5)?,
            summary: ImportSummary {
                total_rows: row.get::<_, i64>(6)? as usize,
                created: row.get::<_, i64>(7)? as usize,
                updated: row.get::<_, i64>(8)? as usize,
                skipped: row.get::<_, i64>(9)? as usize,
                failed: row.get::<_, i64>(10)? as usize,
                deleted_preexisting: row.get::<_, i64>(11)? as usize,
            },
            started_at: row.get(12)?,
            finished_at: row.get(13)?,
            elapsed_ms: row.get(14)?,
        })
    }
}

const RUN_COLUMNS: &str = "run_id, file_name, file_path, status, message, fatal_error, \
     total_rows, created_rows, updated_rows, skipped_rows, failed_rows, deleted_preexisting, \
     started_at, finished_at, elapsed_ms";

impl ImportRunRepository for SqliteImportRunRepository {
    fn record_run(&self, report: &RunReport) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let file_name = Path::new(&report.file_path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
        let summary = &report.summary;

        tx.execute(
            &format!(
                "INSERT INTO import_runs ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                RUN_COLUMNS
            ),
            params![
                report.run_id,
                file_name,
                report.file_path,
                report.status.as_str(),
                report.message,
                report.fatal_error,
                summary.total_rows as i64,
                summary.created as i64,
                summary.updated as i64,
                summary.skipped as i64,
                summary.failed as i64,
                summary.deleted_preexisting as i64,
                report.started_at,
                report.finished_at,
                report.elapsed.as_millis() as i64,
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO import_row_outcomes (run_id, seq_no, line, kind, message, product_id)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;
            for (seq_no, outcome) in report.outcomes.iter().enumerate() {
                stmt.execute(params![
                    report.run_id,
                    seq_no as i64,
                    outcome.line as i64,
                    outcome.kind.as_str(),
                    outcome.message,
                    outcome.product_id.map(|id| id.0),
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    fn get_run(&self, run_id: &str) -> RepositoryResult<Option<ImportRunRecord>> {
        let conn = self.get_conn()?;
        let record = conn
            .query_row(
                &format!("SELECT {} FROM import_runs WHERE run_id = ?1", RUN_COLUMNS),
                params![run_id],
                Self::map_run,
            )
            .optional()?;
        Ok(record)
    }

    fn list_recent_runs(&self, limit: usize) -> RepositoryResult<Vec<ImportRunRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM import_runs ORDER BY started_at DESC, rowid DESC LIMIT ?1",
            RUN_COLUMNS
        ))?;
        let records = stmt
            .query_map(params![limit as i64], Self::map_run)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn list_outcomes(&self, run_id: &str) -> RepositoryResult<Vec<ImportOutcome>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT line, kind, message, product_id
            FROM import_row_outcomes
            WHERE run_id = ?1
            ORDER BY seq_no
            "#,
        )?;
        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(line, kind, message, product_id)| {
                let kind = OutcomeKind::from_str(&kind).ok_or_else(|| {
                    RepositoryError::FieldValueError {
                        field: "kind".to_string(),
                        message: format!("未知结果类型: {}", kind),
                    }
                })?;
                Ok(ImportOutcome {
                    line: line as u64,
                    kind,
                    message,
                    product_id: product_id.map(ProductId),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_catalog_schema};
    use chrono::{Duration as ChronoDuration, Utc};
    use std::time::Duration;

    fn test_repo() -> SqliteImportRunRepository {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_catalog_schema(&conn).unwrap();
        SqliteImportRunRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn report(run_id: &str, offset_secs: i64) -> RunReport {
        let outcomes = vec![
            ImportOutcome::created(2, ProductId(7), "created"),
            ImportOutcome::failed(3, "boom"),
        ];
        let started_at = Utc::now() + ChronoDuration::seconds(offset_secs);
        RunReport {
            run_id: run_id.to_string(),
            file_path: "/tmp/in/products.csv".to_string(),
            status: RunStatus::Notice,
            message: "ok".to_string(),
            fatal_error: None,
            summary: ImportSummary::from_outcomes(&outcomes),
            outcomes,
            started_at,
            finished_at: started_at,
            elapsed: Duration::from_millis(42),
        }
    }

    #[test]
    fn test_record_and_read_back() {
        let repo = test_repo();
        repo.record_run(&report("run-1", 0)).unwrap();

        let record = repo.get_run("run-1").unwrap().unwrap();
        assert_eq!(record.file_name.as_deref(), Some("products.csv"));
        assert_eq!(record.status, RunStatus::Notice);
        assert_eq!(record.summary.created, 1);
        assert_eq!(record.summary.failed, 1);
        assert_eq!(record.elapsed_ms, 42);

        let outcomes = repo.list_outcomes("run-1").unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].product_id, Some(ProductId(7)));
        assert_eq!(outcomes[1].kind, OutcomeKind::Failed);

        assert!(repo.get_run("missing").unwrap().is_none());
    }

    #[test]
    fn test_recent_runs_newest_first() {
        let repo = test_repo();
        repo.record_run(&report("older", -60)).unwrap();
        repo.record_run(&report("newer", 0)).unwrap();

        let runs = repo.list_recent_runs(1).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].run_id, "newer");
    }
}
