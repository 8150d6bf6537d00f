// ==========================================
// 商品目录导入系统 - 导入领域模型
// ==========================================
// 职责: 原始行、行导入结果、运行报告
// 生命周期: 仅在一次导入运行内（运行报告会落库存档）
// ==========================================

use crate::domain::types::{OutcomeKind, ProductId, RunStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 运行成功时的固定提示
pub const RUN_SUCCESS_MESSAGE: &str = "Product data was successfully imported.";

/// 运行失败时的固定提示
pub const RUN_FAILURE_MESSAGE: &str = "The file data could not be imported. Please check that the spreadsheet is a CSV file, and is correctly formatted.";

// ==========================================
// RawRow - 原始行
// ==========================================
// 与源文件列位置对齐，值为原始字符串（可能为空）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub line: u64, // 源文件行号（从 1 开始，含被跳过的表头）
    pub fields: Vec<String>,
}

impl RawRow {
    pub fn new(line: u64, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    /// 所有字段均为空白
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|f| f.trim().is_empty())
    }
}

// ==========================================
// ImportOutcome - 单行导入结果
// ==========================================
// 全部结果序列即本次运行的审计轨迹
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub line: u64,
    pub kind: OutcomeKind,
    pub message: String,
    pub product_id: Option<ProductId>,
}

impl ImportOutcome {
    pub fn created(line: u64, product_id: ProductId, message: impl Into<String>) -> Self {
        Self {
            line,
            kind: OutcomeKind::Created,
            message: message.into(),
            product_id: Some(product_id),
        }
    }

    pub fn updated(line: u64, product_id: ProductId, message: impl Into<String>) -> Self {
        Self {
            line,
            kind: OutcomeKind::Updated,
            message: message.into(),
            product_id: Some(product_id),
        }
    }

    pub fn skipped_invalid(line: u64, message: impl Into<String>) -> Self {
        Self {
            line,
            kind: OutcomeKind::SkippedInvalid,
            message: message.into(),
            product_id: None,
        }
    }

    pub fn failed(line: u64, message: impl Into<String>) -> Self {
        Self {
            line,
            kind: OutcomeKind::Failed,
            message: message.into(),
            product_id: None,
        }
    }
}

// ==========================================
// ImportSummary - 结果统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub deleted_preexisting: usize,
}

impl ImportSummary {
    pub fn from_outcomes(outcomes: &[ImportOutcome]) -> Self {
        let mut summary = ImportSummary {
            total_rows: outcomes.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome.kind {
                OutcomeKind::Created => summary.created += 1,
                OutcomeKind::Updated => summary.updated += 1,
                OutcomeKind::SkippedInvalid => summary.skipped += 1,
                OutcomeKind::Failed => summary.failed += 1,
            }
        }
        summary
    }
}

// ==========================================
// RunReport - 运行报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub file_path: String,
    pub status: RunStatus,
    pub message: String,
    /// 文件级致命错误详情（仅 status = error 时存在）
    pub fatal_error: Option<String>,
    pub summary: ImportSummary,
    pub outcomes: Vec<ImportOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Notice
    }
}

// ==========================================
// ImportRunRecord - 已存档的运行记录
// ==========================================
// 对齐: import_runs 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRunRecord {
    pub run_id: String,
    pub file_name: Option<String>,
    pub file_path: String,
    pub status: RunStatus,
    pub message: String,
    pub fatal_error: Option<String>,
    pub summary: ImportSummary,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_row_detection() {
        assert!(RawRow::new(2, vec!["".into(), "  ".into()]).is_blank());
        assert!(!RawRow::new(2, vec!["".into(), "x".into()]).is_blank());
    }

    #[test]
    fn test_summary_counts() {
        let outcomes = vec![
            ImportOutcome::created(2, ProductId(1), "ok"),
            ImportOutcome::updated(3, ProductId(1), "ok"),
            ImportOutcome::skipped_invalid(4, "bad"),
            ImportOutcome::failed(5, "boom"),
            ImportOutcome::created(6, ProductId(2), "ok"),
        ];
        let summary = ImportSummary::from_outcomes(&outcomes);
        assert_eq!(summary.total_rows, 5);
        assert_eq!(summary.created, 2);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
    }
}
