// ==========================================
// 商品目录导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分层:
// - ImportError: 文件级致命错误，中止整次运行
// - RowError: 行级错误，仅使该行结果为 Failed
// ==========================================

use crate::config::SettingsError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块致命错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败 (行 {line}): {message}")]
    CsvParseError { line: u64, message: String },

    // ===== 配置错误 =====
    #[error("列映射越界: 字段 {field} 指向第 {index} 列，文件仅有 {column_count} 列")]
    ColumnMappingOutOfRange {
        field: String,
        index: usize,
        column_count: usize,
    },

    #[error(transparent)]
    Settings(#[from] SettingsError),

    // ===== 数据库错误 =====
    #[error("目录访问失败: {0}")]
    Repository(#[from] RepositoryError),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

/// 行级错误
#[derive(Error, Debug)]
pub enum RowError {
    #[error("字段 {field} 指向第 {index} 列，但该行仅有 {row_len} 列")]
    ColumnOutOfRange {
        field: String,
        index: usize,
        row_len: usize,
    },

    #[error("字段 {field} 不是有效数字: {value}")]
    InvalidNumber { field: String, value: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
pub type RowResult<T> = Result<T, RowError>;
