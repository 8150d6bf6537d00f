// ==========================================
// 商品目录导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 分隔文本文件 → 商品目录（商品/规格/分类/属性/图片）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 行处理流水线
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 用例入口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    ImportOutcome, ImportRunRecord, ImportSummary, OutcomeKind, Product, RawRow, RunReport,
    RunStatus, Variant,
};

// 配置
pub use config::{IdentityMode, ImportSettings, TaxonLookupScope};

// 导入
pub use importer::{ColumnMap, ProductImportEngine, RowReader};

// 仓储
pub use repository::{CatalogRepository, SqliteCatalogRepository, SqliteImportRunRepository};

// API
pub use api::ImportApi;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "catalog-import";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
