// ==========================================
// 商品目录导入系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含导入业务规则
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod catalog_repo;
pub mod catalog_repo_impl;
pub mod error;
pub mod import_run_repo;
pub mod natural_key;

// 重导出核心仓储
pub use catalog_repo::CatalogRepository;
pub use catalog_repo_impl::SqliteCatalogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use import_run_repo::{ImportRunRepository, SqliteImportRunRepository};
pub use natural_key::{find_by_key, find_or_insert, NaturalKey};
