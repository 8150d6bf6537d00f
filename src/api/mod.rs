// ==========================================
// 商品目录导入系统 - API 层
// ==========================================
// 职责: 对外用例入口（CLI 调用），屏蔽仓储与引擎组装细节
// ==========================================

pub mod error;
pub mod import_api;

pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportApiResponse};
