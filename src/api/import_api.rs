// ==========================================
// 商品导入API
// ==========================================
// 职责: 组装目录仓储、运行记录仓储与导入引擎；执行导入并存档运行报告
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ImportSettings;
use crate::domain::import::{ImportOutcome, ImportRunRecord, ImportSummary, RunReport};
use crate::domain::types::RunStatus;
use crate::importer::ProductImportEngine;
use crate::repository::{
    ImportRunRepository, SqliteCatalogRepository, SqliteImportRunRepository,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info};

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 运行ID
    pub run_id: String,
    /// 运行状态（notice / error）
    pub status: RunStatus,
    /// 固定提示文本
    pub message: String,
    /// 文件级错误详情
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatal_error: Option<String>,
    /// 结果统计
    pub summary: ImportSummary,
    /// 逐行结果
    pub outcomes: Vec<ImportOutcome>,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
}

impl From<RunReport> for ImportApiResponse {
    fn from(report: RunReport) -> Self {
        Self {
            elapsed_ms: report.elapsed.as_millis() as i64,
            run_id: report.run_id,
            status: report.status,
            message: report.message,
            fatal_error: report.fatal_error,
            summary: report.summary,
            outcomes: report.outcomes,
        }
    }
}

/// 导入API
pub struct ImportApi {
    catalog: SqliteCatalogRepository,
    runs: SqliteImportRunRepository,
}

impl ImportApi {
    /// 打开目录库（schema 不存在时创建）
    pub fn open(db_path: &str) -> ApiResult<Self> {
        let catalog = SqliteCatalogRepository::new(db_path)?;
        catalog.init_schema()?;
        let runs = SqliteImportRunRepository::new(catalog.connection());
        Ok(Self { catalog, runs })
    }

    pub fn catalog(&self) -> &SqliteCatalogRepository {
        &self.catalog
    }

    /// 导入文件并存档运行报告
    ///
    /// # 返回
    /// - Ok(ImportApiResponse): 运行已完成（status 可能为 error，详见 fatal_error）
    /// - Err(ApiError): 运行报告存档失败
    pub fn import_file(
        &self,
        settings: &ImportSettings,
        file_path: &Path,
    ) -> ApiResult<ImportApiResponse> {
        let engine = ProductImportEngine::new(&self.catalog, settings);
        let report = engine.run_file(file_path);

        if let Err(e) = self.runs.record_run(&report) {
            error!(run_id = %report.run_id, error = %e, "运行报告存档失败");
            return Err(e.into());
        }

        info!(
            run_id = %report.run_id,
            status = %report.status,
            "导入运行已存档"
        );
        Ok(report.into())
    }

    /// 最近的运行记录
    pub fn recent_runs(&self, limit: usize) -> ApiResult<Vec<ImportRunRecord>> {
        if limit == 0 {
            return Err(ApiError::InvalidInput("limit 必须大于 0".to_string()));
        }
        Ok(self.runs.list_recent_runs(limit)?)
    }

    /// 某次运行的逐行结果
    pub fn run_outcomes(&self, run_id: &str) -> ApiResult<Vec<ImportOutcome>> {
        if self.runs.get_run(run_id)?.is_none() {
            return Err(ApiError::NotFound(format!("ImportRun(id={})不存在", run_id)));
        }
        Ok(self.runs.list_outcomes(run_id)?)
    }
}
