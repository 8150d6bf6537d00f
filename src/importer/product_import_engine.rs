// ==========================================
// 商品目录导入系统 - 商品导入引擎
// ==========================================
// 职责: 编排一次完整导入运行
// 流程: 运行前快照 → 逐行(身份识别 → 追加规格 | 字段填充 → 校验 → 落库 →
//       属性 → 分类 → 主规格 → 图片) → 运行后清理
// 红线:
// - 只有文件级错误中止运行；行内任何错误只使该行 Failed
// - 行在目录行作用域内执行，Failed 行的写入全部撤销
// - 按文件顺序单遍处理（无名计数器与快照依赖确定的处理顺序）
// ==========================================

use crate::config::{field_names, IdentityMode, ImportSettings};
use crate::domain::import::{
    ImportOutcome, ImportSummary, RawRow, RunReport, RUN_FAILURE_MESSAGE, RUN_SUCCESS_MESSAGE,
};
use crate::domain::product::Product;
use crate::domain::types::{ProductId, RunStatus, ShippingCategoryId, TaxCategoryId};
use crate::importer::column_map::ColumnMap;
use crate::importer::error::{ImportResult, RowResult};
use crate::importer::field_mapper::{FieldMapper, NamelessCounter};
use crate::importer::image_attacher::ImageAttacher;
use crate::importer::row_reader::RowReader;
use crate::importer::taxonomy_resolver::TaxonomyResolver;
use crate::importer::variant_builder::VariantBuilder;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::RepositoryError;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// RunContext - 运行上下文
// ==========================================
// 生命周期: 一次导入运行；逐行传递，不使用全局状态
#[derive(Debug)]
pub struct RunContext {
    pub nameless: NamelessCounter,
    /// 运行开始前已存在的商品
    pub preexisting: BTreeSet<ProductId>,
    /// 本次运行中按外部 ID 命中的既有商品（清理时保留）
    pub matched_preexisting: HashSet<ProductId>,
    pub now: DateTime<Utc>,
    pub shipping_category_id: ShippingCategoryId,
    pub tax_category_id: Option<TaxCategoryId>,
}

/// 逐行处理结果 + 运行后清理数量
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    pub outcomes: Vec<ImportOutcome>,
    pub deleted_preexisting: usize,
}

// ==========================================
// ProductImportEngine
// ==========================================
pub struct ProductImportEngine<'a, C: CatalogRepository + ?Sized> {
    catalog: &'a C,
    settings: &'a ImportSettings,
    columns: ColumnMap,
    field_mapper: FieldMapper,
}

impl<'a, C: CatalogRepository + ?Sized> ProductImportEngine<'a, C> {
    pub fn new(catalog: &'a C, settings: &'a ImportSettings) -> Self {
        Self {
            catalog,
            settings,
            columns: ColumnMap::new(settings.column_mapping.clone()),
            field_mapper: FieldMapper::new(settings),
        }
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// 导入文件并生成运行报告
    ///
    /// 文件级错误不向外抛出，转为 status = error 的报告
    #[instrument(skip(self), fields(file = %file_path.display()))]
    pub fn run_file(&self, file_path: &Path) -> RunReport {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let start_time = Instant::now();

        info!(run_id = %run_id, "Importing products for {} began", file_path.display());
        debug!(columns = ?self.settings.column_mapping, "列映射配置");

        let mut output = RunOutput::default();
        let result = self.run_file_inner(file_path, &mut output);

        let (status, message, fatal_error) = match result {
            Ok(()) => {
                info!(run_id = %run_id, "Importing products for {} completed", file_path.display());
                (RunStatus::Notice, RUN_SUCCESS_MESSAGE.to_string(), None)
            }
            Err(e) => {
                error!(run_id = %run_id, error = %e, "导入运行中止");
                (
                    RunStatus::Error,
                    RUN_FAILURE_MESSAGE.to_string(),
                    Some(e.to_string()),
                )
            }
        };

        let mut summary = ImportSummary::from_outcomes(&output.outcomes);
        summary.deleted_preexisting = output.deleted_preexisting;

        info!(
            run_id = %run_id,
            total = summary.total_rows,
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            failed = summary.failed,
            deleted = summary.deleted_preexisting,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "导入运行结束"
        );

        RunReport {
            run_id,
            file_path: file_path.display().to_string(),
            status,
            message,
            fatal_error,
            summary,
            outcomes: output.outcomes,
            started_at,
            finished_at: Utc::now(),
            elapsed: start_time.elapsed(),
        }
    }

    fn run_file_inner(&self, file_path: &Path, output: &mut RunOutput) -> ImportResult<()> {
        self.settings.validate()?;

        let reader = RowReader::open(
            file_path,
            self.settings.delimiter_byte(),
            self.settings.header_rows_to_skip,
        )?;
        if let Some(column_count) = reader.column_count() {
            self.columns.validate_against(column_count)?;
        }

        self.run(reader, output)
    }

    /// 逐行导入
    ///
    /// 已处理行的结果写入 output；返回 Err 表示文件级错误，运行在该处中止
    pub fn run<I>(&self, rows: I, output: &mut RunOutput) -> ImportResult<()>
    where
        I: IntoIterator<Item = ImportResult<RawRow>>,
    {
        let mut ctx = self.start_context()?;

        for row in rows {
            let row = row?;
            let outcome = self.process_row(&row, &mut ctx);
            output.outcomes.push(outcome);
        }

        if self.settings.destroy_preexisting_after_import {
            output.deleted_preexisting = self.destroy_preexisting(&ctx);
        }
        Ok(())
    }

    /// 运行前准备: 商品快照 + 默认类别
    pub fn start_context(&self) -> ImportResult<RunContext> {
        let preexisting: BTreeSet<ProductId> =
            self.catalog.list_product_ids()?.into_iter().collect();
        let shipping_category_id = self
            .catalog
            .find_or_create_shipping_category(&self.settings.default_shipping_category)?;
        let tax_category_id = match self.settings.default_tax_category.trim() {
            "" => None,
            name => Some(self.catalog.find_or_create_tax_category(name)?),
        };

        debug!(preexisting = preexisting.len(), "运行前商品快照");

        Ok(RunContext {
            nameless: NamelessCounter::default(),
            preexisting,
            matched_preexisting: HashSet::new(),
            now: Utc::now(),
            shipping_category_id,
            tax_category_id,
        })
    }

    /// 处理单行（行作用域内执行，任何错误在此收敛为 Failed）
    pub fn process_row(&self, row: &RawRow, ctx: &mut RunContext) -> ImportOutcome {
        debug!(line = row.line, row = ?row.fields, "Import - Current row");

        if row.is_blank() {
            return ImportOutcome::skipped_invalid(row.line, "空白行");
        }

        if let Err(e) = self.catalog.begin_row_scope() {
            error!(line = row.line, error = %e, "行作用域开启失败");
            return ImportOutcome::failed(row.line, e.to_string());
        }

        match self.import_row(row, ctx) {
            Ok(outcome) => match self.catalog.commit_row_scope() {
                Ok(()) => outcome,
                Err(e) => {
                    error!(line = row.line, error = %e, "行提交失败");
                    self.rollback(row.line);
                    ImportOutcome::failed(row.line, e.to_string())
                }
            },
            Err(e) => {
                error!(line = row.line, row = ?row.fields, error = %e, "行导入失败");
                self.rollback(row.line);
                ImportOutcome::failed(row.line, e.to_string())
            }
        }
    }

    fn rollback(&self, line: u64) {
        if let Err(e) = self.catalog.rollback_row_scope() {
            error!(line, error = %e, "行回滚失败");
        }
    }

    fn import_row(&self, row: &RawRow, ctx: &mut RunContext) -> RowResult<ImportOutcome> {
        let external_id = self.columns.lookup(row, field_names::ID)?.present();

        // ===== 身份识别 =====
        if self.settings.identity_mode == IdentityMode::ExternalId {
            if let Some(id) = external_id {
                if let Some(product) = self
                    .catalog
                    .find_product_by_external_id(&self.settings.identity_property, id)?
                {
                    // 命中即计入保留集；行作用域回滚不影响运行上下文
                    if ctx.preexisting.contains(&product.id) {
                        ctx.matched_preexisting.insert(product.id);
                    }
                    return self.add_variant(row, &product);
                }
            }
        }

        // ===== 新建商品 =====
        let draft = self.field_mapper.map_product(
            row,
            &self.columns,
            &mut ctx.nameless,
            Some(ctx.shipping_category_id),
            ctx.tax_category_id,
            ctx.now,
        )?;

        let errors = self.catalog.validate_product(&draft);
        if !errors.is_empty() {
            let detail = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            error!(
                line = row.line,
                draft = ?draft,
                errors = %detail,
                "A product could not be imported"
            );
            return Ok(ImportOutcome::skipped_invalid(row.line, detail));
        }

        let product = self.catalog.create_product(&draft)?;

        self.stamp_properties(row, &product, external_id)?;

        let resolver = TaxonomyResolver::new(self.catalog, self.settings.taxon_lookup);
        for column in &self.settings.taxonomy_columns {
            if let Some(value) = self.columns.lookup(row, &column.field)?.present() {
                resolver.ensure_taxon(&column.taxonomy, value, product.id)?;
            }
        }

        let master = VariantBuilder::new(self.catalog, &self.settings.option_axes)
            .ensure_variant(&product, row, &self.columns, true)?;
        debug!(product_id = %product.id, sku = ?master.sku, "Master Variant saved");

        self.attach_images(row, &product)?;

        info!(
            line = row.line,
            product_id = %product.id,
            sku = ?master.sku,
            price = master.price,
            "{} successfully imported",
            product.name
        );
        Ok(ImportOutcome::created(
            row.line,
            product.id,
            format!("{} successfully imported", product.name),
        ))
    }

    /// 已有商品: 仅追加规格，不覆盖基础字段
    fn add_variant(&self, row: &RawRow, product: &Product) -> RowResult<ImportOutcome> {
        let variant = VariantBuilder::new(self.catalog, &self.settings.option_axes)
            .ensure_variant(product, row, &self.columns, false)?;

        info!(
            line = row.line,
            product_id = %product.id,
            variant_id = %variant.id,
            sku = ?variant.sku,
            "Variant saved"
        );
        Ok(ImportOutcome::updated(
            row.line,
            product.id,
            format!("variant {} added to {}", variant.id, product.name),
        ))
    }

    fn stamp_properties(
        &self,
        row: &RawRow,
        product: &Product,
        external_id: Option<&str>,
    ) -> RowResult<()> {
        if let Some(id) = external_id {
            let property = self.catalog.create_property(
                &self.settings.identity_property,
                &self.settings.identity_property,
            )?;
            self.catalog.set_product_property(product.id, property.id, id)?;
        }

        for column in &self.settings.property_columns {
            if let Some(value) = self.columns.lookup(row, &column.field)?.present() {
                let property = self
                    .catalog
                    .create_property(&column.name, &column.presentation)?;
                self.catalog.set_product_property(product.id, property.id, value)?;
            }
        }
        Ok(())
    }

    fn attach_images(&self, row: &RawRow, product: &Product) -> RowResult<()> {
        let subdirectory = match &self.settings.image_subdirectory_field {
            Some(field) => self.columns.lookup(row, field)?.present(),
            None => None,
        };

        let attacher = ImageAttacher::new(self.catalog, &self.settings.image_root_path);
        for column in &self.settings.image_columns {
            if let Some(file_name) = self.columns.lookup(row, column)?.present() {
                attacher.attach(file_name, subdirectory, product.id)?;
            }
        }
        Ok(())
    }

    /// 删除运行前已存在、且本次未按外部 ID 命中的商品
    fn destroy_preexisting(&self, ctx: &RunContext) -> usize {
        let mut deleted = 0;
        for product_id in &ctx.preexisting {
            if ctx.matched_preexisting.contains(product_id) {
                continue;
            }
            match self.catalog.delete_product(*product_id) {
                Ok(()) => deleted += 1,
                Err(RepositoryError::NotFound { .. }) => {
                    debug!(product_id = %product_id, "商品已不存在，跳过删除");
                }
                Err(e) => {
                    warn!(product_id = %product_id, error = %e, "既有商品删除失败");
                }
            }
        }
        info!(deleted, kept = ctx.matched_preexisting.len(), "运行前商品清理完成");
        deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::OutcomeKind;
    use crate::importer::error::ImportError;
    use crate::repository::SqliteCatalogRepository;
    use rusqlite::Connection;
    use std::sync::{Arc, Mutex};

    fn repo() -> SqliteCatalogRepository {
        let conn = Connection::open_in_memory().unwrap();
        let repo = SqliteCatalogRepository::from_connection(Arc::new(Mutex::new(conn))).unwrap();
        repo.init_schema().unwrap();
        repo
    }

    fn rows(data: &[&[&str]]) -> Vec<ImportResult<RawRow>> {
        data.iter()
            .enumerate()
            .map(|(idx, fields)| {
                Ok(RawRow::new(
                    idx as u64 + 2,
                    fields.iter().map(|s| s.to_string()).collect(),
                ))
            })
            .collect()
    }

    #[test]
    fn test_blank_and_short_rows() {
        let catalog = repo();
        let settings = ImportSettings::with_mapping([("Name", 0), ("Category", 3)]);
        let engine = ProductImportEngine::new(&catalog, &settings);

        let mut output = RunOutput::default();
        engine
            .run(rows(&[&["", "", "", ""], &["Short"], &["Ok", "", "", "Toys"]]), &mut output)
            .unwrap();

        let kinds: Vec<OutcomeKind> = output.outcomes.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![OutcomeKind::SkippedInvalid, OutcomeKind::Failed, OutcomeKind::Created]
        );
        // 失败行已回滚，不留下半成品
        assert_eq!(catalog.list_product_ids().unwrap().len(), 1);
    }

    #[test]
    fn test_fatal_row_error_stops_run() {
        let catalog = repo();
        let settings = ImportSettings::with_mapping([("Name", 0)]);
        let engine = ProductImportEngine::new(&catalog, &settings);

        let mut input = rows(&[&["A"]]);
        input.push(Err(ImportError::CsvParseError {
            line: 3,
            message: "bad".to_string(),
        }));
        input.extend(rows(&[&["B"]]));

        let mut output = RunOutput::default();
        let result = engine.run(input, &mut output);

        assert!(result.is_err());
        assert_eq!(output.outcomes.len(), 1);
    }

    #[test]
    fn test_always_new_mode_ignores_identity() {
        let catalog = repo();
        let mut settings = ImportSettings::with_mapping([("Id", 0), ("Name", 1)]);
        settings.identity_mode = IdentityMode::AlwaysNew;
        let engine = ProductImportEngine::new(&catalog, &settings);

        let mut output = RunOutput::default();
        engine
            .run(rows(&[&["X1", "A"], &["X1", "B"]]), &mut output)
            .unwrap();

        assert!(output.outcomes.iter().all(|o| o.kind == OutcomeKind::Created));
        assert_eq!(catalog.list_product_ids().unwrap().len(), 2);
    }
}
