// ==========================================
// 商品目录导入系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod catalog;
pub mod import;
pub mod product;
pub mod types;

// 重导出核心类型
pub use catalog::{Image, OptionType, OptionValue, Property, Taxon, Taxonomy};
pub use import::{
    ImportOutcome, ImportRunRecord, ImportSummary, RawRow, RunReport, RUN_FAILURE_MESSAGE,
    RUN_SUCCESS_MESSAGE,
};
pub use product::{NumericField, Product, ProductDraft, ValidationError, Variant};
pub use types::{
    ImageId, OptionTypeId, OptionValueId, OutcomeKind, ProductId, PropertyId, RunStatus,
    ShippingCategoryId, TaxCategoryId, TaxonId, TaxonomyId, VariantId,
};
