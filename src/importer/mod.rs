// ==========================================
// 商品目录导入系统 - 导入层
// ==========================================
// 职责: 分隔文本文件 → 商品目录
// 流程: 行读取 → 列映射 → 身份识别 → 字段填充/校验 → 分类/规格/图片 → 运行后清理
// ==========================================

// 模块声明
pub mod column_map;
pub mod error;
pub mod field_mapper;
pub mod image_attacher;
pub mod product_import_engine;
pub mod row_reader;
pub mod taxonomy_resolver;
pub mod text_decoder;
pub mod variant_builder;

// 重导出核心类型
pub use column_map::{ColumnMap, FieldValue};
pub use error::{ImportError, ImportResult, RowError, RowResult};
pub use field_mapper::{FieldMapper, NamelessCounter};
pub use image_attacher::ImageAttacher;
pub use product_import_engine::{ProductImportEngine, RunContext, RunOutput};
pub use row_reader::RowReader;
pub use taxonomy_resolver::TaxonomyResolver;
pub use text_decoder::{HtmlEntityDecoder, PassThrough, TextDecoder};
pub use variant_builder::VariantBuilder;
