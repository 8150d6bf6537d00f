// ==========================================
// 商品目录导入系统 - 配置层
// ==========================================
// 职责: 导入运行配置（JSON 文件，缺省值内置）
// ==========================================

pub mod import_settings;

// 重导出核心配置
pub use import_settings::{
    field_names, IdentityMode, ImportSettings, OptionAxis, PropertyColumn, SettingsError,
    TaxonLookupScope, TaxonomyColumn,
};
