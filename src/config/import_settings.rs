// ==========================================
// 商品目录导入系统 - 导入配置
// ==========================================
// 职责: 导入运行参数（列映射、分隔符、默认类别、身份模式等）
// 存储: JSON 文件（serde 反序列化，缺省字段取默认值）
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ==========================================
// 逻辑字段名
// ==========================================
// 列映射的键；未出现在映射中的字段视为“本文件不含该列”
pub mod field_names {
    pub const ID: &str = "Id";
    pub const NAME: &str = "Name";
    pub const DESCRIPTION: &str = "Description";
    pub const MASTER_PRICE: &str = "Master Price";
    pub const SKU: &str = "SKU";
    pub const WEIGHT: &str = "Weight";
    pub const HEIGHT: &str = "Height";
    pub const WIDTH: &str = "Width";
    pub const DEPTH: &str = "Depth";
    pub const CATEGORY: &str = "Category";
    pub const GENDER: &str = "Gender";
    pub const BRAND: &str = "Brand";
    pub const COLOR: &str = "Color";
    pub const SIZE: &str = "Size";
    pub const AGE: &str = "Age";
    pub const IMAGE_MAIN: &str = "Image Main";
}

/// 配置错误
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("配置文件读取失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件格式错误 ({path}): {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("配置无效: {0}")]
    Invalid(String),
}

// ==========================================
// 身份模式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdentityMode {
    /// 按外部 ID 属性识别已导入商品，命中则只追加规格
    #[default]
    ExternalId,
    /// 文件无稳定外部 ID，每行都是新商品
    AlwaysNew,
}

// ==========================================
// 分类值查找范围
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaxonLookupScope {
    /// 在全部分类轴中按名称查找（命中多个则全部关联）
    #[default]
    Global,
    /// 仅在目标分类轴中查找
    WithinTaxonomy,
}

/// 分类列: 分类轴名称 ← 逻辑字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyColumn {
    pub taxonomy: String,
    pub field: String,
}

/// 规格轴: (名称, 展示名) ← 逻辑字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionAxis {
    pub name: String,
    pub presentation: String,
    pub field: String,
}

/// 附加属性列（供应商 ID、品牌 ID 等）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyColumn {
    pub name: String,
    pub presentation: String,
    pub field: String,
}

// ==========================================
// ImportSettings
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportSettings {
    /// 逻辑字段名 → 列下标（从 0 开始）
    pub column_mapping: BTreeMap<String, usize>,
    pub field_delimiter: char,
    pub header_rows_to_skip: usize,

    pub default_shipping_category: String,
    pub default_tax_category: String,

    pub decode_html_in_names: bool,
    pub decode_html_in_descriptions: bool,

    /// 导入完成后删除运行前已存在的商品
    pub destroy_preexisting_after_import: bool,

    pub image_root_path: PathBuf,
    pub log_file_path: Option<PathBuf>,

    pub identity_mode: IdentityMode,
    pub identity_property: String,

    pub taxonomy_columns: Vec<TaxonomyColumn>,
    pub option_axes: Vec<OptionAxis>,
    pub property_columns: Vec<PropertyColumn>,
    pub image_columns: Vec<String>,
    /// 图片子目录字段（如按供应商分目录）；None 时图片平铺在根目录下
    pub image_subdirectory_field: Option<String>,
    pub taxon_lookup: TaxonLookupScope,
}

impl Default for ImportSettings {
    fn default() -> Self {
        use field_names::*;

        Self {
            column_mapping: BTreeMap::new(),
            field_delimiter: ',',
            header_rows_to_skip: 1,
            default_shipping_category: "Default".to_string(),
            default_tax_category: String::new(),
            decode_html_in_names: false,
            decode_html_in_descriptions: true,
            destroy_preexisting_after_import: false,
            image_root_path: PathBuf::from("."),
            log_file_path: None,
            identity_mode: IdentityMode::ExternalId,
            identity_property: "XmlImportId".to_string(),
            taxonomy_columns: vec![
                TaxonomyColumn {
                    taxonomy: CATEGORY.to_string(),
                    field: CATEGORY.to_string(),
                },
                TaxonomyColumn {
                    taxonomy: GENDER.to_string(),
                    field: GENDER.to_string(),
                },
            ],
            option_axes: [
                (BRAND, "Marque"),
                (COLOR, "Couleur"),
                (SIZE, "Taille"),
                (AGE, "Age"),
            ]
            .iter()
            .map(|(name, presentation)| OptionAxis {
                name: name.to_string(),
                presentation: presentation.to_string(),
                field: name.to_string(),
            })
            .collect(),
            property_columns: Vec::new(),
            image_columns: vec![IMAGE_MAIN.to_string()],
            image_subdirectory_field: None,
            taxon_lookup: TaxonLookupScope::Global,
        }
    }
}

impl ImportSettings {
    /// 从 JSON 文件加载并校验
    pub fn from_json_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings: ImportSettings =
            serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// 以给定列映射构造（其余取默认）
    pub fn with_mapping<I, S>(mapping: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        Self {
            column_mapping: mapping
                .into_iter()
                .map(|(field, index)| (field.into(), index))
                .collect(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.field_delimiter.is_ascii() {
            return Err(SettingsError::Invalid(format!(
                "fieldDelimiter 必须为 ASCII 字符: {:?}",
                self.field_delimiter
            )));
        }
        if matches!(self.field_delimiter, '"' | '\n' | '\r') {
            return Err(SettingsError::Invalid(format!(
                "fieldDelimiter 不可用: {:?}",
                self.field_delimiter
            )));
        }
        if self.column_mapping.is_empty() {
            return Err(SettingsError::Invalid("columnMapping 不能为空".to_string()));
        }
        if self.identity_mode == IdentityMode::ExternalId
            && self.identity_property.trim().is_empty()
        {
            return Err(SettingsError::Invalid(
                "externalId 模式下 identityProperty 不能为空".to_string(),
            ));
        }
        Ok(())
    }

    /// 分隔符字节（validate 保证为 ASCII）
    pub fn delimiter_byte(&self) -> u8 {
        let mut buf = [0u8; 4];
        self.field_delimiter.encode_utf8(&mut buf);
        buf[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_from_partial_json() {
        let json = r#"{ "columnMapping": { "Name": 0, "Master Price": 1 } }"#;
        let settings: ImportSettings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.field_delimiter, ',');
        assert_eq!(settings.header_rows_to_skip, 1);
        assert_eq!(settings.default_shipping_category, "Default");
        assert!(!settings.decode_html_in_names);
        assert!(settings.decode_html_in_descriptions);
        assert_eq!(settings.identity_mode, IdentityMode::ExternalId);
        assert_eq!(settings.identity_property, "XmlImportId");
        assert_eq!(settings.option_axes.len(), 4);
        assert_eq!(settings.option_axes[1].presentation, "Couleur");
        assert_eq!(settings.taxon_lookup, TaxonLookupScope::Global);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_pipe_delimited_always_new() {
        let json = r#"{
            "columnMapping": { "Name": 0 },
            "fieldDelimiter": "|",
            "identityMode": "alwaysNew",
            "taxonLookup": "withinTaxonomy",
            "imageSubdirectoryField": "Supplier"
        }"#;
        let settings: ImportSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.delimiter_byte(), b'|');
        assert_eq!(settings.identity_mode, IdentityMode::AlwaysNew);
        assert_eq!(settings.taxon_lookup, TaxonLookupScope::WithinTaxonomy);
        assert_eq!(settings.image_subdirectory_field.as_deref(), Some("Supplier"));
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let empty = ImportSettings::default();
        assert!(matches!(empty.validate(), Err(SettingsError::Invalid(_))));

        let mut settings = ImportSettings::with_mapping([("Name", 0)]);
        settings.field_delimiter = '§';
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "columnMapping": {{ "Name": 2 }}, "headerRowsToSkip": 0 }}"#).unwrap();

        let settings = ImportSettings::from_json_file(file.path()).unwrap();
        assert_eq!(settings.column_mapping.get("Name"), Some(&2));
        assert_eq!(settings.header_rows_to_skip, 0);

        let missing = ImportSettings::from_json_file(Path::new("/nonexistent/settings.json"));
        assert!(matches!(missing, Err(SettingsError::Io { .. })));
    }
}
