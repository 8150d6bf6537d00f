// ==========================================
// 商品目录导入系统 - 目录参考数据模型
// ==========================================
// 职责: 分类体系、规格选项、自定义属性、图片
// 红线: 参考数据跨导入长期共享，导入只做关联，不删除
// ==========================================

use crate::domain::types::{
    ImageId, OptionTypeId, OptionValueId, ProductId, PropertyId, TaxonId, TaxonomyId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Taxonomy - 分类轴（如 "Category"）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub id: TaxonomyId,
    pub name: String,
    pub root_taxon_id: TaxonId, // 根节点（创建分类轴时同步创建）
}

// ==========================================
// Taxon - 分类值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxon {
    pub id: TaxonId,
    pub taxonomy_id: TaxonomyId,
    pub parent_id: Option<TaxonId>, // 根节点为 None
    pub name: String,
}

// ==========================================
// OptionType / OptionValue - 规格轴与规格值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionType {
    pub id: OptionTypeId,
    pub name: String,
    pub presentation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionValue {
    pub id: OptionValueId,
    pub option_type_id: OptionTypeId,
    pub name: String,
    pub presentation: String,
}

// ==========================================
// Property - 自定义属性定义
// ==========================================
// 用途: 不改表结构地给商品打上导入元数据（外部 ID、品牌 ID 等）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    pub presentation: String,
}

// ==========================================
// Image - 商品图片附件
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,
    pub product_id: ProductId,
    pub position: i64, // 追加到商品现有图片末尾
    pub file_name: String,
    pub byte_size: i64,
    pub created_at: DateTime<Utc>,
}
