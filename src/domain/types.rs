// ==========================================
// 商品目录导入系统 - 领域类型定义
// ==========================================
// 职责: 实体 ID 新类型、导入结果枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 实体 ID
// ==========================================
// 对齐: SQLite INTEGER PRIMARY KEY
macro_rules! entity_id {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub i64);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}

entity_id!(
    ProductId,
    VariantId,
    TaxonomyId,
    TaxonId,
    OptionTypeId,
    OptionValueId,
    PropertyId,
    ImageId,
    ShippingCategoryId,
    TaxCategoryId,
);

// ==========================================
// 行导入结果类型 (Outcome Kind)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Created,        // 新建商品
    Updated,        // 已有商品追加规格
    SkippedInvalid, // 校验不通过/空白行，跳过
    Failed,         // 行内意外错误
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Created => "CREATED",
            OutcomeKind::Updated => "UPDATED",
            OutcomeKind::SkippedInvalid => "SKIPPED_INVALID",
            OutcomeKind::Failed => "FAILED",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim() {
            "CREATED" => Some(OutcomeKind::Created),
            "UPDATED" => Some(OutcomeKind::Updated),
            "SKIPPED_INVALID" => Some(OutcomeKind::SkippedInvalid),
            "FAILED" => Some(OutcomeKind::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 运行状态 (Run Status)
// ==========================================
// 对外只有两种固定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Notice,
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Notice => "notice",
            RunStatus::Error => "error",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value.trim() {
            "notice" => RunStatus::Notice,
            _ => RunStatus::Error,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
