// ==========================================
// 商品目录导入系统 - 商品领域模型
// ==========================================
// 职责: 商品、规格（Variant）、校验错误
// 红线: 商品独占其规格/属性值/图片，随商品创建与删除
// ==========================================

use crate::domain::types::{ProductId, ShippingCategoryId, TaxCategoryId, VariantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 商品名称最大长度
pub const MAX_NAME_LENGTH: usize = 255;

// ==========================================
// NumericField - 数值字段
// ==========================================
// 映射阶段无法解析的数值保留原文，交给目录校验报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NumericField {
    Value(f64),
    Unparsed(String),
}

impl NumericField {
    pub fn value(&self) -> Option<f64> {
        match self {
            NumericField::Value(v) => Some(*v),
            NumericField::Unparsed(_) => None,
        }
    }
}

impl Default for NumericField {
    fn default() -> Self {
        NumericField::Value(0.0)
    }
}

// ==========================================
// ProductDraft - 待创建商品
// ==========================================
// 用途: 字段映射产物，校验通过后交给目录落库
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: NumericField,

    // ===== 尺寸（未映射则为 None，不落库）=====
    pub weight: Option<NumericField>,
    pub height: Option<NumericField>,
    pub width: Option<NumericField>,
    pub depth: Option<NumericField>,

    /// 上架时间（导入时回拨一天，保证立即可见）
    pub available_on: DateTime<Utc>,

    pub shipping_category_id: Option<ShippingCategoryId>,
    pub tax_category_id: Option<TaxCategoryId>,
}

impl ProductDraft {
    /// 按目录约束校验
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::new("name", "不能为空"));
        } else if name.chars().count() > MAX_NAME_LENGTH {
            errors.push(ValidationError::new(
                "name",
                format!("长度超过 {} 个字符", MAX_NAME_LENGTH),
            ));
        }

        check_non_negative(&mut errors, "price", Some(&self.price));
        check_non_negative(&mut errors, "weight", self.weight.as_ref());
        check_non_negative(&mut errors, "height", self.height.as_ref());
        check_non_negative(&mut errors, "width", self.width.as_ref());
        check_non_negative(&mut errors, "depth", self.depth.as_ref());

        if self.shipping_category_id.is_none() {
            errors.push(ValidationError::new("shipping_category", "未设置"));
        }

        errors
    }
}

fn check_non_negative(errors: &mut Vec<ValidationError>, field: &str, value: Option<&NumericField>) {
    match value {
        None => {}
        Some(NumericField::Unparsed(raw)) => {
            errors.push(ValidationError::new(field, format!("不是有效数字: {}", raw)));
        }
        Some(NumericField::Value(v)) if !v.is_finite() || *v < 0.0 => {
            errors.push(ValidationError::new(field, format!("必须为非负数: {}", v)));
        }
        Some(NumericField::Value(_)) => {}
    }
}

// ==========================================
// ValidationError - 目录校验错误
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

// ==========================================
// Product - 已落库商品
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub width: Option<f64>,
    pub depth: Option<f64>,
    pub available_on: DateTime<Utc>,
    pub shipping_category_id: Option<ShippingCategoryId>,
    pub tax_category_id: Option<TaxCategoryId>,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// Variant - 可购买规格（SKU）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub sku: Option<String>,
    pub price: f64,
    pub is_master: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Widget".to_string(),
            description: String::new(),
            price: NumericField::Value(10.0),
            weight: None,
            height: None,
            width: None,
            depth: None,
            available_on: Utc::now(),
            shipping_category_id: Some(ShippingCategoryId(1)),
            tax_category_id: None,
        }
    }

    #[test]
    fn test_valid_draft() {
        assert!(draft().validate().is_empty());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut d = draft();
        d.name = "   ".to_string();
        let errors = d.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn test_negative_and_unparsed_numbers() {
        let mut d = draft();
        d.price = NumericField::Value(-1.0);
        d.weight = Some(NumericField::Unparsed("heavy".to_string()));
        let fields: Vec<String> = d.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["price".to_string(), "weight".to_string()]);
    }

    #[test]
    fn test_missing_shipping_category() {
        let mut d = draft();
        d.shipping_category_id = None;
        assert_eq!(d.validate()[0].field, "shipping_category");
    }
}
