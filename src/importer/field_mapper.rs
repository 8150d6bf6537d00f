// ==========================================
// 商品目录导入系统 - 字段映射器
// ==========================================
// 职责: 原始行 → 待创建商品（ProductDraft）
// 规则:
// - 名称为空 → "No-name product {n}"（n 为运行内计数，从 0 递增）
// - 数值字段: 映射但为空 → 0.0；未映射 → 不设置；无法解析 → 保留原文交给校验
// - 上架时间 = 当前时间 - 1 天
// ==========================================

use crate::config::{field_names, ImportSettings};
use crate::domain::import::RawRow;
use crate::domain::product::{NumericField, ProductDraft};
use crate::domain::types::{ShippingCategoryId, TaxCategoryId};
use crate::importer::column_map::{ColumnMap, FieldValue};
use crate::importer::error::RowResult;
use crate::importer::text_decoder::{decoder_for, TextDecoder};
use chrono::{DateTime, Duration, Utc};
use tracing::info;

// ==========================================
// NamelessCounter - 无名商品计数器
// ==========================================
// 生命周期: 一次导入运行
#[derive(Debug, Default)]
pub struct NamelessCounter {
    next: u64,
}

impl NamelessCounter {
    pub fn next_name(&mut self) -> String {
        let name = format!("No-name product {}", self.next);
        self.next += 1;
        name
    }
}

/// 解析数值字段
///
/// 小数分隔符接受 '.'，无 '.' 时也接受单个 ','
pub fn parse_numeric(value: FieldValue<'_>) -> Option<NumericField> {
    match value {
        FieldValue::Unmapped => None,
        FieldValue::Blank => Some(NumericField::Value(0.0)),
        FieldValue::Present(raw) => Some(parse_number(raw).map_or_else(
            || NumericField::Unparsed(raw.to_string()),
            NumericField::Value,
        )),
    }
}

/// 解析数值文本
pub fn parse_number(raw: &str) -> Option<f64> {
    if let Ok(v) = raw.parse::<f64>() {
        return Some(v);
    }
    if !raw.contains('.') && raw.matches(',').count() == 1 {
        return raw.replace(',', ".").parse::<f64>().ok();
    }
    None
}

// ==========================================
// FieldMapper
// ==========================================
pub struct FieldMapper {
    name_decoder: Box<dyn TextDecoder>,
    description_decoder: Box<dyn TextDecoder>,
}

impl FieldMapper {
    pub fn new(settings: &ImportSettings) -> Self {
        Self {
            name_decoder: decoder_for(settings.decode_html_in_names),
            description_decoder: decoder_for(settings.decode_html_in_descriptions),
        }
    }

    /// 填充商品基础字段
    ///
    /// # 参数
    /// - shipping_category_id / tax_category_id: 已按配置解析的默认类别
    /// - now: 运行时钟（上架时间据此回拨一天）
    pub fn map_product(
        &self,
        row: &RawRow,
        columns: &ColumnMap,
        counter: &mut NamelessCounter,
        shipping_category_id: Option<ShippingCategoryId>,
        tax_category_id: Option<TaxCategoryId>,
        now: DateTime<Utc>,
    ) -> RowResult<ProductDraft> {
        let description = columns
            .lookup(row, field_names::DESCRIPTION)?
            .mapped_or_empty()
            .map(|d| self.description_decoder.decode(d).into_owned())
            .unwrap_or_default();

        let name = match columns.lookup(row, field_names::NAME)?.present() {
            Some(raw) => self.name_decoder.decode(raw).trim().to_string(),
            None => {
                let generated = counter.next_name();
                info!(line = row.line, name = %generated, description = %description, "商品名称为空，使用占位名称");
                generated
            }
        };

        let price = parse_numeric(columns.lookup(row, field_names::MASTER_PRICE)?)
            .unwrap_or_default();

        Ok(ProductDraft {
            name,
            description,
            price,
            weight: parse_numeric(columns.lookup(row, field_names::WEIGHT)?),
            height: parse_numeric(columns.lookup(row, field_names::HEIGHT)?),
            width: parse_numeric(columns.lookup(row, field_names::WIDTH)?),
            depth: parse_numeric(columns.lookup(row, field_names::DEPTH)?),
            available_on: now - Duration::days(1),
            shipping_category_id,
            tax_category_id,
        })
    }
}
