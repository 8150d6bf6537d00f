// ==========================================
// 商品目录导入系统 - 规格构建器
// ==========================================
// 职责: 为商品新增一条规格（SKU + 价格），并关联规格值
// 规则:
// - 每次调用新增一条规格（同一商品可有多个 SKU）
// - 价格列为空或未映射时沿用商品价格
// - 规格轴有值时: 查找或创建规格轴 → 在轴内查找或创建规格值 → 关联
// ==========================================

use crate::config::{field_names, OptionAxis};
use crate::domain::import::RawRow;
use crate::domain::product::{Product, Variant};
use crate::importer::column_map::{ColumnMap, FieldValue};
use crate::importer::error::{RowError, RowResult};
use crate::importer::field_mapper::parse_number;
use crate::repository::catalog_repo::CatalogRepository;
use tracing::debug;

pub struct VariantBuilder<'a, C: CatalogRepository + ?Sized> {
    catalog: &'a C,
    axes: &'a [OptionAxis],
}

impl<'a, C: CatalogRepository + ?Sized> VariantBuilder<'a, C> {
    pub fn new(catalog: &'a C, axes: &'a [OptionAxis]) -> Self {
        Self { catalog, axes }
    }

    /// 为商品新增规格
    ///
    /// # 参数
    /// - is_master: 新建商品的主规格为 true，已有商品追加的规格为 false
    ///
    /// # 错误
    /// - RowError::InvalidNumber: 价格列无法解析
    /// - RowError::Repository: SKU 重复等目录错误
    pub fn ensure_variant(
        &self,
        product: &Product,
        row: &RawRow,
        columns: &ColumnMap,
        is_master: bool,
    ) -> RowResult<Variant> {
        let sku = columns.lookup(row, field_names::SKU)?.present();
        let price = match columns.lookup(row, field_names::MASTER_PRICE)? {
            FieldValue::Present(raw) => {
                parse_number(raw).ok_or_else(|| RowError::InvalidNumber {
                    field: field_names::MASTER_PRICE.to_string(),
                    value: raw.to_string(),
                })?
            }
            FieldValue::Blank | FieldValue::Unmapped => product.price,
        };

        let variant = self
            .catalog
            .create_variant(product.id, sku, price, is_master)?;

        for axis in self.axes {
            let Some(value) = columns.lookup(row, &axis.field)?.present() else {
                continue;
            };

            let option_type = self
                .catalog
                .find_or_create_option_type(&axis.name, &axis.presentation)?;
            let option_value = self
                .catalog
                .find_or_create_option_value(&option_type, value, value)?;
            self.catalog
                .add_variant_option_value(variant.id, option_value.id)?;

            debug!(
                variant_id = %variant.id,
                option = %axis.name,
                value = %value,
                "规格值已关联"
            );
        }

        Ok(variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportSettings;
    use crate::domain::product::{NumericField, ProductDraft};
    use crate::repository::SqliteCatalogRepository;
    use chrono::Utc;
    use rusqlite::Connection;
    use std::sync::{Arc, Mutex};

    fn setup() -> (SqliteCatalogRepository, Product) {
        let conn = Connection::open_in_memory().unwrap();
        let repo = SqliteCatalogRepository::from_connection(Arc::new(Mutex::new(conn))).unwrap();
        repo.init_schema().unwrap();
        let shipping = repo.find_or_create_shipping_category("Default").unwrap();
        let product = repo
            .create_product(&ProductDraft {
                name: "Shirt".to_string(),
                description: String::new(),
                price: NumericField::Value(20.0),
                weight: None,
                height: None,
                width: None,
                depth: None,
                available_on: Utc::now(),
                shipping_category_id: Some(shipping),
                tax_category_id: None,
            })
            .unwrap();
        (repo, product)
    }

    fn columns() -> ColumnMap {
        [("SKU", 0), ("Master Price", 1), ("Color", 2), ("Size", 3)]
            .into_iter()
            .collect()
    }

    fn row(fields: &[&str]) -> RawRow {
        RawRow::new(2, fields.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_each_call_adds_variant_and_reuses_option_values() {
        let (repo, product) = setup();
        let axes = ImportSettings::default().option_axes;
        let builder = VariantBuilder::new(&repo, &axes);

        let v1 = builder
            .ensure_variant(&product, &row(&["S-1", "21.5", "Red", "M"]), &columns(), true)
            .unwrap();
        let v2 = builder
            .ensure_variant(&product, &row(&["S-2", "", "Red", ""]), &columns(), false)
            .unwrap();

        assert_eq!(repo.list_variants(product.id).unwrap().len(), 2);
        assert!(v1.is_master);
        assert_eq!(v1.price, 21.5);
        // 价格为空沿用商品价格
        assert_eq!(v2.price, 20.0);

        let v1_values = repo.list_variant_option_values(v1.id).unwrap();
        let v2_values = repo.list_variant_option_values(v2.id).unwrap();
        assert_eq!(v1_values.len(), 2);
        assert_eq!(v2_values.len(), 1);
        assert_eq!(v1_values[0].id, v2_values[0].id);
    }

    #[test]
    fn test_unparseable_price_is_row_error() {
        let (repo, product) = setup();
        let axes = ImportSettings::default().option_axes;
        let builder = VariantBuilder::new(&repo, &axes);

        let err = builder
            .ensure_variant(&product, &row(&["S-1", "cheap", "", ""]), &columns(), false)
            .unwrap_err();
        assert!(matches!(err, RowError::InvalidNumber { .. }));
        assert!(repo.list_variants(product.id).unwrap().is_empty());
    }

    #[test]
    fn test_blank_sku_stored_as_none() {
        let (repo, product) = setup();
        let builder = VariantBuilder::new(&repo, &[]);
        let variant = builder
            .ensure_variant(&product, &row(&["", "1", "", ""]), &columns(), true)
            .unwrap();
        assert_eq!(variant.sku, None);
    }
}
