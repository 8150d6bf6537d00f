// ==========================================
// 商品目录导入系统 - 分类解析器
// ==========================================
// 职责: 按分类值查找或创建分类，并关联到商品
// 规则:
// - 空白分类值不做任何处理
// - Global: 先在全部分类轴中按值查找，命中即全部关联
// - WithinTaxonomy: 只在目标分类轴中查找
// - 未命中: 查找或创建分类轴（新建记 warn），在根节点下查找或创建分类值
// ==========================================

use crate::config::TaxonLookupScope;
use crate::domain::catalog::{Taxon, Taxonomy};
use crate::domain::types::ProductId;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::RepositoryResult;
use tracing::{debug, warn};

pub struct TaxonomyResolver<'a, C: CatalogRepository + ?Sized> {
    catalog: &'a C,
    scope: TaxonLookupScope,
}

impl<'a, C: CatalogRepository + ?Sized> TaxonomyResolver<'a, C> {
    pub fn new(catalog: &'a C, scope: TaxonLookupScope) -> Self {
        Self { catalog, scope }
    }

    /// 确保商品关联到分类值
    ///
    /// # 返回
    /// - 本次关联的分类值（空白值返回空列表）
    pub fn ensure_taxon(
        &self,
        taxonomy_name: &str,
        taxon_value: &str,
        product_id: ProductId,
    ) -> RepositoryResult<Vec<Taxon>> {
        let taxon_value = taxon_value.trim();
        if taxon_value.is_empty() {
            return Ok(Vec::new());
        }

        let taxons = match self.scope {
            TaxonLookupScope::Global => {
                let existing = self.catalog.find_taxons_by_value(taxon_value)?;
                if existing.is_empty() {
                    let taxonomy = self.resolve_taxonomy(taxonomy_name)?;
                    vec![self.catalog.create_taxon(&taxonomy, taxon_value)?]
                } else {
                    existing
                }
            }
            TaxonLookupScope::WithinTaxonomy => {
                let taxonomy = self.resolve_taxonomy(taxonomy_name)?;
                let existing = self.catalog.find_taxons_in_taxonomy(&taxonomy, taxon_value)?;
                if existing.is_empty() {
                    vec![self.catalog.create_taxon(&taxonomy, taxon_value)?]
                } else {
                    existing
                }
            }
        };

        for taxon in &taxons {
            self.catalog.add_product_taxon(product_id, taxon.id)?;
            debug!(
                product_id = %product_id,
                taxon_id = %taxon.id,
                taxon = %taxon.name,
                "商品已关联分类"
            );
        }

        Ok(taxons)
    }

    fn resolve_taxonomy(&self, taxonomy_name: &str) -> RepositoryResult<Taxonomy> {
        let (taxonomy, created) = self.catalog.find_or_create_taxonomy(taxonomy_name)?;
        if created {
            warn!(taxonomy = %taxonomy.name, "分类轴 {} 不存在，已自动创建", taxonomy.name);
        }
        Ok(taxonomy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::{NumericField, ProductDraft};
    use crate::repository::SqliteCatalogRepository;
    use chrono::Utc;
    use rusqlite::Connection;
    use std::sync::{Arc, Mutex};

    fn setup() -> (SqliteCatalogRepository, ProductId) {
        let conn = Connection::open_in_memory().unwrap();
        let repo = SqliteCatalogRepository::from_connection(Arc::new(Mutex::new(conn))).unwrap();
        repo.init_schema().unwrap();
        let shipping = repo.find_or_create_shipping_category("Default").unwrap();
        let product = repo
            .create_product(&ProductDraft {
                name: "Widget".to_string(),
                description: String::new(),
                price: NumericField::Value(1.0),
                weight: None,
                height: None,
                width: None,
                depth: None,
                available_on: Utc::now(),
                shipping_category_id: Some(shipping),
                tax_category_id: None,
            })
            .unwrap();
        (repo, product.id)
    }

    #[test]
    fn test_blank_value_is_noop() {
        let (repo, product_id) = setup();
        let resolver = TaxonomyResolver::new(&repo, TaxonLookupScope::Global);
        assert!(resolver.ensure_taxon("Color", "  ", product_id).unwrap().is_empty());
        assert!(repo.list_product_taxons(product_id).unwrap().is_empty());
    }

    #[test]
    fn test_creates_taxonomy_and_taxon_under_root() {
        let (repo, product_id) = setup();
        let resolver = TaxonomyResolver::new(&repo, TaxonLookupScope::Global);

        let taxons = resolver.ensure_taxon("Color", "Red", product_id).unwrap();
        let (taxonomy, created) = repo.find_or_create_taxonomy("Color").unwrap();

        assert!(!created);
        assert_eq!(taxons.len(), 1);
        assert_eq!(taxons[0].taxonomy_id, taxonomy.id);
        assert_eq!(taxons[0].parent_id, Some(taxonomy.root_taxon_id));
        assert_eq!(repo.list_product_taxons(product_id).unwrap(), taxons);
    }

    #[test]
    fn test_global_lookup_attaches_every_match() {
        let (repo, product_id) = setup();
        let (color, _) = repo.find_or_create_taxonomy("Color").unwrap();
        let (brand, _) = repo.find_or_create_taxonomy("Brand").unwrap();
        repo.create_taxon(&color, "Red").unwrap();
        repo.create_taxon(&brand, "Red").unwrap();

        let resolver = TaxonomyResolver::new(&repo, TaxonLookupScope::Global);
        let taxons = resolver.ensure_taxon("Category", "red", product_id).unwrap();

        assert_eq!(taxons.len(), 2);
        // 命中后不创建目标分类轴
        assert!(repo.find_or_create_taxonomy("Category").unwrap().1);
    }

    #[test]
    fn test_within_taxonomy_ignores_other_axes() {
        let (repo, product_id) = setup();
        let (brand, _) = repo.find_or_create_taxonomy("Brand").unwrap();
        let brand_red = repo.create_taxon(&brand, "Red").unwrap();

        let resolver = TaxonomyResolver::new(&repo, TaxonLookupScope::WithinTaxonomy);
        let taxons = resolver.ensure_taxon("Color", "Red", product_id).unwrap();

        assert_eq!(taxons.len(), 1);
        assert_ne!(taxons[0].id, brand_red.id);
    }
}
