// ==========================================
// 商品目录导入系统 - 目录 Repository 实现
// ==========================================
// 职责: 实现目录数据访问（使用 rusqlite）
// 红线: Repository 不含导入业务规则，只做数据 CRUD
// ==========================================

use crate::db::{configure_sqlite_connection, init_catalog_schema, open_sqlite_connection};
use crate::domain::catalog::{Image, OptionType, OptionValue, Property, Taxon, Taxonomy};
use crate::domain::product::{NumericField, Product, ProductDraft, ValidationError, Variant};
use crate::domain::types::{
    ImageId, OptionTypeId, OptionValueId, ProductId, PropertyId, ShippingCategoryId,
    TaxCategoryId, TaxonId, TaxonomyId, VariantId,
};
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::natural_key::{
    find_or_insert, OptionTypeKey, OptionValueKey, PropertyKey, ShippingCategoryKey,
    TaxCategoryKey, TaxonKey, TaxonomyKey,
};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.price, p.weight, p.height, \
     p.width, p.depth, p.available_on, p.shipping_category_id, p.tax_category_id, p.created_at";

const ROW_SAVEPOINT: &str = "import_row";

// ==========================================
// SqliteCatalogRepository
// ==========================================
pub struct SqliteCatalogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogRepository {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 初始化目录库 schema
    pub fn init_schema(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        init_catalog_schema(&conn)?;
        Ok(())
    }

    /// 共享底层连接（供运行记录仓储复用同一连接）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_product(row: &Row) -> rusqlite::Result<Product> {
        Ok(Product {
            id: ProductId(row.get(0)?),
            name: row.get(1)?,
            description: row.get(2)?,
            price: row.get(3)?,
            weight: row.get(4)?,
            height: row.get(5)?,
            width: row.get(6)?,
            depth: row.get(7)?,
            available_on: row.get(8)?,
            shipping_category_id: row.get::<_, Option<i64>>(9)?.map(ShippingCategoryId),
            tax_category_id: row.get::<_, Option<i64>>(10)?.map(TaxCategoryId),
            created_at: row.get(11)?,
        })
    }

    fn map_taxon(row: &Row) -> rusqlite::Result<Taxon> {
        Ok(Taxon {
            id: TaxonId(row.get(0)?),
            taxonomy_id: TaxonomyId(row.get(1)?),
            parent_id: row.get::<_, Option<i64>>(2)?.map(TaxonId),
            name: row.get(3)?,
        })
    }

    fn map_variant(row: &Row) -> rusqlite::Result<Variant> {
        Ok(Variant {
            id: VariantId(row.get(0)?),
            product_id: ProductId(row.get(1)?),
            sku: row.get(2)?,
            price: row.get(3)?,
            is_master: row.get::<_, i64>(4)? != 0,
        })
    }

    fn map_option_value(row: &Row) -> rusqlite::Result<OptionValue> {
        Ok(OptionValue {
            id: OptionValueId(row.get(0)?),
            option_type_id: OptionTypeId(row.get(1)?),
            name: row.get(2)?,
            presentation: row.get(3)?,
        })
    }

    fn map_image(row: &Row) -> rusqlite::Result<Image> {
        Ok(Image {
            id: ImageId(row.get(0)?),
            product_id: ProductId(row.get(1)?),
            position: row.get(2)?,
            file_name: row.get(3)?,
            byte_size: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn load_taxon(conn: &Connection, taxon_id: i64) -> RepositoryResult<Taxon> {
        conn.query_row(
            "SELECT id, taxonomy_id, parent_id, name FROM taxons WHERE id = ?1",
            params![taxon_id],
            Self::map_taxon,
        )
        .optional()?
        .ok_or_else(|| RepositoryError::NotFound {
            entity: "Taxon".to_string(),
            id: taxon_id.to_string(),
        })
    }

    /// 读取分类轴根节点，缺失时补建
    fn ensure_root_taxon(conn: &Connection, taxonomy_id: i64, name: &str) -> RepositoryResult<i64> {
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM taxons WHERE taxonomy_id = ?1 AND parent_id IS NULL ORDER BY id LIMIT 1",
                params![taxonomy_id],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute(
            "INSERT INTO taxons (taxonomy_id, parent_id, name) VALUES (?1, NULL, ?2)",
            params![taxonomy_id, name],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn numeric_value(field: &NumericField) -> f64 {
        field.value().unwrap_or(0.0)
    }
}

impl CatalogRepository for SqliteCatalogRepository {
    fn list_product_ids(&self) -> RepositoryResult<Vec<ProductId>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id FROM products ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids.into_iter().map(ProductId).collect())
    }

    fn find_product_by_external_id(
        &self,
        property_name: &str,
        external_id: &str,
    ) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM products p
            JOIN product_properties pp ON pp.product_id = p.id
            JOIN properties pr ON pr.id = pp.property_id
            WHERE pr.name = ?1 AND pp.value = ?2
            ORDER BY p.id
            LIMIT 1
            "#,
            PRODUCT_COLUMNS
        );
        let product = conn
            .query_row(&sql, params![property_name, external_id], Self::map_product)
            .optional()?;
        Ok(product)
    }

    fn get_product(&self, product_id: ProductId) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM products p WHERE p.id = ?1", PRODUCT_COLUMNS);
        let product = conn
            .query_row(&sql, params![product_id.0], Self::map_product)
            .optional()?;
        Ok(product)
    }

    fn validate_product(&self, draft: &ProductDraft) -> Vec<ValidationError> {
        draft.validate()
    }

    fn create_product(&self, draft: &ProductDraft) -> RepositoryResult<Product> {
        let conn = self.get_conn()?;
        let now = Utc::now();
        conn.execute(
            r#"
            INSERT INTO products (
                name, description, price, weight, height, width, depth,
                available_on, shipping_category_id, tax_category_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                draft.name,
                draft.description,
                Self::numeric_value(&draft.price),
                draft.weight.as_ref().map(Self::numeric_value),
                draft.height.as_ref().map(Self::numeric_value),
                draft.width.as_ref().map(Self::numeric_value),
                draft.depth.as_ref().map(Self::numeric_value),
                draft.available_on,
                draft.shipping_category_id.map(|id| id.0),
                draft.tax_category_id.map(|id| id.0),
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();

        let sql = format!("SELECT {} FROM products p WHERE p.id = ?1", PRODUCT_COLUMNS);
        let product = conn.query_row(&sql, params![id], Self::map_product)?;
        Ok(product)
    }

    fn delete_product(&self, product_id: ProductId) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM products WHERE id = ?1", params![product_id.0])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Product".to_string(),
                id: product_id.to_string(),
            });
        }
        Ok(())
    }

    fn find_or_create_shipping_category(
        &self,
        name: &str,
    ) -> RepositoryResult<ShippingCategoryId> {
        let conn = self.get_conn()?;
        let (id, _) = find_or_insert(&conn, &ShippingCategoryKey { name })?;
        Ok(ShippingCategoryId(id))
    }

    fn find_or_create_tax_category(&self, name: &str) -> RepositoryResult<TaxCategoryId> {
        let conn = self.get_conn()?;
        let (id, _) = find_or_insert(&conn, &TaxCategoryKey { name })?;
        Ok(TaxCategoryId(id))
    }

    fn find_or_create_taxonomy(&self, name: &str) -> RepositoryResult<(Taxonomy, bool)> {
        let conn = self.get_conn()?;
        let (taxonomy_id, created) = find_or_insert(&conn, &TaxonomyKey { name })?;
        let stored_name: String = conn.query_row(
            "SELECT name FROM taxonomies WHERE id = ?1",
            params![taxonomy_id],
            |row| row.get(0),
        )?;
        let root_id = Self::ensure_root_taxon(&conn, taxonomy_id, &stored_name)?;

        Ok((
            Taxonomy {
                id: TaxonomyId(taxonomy_id),
                name: stored_name,
                root_taxon_id: TaxonId(root_id),
            },
            created,
        ))
    }

    fn find_taxons_by_value(&self, value: &str) -> RepositoryResult<Vec<Taxon>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, taxonomy_id, parent_id, name
            FROM taxons
            WHERE name = ?1 AND parent_id IS NOT NULL
            ORDER BY id
            "#,
        )?;
        let taxons = stmt
            .query_map(params![value], Self::map_taxon)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(taxons)
    }

    fn find_taxons_in_taxonomy(
        &self,
        taxonomy: &Taxonomy,
        value: &str,
    ) -> RepositoryResult<Vec<Taxon>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, taxonomy_id, parent_id, name
            FROM taxons
            WHERE taxonomy_id = ?1 AND name = ?2 AND parent_id IS NOT NULL
            ORDER BY id
            "#,
        )?;
        let taxons = stmt
            .query_map(params![taxonomy.id.0, value], Self::map_taxon)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(taxons)
    }

    fn create_taxon(&self, taxonomy: &Taxonomy, value: &str) -> RepositoryResult<Taxon> {
        let conn = self.get_conn()?;
        let (taxon_id, _) = find_or_insert(
            &conn,
            &TaxonKey {
                taxonomy_id: taxonomy.id.0,
                parent_id: taxonomy.root_taxon_id.0,
                name: value,
            },
        )?;
        Self::load_taxon(&conn, taxon_id)
    }

    fn add_product_taxon(&self, product_id: ProductId, taxon_id: TaxonId) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO products_taxons (product_id, taxon_id) VALUES (?1, ?2)",
            params![product_id.0, taxon_id.0],
        )?;
        Ok(())
    }

    fn list_product_taxons(&self, product_id: ProductId) -> RepositoryResult<Vec<Taxon>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT t.id, t.taxonomy_id, t.parent_id, t.name
            FROM taxons t
            JOIN products_taxons pt ON pt.taxon_id = t.id
            WHERE pt.product_id = ?1
            ORDER BY t.id
            "#,
        )?;
        let taxons = stmt
            .query_map(params![product_id.0], Self::map_taxon)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(taxons)
    }

    fn find_or_create_option_type(
        &self,
        name: &str,
        presentation: &str,
    ) -> RepositoryResult<OptionType> {
        let conn = self.get_conn()?;
        let (id, _) = find_or_insert(&conn, &OptionTypeKey { name, presentation })?;
        let option_type = conn.query_row(
            "SELECT id, name, presentation FROM option_types WHERE id = ?1",
            params![id],
            |row| {
                Ok(OptionType {
                    id: OptionTypeId(row.get(0)?),
                    name: row.get(1)?,
                    presentation: row.get(2)?,
                })
            },
        )?;
        Ok(option_type)
    }

    fn find_or_create_option_value(
        &self,
        option_type: &OptionType,
        name: &str,
        presentation: &str,
    ) -> RepositoryResult<OptionValue> {
        let conn = self.get_conn()?;
        let (id, _) = find_or_insert(
            &conn,
            &OptionValueKey {
                option_type_id: option_type.id.0,
                name,
                presentation,
            },
        )?;
        let option_value = conn.query_row(
            "SELECT id, option_type_id, name, presentation FROM option_values WHERE id = ?1",
            params![id],
            Self::map_option_value,
        )?;
        Ok(option_value)
    }

    fn create_variant(
        &self,
        product_id: ProductId,
        sku: Option<&str>,
        price: f64,
        is_master: bool,
    ) -> RepositoryResult<Variant> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO variants (product_id, sku, price, is_master, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![product_id.0, sku, price, is_master as i64, Utc::now()],
        )?;

        Ok(Variant {
            id: VariantId(conn.last_insert_rowid()),
            product_id,
            sku: sku.map(str::to_string),
            price,
            is_master,
        })
    }

    fn add_variant_option_value(
        &self,
        variant_id: VariantId,
        option_value_id: OptionValueId,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO variants_option_values (variant_id, option_value_id) VALUES (?1, ?2)",
            params![variant_id.0, option_value_id.0],
        )?;
        Ok(())
    }

    fn list_variants(&self, product_id: ProductId) -> RepositoryResult<Vec<Variant>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, product_id, sku, price, is_master FROM variants WHERE product_id = ?1 ORDER BY id",
        )?;
        let variants = stmt
            .query_map(params![product_id.0], Self::map_variant)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(variants)
    }

    fn list_variant_option_values(
        &self,
        variant_id: VariantId,
    ) -> RepositoryResult<Vec<OptionValue>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT ov.id, ov.option_type_id, ov.name, ov.presentation
            FROM option_values ov
            JOIN variants_option_values vov ON vov.option_value_id = ov.id
            WHERE vov.variant_id = ?1
            ORDER BY ov.id
            "#,
        )?;
        let values = stmt
            .query_map(params![variant_id.0], Self::map_option_value)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }

    fn create_property(&self, name: &str, presentation: &str) -> RepositoryResult<Property> {
        let conn = self.get_conn()?;
        let (id, _) = find_or_insert(&conn, &PropertyKey { name, presentation })?;
        let property = conn.query_row(
            "SELECT id, name, presentation FROM properties WHERE id = ?1",
            params![id],
            |row| {
                Ok(Property {
                    id: PropertyId(row.get(0)?),
                    name: row.get(1)?,
                    presentation: row.get(2)?,
                })
            },
        )?;
        Ok(property)
    }

    fn set_product_property(
        &self,
        product_id: ProductId,
        property_id: PropertyId,
        value: &str,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO product_properties (product_id, property_id, value)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (product_id, property_id) DO UPDATE SET value = excluded.value
            "#,
            params![product_id.0, property_id.0, value],
        )?;
        Ok(())
    }

    fn get_product_property(
        &self,
        product_id: ProductId,
        property_name: &str,
    ) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                r#"
                SELECT pp.value
                FROM product_properties pp
                JOIN properties pr ON pr.id = pp.property_id
                WHERE pp.product_id = ?1 AND pr.name = ?2
                "#,
                params![product_id.0, property_name],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn count_product_images(&self, product_id: ProductId) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM images WHERE product_id = ?1",
            params![product_id.0],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn attach_image(
        &self,
        product_id: ProductId,
        file_name: &str,
        content: &[u8],
        position: i64,
    ) -> RepositoryResult<Image> {
        let conn = self.get_conn()?;
        let now = Utc::now();
        let byte_size = content.len() as i64;
        conn.execute(
            r#"
            INSERT INTO images (product_id, position, file_name, content, byte_size, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![product_id.0, position, file_name, content, byte_size, now],
        )?;

        Ok(Image {
            id: ImageId(conn.last_insert_rowid()),
            product_id,
            position,
            file_name: file_name.to_string(),
            byte_size,
            created_at: now,
        })
    }

    fn list_product_images(&self, product_id: ProductId) -> RepositoryResult<Vec<Image>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, product_id, position, file_name, byte_size, created_at
            FROM images
            WHERE product_id = ?1
            ORDER BY position, id
            "#,
        )?;
        let images = stmt
            .query_map(params![product_id.0], Self::map_image)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(images)
    }

    fn begin_row_scope(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(&format!("SAVEPOINT {};", ROW_SAVEPOINT))
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    fn commit_row_scope(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(&format!("RELEASE SAVEPOINT {};", ROW_SAVEPOINT))
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    fn rollback_row_scope(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(&format!(
            "ROLLBACK TO SAVEPOINT {0}; RELEASE SAVEPOINT {0};",
            ROW_SAVEPOINT
        ))
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_repo() -> SqliteCatalogRepository {
        let conn = Connection::open_in_memory().unwrap();
        let repo = SqliteCatalogRepository::from_connection(Arc::new(Mutex::new(conn))).unwrap();
        repo.init_schema().unwrap();
        repo
    }

    fn draft(repo: &SqliteCatalogRepository, name: &str) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            description: "desc".to_string(),
            price: NumericField::Value(12.5),
            weight: Some(NumericField::Value(1.0)),
            height: None,
            width: None,
            depth: None,
            available_on: Utc::now(),
            shipping_category_id: Some(repo.find_or_create_shipping_category("Default").unwrap()),
            tax_category_id: None,
        }
    }

    #[test]
    fn test_create_and_find_by_external_id() {
        let repo = test_repo();
        let product = repo.create_product(&draft(&repo, "Widget")).unwrap();
        let property = repo.create_property("XmlImportId", "XmlImportId").unwrap();
        repo.set_product_property(product.id, property.id, "X1").unwrap();

        let found = repo
            .find_product_by_external_id("XmlImportId", "X1")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, product.id);
        assert_eq!(found.price, 12.5);
        assert_eq!(found.weight, Some(1.0));
        assert_eq!(found.height, None);

        assert!(repo
            .find_product_by_external_id("XmlImportId", "X2")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_taxonomy_creates_root_once() {
        let repo = test_repo();
        let (first, created) = repo.find_or_create_taxonomy("Color").unwrap();
        let (second, created_again) = repo.find_or_create_taxonomy("Color").unwrap();

        assert!(created);
        assert!(!created_again);
        assert_eq!(first, second);

        // 根节点不参与按值查找
        assert!(repo.find_taxons_by_value("Color").unwrap().is_empty());

        let red = repo.create_taxon(&first, "Red").unwrap();
        assert_eq!(red.parent_id, Some(first.root_taxon_id));
        assert_eq!(repo.create_taxon(&first, "Red").unwrap().id, red.id);
    }

    #[test]
    fn test_delete_product_cascades_owned_rows() {
        let repo = test_repo();
        let product = repo.create_product(&draft(&repo, "Widget")).unwrap();
        let variant = repo.create_variant(product.id, Some("SKU-1"), 1.0, true).unwrap();
        let option_type = repo.find_or_create_option_type("Size", "Taille").unwrap();
        let value = repo.find_or_create_option_value(&option_type, "M", "M").unwrap();
        repo.add_variant_option_value(variant.id, value.id).unwrap();
        repo.attach_image(product.id, "a.jpg", b"abc", 0).unwrap();

        repo.delete_product(product.id).unwrap();

        assert!(repo.get_product(product.id).unwrap().is_none());
        assert!(repo.list_variants(product.id).unwrap().is_empty());
        assert_eq!(repo.count_product_images(product.id).unwrap(), 0);
        // 参考数据保留
        assert_eq!(
            repo.find_or_create_option_value(&option_type, "M", "M").unwrap().id,
            value.id
        );
    }

    #[test]
    fn test_duplicate_sku_is_unique_violation() {
        let repo = test_repo();
        let product = repo.create_product(&draft(&repo, "Widget")).unwrap();
        repo.create_variant(product.id, Some("SKU-1"), 1.0, true).unwrap();
        let err = repo
            .create_variant(product.id, Some("SKU-1"), 1.0, false)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));

        // 空 SKU 可重复
        repo.create_variant(product.id, None, 1.0, false).unwrap();
        repo.create_variant(product.id, None, 1.0, false).unwrap();
    }

    #[test]
    fn test_row_scope_rollback_discards_writes() {
        let repo = test_repo();
        repo.begin_row_scope().unwrap();
        repo.create_product(&draft(&repo, "Temp")).unwrap();
        repo.rollback_row_scope().unwrap();
        assert!(repo.list_product_ids().unwrap().is_empty());

        repo.begin_row_scope().unwrap();
        repo.create_product(&draft(&repo, "Kept")).unwrap();
        repo.commit_row_scope().unwrap();
        assert_eq!(repo.list_product_ids().unwrap().len(), 1);
    }

    #[test]
    fn test_set_product_property_overwrites() {
        let repo = test_repo();
        let product = repo.create_product(&draft(&repo, "Widget")).unwrap();
        let property = repo.create_property("SupplierId", "Supplier").unwrap();
        repo.set_product_property(product.id, property.id, "A").unwrap();
        repo.set_product_property(product.id, property.id, "B").unwrap();
        assert_eq!(
            repo.get_product_property(product.id, "SupplierId").unwrap(),
            Some("B".to_string())
        );
    }
}
