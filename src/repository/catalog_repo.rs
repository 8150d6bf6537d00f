// ==========================================
// 商品目录导入系统 - 目录 Repository Trait
// ==========================================
// 职责: 定义导入流程所需的目录数据访问接口（不包含实现）
// 红线: Repository 不含导入业务规则，只做数据 CRUD 与目录自身约束
// ==========================================

use crate::domain::catalog::{Image, OptionType, OptionValue, Property, Taxon, Taxonomy};
use crate::domain::product::{Product, ProductDraft, ValidationError, Variant};
use crate::domain::types::{
    OptionValueId, ProductId, PropertyId, ShippingCategoryId, TaxCategoryId, TaxonId, VariantId,
};
use crate::repository::error::RepositoryResult;

// ==========================================
// CatalogRepository Trait
// ==========================================
// 用途: 商品目录读写
// 实现者: SqliteCatalogRepository（使用 rusqlite）
pub trait CatalogRepository {
    // ===== 商品 =====

    /// 列出当前全部商品 ID（用于运行前快照）
    fn list_product_ids(&self) -> RepositoryResult<Vec<ProductId>>;

    /// 按外部 ID 属性查找商品
    ///
    /// # 参数
    /// - property_name: 身份属性名（如 "XmlImportId"）
    /// - external_id: 外部 ID 值
    ///
    /// # 返回
    /// - Ok(Some(Product)): 已导入过的商品（多条命中取最早创建的）
    /// - Ok(None): 未找到
    fn find_product_by_external_id(
        &self,
        property_name: &str,
        external_id: &str,
    ) -> RepositoryResult<Option<Product>>;

    /// 按 ID 查询商品
    fn get_product(&self, product_id: ProductId) -> RepositoryResult<Option<Product>>;

    /// 目录约束校验（不落库）
    fn validate_product(&self, draft: &ProductDraft) -> Vec<ValidationError>;

    /// 创建商品
    fn create_product(&self, draft: &ProductDraft) -> RepositoryResult<Product>;

    /// 删除商品（级联删除规格、属性值、图片、分类关联）
    fn delete_product(&self, product_id: ProductId) -> RepositoryResult<()>;

    // ===== 运输/税务类别 =====

    fn find_or_create_shipping_category(&self, name: &str)
        -> RepositoryResult<ShippingCategoryId>;

    fn find_or_create_tax_category(&self, name: &str) -> RepositoryResult<TaxCategoryId>;

    // ===== 分类 =====

    /// 查找或创建分类轴（新建时同步创建根节点）
    ///
    /// # 返回
    /// - (Taxonomy, true): 新建
    /// - (Taxonomy, false): 已存在
    fn find_or_create_taxonomy(&self, name: &str) -> RepositoryResult<(Taxonomy, bool)>;

    /// 在全部分类轴中按名称查找分类值（不含根节点）
    fn find_taxons_by_value(&self, value: &str) -> RepositoryResult<Vec<Taxon>>;

    /// 在指定分类轴中按名称查找分类值（不含根节点）
    fn find_taxons_in_taxonomy(
        &self,
        taxonomy: &Taxonomy,
        value: &str,
    ) -> RepositoryResult<Vec<Taxon>>;

    /// 在分类轴根节点下查找或创建分类值
    fn create_taxon(&self, taxonomy: &Taxonomy, value: &str) -> RepositoryResult<Taxon>;

    /// 关联商品与分类值（重复关联忽略）
    fn add_product_taxon(&self, product_id: ProductId, taxon_id: TaxonId) -> RepositoryResult<()>;

    /// 商品已关联的分类值
    fn list_product_taxons(&self, product_id: ProductId) -> RepositoryResult<Vec<Taxon>>;

    // ===== 规格 =====

    fn find_or_create_option_type(
        &self,
        name: &str,
        presentation: &str,
    ) -> RepositoryResult<OptionType>;

    /// 在规格轴内按 (规格轴, 名称) 查找或创建规格值
    fn find_or_create_option_value(
        &self,
        option_type: &OptionType,
        name: &str,
        presentation: &str,
    ) -> RepositoryResult<OptionValue>;

    /// 创建规格（每次调用新增一条）
    fn create_variant(
        &self,
        product_id: ProductId,
        sku: Option<&str>,
        price: f64,
        is_master: bool,
    ) -> RepositoryResult<Variant>;

    /// 关联规格与规格值（重复关联忽略）
    fn add_variant_option_value(
        &self,
        variant_id: VariantId,
        option_value_id: OptionValueId,
    ) -> RepositoryResult<()>;

    fn list_variants(&self, product_id: ProductId) -> RepositoryResult<Vec<Variant>>;

    fn list_variant_option_values(&self, variant_id: VariantId)
        -> RepositoryResult<Vec<OptionValue>>;

    // ===== 属性 =====

    /// 查找或创建属性定义（按名称）
    fn create_property(&self, name: &str, presentation: &str) -> RepositoryResult<Property>;

    /// 设置商品属性值（已有则覆盖）
    fn set_product_property(
        &self,
        product_id: ProductId,
        property_id: PropertyId,
        value: &str,
    ) -> RepositoryResult<()>;

    fn get_product_property(
        &self,
        product_id: ProductId,
        property_name: &str,
    ) -> RepositoryResult<Option<String>>;

    // ===== 图片 =====

    fn count_product_images(&self, product_id: ProductId) -> RepositoryResult<i64>;

    fn attach_image(
        &self,
        product_id: ProductId,
        file_name: &str,
        content: &[u8],
        position: i64,
    ) -> RepositoryResult<Image>;

    fn list_product_images(&self, product_id: ProductId) -> RepositoryResult<Vec<Image>>;

    // ===== 行作用域 =====
    // 用途: 单行失败时撤销该行已写入的内容（默认不支持回滚）

    fn begin_row_scope(&self) -> RepositoryResult<()> {
        Ok(())
    }

    fn commit_row_scope(&self) -> RepositoryResult<()> {
        Ok(())
    }

    fn rollback_row_scope(&self) -> RepositoryResult<()> {
        Ok(())
    }
}
