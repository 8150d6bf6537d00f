// ==========================================
// 目录仓储集成测试（文件库）
// ==========================================
// 测试目标: 重新打开目录库后参考数据幂等、商品删除级联
// ==========================================


use catalog_import::domain::product::{NumericField, ProductDraft};
use catalog_import::repository::{CatalogRepository, SqliteCatalogRepository};
use chrono::Utc;

fn draft(name: &str, shipping: catalog_import::domain::types::ShippingCategoryId) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        description: String::new(),
        price: NumericField::Value(9.5),
        weight: None,
        height: None,
        width: None,
        depth: None,
        available_on: Utc::now(),
        shipping_category_id: Some(shipping),
        tax_category_id: None,
    }
}

#[test]
fn test_reference_data_survives_reopen() {
    let (_temp_file, db_path, catalog) = test_helpers::create_test_catalog().unwrap();

    let shipping = catalog.find_or_create_shipping_category("Default").unwrap();
    let (taxonomy, created) = catalog.find_or_create_taxonomy("Category").unwrap();
    assert!(created);
    let taxon = catalog.create_taxon(&taxonomy, "Shoes").unwrap();
    drop(catalog);

    // 重新打开后按名称（大小写不敏感）命中同一条记录
    let reopened = SqliteCatalogRepository::new(&db_path).unwrap();
    reopened.init_schema().unwrap();
    assert_eq!(
        reopened.find_or_create_shipping_category("default").unwrap(),
        shipping
    );
    let (again, created) = reopened.find_or_create_taxonomy("category").unwrap();
    assert!(!created);
    assert_eq!(again.id, taxonomy.id);
    assert_eq!(again.root_taxon_id, taxonomy.root_taxon_id);

    let found = reopened.find_taxons_by_value("shoes").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, taxon.id);
}

#[test]
fn test_delete_product_cascades_owned_rows_only() {
    let (_temp_file, _db_path, catalog) = test_helpers::create_test_catalog().unwrap();

    let shipping = catalog.find_or_create_shipping_category("Default").unwrap();
    let product = catalog.create_product(&draft("Boot", shipping)).unwrap();

    let (taxonomy, _) = catalog.find_or_create_taxonomy("Category").unwrap();
    let taxon = catalog.create_taxon(&taxonomy, "Shoes").unwrap();
    catalog.add_product_taxon(product.id, taxon.id).unwrap();

    let color = catalog.find_or_create_option_type("Color", "Couleur").unwrap();
    let red = catalog.find_or_create_option_value(&color, "Red", "Red").unwrap();
    let variant = catalog
        .create_variant(product.id, Some("BOOT-1"), 9.5, true)
        .unwrap();
    catalog.add_variant_option_value(variant.id, red.id).unwrap();

    let property = catalog.create_property("XmlImportId", "XmlImportId").unwrap();
    catalog.set_product_property(product.id, property.id, "B1").unwrap();
    catalog
        .attach_image(product.id, "boot.jpg", b"img", 0)
        .unwrap();

    catalog.delete_product(product.id).unwrap();

    assert!(catalog.get_product(product.id).unwrap().is_none());
    assert!(catalog.list_variants(product.id).unwrap().is_empty());
    assert!(catalog.list_product_images(product.id).unwrap().is_empty());
    assert!(catalog
        .find_product_by_external_id("XmlImportId", "B1")
        .unwrap()
        .is_none());

    // 共享参考数据保留；SKU 可再次使用
    assert_eq!(catalog.find_taxons_by_value("Shoes").unwrap().len(), 1);
    let red_again = catalog.find_or_create_option_value(&color, "Red", "Red").unwrap();
    assert_eq!(red_again.id, red.id);

    let other = catalog.create_product(&draft("Boot II", shipping)).unwrap();
    assert!(catalog
        .create_variant(other.id, Some("BOOT-1"), 9.5, true)
        .is_ok());

    // 重复删除返回 NotFound
    assert!(catalog.delete_product(product.id).is_err());
}
