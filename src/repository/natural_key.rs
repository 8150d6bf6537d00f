// ==========================================
// 商品目录导入系统 - 自然键查找或插入
// ==========================================
// 职责: 按自然键幂等地“查到即复用，查不到再插入”
// 适用: 运输/税务类别、分类轴、分类值、规格轴、规格值、属性
// 约束: 表名/列名均为编译期常量，值一律参数化
// ==========================================

use crate::repository::error::RepositoryResult;
use rusqlite::{Connection, OptionalExtension, ToSql};

// ==========================================
// NaturalKey Trait
// ==========================================
// 用途: 描述一种参考数据的自然键
pub trait NaturalKey {
    /// 目标表
    const TABLE: &'static str;

    /// 自然键列（参与查找）
    const KEY_COLUMNS: &'static [&'static str];

    /// 仅在插入时写入的附加列
    const EXTRA_COLUMNS: &'static [&'static str] = &[];

    /// 自然键参数（顺序与 KEY_COLUMNS 一致）
    fn key_params(&self) -> Vec<&dyn ToSql>;

    /// 附加列参数（顺序与 EXTRA_COLUMNS 一致）
    fn extra_params(&self) -> Vec<&dyn ToSql> {
        Vec::new()
    }
}

/// 查找或插入
///
/// # 返回
/// - Ok((id, false)): 已存在，复用
/// - Ok((id, true)): 新建
pub fn find_or_insert<K: NaturalKey>(conn: &Connection, key: &K) -> RepositoryResult<(i64, bool)> {
    if let Some(id) = find_by_key(conn, key)? {
        return Ok((id, false));
    }

    let columns: Vec<&str> = K::KEY_COLUMNS
        .iter()
        .chain(K::EXTRA_COLUMNS.iter())
        .copied()
        .collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        K::TABLE,
        columns.join(", "),
        placeholders.join(", ")
    );

    let mut params = key.key_params();
    params.extend(key.extra_params());
    conn.execute(&sql, &params[..])?;

    Ok((conn.last_insert_rowid(), true))
}

/// 仅按自然键查找（最早创建的一条）
pub fn find_by_key<K: NaturalKey>(conn: &Connection, key: &K) -> RepositoryResult<Option<i64>> {
    let where_clause: Vec<String> = K::KEY_COLUMNS
        .iter()
        .enumerate()
        .map(|(idx, column)| format!("{} = ?{}", column, idx + 1))
        .collect();
    let sql = format!(
        "SELECT id FROM {} WHERE {} ORDER BY id LIMIT 1",
        K::TABLE,
        where_clause.join(" AND ")
    );

    let params = key.key_params();
    let id = conn
        .query_row(&sql, &params[..], |row| row.get::<_, i64>(0))
        .optional()?;
    Ok(id)
}

// ==========================================
// 各参考数据的自然键
// ==========================================

pub struct ShippingCategoryKey<'a> {
    pub name: &'a str,
}

impl NaturalKey for ShippingCategoryKey<'_> {
    const TABLE: &'static str = "shipping_categories";
    const KEY_COLUMNS: &'static [&'static str] = &["name"];

    fn key_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.name as &dyn ToSql]
    }
}

pub struct TaxCategoryKey<'a> {
    pub name: &'a str,
}

impl NaturalKey for TaxCategoryKey<'_> {
    const TABLE: &'static str = "tax_categories";
    const KEY_COLUMNS: &'static [&'static str] = &["name"];

    fn key_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.name as &dyn ToSql]
    }
}

pub struct TaxonomyKey<'a> {
    pub name: &'a str,
}

impl NaturalKey for TaxonomyKey<'_> {
    const TABLE: &'static str = "taxonomies";
    const KEY_COLUMNS: &'static [&'static str] = &["name"];

    fn key_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.name as &dyn ToSql]
    }
}

/// 分类值：在分类轴根节点下按名称唯一
pub struct TaxonKey<'a> {
    pub taxonomy_id: i64,
    pub parent_id: i64,
    pub name: &'a str,
}

impl NaturalKey for TaxonKey<'_> {
    const TABLE: &'static str = "taxons";
    const KEY_COLUMNS: &'static [&'static str] = &["taxonomy_id", "parent_id", "name"];

    fn key_params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.taxonomy_id as &dyn ToSql,
            &self.parent_id as &dyn ToSql,
            &self.name as &dyn ToSql,
        ]
    }
}

pub struct OptionTypeKey<'a> {
    pub name: &'a str,
    pub presentation: &'a str,
}

impl NaturalKey for OptionTypeKey<'_> {
    const TABLE: &'static str = "option_types";
    const KEY_COLUMNS: &'static [&'static str] = &["name", "presentation"];

    fn key_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.name as &dyn ToSql, &self.presentation as &dyn ToSql]
    }
}

/// 规格值：在所属规格轴内按名称唯一
pub struct OptionValueKey<'a> {
    pub option_type_id: i64,
    pub name: &'a str,
    pub presentation: &'a str,
}

impl NaturalKey for OptionValueKey<'_> {
    const TABLE: &'static str = "option_values";
    const KEY_COLUMNS: &'static [&'static str] = &["option_type_id", "name"];
    const EXTRA_COLUMNS: &'static [&'static str] = &["presentation"];

    fn key_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.option_type_id as &dyn ToSql, &self.name as &dyn ToSql]
    }

    fn extra_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.presentation as &dyn ToSql]
    }
}

pub struct PropertyKey<'a> {
    pub name: &'a str,
    pub presentation: &'a str,
}

impl NaturalKey for PropertyKey<'_> {
    const TABLE: &'static str = "properties";
    const KEY_COLUMNS: &'static [&'static str] = &["name"];
    const EXTRA_COLUMNS: &'static [&'static str] = &["presentation"];

    fn key_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.name as &dyn ToSql]
    }

    fn extra_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.presentation as &dyn ToSql]
    }
}
