// ==========================================
// 商品目录导入系统 - 列映射
// ==========================================
// 职责: 逻辑字段名 → 列下标；按字段取值
// 约束:
// - 未映射的字段 = 本文件不含该列（跳过，不是错误）
// - 映射了但为空白 = Blank（由调用方套用默认值）
// ==========================================

use crate::domain::import::RawRow;
use crate::importer::error::{ImportError, ImportResult, RowError, RowResult};
use std::collections::BTreeMap;

// ==========================================
// FieldValue - 字段取值结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// 本文件未映射该字段
    Unmapped,
    /// 已映射但为空白
    Blank,
    /// 已映射且有值（已去除首尾空白）
    Present(&'a str),
}

impl<'a> FieldValue<'a> {
    pub fn is_mapped(&self) -> bool {
        !matches!(self, FieldValue::Unmapped)
    }

    pub fn present(&self) -> Option<&'a str> {
        match self {
            FieldValue::Present(value) => Some(value),
            _ => None,
        }
    }

    /// 未映射 → None；空白 → Some("")
    pub fn mapped_or_empty(&self) -> Option<&'a str> {
        match self {
            FieldValue::Unmapped => None,
            FieldValue::Blank => Some(""),
            FieldValue::Present(value) => Some(value),
        }
    }
}

// ==========================================
// ColumnMap
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    mapping: BTreeMap<String, usize>,
}

impl ColumnMap {
    pub fn new(mapping: BTreeMap<String, usize>) -> Self {
        Self { mapping }
    }

    pub fn index_of(&self, field: &str) -> Option<usize> {
        self.mapping.get(field).copied()
    }

    pub fn is_mapped(&self, field: &str) -> bool {
        self.mapping.contains_key(field)
    }

    /// 按字段取值
    ///
    /// # 错误
    /// - RowError::ColumnOutOfRange: 映射的列下标超出本行长度（短行）
    pub fn lookup<'r>(&self, row: &'r RawRow, field: &str) -> RowResult<FieldValue<'r>> {
        let Some(index) = self.index_of(field) else {
            return Ok(FieldValue::Unmapped);
        };

        let raw = row
            .fields
            .get(index)
            .ok_or_else(|| RowError::ColumnOutOfRange {
                field: field.to_string(),
                index,
                row_len: row.fields.len(),
            })?;

        let value = raw.trim();
        if value.is_empty() {
            Ok(FieldValue::Blank)
        } else {
            Ok(FieldValue::Present(value))
        }
    }

    /// 以文件实际列数校验映射（运行前执行，越界为致命配置错误）
    pub fn validate_against(&self, column_count: usize) -> ImportResult<()> {
        for (field, index) in &self.mapping {
            if *index >= column_count {
                return Err(ImportError::ColumnMappingOutOfRange {
                    field: field.clone(),
                    index: *index,
                    column_count,
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for ColumnMap {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        Self {
            mapping: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> RawRow {
        RawRow::new(2, fields.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_lookup_distinguishes_unmapped_blank_present() {
        let map: ColumnMap = [("Name", 0), ("Master Price", 1)].into_iter().collect();
        let r = row(&["  ", " 10.00 "]);

        assert_eq!(map.lookup(&r, "Name").unwrap(), FieldValue::Blank);
        assert_eq!(map.lookup(&r, "Master Price").unwrap(), FieldValue::Present("10.00"));
        assert_eq!(map.lookup(&r, "Weight").unwrap(), FieldValue::Unmapped);
        assert_eq!(FieldValue::Blank.mapped_or_empty(), Some(""));
        assert_eq!(FieldValue::Unmapped.mapped_or_empty(), None);
    }

    #[test]
    fn test_short_row_is_row_error() {
        let map: ColumnMap = [("Category", 5)].into_iter().collect();
        let err = map.lookup(&row(&["a", "b"]), "Category").unwrap_err();
        assert!(matches!(
            err,
            RowError::ColumnOutOfRange { index: 5, row_len: 2, .. }
        ));
    }

    #[test]
    fn test_validate_against_column_count() {
        let map: ColumnMap = [("Name", 0), ("Image Main", 3)].into_iter().collect();
        assert!(map.validate_against(4).is_ok());
        assert!(matches!(
            map.validate_against(3),
            Err(ImportError::ColumnMappingOutOfRange { index: 3, column_count: 3, .. })
        ));
    }
}
