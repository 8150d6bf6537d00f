// ==========================================
// 商品目录导入系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为可读的错误消息
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err: ApiError = RepositoryError::NotFound {
            entity: "ImportRun".to_string(),
            id: "r1".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "资源未找到: ImportRun(id=r1)不存在");
    }

    #[test]
    fn test_storage_errors_map_to_database_variants() {
        let lock: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(lock, ApiError::DatabaseConnectionError(_)));

        let unique: ApiError =
            RepositoryError::UniqueConstraintViolation("variants.sku".to_string()).into();
        assert!(matches!(unique, ApiError::BusinessRuleViolation(_)));

        let tx: ApiError = RepositoryError::DatabaseTransactionError("busy".to_string()).into();
        assert!(matches!(tx, ApiError::DatabaseTransactionError(_)));
    }
}
