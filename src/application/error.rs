use crate::domain::error::DomainError;
use crate::domain::port::RepositoryError;

/// アプリケーション層のエラー型
/// 呼び出し側へ返す型付きの結果として、ドメインエラーとリポジトリエラーを分類し直す
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    /// 参照したツアー・予約が存在しない
    #[error("Not found: {0}")]
    NotFound(String),
    /// 空き枠不足
    #[error("Sold out: requested {requested}, available {available}")]
    SoldOut { requested: u32, available: u32 },
    /// 入力値またはビジネスルールの検証に失敗
    #[error("Validation error: {0}")]
    Validation(String),
    /// リポジトリエラー（永続化の失敗）
    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

// From実装でエラー変換を簡潔に
impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::SoldOut {
                requested,
                available,
            } => ApplicationError::SoldOut {
                requested,
                available,
            },
            other => ApplicationError::Validation(other.to_string()),
        }
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::RecordNotFound(msg) => ApplicationError::NotFound(msg),
            // 並行する状態遷移に先を越された場合は不正な遷移として扱う
            RepositoryError::Conflict(msg) => ApplicationError::Validation(msg),
            other => ApplicationError::Repository(other),
        }
    }
}
