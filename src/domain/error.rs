/// ドメイン層のエラー型
/// ビジネスルール違反を表現する
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// 無効な人数（0人での予約）
    #[error("Invalid number of people: must be at least 1")]
    InvalidNumberOfPeople,
    /// 空き枠不足
    #[error("Sold out: requested {requested}, available {available}")]
    SoldOut { requested: u32, available: u32 },
    /// 無効な定員（例: 0、予約済み枠数を下回る定員）
    #[error("Invalid capacity: {0}")]
    InvalidCapacity(String),
    /// 無効な予約状態遷移（例: キャンセル済みの予約を確定しようとした）
    #[error("Invalid booking state: {0}")]
    InvalidBookingState(String),
    /// 無効な値
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
