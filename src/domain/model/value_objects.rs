use crate::domain::error::DomainError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// ツアーの一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TourId(Uuid);

impl TourId {
    /// 新しい一意のTourIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから TourId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からTourIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }
}

impl fmt::Display for TourId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for TourId {
    fn default() -> Self {
        Self::new()
    }
}

/// 予約の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookingId(Uuid);

impl BookingId {
    /// 新しい一意のBookingIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから BookingId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からBookingIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

/// 利用者の一意識別子
/// 認証基盤から渡される値をそのまま保持する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// 新しい一意のUserIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから UserId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からUserIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// 通貨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// 日本円
    #[allow(clippy::upper_case_acronyms)]
    JPY,
}

/// 金額を表す値オブジェクト
/// ツアー料金として使うため負の値は作成できない
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// 金額と通貨から作成
    pub fn new(amount: i64, currency: String) -> Result<Self, DomainError> {
        let currency = match currency.as_str() {
            "JPY" => Currency::JPY,
            _ => {
                return Err(DomainError::InvalidValue(format!(
                    "サポートされていない通貨: {}",
                    currency
                )))
            }
        };
        Self::validate_amount(amount)?;
        Ok(Self { amount, currency })
    }

    /// 日本円の金額を作成
    pub fn jpy(amount: i64) -> Result<Self, DomainError> {
        Self::validate_amount(amount)?;
        Ok(Self {
            amount,
            currency: Currency::JPY,
        })
    }

    fn validate_amount(amount: i64) -> Result<(), DomainError> {
        if amount < 0 {
            return Err(DomainError::InvalidValue(format!(
                "金額は0以上である必要があります: {}",
                amount
            )));
        }
        Ok(())
    }

    /// 金額を取得
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// 通貨を文字列として取得
    pub fn currency(&self) -> String {
        match self.currency {
            Currency::JPY => "JPY".to_string(),
        }
    }
}

/// ツアーの説明情報を表す値オブジェクト
/// 管理者が編集できる項目をまとめたもの（定員・空き枠は含まない）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourProfile {
    name: String,
    description: String,
    location: String,
    price: Money,
    image_url: Option<String>,
    is_featured: bool,
}

impl TourProfile {
    /// 新しいツアー説明情報を作成
    /// バリデーション:
    /// - ツアー名は空でない必要がある
    pub fn new(
        name: String,
        description: String,
        location: String,
        price: Money,
        image_url: Option<String>,
        is_featured: bool,
    ) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::InvalidValue(
                "ツアー名は空にできません".to_string(),
            ));
        }

        Ok(Self {
            name,
            description,
            location,
            price,
            image_url,
            is_featured,
        })
    }

    /// ツアー名を取得
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 説明文を取得
    pub fn description(&self) -> &str {
        &self.description
    }

    /// 開催地を取得
    pub fn location(&self) -> &str {
        &self.location
    }

    /// 料金を取得
    pub fn price(&self) -> Money {
        self.price
    }

    /// 画像URLを取得
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// おすすめツアーかどうか
    pub fn is_featured(&self) -> bool {
        self.is_featured
    }
}

/// 予約時に利用者が入力する付帯情報
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDetails {
    tour_date: NaiveDate,
    requires_car_rental: bool,
    stay_duration_days: u32,
}

impl BookingDetails {
    pub fn new(tour_date: NaiveDate, requires_car_rental: bool, stay_duration_days: u32) -> Self {
        Self {
            tour_date,
            requires_car_rental,
            stay_duration_days,
        }
    }

    /// 参加希望日を取得
    pub fn tour_date(&self) -> NaiveDate {
        self.tour_date
    }

    /// レンタカーを希望するかどうか
    pub fn requires_car_rental(&self) -> bool {
        self.requires_car_rental
    }

    /// 滞在日数を取得
    pub fn stay_duration_days(&self) -> u32 {
        self.stay_duration_days
    }
}

/// 予約のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    /// 保留中（作成直後）
    Pending,
    /// 確定済み
    Confirmed,
    /// キャンセル済み
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status_str = match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", status_str)
    }
}

impl BookingStatus {
    /// 文字列からBookingStatusを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な予約ステータス: {}",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tour_id_creation() {
        let id1 = TourId::new();
        let id2 = TourId::new();
        assert_ne!(id1, id2, "Each TourId should be unique");
    }

    #[test]
    fn test_booking_id_from_string() {
        let id = BookingId::new();
        let parsed = BookingId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert!(BookingId::from_string("not-a-uuid").is_err());
    }

    #[test]
    fn test_money_rejects_negative_amount() {
        assert!(Money::jpy(0).is_ok());
        assert!(Money::jpy(12_000).is_ok());
        assert!(Money::jpy(-1).is_err());
    }

    #[test]
    fn test_money_equality_includes_currency() {
        let price = Money::jpy(4800).unwrap();
        assert_eq!(price, Money::new(4800, "JPY".to_string()).unwrap());
        assert_ne!(price, Money::jpy(4801).unwrap());
        assert_eq!(price.currency(), "JPY");
    }

    #[test]
    fn test_money_unsupported_currency() {
        let result = Money::new(1000, "USD".to_string());
        assert!(matches!(result, Err(DomainError::InvalidValue(_))));
    }

    #[test]
    fn test_tour_profile_blank_name() {
        let result = TourProfile::new(
            "   ".to_string(),
            "説明".to_string(),
            "京都".to_string(),
            Money::jpy(5000).unwrap(),
            None,
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_booking_status_from_string_valid() {
        assert_eq!(BookingStatus::from_string("PENDING").unwrap(), BookingStatus::Pending);
        assert_eq!(BookingStatus::from_string("CONFIRMED").unwrap(), BookingStatus::Confirmed);
        assert_eq!(BookingStatus::from_string("CANCELLED").unwrap(), BookingStatus::Cancelled);
    }

    #[test]
    fn test_booking_status_from_string_invalid() {
        assert!(BookingStatus::from_string("Pending").is_err()); // 大文字小文字が違う
        assert!(BookingStatus::from_string("").is_err());
    }

    #[test]
    fn test_booking_status_display_matches_storage_format() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::from_string(&status.to_string()).unwrap(), status);
        }
    }
}
