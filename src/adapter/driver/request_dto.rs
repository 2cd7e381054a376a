use crate::domain::error::DomainError;
use crate::domain::model::{BookingDetails, Money, TourProfile};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ツアー登録・編集用のリクエストDTO
#[derive(Debug, Serialize, Deserialize)]
pub struct TourRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub price: i64, // JPY
    pub max_capacity: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

impl TourRequest {
    /// ドメインの説明情報と定員に変換する
    pub fn into_domain(self) -> Result<(TourProfile, u32), DomainError> {
        if self.max_capacity <= 0 {
            return Err(DomainError::InvalidCapacity(
                "定員は1以上である必要があります".to_string(),
            ));
        }
        let max_capacity = u32::try_from(self.max_capacity).map_err(|_| {
            DomainError::InvalidCapacity(format!("定員が大きすぎます: {}", self.max_capacity))
        })?;

        let profile = TourProfile::new(
            self.name,
            self.description,
            self.location,
            Money::jpy(self.price)?,
            self.image_url,
            self.is_featured,
        )?;
        Ok((profile, max_capacity))
    }
}

/// ツアー予約用のリクエストDTO
#[derive(Debug, Serialize, Deserialize)]
pub struct BookTourRequest {
    pub number_of_people: i64,
    pub tour_date: NaiveDate,
    #[serde(default)]
    pub requires_car_rental: bool,
    #[serde(default)]
    pub stay_duration_days: u32,
}

impl BookTourRequest {
    /// 参加人数を検証して取得する
    pub fn number_of_people(&self) -> Result<u32, DomainError> {
        if self.number_of_people <= 0 {
            return Err(DomainError::InvalidNumberOfPeople);
        }
        u32::try_from(self.number_of_people).map_err(|_| {
            DomainError::InvalidValue(format!("参加人数が大きすぎます: {}", self.number_of_people))
        })
    }

    /// 付帯情報を取得する
    pub fn details(&self) -> BookingDetails {
        BookingDetails::new(
            self.tour_date,
            self.requires_car_rental,
            self.stay_duration_days,
        )
    }
}

/// 予約一覧取得用のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct BookingsQueryParams {
    pub user_id: Option<Uuid>,
}
