use crate::domain::model::{Booking, Tour};
use serde::{Deserialize, Serialize};

/// ツアー用のレスポンスDTO
#[derive(Debug, Serialize, Deserialize)]
pub struct TourResponse {
    pub tour_id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub price_amount: i64,
    pub price_currency: String,
    pub max_capacity: u32,
    pub available_slots: u32,
    pub image_url: Option<String>,
    pub is_featured: bool,
}

/// 予約用のレスポンスDTO
#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
    pub booking_id: String,
    pub tour_id: String,
    pub user_id: String,
    pub number_of_people: u32,
    pub tour_date: String,
    pub requires_car_rental: bool,
    pub stay_duration_days: u32,
    pub status: String,
    pub created_at: String,
}

impl TourResponse {
    /// ドメインオブジェクトからTourResponseを作成
    pub fn from_domain(tour: &Tour) -> Self {
        let profile = tour.profile();
        Self {
            tour_id: tour.id().to_string(),
            name: profile.name().to_string(),
            description: profile.description().to_string(),
            location: profile.location().to_string(),
            price_amount: profile.price().amount(),
            price_currency: profile.price().currency(),
            max_capacity: tour.max_capacity(),
            available_slots: tour.available_slots(),
            image_url: profile.image_url().map(str::to_string),
            is_featured: profile.is_featured(),
        }
    }
}

impl BookingResponse {
    /// ドメインオブジェクトからBookingResponseを作成
    pub fn from_domain(booking: &Booking) -> Self {
        let details = booking.details();
        Self {
            booking_id: booking.id().to_string(),
            tour_id: booking.tour_id().to_string(),
            user_id: booking.user_id().to_string(),
            number_of_people: booking.number_of_people(),
            tour_date: details.tour_date().format("%Y-%m-%d").to_string(),
            requires_car_rental: details.requires_car_rental(),
            stay_duration_days: details.stay_duration_days(),
            status: booking.status().to_string(),
            created_at: booking.created_at().to_rfc3339(),
        }
    }
}
