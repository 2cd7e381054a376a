// ドメインモデル（エンティティと値オブジェクト）

mod value_objects;
mod tour;
mod booking;

pub use value_objects::{
    TourId, BookingId, UserId,
    Money,
    TourProfile,
    BookingDetails,
    BookingStatus,
};

pub use tour::Tour;
pub use booking::Booking;
