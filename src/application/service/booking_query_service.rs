use crate::application::ApplicationError;
use crate::domain::model::{Booking, BookingId, UserId};
use crate::domain::port::BookingRepository;
use std::sync::Arc;

/// 予約クエリサービス
/// 読み取り専用の予約操作を提供する
pub struct BookingQueryService {
    booking_repository: Arc<dyn BookingRepository>,
}

impl BookingQueryService {
    /// 新しい予約クエリサービスを作成
    ///
    /// # Arguments
    /// * `booking_repository` - 予約リポジトリ
    pub fn new(booking_repository: Arc<dyn BookingRepository>) -> Self {
        Self { booking_repository }
    }

    /// 予約IDで予約を取得
    pub async fn get_booking(&self, booking_id: BookingId) -> Result<Booking, ApplicationError> {
        self.booking_repository
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("予約が見つかりません: {}", booking_id))
            })
    }

    /// すべての予約を取得（管理者向け）
    /// 作成日時の降順で並べて返す
    pub async fn list_bookings(&self) -> Result<Vec<Booking>, ApplicationError> {
        self.booking_repository
            .find_all()
            .await
            .map_err(ApplicationError::from)
    }

    /// 指定された利用者の予約を取得
    /// 作成日時の降順で並べて返す
    pub async fn list_bookings_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Booking>, ApplicationError> {
        self.booking_repository
            .find_by_user_id(user_id)
            .await
            .map_err(ApplicationError::from)
    }
}
