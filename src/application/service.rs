use crate::application::ApplicationError;
use crate::domain::model::{
    Booking, BookingDetails, BookingId, Tour, TourId, TourProfile, UserId,
};
use crate::domain::port::{BookingRepository, Logger, ReservationStore, TourRepository};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

mod booking_query_service;
mod tour_query_service;

pub use booking_query_service::BookingQueryService;
pub use tour_query_service::TourQueryService;

/// 空き枠の読み取り〜更新を直列化するロック
/// 予約と定員変更で同じインスタンスを共有する
pub type SlotLock = Arc<Mutex<()>>;

/// 新しい空き枠ロックを作成
pub fn new_slot_lock() -> SlotLock {
    Arc::new(Mutex::new(()))
}

/// 予約アプリケーションサービス
/// 空き枠の予約と予約の登録をひとつの操作として扱う
pub struct BookingApplicationService {
    tour_repository: Arc<dyn TourRepository>,
    booking_repository: Arc<dyn BookingRepository>,
    reservation_store: Arc<dyn ReservationStore>,
    logger: Arc<dyn Logger>,
    slot_lock: SlotLock,
}

impl BookingApplicationService {
    const COMPONENT: &'static str = "BookingApplicationService";

    /// 新しい予約アプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `tour_repository` - ツアーリポジトリ
    /// * `booking_repository` - 予約リポジトリ
    /// * `reservation_store` - 空き枠更新と予約登録をまとめてコミットするストア
    /// * `logger` - ロガー
    /// * `slot_lock` - 空き枠ロック
    pub fn new(
        tour_repository: Arc<dyn TourRepository>,
        booking_repository: Arc<dyn BookingRepository>,
        reservation_store: Arc<dyn ReservationStore>,
        logger: Arc<dyn Logger>,
        slot_lock: SlotLock,
    ) -> Self {
        Self {
            tour_repository,
            booking_repository,
            reservation_store,
            logger,
            slot_lock,
        }
    }

    /// ツアーを予約する
    ///
    /// ロックを保持したままツアーの読み取り・空き枠の検証・コミットを行うため、
    /// 同時に実行された予約が同じ空き枠を二重に消費することはない
    ///
    /// # Arguments
    /// * `tour_id` - ツアーID
    /// * `user_id` - 予約する利用者のID
    /// * `number_of_people` - 参加人数（1以上）
    /// * `details` - 参加希望日などの付帯情報
    ///
    /// # Returns
    /// * `Ok(Booking)` - PENDING状態で作成された予約
    /// * `Err(ApplicationError::Validation)` - 人数が0
    /// * `Err(ApplicationError::NotFound)` - ツアーが存在しない
    /// * `Err(ApplicationError::SoldOut)` - 空き枠不足（何も変更しない）
    pub async fn book(
        &self,
        tour_id: TourId,
        user_id: UserId,
        number_of_people: u32,
        details: BookingDetails,
    ) -> Result<Booking, ApplicationError> {
        if number_of_people == 0 {
            return Err(ApplicationError::Validation(
                "参加人数は1以上である必要があります".to_string(),
            ));
        }

        let correlation_id = Uuid::new_v4();
        let _guard = self.slot_lock.lock().await;
        self.logger.debug(
            Self::COMPONENT,
            &format!("空き枠ロックを取得しました: {}", tour_id),
            Some(correlation_id),
            None,
        );

        let mut tour = self
            .tour_repository
            .find_by_id(tour_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("ツアーが見つかりません: {}", tour_id))
            })?;

        if let Err(err) = tour.reserve_slots(number_of_people) {
            let mut context = HashMap::new();
            context.insert("tour_id".to_string(), tour_id.to_string());
            context.insert("requested".to_string(), number_of_people.to_string());
            context.insert("available".to_string(), tour.available_slots().to_string());
            self.logger.info(
                Self::COMPONENT,
                "空き枠不足のため予約を受け付けませんでした",
                Some(correlation_id),
                Some(context),
            );
            return Err(err.into());
        }

        let booking = Booking::new(
            self.booking_repository.next_identity(),
            tour_id,
            user_id,
            number_of_people,
            details,
        )?;

        self.reservation_store
            .commit_reservation(&tour, &booking)
            .await?;

        let mut context = HashMap::new();
        context.insert("tour_id".to_string(), tour_id.to_string());
        context.insert("booking_id".to_string(), booking.id().to_string());
        context.insert("number_of_people".to_string(), number_of_people.to_string());
        context.insert("available".to_string(), tour.available_slots().to_string());
        self.logger.info(
            Self::COMPONENT,
            "予約を作成しました",
            Some(correlation_id),
            Some(context),
        );

        Ok(booking)
    }

    /// 予約を確定する（PENDING → CONFIRMED）
    ///
    /// # Arguments
    /// * `booking_id` - 予約ID
    ///
    /// # Returns
    /// * `Ok(Booking)` - 確定後の予約
    /// * `Err(ApplicationError)` - 確定失敗
    pub async fn confirm(&self, booking_id: BookingId) -> Result<Booking, ApplicationError> {
        let mut booking = self.find_booking(booking_id).await?;
        let previous_status = booking.status();

        booking.confirm()?;
        // 読み取り後に他の遷移が完了していた場合はConflictとなり書き込まない
        self.booking_repository
            .update(&booking, previous_status)
            .await?;

        self.logger.info(
            Self::COMPONENT,
            &format!("予約を確定しました: {}", booking_id),
            None,
            None,
        );
        Ok(booking)
    }

    /// 予約をキャンセルする（PENDING / CONFIRMED → CANCELLED）
    /// ツアーの空き枠は戻さない
    ///
    /// # Arguments
    /// * `booking_id` - 予約ID
    ///
    /// # Returns
    /// * `Ok(Booking)` - キャンセル後の予約
    /// * `Err(ApplicationError)` - キャンセル失敗
    pub async fn cancel(&self, booking_id: BookingId) -> Result<Booking, ApplicationError> {
        let mut booking = self.find_booking(booking_id).await?;
        let previous_status = booking.status();

        booking.cancel()?;
        // 読み取り後に他の遷移が完了していた場合はConflictとなり書き込まない
        self.booking_repository
            .update(&booking, previous_status)
            .await?;

        let mut context = HashMap::new();
        context.insert("tour_id".to_string(), booking.tour_id().to_string());
        context.insert(
            "unreleased_slots".to_string(),
            booking.number_of_people().to_string(),
        );
        self.logger.warn(
            Self::COMPONENT,
            &format!("予約をキャンセルしました（空き枠は戻していません）: {}", booking_id),
            None,
            Some(context),
        );
        Ok(booking)
    }

    async fn find_booking(&self, booking_id: BookingId) -> Result<Booking, ApplicationError> {
        self.booking_repository
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("予約が見つかりません: {}", booking_id))
            })
    }
}

/// ツアーアプリケーションサービス
/// 管理者によるツアーの登録・編集・削除を扱う
pub struct TourApplicationService {
    tour_repository: Arc<dyn TourRepository>,
    logger: Arc<dyn Logger>,
    slot_lock: SlotLock,
}

impl TourApplicationService {
    const COMPONENT: &'static str = "TourApplicationService";

    /// 新しいツアーアプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `tour_repository` - ツアーリポジトリ
    /// * `logger` - ロガー
    /// * `slot_lock` - 予約サービスと共有する空き枠ロック
    pub fn new(
        tour_repository: Arc<dyn TourRepository>,
        logger: Arc<dyn Logger>,
        slot_lock: SlotLock,
    ) -> Self {
        Self {
            tour_repository,
            logger,
            slot_lock,
        }
    }

    /// ツアーを登録する
    /// 空き枠数は定員と同じ値で作成される
    pub async fn create_tour(
        &self,
        profile: TourProfile,
        max_capacity: u32,
    ) -> Result<Tour, ApplicationError> {
        let tour = Tour::new(self.tour_repository.next_identity(), profile, max_capacity)?;
        self.tour_repository.insert(&tour).await?;

        self.logger.info(
            Self::COMPONENT,
            &format!("ツアーを登録しました: {} ({})", tour.profile().name(), tour.id()),
            None,
            None,
        );
        Ok(tour)
    }

    /// ツアーを編集する
    /// 定員を変えた場合は予約済みの枠数を維持したまま空き枠数を調整する
    ///
    /// # Returns
    /// * `Ok(Tour)` - 編集後のツアー
    /// * `Err(ApplicationError::NotFound)` - ツアーが存在しない
    /// * `Err(ApplicationError::Validation)` - 定員が予約済みの枠数を下回る
    pub async fn update_tour(
        &self,
        tour_id: TourId,
        profile: TourProfile,
        max_capacity: u32,
    ) -> Result<Tour, ApplicationError> {
        let _guard = self.slot_lock.lock().await;

        let mut tour = self
            .tour_repository
            .find_by_id(tour_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("ツアーが見つかりません: {}", tour_id))
            })?;

        tour.resize(max_capacity)?;
        tour.update_profile(profile);
        self.tour_repository.update(&tour).await?;

        self.logger.info(
            Self::COMPONENT,
            &format!("ツアーを更新しました: {}", tour_id),
            None,
            None,
        );
        Ok(tour)
    }

    /// ツアーを削除する
    /// 既存の予約はそのまま残す
    pub async fn delete_tour(&self, tour_id: TourId) -> Result<(), ApplicationError> {
        self.tour_repository.delete(tour_id).await?;

        self.logger.info(
            Self::COMPONENT,
            &format!("ツアーを削除しました: {}", tour_id),
            None,
            None,
        );
        Ok(())
    }
}
