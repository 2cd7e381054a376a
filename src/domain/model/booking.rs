use crate::domain::error::DomainError;
use crate::domain::model::{BookingDetails, BookingId, BookingStatus, TourId, UserId};
use chrono::{DateTime, SubsecRound, Utc};

/// Booking集約
/// 予約のライフサイクル（保留 → 確定 / キャンセル）を管理する
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    id: BookingId,
    tour_id: TourId,
    user_id: UserId,
    number_of_people: u32,
    details: BookingDetails,
    status: BookingStatus,
    created_at: DateTime<Utc>,
}

impl Booking {
    /// 新しい予約を作成
    /// 初期ステータスはPending
    pub fn new(
        id: BookingId,
        tour_id: TourId,
        user_id: UserId,
        number_of_people: u32,
        details: BookingDetails,
    ) -> Result<Self, DomainError> {
        // DATETIME(6)に保存しても値が変わらないようにマイクロ秒に丸める
        let created_at = Utc::now().trunc_subsecs(6);
        Self::reconstruct(
            id,
            tour_id,
            user_id,
            number_of_people,
            details,
            BookingStatus::Pending,
            created_at,
        )
    }

    /// データベースから取得したデータで予約を再構築
    /// リポジトリでの使用を想定
    pub fn reconstruct(
        id: BookingId,
        tour_id: TourId,
        user_id: UserId,
        number_of_people: u32,
        details: BookingDetails,
        status: BookingStatus,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if number_of_people == 0 {
            return Err(DomainError::InvalidNumberOfPeople);
        }
        Ok(Self {
            id,
            tour_id,
            user_id,
            number_of_people,
            details,
            status,
            created_at,
        })
    }

    /// 予約IDを取得
    pub fn id(&self) -> BookingId {
        self.id
    }

    /// ツアーIDを取得
    pub fn tour_id(&self) -> TourId {
        self.tour_id
    }

    /// 利用者IDを取得
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// 参加人数を取得
    pub fn number_of_people(&self) -> u32 {
        self.number_of_people
    }

    /// 付帯情報を取得
    pub fn details(&self) -> &BookingDetails {
        &self.details
    }

    /// 予約ステータスを取得
    pub fn status(&self) -> BookingStatus {
        self.status
    }

    /// 作成日時を取得
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 予約を確定
    /// 事前条件:
    /// - ステータスがPending
    pub fn confirm(&mut self) -> Result<(), DomainError> {
        if self.status != BookingStatus::Pending {
            return Err(DomainError::InvalidBookingState(format!(
                "予約を確定できるのはPENDING状態のみです（現在: {}）",
                self.status
            )));
        }
        self.status = BookingStatus::Confirmed;
        Ok(())
    }

    /// 予約をキャンセル
    /// 事前条件:
    /// - ステータスがPendingまたはConfirmed
    ///
    /// ツアーの空き枠は戻さない
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        if self.status == BookingStatus::Cancelled {
            return Err(DomainError::InvalidBookingState(
                "既にキャンセル済みの予約です".to_string(),
            ));
        }
        self.status = BookingStatus::Cancelled;
        Ok(())
    }
}
