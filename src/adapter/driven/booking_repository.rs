use crate::adapter::database_error::DatabaseError;
use crate::adapter::driven::tour_repository::{tour_exists, update_tour_row};
use crate::domain::model::{
    Booking, BookingDetails, BookingId, BookingStatus, Tour, TourId, UserId,
};
use crate::domain::port::{BookingRepository, RepositoryError, ReservationStore};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

// MySQL関連のインポート
use sqlx::mysql::MySqlRow;
use sqlx::{Executor, MySql, Pool, Row};

const BOOKING_COLUMNS: &str = "id, tour_id, user_id, number_of_people, tour_date, \
     requires_car_rental, stay_duration_days, status, created_at";

/// MySQL予約リポジトリ
/// MySQLデータベースを使用して予約を永続化する
/// 予約確定時のツアー更新と予約登録も同じトランザクションで扱う
#[derive(Clone)]
pub struct MySqlBookingRepository {
    pool: Pool<MySql>,
}

impl MySqlBookingRepository {
    /// 新しいMySQL予約リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

/// データベースの行から予約を再構築する
fn booking_from_row(row: &MySqlRow) -> Result<Booking, RepositoryError> {
    let booking_id = BookingId::from_string(&row.get::<String, _>("id"))
        .map_err(|e| RepositoryError::FetchFailed(format!("予約IDの解析に失敗しました: {}", e)))?;

    let tour_id = TourId::from_string(&row.get::<String, _>("tour_id"))
        .map_err(|e| RepositoryError::FetchFailed(format!("ツアーIDの解析に失敗しました: {}", e)))?;

    let user_id = UserId::from_string(&row.get::<String, _>("user_id"))
        .map_err(|e| RepositoryError::FetchFailed(format!("利用者IDの解析に失敗しました: {}", e)))?;

    let status = BookingStatus::from_string(&row.get::<String, _>("status")).map_err(|e| {
        RepositoryError::FetchFailed(format!("予約ステータスの解析に失敗しました: {}", e))
    })?;

    let details = BookingDetails::new(
        row.get::<NaiveDate, _>("tour_date"),
        row.get::<bool, _>("requires_car_rental"),
        row.get::<u32, _>("stay_duration_days"),
    );

    Booking::reconstruct(
        booking_id,
        tour_id,
        user_id,
        row.get::<u32, _>("number_of_people"),
        details,
        status,
        row.get::<DateTime<Utc>, _>("created_at"),
    )
    .map_err(|e| RepositoryError::FetchFailed(format!("予約集約の再構築に失敗しました: {}", e)))
}

/// 予約の行を登録する
async fn insert_booking_row<'e, E>(executor: E, booking: &Booking) -> Result<(), DatabaseError>
where
    E: Executor<'e, Database = MySql>,
{
    let details = booking.details();
    sqlx::query(
        r#"
        INSERT INTO bookings (id, tour_id, user_id, number_of_people, tour_date,
                              requires_car_rental, stay_duration_days, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(booking.id().to_string())
    .bind(booking.tour_id().to_string())
    .bind(booking.user_id().to_string())
    .bind(booking.number_of_people())
    .bind(details.tour_date())
    .bind(details.requires_car_rental())
    .bind(details.stay_duration_days())
    .bind(booking.status().to_string())
    .bind(booking.created_at())
    .execute(executor)
    .await
    .map(|_| ())
    .map_err(|e| DatabaseError::from_query("予約の登録に失敗しました", e))
}

#[async_trait]
impl BookingRepository for MySqlBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<(), RepositoryError> {
        insert_booking_row(&self.pool, booking)
            .await
            .map_err(RepositoryError::from)
    }

    async fn update(
        &self,
        booking: &Booking,
        expected_status: BookingStatus,
    ) -> Result<(), RepositoryError> {
        // 予約は状態遷移以外で変更されないため、ステータスのみを更新する
        // 読み取り時のステータスを条件にして、並行する遷移を上書きしない
        let result = sqlx::query("UPDATE bookings SET status = ? WHERE id = ? AND status = ?")
            .bind(booking.status().to_string())
            .bind(booking.id().to_string())
            .bind(expected_status.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_query("予約の更新に失敗しました", e))
            .map_err(RepositoryError::from)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let current = sqlx::query("SELECT status FROM bookings WHERE id = ?")
            .bind(booking.id().to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_query("予約の存在確認に失敗しました", e))
            .map_err(RepositoryError::from)?;

        match current {
            None => Err(RepositoryError::RecordNotFound(format!(
                "予約が見つかりません: {}",
                booking.id()
            ))),
            Some(row) => Err(RepositoryError::Conflict(format!(
                "予約のステータスが既に変更されています: {} ({})",
                booking.id(),
                row.get::<String, _>("status")
            ))),
        }
    }

    async fn delete(&self, booking_id: BookingId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(booking_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_query("予約の削除に失敗しました", e))
            .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::RecordNotFound(format!(
                "予約が見つかりません: {}",
                booking_id
            )));
        }
        Ok(())
    }

    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        let sql = format!("SELECT {} FROM bookings WHERE id = ?", BOOKING_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(booking_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_query("予約の取得に失敗しました", e))
            .map_err(RepositoryError::from)?;

        row.as_ref().map(booking_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Booking>, RepositoryError> {
        // 作成日時の降順で並べる
        let sql = format!(
            "SELECT {} FROM bookings ORDER BY created_at DESC, id ASC",
            BOOKING_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_query("予約一覧の取得に失敗しました", e))
            .map_err(RepositoryError::from)?;

        rows.iter().map(booking_from_row).collect()
    }

    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Booking>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE user_id = ? ORDER BY created_at DESC, id ASC",
            BOOKING_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_query("利用者の予約一覧の取得に失敗しました", e))
            .map_err(RepositoryError::from)?;

        rows.iter().map(booking_from_row).collect()
    }

    fn next_identity(&self) -> BookingId {
        BookingId::new()
    }
}

#[async_trait]
impl ReservationStore for MySqlBookingRepository {
    async fn commit_reservation(
        &self,
        tour: &Tour,
        booking: &Booking,
    ) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| {
                DatabaseError::ConnectionError(format!("トランザクション開始に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        // ツアーの空き枠を更新
        let affected = update_tour_row(&mut *tx, tour)
            .await
            .map_err(RepositoryError::from)?;
        if affected == 0 && !tour_exists(&mut *tx, tour.id()).await.map_err(RepositoryError::from)? {
            // txはここでドロップされロールバックされる
            return Err(RepositoryError::RecordNotFound(format!(
                "ツアーが見つかりません: {}",
                tour.id()
            )));
        }

        // 予約を登録
        insert_booking_row(&mut *tx, booking)
            .await
            .map_err(RepositoryError::from)?;

        // トランザクションをコミット
        tx.commit()
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!(
                    "トランザクションのコミットに失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)?;

        Ok(())
    }
}
