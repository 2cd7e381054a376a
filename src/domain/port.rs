// 出力ポート
// ドメイン層が外部に依存する機能をトレイトとして定義
// アダプター層でこれらのトレイトを実装する

use crate::domain::model::{Booking, BookingId, BookingStatus, Tour, TourId, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// ロガートレイト
/// ログ出力を抽象化するポート
pub trait Logger: Send + Sync {
    /// 指定レベルでログを出力
    fn log(
        &self,
        level: LogLevel,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// デバッグレベルのログを出力
    fn debug(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    ) {
        self.log(LogLevel::Debug, component, message, correlation_id, context);
    }

    /// 情報レベルのログを出力
    fn info(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    ) {
        self.log(LogLevel::Info, component, message, correlation_id, context);
    }

    /// 警告レベルのログを出力
    fn warn(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    ) {
        self.log(LogLevel::Warning, component, message, correlation_id, context);
    }

    /// エラーレベルのログを出力
    fn error(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    ) {
        self.log(LogLevel::Error, component, message, correlation_id, context);
    }
}

/// リポジトリエラー型
/// リポジトリ操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    /// データベース接続に失敗
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// 操作に失敗
    #[error("Operation failed: {0}")]
    OperationFailed(String),
    /// データの取得に失敗
    #[error("Fetch failed: {0}")]
    FetchFailed(String),
    /// 更新・削除対象のレコードが存在しない
    #[error("Record not found: {0}")]
    RecordNotFound(String),
    /// 同じキーのレコードが既に存在する
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    /// 読み取り後にレコードが他の操作で変更されていた
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// ツアーリポジトリトレイト
/// ツアー集約の永続化を抽象化する
#[async_trait]
pub trait TourRepository: Send + Sync {
    /// ツアーを新規登録する
    ///
    /// # Returns
    /// * `Ok(())` - 登録成功
    /// * `Err(RepositoryError::DuplicateKey)` - 同じIDのツアーが存在する
    async fn insert(&self, tour: &Tour) -> Result<(), RepositoryError>;

    /// 既存のツアーを更新する
    ///
    /// # Returns
    /// * `Ok(())` - 更新成功
    /// * `Err(RepositoryError::RecordNotFound)` - ツアーが存在しない
    async fn update(&self, tour: &Tour) -> Result<(), RepositoryError>;

    /// ツアーを削除する
    ///
    /// # Returns
    /// * `Ok(())` - 削除成功
    /// * `Err(RepositoryError::RecordNotFound)` - ツアーが存在しない
    async fn delete(&self, tour_id: TourId) -> Result<(), RepositoryError>;

    /// ツアーIDでツアーを検索する
    ///
    /// # Returns
    /// * `Ok(Some(Tour))` - ツアーが見つかった
    /// * `Ok(None)` - ツアーが見つからなかった
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_id(&self, tour_id: TourId) -> Result<Option<Tour>, RepositoryError>;

    /// すべてのツアーを取得する
    /// ツアー名の昇順（同名はID順）で並べて返す
    async fn find_all(&self) -> Result<Vec<Tour>, RepositoryError>;

    /// 空き枠が1以上のツアーを取得する
    /// 料金の昇順（同額はツアー名、ID順）で並べて返す
    async fn find_available(&self) -> Result<Vec<Tour>, RepositoryError>;

    /// 新しい一意のツアーIDを生成する
    fn next_identity(&self) -> TourId;
}

/// 予約リポジトリトレイト
/// 予約集約の永続化を抽象化する
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// 予約を新規登録する
    async fn insert(&self, booking: &Booking) -> Result<(), RepositoryError>;

    /// 既存の予約のステータスを更新する
    /// 保存されているステータスが `expected_status` のときだけ書き込む
    ///
    /// # Returns
    /// * `Ok(())` - 更新成功
    /// * `Err(RepositoryError::RecordNotFound)` - 予約が存在しない
    /// * `Err(RepositoryError::Conflict)` - ステータスが既に変わっていた
    async fn update(
        &self,
        booking: &Booking,
        expected_status: BookingStatus,
    ) -> Result<(), RepositoryError>;

    /// 予約を削除する
    async fn delete(&self, booking_id: BookingId) -> Result<(), RepositoryError>;

    /// 予約IDで予約を検索する
    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError>;

    /// すべての予約を取得する
    /// 作成日時の降順（同時刻はID順）で並べて返す
    async fn find_all(&self) -> Result<Vec<Booking>, RepositoryError>;

    /// 指定された利用者の予約を取得する
    /// 作成日時の降順（同時刻はID順）で並べて返す
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Booking>, RepositoryError>;

    /// 新しい一意の予約IDを生成する
    fn next_identity(&self) -> BookingId;
}

/// 予約確定ストアトレイト
/// ツアーの空き枠更新と予約の登録を1回のコミットで永続化する
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// 更新後のツアーと新しい予約をまとめて保存する
    /// どちらか一方だけが反映された状態は外部から観測されない
    ///
    /// # Returns
    /// * `Ok(())` - 両方の保存に成功
    /// * `Err(RepositoryError::RecordNotFound)` - ツアーが存在しない（何も書き込まない）
    /// * `Err(RepositoryError)` - 保存失敗（何も書き込まない）
    async fn commit_reservation(&self, tour: &Tour, booking: &Booking)
        -> Result<(), RepositoryError>;
}
