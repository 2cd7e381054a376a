use crate::application::ApplicationError;
use crate::domain::model::{Tour, TourId};
use crate::domain::port::TourRepository;
use std::sync::Arc;

/// ツアークエリサービス
/// 読み取り専用のツアー操作を提供する
pub struct TourQueryService {
    tour_repository: Arc<dyn TourRepository>,
}

impl TourQueryService {
    /// 新しいツアークエリサービスを作成
    ///
    /// # Arguments
    /// * `tour_repository` - ツアーリポジトリ
    pub fn new(tour_repository: Arc<dyn TourRepository>) -> Self {
        Self { tour_repository }
    }

    /// ツアーIDでツアーを取得
    ///
    /// # Returns
    /// * `Ok(Tour)` - ツアーが見つかった
    /// * `Err(ApplicationError::NotFound)` - ツアーが見つからなかった
    pub async fn get_tour(&self, tour_id: TourId) -> Result<Tour, ApplicationError> {
        self.tour_repository
            .find_by_id(tour_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("ツアーが見つかりません: {}", tour_id)))
    }

    /// すべてのツアーを取得（管理者向け）
    /// ツアー名の昇順で並べて返す
    pub async fn list_tours(&self) -> Result<Vec<Tour>, ApplicationError> {
        self.tour_repository
            .find_all()
            .await
            .map_err(ApplicationError::from)
    }

    /// 予約可能なツアーを取得（利用者向け）
    /// 料金の昇順で並べて返す
    pub async fn list_available_tours(&self) -> Result<Vec<Tour>, ApplicationError> {
        self.tour_repository
            .find_available()
            .await
            .map_err(ApplicationError::from)
    }
}
