use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{Money, Tour, TourId, TourProfile};
use crate::domain::port::{RepositoryError, TourRepository};
use async_trait::async_trait;

// MySQL関連のインポート
use sqlx::mysql::MySqlRow;
use sqlx::{Executor, MySql, Pool, Row};

const TOUR_COLUMNS: &str = "id, name, description, location, price_amount, price_currency, \
     max_capacity, available_slots, image_url, is_featured";

/// MySQLツアーリポジトリ
/// MySQLデータベースを使用してツアーを永続化する
#[derive(Clone)]
pub struct MySqlTourRepository {
    pool: Pool<MySql>,
}

impl MySqlTourRepository {
    /// 新しいMySQLツアーリポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    async fn fetch_tours(&self, sql: &str, context: &str) -> Result<Vec<Tour>, RepositoryError> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_query(context, e))
            .map_err(RepositoryError::from)?;

        rows.iter().map(tour_from_row).collect()
    }
}

/// データベースの行からツアーを再構築する
pub(super) fn tour_from_row(row: &MySqlRow) -> Result<Tour, RepositoryError> {
    let tour_id = TourId::from_string(&row.get::<String, _>("id"))
        .map_err(|e| RepositoryError::FetchFailed(format!("ツアーIDの解析に失敗しました: {}", e)))?;

    let price = Money::new(row.get("price_amount"), row.get("price_currency"))
        .map_err(|e| RepositoryError::FetchFailed(format!("料金の構築に失敗しました: {}", e)))?;

    let profile = TourProfile::new(
        row.get("name"),
        row.get("description"),
        row.get("location"),
        price,
        row.get::<Option<String>, _>("image_url"),
        row.get::<bool, _>("is_featured"),
    )
    .map_err(|e| RepositoryError::FetchFailed(format!("ツアー情報の構築に失敗しました: {}", e)))?;

    Tour::reconstruct(
        tour_id,
        profile,
        row.get::<u32, _>("max_capacity"),
        row.get::<u32, _>("available_slots"),
    )
    .map_err(|e| RepositoryError::FetchFailed(format!("ツアー集約の再構築に失敗しました: {}", e)))
}

/// ツアーの行を更新し、影響を受けた行数を返す
pub(super) async fn update_tour_row<'e, E>(executor: E, tour: &Tour) -> Result<u64, DatabaseError>
where
    E: Executor<'e, Database = MySql>,
{
    let profile = tour.profile();
    sqlx::query(
        r#"
        UPDATE tours SET
            name = ?,
            description = ?,
            location = ?,
            price_amount = ?,
            price_currency = ?,
            max_capacity = ?,
            available_slots = ?,
            image_url = ?,
            is_featured = ?
        WHERE id = ?
        "#,
    )
    .bind(profile.name().to_string())
    .bind(profile.description().to_string())
    .bind(profile.location().to_string())
    .bind(profile.price().amount())
    .bind(profile.price().currency())
    .bind(tour.max_capacity())
    .bind(tour.available_slots())
    .bind(profile.image_url().map(str::to_string))
    .bind(profile.is_featured())
    .bind(tour.id().to_string())
    .execute(executor)
    .await
    .map(|result| result.rows_affected())
    .map_err(|e| DatabaseError::from_query("ツアーの更新に失敗しました", e))
}

/// ツアーの行が存在するか確認する
/// 値が変わらないUPDATEは影響行数0を返すため、存在確認を別に行う
pub(super) async fn tour_exists<'e, E>(executor: E, tour_id: TourId) -> Result<bool, DatabaseError>
where
    E: Executor<'e, Database = MySql>,
{
    sqlx::query("SELECT 1 FROM tours WHERE id = ?")
        .bind(tour_id.to_string())
        .fetch_optional(executor)
        .await
        .map(|row| row.is_some())
        .map_err(|e| DatabaseError::from_query("ツアーの存在確認に失敗しました", e))
}

#[async_trait]
impl TourRepository for MySqlTourRepository {
    async fn insert(&self, tour: &Tour) -> Result<(), RepositoryError> {
        let profile = tour.profile();
        sqlx::query(
            r#"
            INSERT INTO tours (id, name, description, location, price_amount, price_currency,
                               max_capacity, available_slots, image_url, is_featured)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(tour.id().to_string())
        .bind(profile.name())
        .bind(profile.description())
        .bind(profile.location())
        .bind(profile.price().amount())
        .bind(profile.price().currency())
        .bind(tour.max_capacity())
        .bind(tour.available_slots())
        .bind(profile.image_url())
        .bind(profile.is_featured())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_query("ツアーの登録に失敗しました", e))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn update(&self, tour: &Tour) -> Result<(), RepositoryError> {
        let affected = update_tour_row(&self.pool, tour)
            .await
            .map_err(RepositoryError::from)?;

        if affected == 0 && !tour_exists(&self.pool, tour.id()).await.map_err(RepositoryError::from)? {
            return Err(RepositoryError::RecordNotFound(format!(
                "ツアーが見つかりません: {}",
                tour.id()
            )));
        }
        Ok(())
    }

    async fn delete(&self, tour_id: TourId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tours WHERE id = ?")
            .bind(tour_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_query("ツアーの削除に失敗しました", e))
            .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::RecordNotFound(format!(
                "ツアーが見つかりません: {}",
                tour_id
            )));
        }
        Ok(())
    }

    async fn find_by_id(&self, tour_id: TourId) -> Result<Option<Tour>, RepositoryError> {
        let sql = format!("SELECT {} FROM tours WHERE id = ?", TOUR_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(tour_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_query("ツアーの取得に失敗しました", e))
            .map_err(RepositoryError::from)?;

        row.as_ref().map(tour_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Tour>, RepositoryError> {
        // ツアー名の昇順で並べる
        // 照合順序をバイナリにしてインメモリストアと同じ順序にする
        let sql = format!(
            "SELECT {} FROM tours ORDER BY name COLLATE utf8mb4_bin ASC, id ASC",
            TOUR_COLUMNS
        );
        self.fetch_tours(&sql, "ツアー一覧の取得に失敗しました").await
    }

    async fn find_available(&self) -> Result<Vec<Tour>, RepositoryError> {
        // 空き枠のあるツアーを料金の昇順で並べる
        let sql = format!(
            "SELECT {} FROM tours WHERE available_slots > 0 \
             ORDER BY price_amount ASC, name COLLATE utf8mb4_bin ASC, id ASC",
            TOUR_COLUMNS
        );
        self.fetch_tours(&sql, "予約可能なツアー一覧の取得に失敗しました").await
    }

    fn next_identity(&self) -> TourId {
        TourId::new()
    }
}
