use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::adapter::driver::request_dto::{BookTourRequest, BookingsQueryParams, TourRequest};
use crate::adapter::driver::response_dto::{BookingResponse, TourResponse};
use crate::application::service::{
    new_slot_lock, BookingApplicationService, BookingQueryService, TourApplicationService,
    TourQueryService,
};
use crate::application::ApplicationError;
use crate::domain::model::{BookingId, TourId, UserId};
use crate::domain::port::{BookingRepository, Logger, ReservationStore, TourRepository};

/// 予約する利用者を識別するリクエストヘッダー
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

// アプリケーションサービスを含む状態
#[derive(Clone)]
pub struct AppState {
    pub booking_service: Arc<BookingApplicationService>,
    pub tour_service: Arc<TourApplicationService>,
    pub tour_query_service: Arc<TourQueryService>,
    pub booking_query_service: Arc<BookingQueryService>,
}

impl AppState {
    /// リポジトリからアプリケーションサービス一式を組み立てる
    /// 予約サービスとツアーサービスは同じ空き枠ロックを共有する
    pub fn new(
        tour_repository: Arc<dyn TourRepository>,
        booking_repository: Arc<dyn BookingRepository>,
        reservation_store: Arc<dyn ReservationStore>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let slot_lock = new_slot_lock();

        Self {
            booking_service: Arc::new(BookingApplicationService::new(
                tour_repository.clone(),
                booking_repository.clone(),
                reservation_store,
                logger.clone(),
                slot_lock.clone(),
            )),
            tour_service: Arc::new(TourApplicationService::new(
                tour_repository.clone(),
                logger,
                slot_lock,
            )),
            tour_query_service: Arc::new(TourQueryService::new(tour_repository)),
            booking_query_service: Arc::new(BookingQueryService::new(booking_repository)),
        }
    }
}

// REST APIルーターを作成
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/tours", get(list_tours).post(create_tour))
        .route("/tours/available", get(list_available_tours))
        .route(
            "/tours/:tour_id",
            get(get_tour).put(update_tour).delete(delete_tour),
        )
        .route("/tours/:tour_id/bookings", post(book_tour))
        .route("/bookings", get(list_bookings))
        .route("/bookings/:booking_id", get(get_booking))
        .route("/bookings/:booking_id/confirm", post(confirm_booking))
        .route("/bookings/:booking_id/cancel", post(cancel_booking))
}

// ヘルスチェックエンドポイント
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "tour-booking-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ツアー一覧取得エンドポイント（管理者向け）
async fn list_tours(State(state): State<AppState>) -> ApiResult<Json<Vec<TourResponse>>> {
    let tours = state
        .tour_query_service
        .list_tours()
        .await
        .map_err(map_application_error)?;

    Ok(Json(tours.iter().map(TourResponse::from_domain).collect()))
}

// 予約可能なツアー一覧取得エンドポイント（利用者向け）
async fn list_available_tours(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<TourResponse>>> {
    let tours = state
        .tour_query_service
        .list_available_tours()
        .await
        .map_err(map_application_error)?;

    Ok(Json(tours.iter().map(TourResponse::from_domain).collect()))
}

// ツアー詳細取得エンドポイント
async fn get_tour(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<TourResponse>> {
    let tour_id = tour_id_from_path(path)?;

    let tour = state
        .tour_query_service
        .get_tour(tour_id)
        .await
        .map_err(map_application_error)?;
    Ok(Json(TourResponse::from_domain(&tour)))
}

// ツアー登録エンドポイント
async fn create_tour(
    State(state): State<AppState>,
    body: Result<Json<TourRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TourResponse>)> {
    let Json(request) = body.map_err(|rejection| invalid_request(rejection.body_text()))?;
    let (profile, max_capacity) = request
        .into_domain()
        .map_err(|err| map_application_error(err.into()))?;

    let tour = state
        .tour_service
        .create_tour(profile, max_capacity)
        .await
        .map_err(map_application_error)?;
    Ok((StatusCode::CREATED, Json(TourResponse::from_domain(&tour))))
}

// ツアー編集エンドポイント
async fn update_tour(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<TourRequest>, JsonRejection>,
) -> ApiResult<Json<TourResponse>> {
    let tour_id = tour_id_from_path(path)?;
    let Json(request) = body.map_err(|rejection| invalid_request(rejection.body_text()))?;
    let (profile, max_capacity) = request
        .into_domain()
        .map_err(|err| map_application_error(err.into()))?;

    let tour = state
        .tour_service
        .update_tour(tour_id, profile, max_capacity)
        .await
        .map_err(map_application_error)?;
    Ok(Json(TourResponse::from_domain(&tour)))
}

// ツアー削除エンドポイント
async fn delete_tour(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let tour_id = tour_id_from_path(path)?;

    state
        .tour_service
        .delete_tour(tour_id)
        .await
        .map_err(map_application_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ツアー予約エンドポイント
async fn book_tour(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<BookTourRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BookingResponse>)> {
    let tour_id = tour_id_from_path(path)?;
    let user_id = user_id_from_headers(&headers)?;
    let Json(request) = body.map_err(|rejection| invalid_request(rejection.body_text()))?;
    let number_of_people = request
        .number_of_people()
        .map_err(|err| map_application_error(err.into()))?;

    let booking = state
        .booking_service
        .book(tour_id, user_id, number_of_people, request.details())
        .await
        .map_err(map_application_error)?;
    Ok((StatusCode::CREATED, Json(BookingResponse::from_domain(&booking))))
}

// 予約一覧取得エンドポイント
// user_idを指定した場合はその利用者の予約だけを返す
async fn list_bookings(
    State(state): State<AppState>,
    query: Result<Query<BookingsQueryParams>, QueryRejection>,
) -> ApiResult<Json<Vec<BookingResponse>>> {
    let Query(params) = query.map_err(|_| invalid_request("無効なクエリパラメータです"))?;

    let bookings = match params.user_id {
        Some(user_id) => {
            state
                .booking_query_service
                .list_bookings_for_user(UserId::from_uuid(user_id))
                .await
        }
        None => state.booking_query_service.list_bookings().await,
    }
    .map_err(map_application_error)?;

    Ok(Json(bookings.iter().map(BookingResponse::from_domain).collect()))
}

// 予約詳細取得エンドポイント
async fn get_booking(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<BookingResponse>> {
    let booking_id = booking_id_from_path(path)?;

    let booking = state
        .booking_query_service
        .get_booking(booking_id)
        .await
        .map_err(map_application_error)?;
    Ok(Json(BookingResponse::from_domain(&booking)))
}

// 予約確定エンドポイント
async fn confirm_booking(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<BookingResponse>> {
    let booking_id = booking_id_from_path(path)?;

    let booking = state
        .booking_service
        .confirm(booking_id)
        .await
        .map_err(map_application_error)?;
    Ok(Json(BookingResponse::from_domain(&booking)))
}

// 予約キャンセルエンドポイント
async fn cancel_booking(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<BookingResponse>> {
    let booking_id = booking_id_from_path(path)?;

    let booking = state
        .booking_service
        .cancel(booking_id)
        .await
        .map_err(map_application_error)?;
    Ok(Json(BookingResponse::from_domain(&booking)))
}

fn tour_id_from_path(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<TourId> {
    let Path(id) = path.map_err(|_| invalid_request("無効なツアーID形式です"))?;
    Ok(TourId::from_uuid(id))
}

fn booking_id_from_path(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<BookingId> {
    let Path(id) = path.map_err(|_| invalid_request("無効な予約ID形式です"))?;
    Ok(BookingId::from_uuid(id))
}

// X-User-Idヘッダーから利用者IDを取得
fn user_id_from_headers(headers: &HeaderMap) -> ApiResult<UserId> {
    let value = headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| invalid_request("X-User-Idヘッダーが必要です"))?;

    value
        .to_str()
        .ok()
        .and_then(|raw| UserId::from_string(raw.trim()).ok())
        .ok_or_else(|| invalid_request("X-User-Idヘッダーの形式が不正です"))
}

fn invalid_request(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    map_application_error(ApplicationError::Validation(message.into()))
}

// アプリケーションエラーをHTTPエラーにマッピング
fn map_application_error(err: ApplicationError) -> (StatusCode, Json<ApiError>) {
    let (status, code) = match &err {
        ApplicationError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ApplicationError::SoldOut { .. } => (StatusCode::CONFLICT, "SOLD_OUT"),
        ApplicationError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ApplicationError::Repository(repo_err) => {
            tracing::error!(error = %repo_err, "リポジトリ操作に失敗しました");
            (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR")
        }
    };

    let error = match err {
        ApplicationError::NotFound(msg) | ApplicationError::Validation(msg) => msg,
        other => other.to_string(),
    };

    (
        status,
        Json(ApiError {
            error,
            code: code.to_string(),
        }),
    )
}
