// REST API経由の予約フロー統合テスト
// インメモリストアでルーターを組み立て、HTTPリクエストで一連の操作を検証する

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use tour_booking_service::adapter::driven::{InMemoryTourBookingStore, TracingLogger};
use tour_booking_service::adapter::driver::response_dto::{BookingResponse, TourResponse};
use tour_booking_service::adapter::driver::rest_api::{create_router, ApiError, AppState};
use tour_booking_service::application::ApplicationError;
use tour_booking_service::domain::model::{BookingDetails, TourId, UserId};

fn test_app() -> (TestServer, AppState) {
    let store = Arc::new(InMemoryTourBookingStore::new());
    let state = AppState::new(
        store.clone(),
        store.clone(),
        store,
        Arc::new(TracingLogger::new()),
    );
    let server = TestServer::new(create_router().with_state(state.clone())).unwrap();
    (server, state)
}

fn test_server() -> TestServer {
    test_app().0
}

fn user_header(user_id: Uuid) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-user-id"),
        HeaderValue::from_str(&user_id.to_string()).unwrap(),
    )
}

async fn create_tour(server: &TestServer, name: &str, price: i64, max_capacity: i64) -> TourResponse {
    let response = server
        .post("/tours")
        .json(&json!({
            "name": name,
            "description": "テスト用ツアー",
            "location": "北海道",
            "price": price,
            "max_capacity": max_capacity,
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<TourResponse>()
}

async fn book(
    server: &TestServer,
    tour_id: &str,
    user_id: Uuid,
    number_of_people: i64,
) -> axum_test::TestResponse {
    let (name, value) = user_header(user_id);
    server
        .post(&format!("/tours/{}/bookings", tour_id))
        .add_header(name, value)
        .json(&json!({
            "number_of_people": number_of_people,
            "tour_date": "2027-02-11",
            "requires_car_rental": true,
            "stay_duration_days": 2,
        }))
        .await
}

async fn fetch_tour(server: &TestServer, tour_id: &str) -> TourResponse {
    server
        .get(&format!("/tours/{}", tour_id))
        .await
        .json::<TourResponse>()
}

#[tokio::test]
async fn test_health_check() {
    let server = test_server();
    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<serde_json::Value>()["status"], "healthy");
}

#[tokio::test]
async fn test_book_then_sold_out_leaves_slots_unchanged() {
    let server = test_server();
    let tour = create_tour(&server, "流氷クルーズ", 12000, 10).await;
    assert_eq!(tour.available_slots, 10);
    let user_id = Uuid::new_v4();

    let response = book(&server, &tour.tour_id, user_id, 4).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let booking = response.json::<BookingResponse>();
    assert_eq!(booking.status, "PENDING");
    assert_eq!(booking.number_of_people, 4);
    assert_eq!(booking.user_id, user_id.to_string());
    assert_eq!(booking.tour_date, "2027-02-11");
    assert_eq!(fetch_tour(&server, &tour.tour_id).await.available_slots, 6);

    let response = book(&server, &tour.tour_id, user_id, 7).await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<ApiError>().code, "SOLD_OUT");
    assert_eq!(fetch_tour(&server, &tour.tour_id).await.available_slots, 6);

    let bookings = server
        .get("/bookings")
        .await
        .json::<Vec<BookingResponse>>();
    assert_eq!(bookings.len(), 1);
}

#[tokio::test]
async fn test_confirm_and_cancel() {
    let server = test_server();
    let tour = create_tour(&server, "旭山動物園ツアー", 6000, 5).await;
    let booking = book(&server, &tour.tour_id, Uuid::new_v4(), 2)
        .await
        .json::<BookingResponse>();

    let response = server
        .post(&format!("/bookings/{}/confirm", booking.booking_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<BookingResponse>().status, "CONFIRMED");

    // 確定済みの予約は再確定できない
    let response = server
        .post(&format!("/bookings/{}/confirm", booking.booking_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<ApiError>().code, "VALIDATION_ERROR");

    let response = server
        .post(&format!("/bookings/{}/cancel", booking.booking_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<BookingResponse>().status, "CANCELLED");

    let response = server
        .post(&format!("/bookings/{}/cancel", booking.booking_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // キャンセルしても空き枠は戻らない
    assert_eq!(fetch_tour(&server, &tour.tour_id).await.available_slots, 3);

    let fetched = server
        .get(&format!("/bookings/{}", booking.booking_id))
        .await
        .json::<BookingResponse>();
    assert_eq!(fetched.status, "CANCELLED");
}

#[tokio::test]
async fn test_book_requires_valid_user_header() {
    let server = test_server();
    let tour = create_tour(&server, "富良野ラベンダー畑", 5000, 10).await;

    let response = server
        .post(&format!("/tours/{}/bookings", tour.tour_id))
        .json(&json!({ "number_of_people": 1, "tour_date": "2027-07-20" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<ApiError>().code, "VALIDATION_ERROR");

    let response = server
        .post(&format!("/tours/{}/bookings", tour.tour_id))
        .add_header(
            HeaderName::from_static("x-user-id"),
            HeaderValue::from_static("guest"),
        )
        .json(&json!({ "number_of_people": 1, "tour_date": "2027-07-20" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(fetch_tour(&server, &tour.tour_id).await.available_slots, 10);
}

#[tokio::test]
async fn test_book_rejects_invalid_party_size() {
    let server = test_server();
    let tour = create_tour(&server, "知床五湖散策", 4500, 10).await;

    for number_of_people in [0, -1] {
        let response = book(&server, &tour.tour_id, Uuid::new_v4(), number_of_people).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<ApiError>().code, "VALIDATION_ERROR");
    }
    assert_eq!(fetch_tour(&server, &tour.tour_id).await.available_slots, 10);
}

#[tokio::test]
async fn test_not_found_responses() {
    let server = test_server();
    let missing = Uuid::new_v4();

    let response = server.get(&format!("/tours/{}", missing)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<ApiError>().code, "NOT_FOUND");

    let response = book(&server, &missing.to_string(), Uuid::new_v4(), 1).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server.post(&format!("/bookings/{}/confirm", missing)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server.get("/tours/not-a-uuid").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_available_tours_sorted_by_price() {
    let server = test_server();
    let expensive = create_tour(&server, "函館夜景ツアー", 9000, 4).await;
    let cheap = create_tour(&server, "小樽運河散策", 3000, 2).await;
    let full = create_tour(&server, "美瑛の丘サイクリング", 1000, 2).await;

    let response = book(&server, &full.tour_id, Uuid::new_v4(), 2).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let available = server
        .get("/tours/available")
        .await
        .json::<Vec<TourResponse>>();
    let ids: Vec<&str> = available.iter().map(|t| t.tour_id.as_str()).collect();
    assert_eq!(ids, vec![cheap.tour_id.as_str(), expensive.tour_id.as_str()]);

    let all = server.get("/tours").await.json::<Vec<TourResponse>>();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_list_bookings_for_user() {
    let server = test_server();
    let tour = create_tour(&server, "支笏湖カヌー", 8000, 10).await;
    let me = Uuid::new_v4();

    book(&server, &tour.tour_id, me, 1).await;
    book(&server, &tour.tour_id, me, 2).await;
    book(&server, &tour.tour_id, Uuid::new_v4(), 3).await;

    let mine = server
        .get(&format!("/bookings?user_id={}", me))
        .await
        .json::<Vec<BookingResponse>>();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|b| b.user_id == me.to_string()));

    let response = server.get("/bookings?user_id=someone").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_and_delete_tour() {
    let server = test_server();
    let tour = create_tour(&server, "洞爺湖温泉ツアー", 20000, 10).await;
    book(&server, &tour.tour_id, Uuid::new_v4(), 4).await;

    let response = server
        .put(&format!("/tours/{}", tour.tour_id))
        .json(&json!({
            "name": "洞爺湖温泉ツアー（拡大版）",
            "price": 22000,
            "max_capacity": 12,
            "is_featured": true,
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated = response.json::<TourResponse>();
    assert_eq!(updated.max_capacity, 12);
    assert_eq!(updated.available_slots, 8);
    assert!(updated.is_featured);

    // 予約済みの枠数を下回る定員には変更できない
    let response = server
        .put(&format!("/tours/{}", tour.tour_id))
        .json(&json!({ "name": "洞爺湖温泉ツアー", "price": 22000, "max_capacity": 3 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server.delete(&format!("/tours/{}", tour.tour_id)).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = server.get(&format!("/tours/{}", tour.tour_id)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // 既存の予約は削除後も参照できる
    let bookings = server.get("/bookings").await.json::<Vec<BookingResponse>>();
    assert_eq!(bookings.len(), 1);
}

#[tokio::test]
async fn test_create_tour_rejects_invalid_input() {
    let server = test_server();

    let response = server
        .post("/tours")
        .json(&json!({ "name": "  ", "price": 1000, "max_capacity": 5 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/tours")
        .json(&json!({ "name": "定員なし", "price": 1000, "max_capacity": 0 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/tours")
        .json(&json!({ "name": "価格なし" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<ApiError>().code, "VALIDATION_ERROR");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_never_oversell() {
    let (server, state) = test_app();
    let tour = create_tour(&server, "ニセコ スキーレッスン", 18000, 10).await;
    let tour_id = TourId::from_string(&tour.tour_id).unwrap();
    let details = BookingDetails::new(
        chrono::NaiveDate::from_ymd_opt(2027, 1, 15).unwrap(),
        false,
        3,
    );

    let mut handles = Vec::new();
    for _ in 0..30 {
        let booking_service = state.booking_service.clone();
        handles.push(tokio::spawn(async move {
            booking_service
                .book(tour_id, UserId::new(), 1, details)
                .await
        }));
    }

    let mut succeeded = 0;
    let mut sold_out = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(ApplicationError::SoldOut { .. }) => sold_out += 1,
            Err(err) => panic!("unexpected error: {}", err),
        }
    }
    assert_eq!(succeeded, 10);
    assert_eq!(sold_out, 20);

    assert_eq!(fetch_tour(&server, &tour.tour_id).await.available_slots, 0);
    let bookings = server.get("/bookings").await.json::<Vec<BookingResponse>>();
    assert_eq!(bookings.len(), 10);

    let available = server
        .get("/tours/available")
        .await
        .json::<Vec<TourResponse>>();
    assert!(available.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mixed_party_sizes_with_tour_deletion() {
    let (server, state) = test_app();
    let tour = create_tour(&server, "大雪山縦走", 25000, 15).await;
    let tour_id = TourId::from_string(&tour.tour_id).unwrap();
    let details = BookingDetails::new(
        chrono::NaiveDate::from_ymd_opt(2027, 8, 1).unwrap(),
        true,
        4,
    );

    let mut handles = Vec::new();
    for i in 0..24u32 {
        let booking_service = state.booking_service.clone();
        handles.push(tokio::spawn(async move {
            booking_service
                .book(tour_id, UserId::new(), i % 4 + 1, details)
                .await
        }));
    }
    let tour_service = state.tour_service.clone();
    let deletion = tokio::spawn(async move { tour_service.delete_tour(tour_id).await });

    let mut booked = 0u32;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(booking) => booked += booking.number_of_people(),
            Err(ApplicationError::SoldOut { .. }) | Err(ApplicationError::NotFound(_)) => {}
            Err(err) => panic!("unexpected error: {}", err),
        }
    }
    deletion.await.unwrap().unwrap();
    assert!(booked <= 15);

    // 削除後もツアーは参照できず、成立した予約だけが残る
    let response = server.get(&format!("/tours/{}", tour.tour_id)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let bookings = server.get("/bookings").await.json::<Vec<BookingResponse>>();
    let persisted: u32 = bookings.iter().map(|b| b.number_of_people).sum();
    assert_eq!(persisted, booked);
}
