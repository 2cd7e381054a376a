use crate::domain::model::{Booking, BookingId, BookingStatus, Tour, TourId, UserId};
use crate::domain::port::{BookingRepository, RepositoryError, ReservationStore, TourRepository};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct StoreState {
    tours: HashMap<TourId, Tour>,
    bookings: HashMap<BookingId, Booking>,
}

/// インメモリのツアー・予約ストア
/// 2つのテーブルを1つのRwLockで保護し、予約確定のコミットを単一の書き込みとして扱う
/// テストと単一プロセスでの起動（STORAGE_BACKEND=memory）で使用する
#[derive(Default)]
pub struct InMemoryTourBookingStore {
    state: RwLock<StoreState>,
}

impl InMemoryTourBookingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_tours_by_name(tours: &mut [Tour]) {
    tours.sort_by(|a, b| {
        a.profile()
            .name()
            .cmp(b.profile().name())
            .then_with(|| a.id().cmp(&b.id()))
    });
}

fn sort_tours_by_price(tours: &mut [Tour]) {
    tours.sort_by(|a, b| {
        a.profile()
            .price()
            .amount()
            .cmp(&b.profile().price().amount())
            .then_with(|| a.profile().name().cmp(b.profile().name()))
            .then_with(|| a.id().cmp(&b.id()))
    });
}

fn sort_bookings_newest_first(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| a.id().cmp(&b.id()))
    });
}

#[async_trait]
impl TourRepository for InMemoryTourBookingStore {
    async fn insert(&self, tour: &Tour) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if state.tours.contains_key(&tour.id()) {
            return Err(RepositoryError::DuplicateKey(format!(
                "ツアーは既に存在します: {}",
                tour.id()
            )));
        }
        state.tours.insert(tour.id(), tour.clone());
        Ok(())
    }

    async fn update(&self, tour: &Tour) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        match state.tours.get_mut(&tour.id()) {
            Some(stored) => {
                *stored = tour.clone();
                Ok(())
            }
            None => Err(RepositoryError::RecordNotFound(format!(
                "ツアーが見つかりません: {}",
                tour.id()
            ))),
        }
    }

    async fn delete(&self, tour_id: TourId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state
            .tours
            .remove(&tour_id)
            .map(|_| ())
            .ok_or_else(|| {
                RepositoryError::RecordNotFound(format!("ツアーが見つかりません: {}", tour_id))
            })
    }

    async fn find_by_id(&self, tour_id: TourId) -> Result<Option<Tour>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.tours.get(&tour_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Tour>, RepositoryError> {
        let state = self.state.read().await;
        let mut tours: Vec<Tour> = state.tours.values().cloned().collect();
        sort_tours_by_name(&mut tours);
        Ok(tours)
    }

    async fn find_available(&self) -> Result<Vec<Tour>, RepositoryError> {
        let state = self.state.read().await;
        let mut tours: Vec<Tour> = state
            .tours
            .values()
            .filter(|tour| tour.available_slots() > 0)
            .cloned()
            .collect();
        sort_tours_by_price(&mut tours);
        Ok(tours)
    }

    fn next_identity(&self) -> TourId {
        TourId::new()
    }
}

#[async_trait]
impl BookingRepository for InMemoryTourBookingStore {
    async fn insert(&self, booking: &Booking) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if state.bookings.contains_key(&booking.id()) {
            return Err(RepositoryError::DuplicateKey(format!(
                "予約は既に存在します: {}",
                booking.id()
            )));
        }
        state.bookings.insert(booking.id(), booking.clone());
        Ok(())
    }

    async fn update(
        &self,
        booking: &Booking,
        expected_status: BookingStatus,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        let stored = state.bookings.get_mut(&booking.id()).ok_or_else(|| {
            RepositoryError::RecordNotFound(format!("予約が見つかりません: {}", booking.id()))
        })?;

        if stored.status() != expected_status {
            return Err(RepositoryError::Conflict(format!(
                "予約のステータスが既に変更されています: {} ({})",
                booking.id(),
                stored.status()
            )));
        }
        *stored = booking.clone();
        Ok(())
    }

    async fn delete(&self, booking_id: BookingId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state
            .bookings
            .remove(&booking_id)
            .map(|_| ())
            .ok_or_else(|| {
                RepositoryError::RecordNotFound(format!("予約が見つかりません: {}", booking_id))
            })
    }

    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.bookings.get(&booking_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Booking>, RepositoryError> {
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state.bookings.values().cloned().collect();
        sort_bookings_newest_first(&mut bookings);
        Ok(bookings)
    }

    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Booking>, RepositoryError> {
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|booking| booking.user_id() == user_id)
            .cloned()
            .collect();
        sort_bookings_newest_first(&mut bookings);
        Ok(bookings)
    }

    fn next_identity(&self) -> BookingId {
        BookingId::new()
    }
}

#[async_trait]
impl ReservationStore for InMemoryTourBookingStore {
    async fn commit_reservation(
        &self,
        tour: &Tour,
        booking: &Booking,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;

        // 書き込み前にすべて検証し、途中で失敗しても片方だけ反映されないようにする
        if !state.tours.contains_key(&tour.id()) {
            return Err(RepositoryError::RecordNotFound(format!(
                "ツアーが見つかりません: {}",
                tour.id()
            )));
        }
        if state.bookings.contains_key(&booking.id()) {
            return Err(RepositoryError::DuplicateKey(format!(
                "予約は既に存在します: {}",
                booking.id()
            )));
        }

        state.tours.insert(tour.id(), tour.clone());
        state.bookings.insert(booking.id(), booking.clone());
        Ok(())
    }
}
