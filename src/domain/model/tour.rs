use crate::domain::error::DomainError;
use crate::domain::model::{TourId, TourProfile};

/// ツアー集約
/// ツアーの説明情報と定員・空き枠数を管理する
///
/// 不変条件: `0 <= available_slots <= max_capacity` かつ `max_capacity >= 1`
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    id: TourId,
    profile: TourProfile,
    max_capacity: u32,
    available_slots: u32,
}

impl Tour {
    /// 新しいツアーを作成
    /// 空き枠数は定員と同じ値から始まる
    ///
    /// # Arguments
    /// * `id` - ツアーID
    /// * `profile` - ツアーの説明情報
    /// * `max_capacity` - 定員（1以上）
    pub fn new(id: TourId, profile: TourProfile, max_capacity: u32) -> Result<Self, DomainError> {
        Self::reconstruct(id, profile, max_capacity, max_capacity)
    }

    /// データベースから取得したデータでツアーを再構築
    /// リポジトリでの使用を想定
    pub fn reconstruct(
        id: TourId,
        profile: TourProfile,
        max_capacity: u32,
        available_slots: u32,
    ) -> Result<Self, DomainError> {
        if max_capacity == 0 {
            return Err(DomainError::InvalidCapacity(
                "定員は1以上である必要があります".to_string(),
            ));
        }
        if available_slots > max_capacity {
            return Err(DomainError::InvalidCapacity(format!(
                "空き枠数({})が定員({})を超えています",
                available_slots, max_capacity
            )));
        }
        Ok(Self {
            id,
            profile,
            max_capacity,
            available_slots,
        })
    }

    /// ツアーIDを取得
    pub fn id(&self) -> TourId {
        self.id
    }

    /// ツアーの説明情報を取得
    pub fn profile(&self) -> &TourProfile {
        &self.profile
    }

    /// 定員を取得
    pub fn max_capacity(&self) -> u32 {
        self.max_capacity
    }

    /// 空き枠数を取得
    pub fn available_slots(&self) -> u32 {
        self.available_slots
    }

    /// 予約済みの枠数を取得
    pub fn booked_slots(&self) -> u32 {
        self.max_capacity - self.available_slots
    }

    /// 指定された人数分の空き枠があるかチェック
    pub fn has_available_slots(&self, number_of_people: u32) -> bool {
        self.available_slots >= number_of_people
    }

    /// 空き枠を予約する
    ///
    /// # Returns
    /// * `Ok(())` - 予約成功
    /// * `Err(DomainError::InvalidNumberOfPeople)` - 人数が0
    /// * `Err(DomainError::SoldOut)` - 空き枠不足（空き枠数は変わらない）
    pub fn reserve_slots(&mut self, number_of_people: u32) -> Result<(), DomainError> {
        if number_of_people == 0 {
            return Err(DomainError::InvalidNumberOfPeople);
        }
        if !self.has_available_slots(number_of_people) {
            return Err(DomainError::SoldOut {
                requested: number_of_people,
                available: self.available_slots,
            });
        }
        self.available_slots -= number_of_people;
        Ok(())
    }

    /// 説明情報を差し替える
    pub fn update_profile(&mut self, profile: TourProfile) {
        self.profile = profile;
    }

    /// 定員を変更する
    /// 予約済みの枠数は維持したまま、差分だけ空き枠数を増減させる
    pub fn resize(&mut self, new_max_capacity: u32) -> Result<(), DomainError> {
        if new_max_capacity == 0 {
            return Err(DomainError::InvalidCapacity(
                "定員は1以上である必要があります".to_string(),
            ));
        }
        let booked = self.booked_slots();
        if new_max_capacity < booked {
            return Err(DomainError::InvalidCapacity(format!(
                "定員({})が予約済みの枠数({})を下回っています",
                new_max_capacity, booked
            )));
        }
        self.max_capacity = new_max_capacity;
        self.available_slots = new_max_capacity - booked;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Money;

    fn profile() -> TourProfile {
        TourProfile::new(
            "嵐山ウォーキングツアー".to_string(),
            "竹林と渡月橋を巡る半日ツアー".to_string(),
            "京都".to_string(),
            Money::jpy(8000).unwrap(),
            None,
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_tour_creation_starts_fully_available() {
        let tour = Tour::new(TourId::new(), profile(), 10).unwrap();
        assert_eq!(tour.max_capacity(), 10);
        assert_eq!(tour.available_slots(), 10);
        assert_eq!(tour.booked_slots(), 0);
    }

    #[test]
    fn test_tour_creation_zero_capacity() {
        let result = Tour::new(TourId::new(), profile(), 0);
        assert!(matches!(result, Err(DomainError::InvalidCapacity(_))));
    }

    #[test]
    fn test_reconstruct_rejects_slots_above_capacity() {
        let result = Tour::reconstruct(TourId::new(), profile(), 5, 6);
        assert!(result.is_err());
    }

    #[test]
    fn test_reserve_success() {
        let mut tour = Tour::new(TourId::new(), profile(), 10).unwrap();
        tour.reserve_slots(4).unwrap();
        assert_eq!(tour.available_slots(), 6);
    }

    #[test]
    fn test_reserve_sold_out() {
        let mut tour = Tour::reconstruct(TourId::new(), profile(), 10, 6).unwrap();
        let result = tour.reserve_slots(7);
        assert_eq!(
            result.unwrap_err(),
            DomainError::SoldOut {
                requested: 7,
                available: 6
            }
        );
        assert_eq!(tour.available_slots(), 6); // 空き枠数は変わらない
    }

    #[test]
    fn test_reserve_exact_remaining() {
        let mut tour = Tour::new(TourId::new(), profile(), 3).unwrap();
        tour.reserve_slots(3).unwrap();
        assert_eq!(tour.available_slots(), 0);
        assert!(!tour.has_available_slots(1));
    }

    #[test]
    fn test_reserve_zero_people() {
        let mut tour = Tour::new(TourId::new(), profile(), 3).unwrap();
        assert_eq!(
            tour.reserve_slots(0).unwrap_err(),
            DomainError::InvalidNumberOfPeople
        );
    }

    #[test]
    fn test_resize_keeps_booked_slots() {
        let mut tour = Tour::reconstruct(TourId::new(), profile(), 10, 6).unwrap();
        tour.resize(20).unwrap();
        assert_eq!(tour.max_capacity(), 20);
        assert_eq!(tour.available_slots(), 16);

        tour.resize(4).unwrap();
        assert_eq!(tour.available_slots(), 0);
    }

    #[test]
    fn test_resize_below_booked_fails() {
        let mut tour = Tour::reconstruct(TourId::new(), profile(), 10, 6).unwrap();
        assert!(tour.resize(3).is_err());
        assert_eq!(tour.max_capacity(), 10);
        assert_eq!(tour.available_slots(), 6);
    }
}
