// 駆動される側アダプター（リポジトリ実装など）

mod tour_repository;
mod booking_repository;
mod in_memory_store;
mod tracing_logger;

pub use tour_repository::MySqlTourRepository;
pub use booking_repository::MySqlBookingRepository;
pub use in_memory_store::InMemoryTourBookingStore;
pub use tracing_logger::TracingLogger;
