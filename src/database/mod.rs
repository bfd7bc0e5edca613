pub mod manager;
pub mod memory;
pub mod models;
pub mod query_builder;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryRecordingRepository;
pub use models::{Recording, RecordingPage, APPROVED_STATUS};
pub use repository::{PgRecordingRepository, RecordingRepository};
