use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Recording, RecordingPage};
use crate::database::query_builder::RecordingQuery;
use crate::filter::VideoFilter;

/// Read contract over recording metadata. Implementations must only ever
/// return APPROVED recordings.
#[async_trait]
pub trait RecordingRepository: Send + Sync {
    /// Filtered, ordered window plus the total size of the filtered set
    async fn list_filtered(&self, filter: &VideoFilter) -> Result<RecordingPage, DatabaseError>;

    /// Exact LAN match
    async fn get_by_lan(&self, lan: &str) -> Result<Option<Recording>, DatabaseError>;

    /// Matches for the given LANs in no particular order; missing LANs are
    /// simply absent from the result.
    async fn get_many_by_lan(&self, lans: &[String]) -> Result<Vec<Recording>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

pub struct PgRecordingRepository {
    pool: PgPool,
}

impl PgRecordingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordingRepository for PgRecordingRepository {
    async fn list_filtered(&self, filter: &VideoFilter) -> Result<RecordingPage, DatabaseError> {
        let mut list = RecordingQuery::list(filter);
        let items = list.build_query_as::<Recording>().fetch_all(&self.pool).await?;

        let mut count = RecordingQuery::count(filter);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        tracing::debug!(
            "Listed {} of {} recordings (page {}, limit {})",
            items.len(),
            total,
            filter.page,
            filter.limit
        );
        Ok(RecordingPage { total, items })
    }

    async fn get_by_lan(&self, lan: &str) -> Result<Option<Recording>, DatabaseError> {
        let mut query = RecordingQuery::by_lan(lan);
        let recording = query.build_query_as::<Recording>().fetch_optional(&self.pool).await?;
        Ok(recording)
    }

    async fn get_many_by_lan(&self, lans: &[String]) -> Result<Vec<Recording>, DatabaseError> {
        if lans.is_empty() {
            return Ok(vec![]);
        }
        let mut query = RecordingQuery::by_lans(lans);
        let recordings = query.build_query_as::<Recording>().fetch_all(&self.pool).await?;
        Ok(recordings)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
