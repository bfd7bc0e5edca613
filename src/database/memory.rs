//! In-process recording store with the same contract as the Postgres
//! repository. Backs local runs without a database and the test suites.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::Datelike;

use crate::database::manager::DatabaseError;
use crate::database::models::{Recording, RecordingPage};
use crate::database::repository::RecordingRepository;
use crate::filter::{SortColumn, SortDirection, VideoFilter};

#[derive(Default)]
pub struct MemoryRecordingRepository {
    rows: Vec<Recording>,
}

impl MemoryRecordingRepository {
    pub fn new(rows: Vec<Recording>) -> Self {
        Self { rows }
    }

    fn matches(recording: &Recording, filter: &VideoFilter) -> bool {
        if !recording.is_approved() {
            return false;
        }
        if let Some(search) = &filter.search {
            if !recording.lan.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        let date = recording.vkyc_date.date_naive();
        filter.date.map_or(true, |d| d == date)
            && filter.month.map_or(true, |m| m == date.month())
            && filter.year.map_or(true, |y| y == date.year())
    }

    fn compare(a: &Recording, b: &Recording, column: SortColumn) -> Ordering {
        let primary = match column {
            SortColumn::VkycDate => a.vkyc_date.cmp(&b.vkyc_date),
            SortColumn::Lan => a.lan.cmp(&b.lan),
            // Postgres sorts NULL above every value
            SortColumn::CallDuration => match (a.call_duration, b.call_duration) {
                (Some(x), Some(y)) => x.cmp(&y),
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
            },
            SortColumn::Id => Ordering::Equal,
        };
        primary.then(a.id.cmp(&b.id))
    }
}

#[async_trait]
impl RecordingRepository for MemoryRecordingRepository {
    async fn list_filtered(&self, filter: &VideoFilter) -> Result<RecordingPage, DatabaseError> {
        let rows = &self.rows;
        let mut matched: Vec<&Recording> = rows.iter().filter(|r| Self::matches(r, filter)).collect();

        matched.sort_by(|a, b| {
            let ordering = Self::compare(a, b, filter.sort_by);
            match filter.sort_order {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total = matched.len() as i64;
        let offset = usize::try_from(filter.offset()).unwrap_or(usize::MAX);
        let items = matched
            .into_iter()
            .skip(offset)
            .take(filter.limit as usize)
            .cloned()
            .collect();

        Ok(RecordingPage { total, items })
    }

    async fn get_by_lan(&self, lan: &str) -> Result<Option<Recording>, DatabaseError> {
        let rows = &self.rows;
        Ok(rows.iter().find(|r| r.is_approved() && r.lan == lan).cloned())
    }

    async fn get_many_by_lan(&self, lans: &[String]) -> Result<Vec<Recording>, DatabaseError> {
        let rows = &self.rows;
        Ok(rows
            .iter()
            .filter(|r| r.is_approved() && lans.contains(&r.lan))
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
