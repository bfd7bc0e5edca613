use sqlx::{Postgres, QueryBuilder};

use crate::database::models::APPROVED_STATUS;
use crate::filter::{FilterOrder, VideoFilter};

const TABLE: &str = "vkyc_recordings";

// Casts pin the wire types the Recording row decodes into.
const COLUMNS: &str = "id::BIGINT AS id, lan, vkyc_date::TIMESTAMPTZ AS vkyc_date, status, \
                       call_duration::INTEGER AS call_duration, nfs_file_path";

/// SQL for the recording queries. Every statement starts from the
/// APPROVED-only base so no caller can forget the status filter.
pub struct RecordingQuery;

impl RecordingQuery {
    pub fn list(filter: &VideoFilter) -> QueryBuilder<'static, Postgres> {
        let mut qb = Self::select(COLUMNS);
        Self::push_filters(&mut qb, filter);
        qb.push(" ");
        qb.push(FilterOrder::generate(filter.sort_by, filter.sort_order));
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(filter.limit));
        qb.push(" OFFSET ");
        qb.push_bind(filter.offset());
        qb
    }

    /// Same predicate as `list`, without ordering or paging
    pub fn count(filter: &VideoFilter) -> QueryBuilder<'static, Postgres> {
        let mut qb = Self::select("COUNT(*) AS count");
        Self::push_filters(&mut qb, filter);
        qb
    }

    pub fn by_lan(lan: &str) -> QueryBuilder<'static, Postgres> {
        let mut qb = Self::select(COLUMNS);
        qb.push(" AND lan = ");
        qb.push_bind(lan.to_string());
        qb.push(" LIMIT 1");
        qb
    }

    pub fn by_lans(lans: &[String]) -> QueryBuilder<'static, Postgres> {
        let mut qb = Self::select(COLUMNS);
        qb.push(" AND lan = ANY(");
        qb.push_bind(lans.to_vec());
        qb.push(")");
        qb
    }

    fn select(columns: &str) -> QueryBuilder<'static, Postgres> {
        QueryBuilder::new(format!(
            "SELECT {} FROM \"{}\" WHERE status = '{}'",
            columns, TABLE, APPROVED_STATUS
        ))
    }

    fn push_filters(qb: &mut QueryBuilder<'static, Postgres>, filter: &VideoFilter) {
        if let Some(pattern) = filter.search_pattern() {
            qb.push(" AND lan ILIKE ");
            qb.push_bind(pattern);
        }
        if let Some(date) = filter.date {
            qb.push(" AND vkyc_date::DATE = ");
            qb.push_bind(date);
        }
        if let Some(month) = filter.month {
            qb.push(" AND EXTRACT(MONTH FROM vkyc_date)::INTEGER = ");
            qb.push_bind(month as i32);
        }
        if let Some(year) = filter.year {
            qb.push(" AND EXTRACT(YEAR FROM vkyc_date)::INTEGER = ");
            qb.push_bind(year);
        }
    }
}
