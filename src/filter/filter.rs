use chrono::NaiveDate;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::types::{ListQuery, VideoFilter};
use crate::config::ListingConfig;

impl VideoFilter {
    /// Validate a raw listing query. `limit` above the configured maximum is
    /// capped rather than rejected.
    pub fn from_query(query: &ListQuery, listing: &ListingConfig) -> Result<Self, FilterError> {
        let page = match non_blank(&query.page) {
            Some(raw) => match raw.parse::<u32>() {
                Ok(page) if page >= 1 => page,
                _ => return Err(FilterError::InvalidPage(raw.to_string())),
            },
            None => 1,
        };

        let requested_limit = match non_blank(&query.limit) {
            Some(raw) => match raw.parse::<u32>() {
                Ok(limit) if limit >= 1 => limit,
                _ => return Err(FilterError::InvalidLimit(raw.to_string())),
            },
            None => listing.default_limit,
        };
        let limit = if requested_limit > listing.max_limit {
            tracing::warn!("Limit {} exceeds max {}, capping to max", requested_limit, listing.max_limit);
            listing.max_limit
        } else {
            requested_limit
        };

        let month = match non_blank(&query.month) {
            Some(raw) => match raw.parse::<u32>() {
                Ok(month) if (1..=12).contains(&month) => Some(month),
                _ => return Err(FilterError::InvalidMonth(raw.to_string())),
            },
            None => None,
        };

        let year = match non_blank(&query.year) {
            Some(raw) => match raw.parse::<i32>() {
                Ok(year) if (1900..=9999).contains(&year) => Some(year),
                _ => return Err(FilterError::InvalidYear(raw.to_string())),
            },
            None => None,
        };

        let date = match non_blank(&query.date) {
            Some(raw) => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| FilterError::InvalidDate(raw.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            search: non_blank(&query.search).map(str::to_string),
            date,
            month,
            year,
            sort_by: FilterOrder::parse_column(query.sort_by.as_deref())?,
            sort_order: FilterOrder::parse_direction(query.sort_order.as_deref())?,
            page,
            limit,
        })
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    /// ILIKE pattern for the search text with LIKE metacharacters escaped
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|search| {
            let mut escaped = String::with_capacity(search.len() + 2);
            escaped.push('%');
            for c in search.chars() {
                if matches!(c, '%' | '_' | '\\') {
                    escaped.push('\\');
                }
                escaped.push(c);
            }
            escaped.push('%');
            escaped
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
