use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw query string of `GET /api/videos`. Everything arrives as text so that
/// bad values surface as our own validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub search: Option<String>,
    pub date: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
}

/// Columns a listing may be ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[default]
    VkycDate,
    Lan,
    CallDuration,
    Id,
}

impl SortColumn {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortColumn::VkycDate => "vkyc_date",
            SortColumn::Lan => "lan",
            SortColumn::CallDuration => "call_duration",
            SortColumn::Id => "id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Validated listing request
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFilter {
    pub search: Option<String>,
    pub date: Option<NaiveDate>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub sort_by: SortColumn,
    pub sort_order: SortDirection,
    pub page: u32,
    pub limit: u32,
}

impl Default for VideoFilter {
    fn default() -> Self {
        Self {
            search: None,
            date: None,
            month: None,
            year: None,
            sort_by: SortColumn::default(),
            sort_order: SortDirection::Desc,
            page: 1,
            limit: 10,
        }
    }
}
