use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid sort column: {0}")]
    InvalidSortColumn(String),

    #[error("Invalid sort order: {0} (expected asc or desc)")]
    InvalidSortOrder(String),

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(String),

    #[error("Invalid year: {0}")]
    InvalidYear(String),

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

impl FilterError {
    /// Query parameter the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            FilterError::InvalidSortColumn(_) => "sortBy",
            FilterError::InvalidSortOrder(_) => "sortOrder",
            FilterError::InvalidPage(_) => "page",
            FilterError::InvalidLimit(_) => "limit",
            FilterError::InvalidMonth(_) => "month",
            FilterError::InvalidYear(_) => "year",
            FilterError::InvalidDate(_) => "date",
        }
    }
}
