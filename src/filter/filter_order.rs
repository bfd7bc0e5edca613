use super::error::FilterError;
use super::types::{SortColumn, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Resolve `sortBy` against the column allow-list. Anything not listed is
    /// rejected so user text never reaches the ORDER BY clause.
    pub fn parse_column(raw: Option<&str>) -> Result<SortColumn, FilterError> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(SortColumn::default());
        };
        match raw.to_ascii_lowercase().as_str() {
            "vkyc_date" | "date" => Ok(SortColumn::VkycDate),
            "lan" => Ok(SortColumn::Lan),
            "call_duration" | "duration" => Ok(SortColumn::CallDuration),
            "id" => Ok(SortColumn::Id),
            _ => Err(FilterError::InvalidSortColumn(raw.to_string())),
        }
    }

    pub fn parse_direction(raw: Option<&str>) -> Result<SortDirection, FilterError> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(SortDirection::Desc);
        };
        if raw.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if raw.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(FilterError::InvalidSortOrder(raw.to_string()))
        }
    }

    /// ORDER BY clause with `id` as tie-breaker so offset windows are stable
    pub fn generate(column: SortColumn, sort: SortDirection) -> String {
        if column == SortColumn::Id {
            return format!("ORDER BY \"id\" {}", sort.to_sql());
        }
        format!("ORDER BY \"{}\" {}, \"id\" {}", column.as_sql(), sort.to_sql(), sort.to_sql())
    }
}
