//! Pagination utilities for service layer
//!
//! Raw `page`/`size`/`sort` request values are validated into a [`PageRequest`]
//! holding an ordered list of [`SortOrder`]s. Sort properties are not
//! interpreted here; whoever builds the query resolves them against its own
//! columns.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PAGE: i64 = 0;
pub const DEFAULT_SIZE: i64 = 10;
pub const MAX_SIZE: i64 = 100;
pub const DEFAULT_SORT_PROPERTY: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("page must be >= 0 (got {0})")]
    InvalidPage(i64),
    #[error("size must be in [1,100] (got {0})")]
    InvalidSize(i64),
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Only `desc` (any case) selects descending; everything else, including a
    /// missing or malformed token, is ascending.
    pub fn parse_lenient(token: Option<&str>) -> Self {
        match token {
            Some(t) if t.eq_ignore_ascii_case("desc") => Direction::Desc,
            _ => Direction::Asc,
        }
    }
}

/// One ordering key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub property: String,
    pub direction: Direction,
}

impl SortOrder {
    pub fn asc(property: impl Into<String>) -> Self {
        Self { property: property.into(), direction: Direction::Asc }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self { property: property.into(), direction: Direction::Desc }
    }

    /// Parse `"property"` or `"property,direction"`.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(',');
        let property = parts.next().unwrap_or_default();
        let direction = Direction::parse_lenient(parts.next());
        Self { property: property.to_string(), direction }
    }
}

/// Validated pagination parameters. Only obtainable through [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u64,
    size: u64,
    sort: Vec<SortOrder>,
}

impl PageRequest {
    /// Zero-based page index
    pub fn page(&self) -> u64 { self.page }

    /// Items per page
    pub fn size(&self) -> u64 { self.size }

    /// Ordering keys, most significant first
    pub fn sort(&self) -> &[SortOrder] { &self.sort }

    /// Rows to skip; `None` when `page * size` does not fit in a `u64`.
    pub fn offset(&self) -> Option<u64> { self.page.checked_mul(self.size) }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE as u64,
            size: DEFAULT_SIZE as u64,
            sort: vec![SortOrder::asc(DEFAULT_SORT_PROPERTY)],
        }
    }
}

/// Validate raw pagination input.
///
/// An empty `sort_specs` falls back to ordering by `id` ascending. Order among
/// sort keys is preserved.
///
/// # Examples
/// ```
/// use service::pagination::{normalize, Direction, SortOrder};
/// let req = normalize(0, 20, &["name,desc", "age"]).unwrap();
/// assert_eq!(req.sort(), &[SortOrder::desc("name"), SortOrder::asc("age")]);
/// assert_eq!(req.sort()[1].direction, Direction::Asc);
/// assert!(normalize::<&str>(0, 101, &[]).is_err());
/// ```
pub fn normalize<S: AsRef<str>>(page: i64, size: i64, sort_specs: &[S]) -> Result<PageRequest, PaginationError> {
    if page < 0 {
        return Err(PaginationError::InvalidPage(page));
    }
    if !(1..=MAX_SIZE).contains(&size) {
        return Err(PaginationError::InvalidSize(size));
    }
    Ok(PageRequest { page: page as u64, size: size as u64, sort: parse_sort(sort_specs) })
}

/// Turn raw sort specs into ordering keys; empty input means `id` ascending.
pub fn parse_sort<S: AsRef<str>>(sort_specs: &[S]) -> Vec<SortOrder> {
    if sort_specs.is_empty() {
        return vec![SortOrder::asc(DEFAULT_SORT_PROPERTY)];
    }
    sort_specs.iter().map(|s| SortOrder::parse(s.as_ref())).collect()
}

/// Query-string form of the pagination parameters.
///
/// `sort` may repeat: `?sort=name,desc&sort=email`.
#[derive(Debug, Clone, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
    #[serde(default = "default_sort")]
    pub sort: Vec<String>,
}

fn default_page() -> i64 { DEFAULT_PAGE }
fn default_size() -> i64 { DEFAULT_SIZE }
fn default_sort() -> Vec<String> { vec![DEFAULT_SORT_PROPERTY.to_string()] }

impl Default for PageParams {
    fn default() -> Self {
        Self { page: default_page(), size: default_size(), sort: default_sort() }
    }
}

impl PageParams {
    pub fn to_page_request(&self) -> Result<PageRequest, PaginationError> {
        normalize(self.page, self.size, &self.sort)
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let total_pages = total_elements.div_ceil(request.size());
        Self { content, page: request.page(), size: request.size(), total_elements, total_pages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_SORT: &[&str] = &[];

    #[test]
    fn valid_bounds_are_echoed() {
        for (page, size) in [(0, 1), (0, 100), (7, 10), (i64::from(u32::MAX), 50)] {
            let req = normalize(page, size, NO_SORT).unwrap();
            assert_eq!(req.page(), page as u64);
            assert_eq!(req.size(), size as u64);
        }
    }

    #[test]
    fn negative_page_is_rejected() {
        assert_eq!(normalize(-1, 10, NO_SORT), Err(PaginationError::InvalidPage(-1)));
    }

    #[test]
    fn size_outside_range_is_rejected() {
        for size in [0, -5, 101, 1000] {
            assert_eq!(normalize(0, size, NO_SORT), Err(PaginationError::InvalidSize(size)));
        }
    }

    #[test]
    fn page_is_checked_before_size() {
        assert_eq!(normalize(-3, 0, NO_SORT), Err(PaginationError::InvalidPage(-3)));
    }

    #[test]
    fn error_messages_name_the_bounds() {
        assert!(PaginationError::InvalidPage(-1).to_string().starts_with("page must be >= 0"));
        assert!(PaginationError::InvalidSize(0).to_string().starts_with("size must be in [1,100]"));
    }

    #[test]
    fn empty_sort_matches_explicit_id() {
        let empty = normalize(2, 5, NO_SORT).unwrap();
        let explicit = normalize(2, 5, &["id"]).unwrap();
        assert_eq!(empty, explicit);
        assert_eq!(empty.sort(), &[SortOrder::asc("id")]);
    }

    #[test]
    fn sort_order_is_preserved() {
        let req = normalize(0, 10, &["name,desc", "age"]).unwrap();
        assert_eq!(req.sort(), &[SortOrder::desc("name"), SortOrder::asc("age")]);
    }

    #[test]
    fn direction_is_case_insensitive() {
        assert_eq!(SortOrder::parse("price,DESC").direction, Direction::Desc);
        assert_eq!(SortOrder::parse("price,Desc").direction, Direction::Desc);
        assert_eq!(SortOrder::parse("price,ASC").direction, Direction::Asc);
    }

    #[test]
    fn malformed_direction_falls_back_to_ascending() {
        assert_eq!(SortOrder::parse("price,down"), SortOrder::asc("price"));
        assert_eq!(SortOrder::parse("price,"), SortOrder::asc("price"));
        assert_eq!(SortOrder::parse("price, desc"), SortOrder::asc("price"));
    }

    #[test]
    fn extra_segments_are_ignored() {
        assert_eq!(SortOrder::parse("price,desc,ignored"), SortOrder::desc("price"));
    }

    #[test]
    fn unknown_properties_pass_through() {
        let req = normalize(0, 10, &["no_such_column,desc"]).unwrap();
        assert_eq!(req.sort(), &[SortOrder::desc("no_such_column")]);
    }

    #[test]
    fn params_default_to_first_page_of_ten_by_id() {
        let req = PageParams::default().to_page_request().unwrap();
        assert_eq!(req, PageRequest::default());
        assert_eq!(req.offset(), Some(0));
    }

    #[test]
    fn params_deserialize_with_missing_fields() {
        let params: PageParams = serde_json::from_value(serde_json::json!({"size": 25})).unwrap();
        assert_eq!(params.page, 0);
        assert_eq!(params.size, 25);
        assert_eq!(params.sort, vec!["id".to_string()]);
    }

    #[test]
    fn offset_multiplies_page_and_size() {
        let req = normalize(3, 20, NO_SORT).unwrap();
        assert_eq!(req.offset(), Some(60));
    }

    #[test]
    fn huge_page_has_no_offset_instead_of_overflowing() {
        let req = normalize(i64::MAX, 100, &["id"]).unwrap();
        assert_eq!(req.page(), i64::MAX as u64);
        assert_eq!(req.offset(), None);
    }

    #[test]
    fn page_counts_round_up() {
        let req = normalize(0, 10, NO_SORT).unwrap();
        assert_eq!(Page::new(Vec::<u8>::new(), &req, 0).total_pages, 0);
        assert_eq!(Page::new(Vec::<u8>::new(), &req, 10).total_pages, 1);
        assert_eq!(Page::new(Vec::<u8>::new(), &req, 11).total_pages, 2);
    }
}
