//! Search entity and related types
//!
//! Defines the request-scoped criteria model and the paginated result shape.
//! Every constructor here normalizes instead of failing: malformed optional
//! input degrades to "criterion absent".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Page size used when the caller gives none
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: u32 = 50;

/// Column a search can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Owning user's display name
    Name,
    /// Average review rating
    Rating,
    /// Number of reviews
    Reviews,
    /// Business identifier
    Id,
}

impl SortKey {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Rating => "rating",
            Self::Reviews => "reviews",
            Self::Id => "id",
        }
    }

    /// Parse a caller-supplied field name; unknown names yield `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Some(Self::Name),
            "rating" | "avg_rating" | "avgrating" => Some(Self::Rating),
            "reviews" | "review_count" | "reviewscount" => Some(Self::Reviews),
            "id" | "business_id" | "businessid" => Some(Self::Id),
            _ => None,
        }
    }

    /// SQL expression this key orders by
    pub(crate) fn column(&self) -> &'static str {
        match self {
            Self::Name => "LOWER(u.name)",
            Self::Rating => "COALESCE(s.avg_rating, 0)",
            Self::Reviews => "COALESCE(s.review_count, 0)",
            Self::Id => "b.business_id",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Only the `desc` token (any case) means descending
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Resolved ordering of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Default ordering of general search
    pub const NAME_ASC: SortSpec = SortSpec::new(SortKey::Name, SortDirection::Asc);

    /// Default ordering of the area-ranked listing
    pub const RATING_DESC: SortSpec = SortSpec::new(SortKey::Rating, SortDirection::Desc);

    pub const fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Parse `field,direction`, falling back to `default` for a missing or
    /// unrecognized field
    pub fn parse_or(raw: Option<&str>, default: SortSpec) -> SortSpec {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return default;
        };

        let mut parts = raw.splitn(2, ',');
        let field = parts.next().unwrap_or_default();
        match SortKey::parse(field) {
            Some(key) => {
                let direction = parts
                    .next()
                    .map(SortDirection::parse)
                    .unwrap_or(SortDirection::Asc);
                SortSpec::new(key, direction)
            }
            None => {
                tracing::warn!(sort = raw, default = %default, "Unrecognized sort field, using default");
                default
            }
        }
    }

    /// `ORDER BY` body, always ending on the business id so pages are stable
    pub(crate) fn order_by(&self) -> String {
        let dir = self.direction.as_sql();
        match self.key {
            SortKey::Id => format!("b.business_id {}", dir),
            SortKey::Rating => format!(
                "{} {dir}, {} {dir}, b.business_id ASC",
                SortKey::Rating.column(),
                SortKey::Reviews.column(),
            ),
            key => format!("{} {}, b.business_id ASC", key.column(), dir),
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::NAME_ASC
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{},{}", self.key, dir)
    }
}

/// Zero-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    /// Clamp raw caller input: negative page → 0, size defaults to 20 and
    /// is kept within [1, 50]
    pub fn new(page: Option<i64>, size: Option<i64>) -> Self {
        let page = page.unwrap_or(0).clamp(0, i64::from(u32::MAX)) as u32;
        let size = size
            .unwrap_or(i64::from(DEFAULT_PAGE_SIZE))
            .clamp(1, i64::from(MAX_PAGE_SIZE)) as u32;
        Self { page, size }
    }

    /// Number of rows skipped before this page
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Raw, unvalidated search input as it arrives from a caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    /// Free-text fragment
    pub q: Option<String>,
    /// Administrative area (alcaldía) name
    pub area: Option<String>,
    /// Menu category labels
    pub categories: Option<Vec<String>>,
    pub page: Option<i64>,
    pub size: Option<i64>,
    /// `field,direction`
    pub sort: Option<String>,
}

/// Normalized, query-ready search request
///
/// Deserializes from the raw [`SearchParams`] shape, so input read from JSON or
/// TOML goes through the same clamping and normalization as [`From`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SearchParams")]
pub struct SearchCriteria {
    /// Trimmed free-text fragment; `None` when blank
    pub text: Option<String>,
    /// Trimmed area name; `None` when blank
    pub area: Option<String>,
    /// Trimmed, lower-cased, de-duplicated labels; empty means no filter
    pub categories: Vec<String>,
    pub page: PageRequest,
    pub sort: SortSpec,
}

impl SearchCriteria {
    /// Criteria with no filters, first page, default ordering
    pub fn new() -> Self {
        Self {
            text: None,
            area: None,
            categories: Vec::new(),
            page: PageRequest::default(),
            sort: SortSpec::NAME_ASC,
        }
    }

    /// Set the free-text fragment
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = normalize_text(Some(text));
        self
    }

    /// Set the administrative area
    pub fn with_area(mut self, area: &str) -> Self {
        self.area = normalize_text(Some(area));
        self
    }

    /// Set the category labels
    pub fn with_categories<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.categories = normalize_labels(labels);
        self
    }

    /// Set the page window
    pub fn with_page(mut self, page: Option<i64>, size: Option<i64>) -> Self {
        self.page = PageRequest::new(page, size);
        self
    }

    /// Set the ordering from a `field,direction` string
    pub fn with_sort(mut self, sort: Option<&str>) -> Self {
        self.sort = SortSpec::parse_or(sort, SortSpec::NAME_ASC);
        self
    }

    /// Whether no criterion narrows the result
    pub fn is_unfiltered(&self) -> bool {
        self.text.is_none() && self.area.is_none() && self.categories.is_empty()
    }
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self::new()
    }
}

impl From<SearchParams> for SearchCriteria {
    fn from(params: SearchParams) -> Self {
        Self {
            text: normalize_text(params.q.as_deref()),
            area: normalize_text(params.area.as_deref()),
            categories: normalize_labels(params.categories.unwrap_or_default()),
            page: PageRequest::new(params.page, params.size),
            sort: SortSpec::parse_or(params.sort.as_deref(), SortSpec::NAME_ASC),
        }
    }
}

/// Trim; blank becomes `None`
pub fn normalize_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Unicode lower-casing applied to every text criterion before it is bound
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Trim and lower-case each label, drop blanks and repeats, keep first-seen order
pub fn normalize_labels<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for label in labels {
        let label = fold_case(label.as_ref().trim());
        if !label.is_empty() && !normalized.contains(&label) {
            normalized.push(label);
        }
    }
    normalized
}

/// One page of an ordered result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    /// Zero-based page index
    pub page: u32,
    pub size: u32,
    /// Matching elements across all pages
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
        }
    }

    /// The "nothing to show" page: no content, page 0, size 0, total 0
    pub fn empty() -> Self {
        Self {
            content: Vec::new(),
            page: 0,
            size: 0,
            total_elements: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            0
        } else {
            self.total_elements.div_ceil(u64::from(self.size))
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

/// Public search result card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
    pub review_count: i64,
    pub rating: f64,
}
