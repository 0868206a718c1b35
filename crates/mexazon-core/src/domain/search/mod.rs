//! Search domain module
//!
//! Filtered, sorted, paginated discovery of active businesses.
//!
//! # Architecture
//!
//! - **Entities**: `SearchCriteria`, `SortSpec`, `PageRequest`, `Page`, `SearchResult`
//! - **Specifications**: one SQL fragment per criterion, composed with AND
//! - **Repository**: `BusinessSearchRepository` runs the page and count queries
//! - **Mapper**: `BusinessRecord` rows into `SearchResult` cards
//! - **Service**: `SearchService` with `search` and `top_in_area`
//!
//! # Example
//!
//! ```ignore
//! use mexazon_core::domain::search::{SearchCriteria, SearchService};
//!
//! let service = SearchService::new(pool.clone());
//!
//! let criteria = SearchCriteria::new()
//!     .with_text("tacos")
//!     .with_area("Coyoacán")
//!     .with_sort(Some("rating,desc"));
//! let page = service.search(&criteria).await?;
//!
//! // Best rated businesses around user 42
//! let page = service.top_in_area(42, None, Some(10)).await?;
//! ```

pub mod entity;
pub mod mapper;
pub mod repository;
pub mod repository_trait;
pub mod service;
pub mod specification;

pub use entity::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest, SearchCriteria, SearchParams,
    SearchResult, SortDirection, SortKey, SortSpec,
};
pub use mapper::BusinessRecord;
pub use repository::BusinessSearchRepository;
pub use repository_trait::BusinessSearchRepositoryTrait;
pub use service::SearchService;
pub use specification::{
    ActiveSpec, AreaSpec, BusinessSpecBuilder, CategoryAnySpec, CategoryLabelContainsSpec,
    NameSpec,
};
