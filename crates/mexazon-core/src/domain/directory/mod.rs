//! Directory domain
//!
//! Read-only access to businesses, addresses, the postal catalog, menus and
//! review aggregates. Search consumes these through
//! [`DirectoryRepositoryTrait`]; the CLI uses [`DirectoryService`] directly.

pub mod entity;
pub mod repository;
pub mod repository_trait;
pub mod service;

pub use entity::{
    BusinessDetail, BusinessProfile, DishWithCategory, MenuCategory, PostalCatalogEntry,
    RatingSummary, ReviewAggregate, UserAddress,
};
pub use repository::DirectoryRepository;
pub use repository_trait::DirectoryRepositoryTrait;
pub use service::DirectoryService;
