//! # Natours Core
//!
//! Domain layer for the Natours tour booking API.
//!
//! ## Overview
//!
//! This crate owns everything that is independent of HTTP:
//! - The document types ([`Tour`], [`User`], [`Review`]) and their schema rules
//! - Document identifiers ([`DocumentId`]) and the [`Document`] trait
//! - Translation of request query strings into a typed [`ListQuery`]
//! - The [`Repository`] abstraction and an in-memory document store
//! - Domain errors, classified as operational or internal
//!
//! The HTTP layer (`natours_api`) depends on this crate, never the reverse.
//!
//! ## Examples
//!
//! ```
//! use natours_core::ListQuery;
//!
//! let query = ListQuery::parse("difficulty=easy&price[lt]=500&sort=-price").unwrap();
//! assert_eq!(
//!     query.filter.to_document(),
//!     serde_json::json!({ "difficulty": "easy", "price": { "$lt": 500 } })
//! );
//! ```

pub mod document;
pub mod errors;
pub mod query;
pub mod review;
pub mod store;
pub mod tour;
pub mod user;

pub use document::{Document, DocumentId};
pub use errors::{QueryError, StoreError, StoreResult, ValidationError};
pub use query::{
    ComparisonOperator, Condition, Filter, ListQuery, Pagination, Projection, SortKey,
};
pub use review::Review;
pub use store::{InMemoryRepository, Repository};
pub use tour::{Difficulty, Tour};
pub use user::{Role, User};
