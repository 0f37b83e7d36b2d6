//! Document collection abstractions
//!
//! - [`Repository`]: async CRUD plus the count/fetch pair used by listings
//! - [`Document`]: what a backend needs to know about a stored entity
//! - [`FilterCondition`] and [`Pagination`]: the building blocks of a
//!   [`QuerySpec`](crate::query::QuerySpec)
//! - [`RepositoryError`]: structured failures mapped to HTTP by the handlers

mod error;
mod pagination;
mod traits;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use pagination::{FilterCondition, FilterOperator, Pagination};
pub use traits::{merge_patch, Document, Patch, Repository, RepositoryResult};
