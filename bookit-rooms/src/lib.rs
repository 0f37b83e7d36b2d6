//! # bookit-rooms
//!
//! Room listing and administration API for the BookIT booking application.
//!
//! ## Features
//!
//! - **Listing**: keyword search, exact and range filters, fixed-size pages
//! - **Administration**: create, partial update and delete rooms
//! - **Stores**: in-memory store, or SurrealDB with the `surrealdb` feature
//! - **Middleware stack**: request tracking, panic recovery, body size limits, CORS
//! - **Health checks**: liveness and readiness checks
//!
//! ## Example
//!
//! ```rust,no_run
//! use bookit_rooms::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let state = AppState::new(config.clone(), MemoryStore::<Room>::new());
//!
//!     Server::new(config).serve(router(state)).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod ids;
pub mod middleware;
pub mod observability;
pub mod query;
pub mod repository;
pub mod rooms;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        Config, ListingConfig, MiddlewareConfig, ServiceConfig, StoreConfig, SurrealDbConfig,
    };
    pub use crate::error::{Error, Result};
    pub use crate::handlers::{ApiError, ApiErrorKind, ApiOperation};
    pub use crate::health::{health, readiness};
    pub use crate::ids::{IdError, MakeTypedRequestId, RequestId, RoomId};
    pub use crate::middleware::{
        request_id_layer, request_id_propagation_layer, sensitive_headers_layer,
        REQUEST_ID_HEADER,
    };
    pub use crate::observability::init_tracing;
    pub use crate::query::{QueryParams, QuerySpec};
    pub use crate::repository::{
        Document, FilterCondition, FilterOperator, Pagination, Patch, Repository,
        RepositoryError, RepositoryErrorKind, RepositoryResult,
    };
    pub use crate::rooms::{NewRoom, Room, RoomCategory, RoomImage};
    pub use crate::routes::router;
    pub use crate::server::Server;
    pub use crate::state::{AppState, RoomStore};
    pub use crate::store::MemoryStore;

    #[cfg(feature = "surrealdb")]
    pub use crate::store::SurrealStore;

    pub use axum::{
        extract::{Path, Query, State},
        routing::{delete, get, post, put},
        Json, Router,
    };
}
