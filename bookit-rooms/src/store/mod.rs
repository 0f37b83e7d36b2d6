//! Collection backends
//!
//! - [`MemoryStore`]: documents kept in process, the default
//! - [`SurrealStore`]: documents kept in a SurrealDB table (`surrealdb` feature)

mod matcher;
mod memory;
#[cfg(feature = "surrealdb")]
mod surreal;

pub use matcher::{condition_matches, document_matches};
pub use memory::MemoryStore;
#[cfg(feature = "surrealdb")]
pub use surreal::{create_client, sanitize_url, SurrealClient, SurrealStore};
