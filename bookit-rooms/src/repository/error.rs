//! Repository error types
//!
//! Every collection backend reports failures as a [`RepositoryError`], which
//! records the operation that failed, a coarse [`RepositoryErrorKind`] used by
//! the HTTP layer to choose a status code, and optionally the entity involved.
//!
//! ```rust
//! use bookit_rooms::repository::{RepositoryError, RepositoryErrorKind};
//!
//! use bookit_rooms::repository::RepositoryOperation;
//!
//! let error = RepositoryError::validation_failed(RepositoryOperation::Update, "bad category")
//!     .with_entity("Room", "room_01h455vb4pex5vsknk084sn02q");
//! assert!(matches!(error.kind, RepositoryErrorKind::ValidationFailed));
//! assert!(error.entity_id.is_some());
//! ```

use std::fmt;

/// Collection operation that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Loading a single document by identifier
    FindById,
    /// Counting documents, filtered or not
    Count,
    /// Fetching a page of matching documents
    FetchPage,
    /// Inserting a new document
    Create,
    /// Merging changes into a stored document
    Update,
    /// Removing a document
    Delete,
    /// Opening the backend or loading seed data
    Connect,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FindById => write!(f, "find_by_id"),
            Self::Count => write!(f, "count"),
            Self::FetchPage => write!(f, "fetch_page"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Connect => write!(f, "connect"),
        }
    }
}

/// Category of repository failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// The input, or the result of merging it, is not a valid document
    ValidationFailed,
    /// The backend could not be reached
    ConnectionFailed,
    /// The backend rejected or failed the query
    DatabaseError,
    /// A document could not be converted to or from its stored form
    SerializationError,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::DatabaseError => write!(f, "database_error"),
            Self::SerializationError => write!(f, "serialization_error"),
        }
    }
}

/// Error returned by collection operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation that failed
    pub operation: RepositoryOperation,
    /// What went wrong
    pub kind: RepositoryErrorKind,
    /// Human-readable detail, not shown to API clients for internal kinds
    pub message: String,
    /// Entity type involved, e.g. "Room"
    pub entity_type: Option<String>,
    /// Identifier of the entity involved
    pub entity_id: Option<String>,
}

impl RepositoryError {
    /// Create a new repository error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Create a validation error
    pub fn validation_failed(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::ValidationFailed, message)
    }

    /// Create a connection error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Connect,
            RepositoryErrorKind::ConnectionFailed,
            message,
        )
    }

    /// Create a database error
    pub fn database_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::DatabaseError, message)
    }

    /// Create a serialization error
    pub fn serialization_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::SerializationError, message)
    }

    /// Attach the entity this error concerns
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Replace the operation recorded on this error
    #[must_use]
    pub fn with_operation(mut self, operation: RepositoryOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Transient failures that may succeed on retry
    pub fn is_retriable(&self) -> bool {
        self.kind == RepositoryErrorKind::ConnectionFailed
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(entity_type), Some(entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_display() {
        assert_eq!(RepositoryOperation::FindById.to_string(), "find_by_id");
        assert_eq!(RepositoryOperation::FetchPage.to_string(), "fetch_page");
        assert_eq!(RepositoryOperation::Delete.to_string(), "delete");
        assert_eq!(RepositoryOperation::Connect.to_string(), "connect");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(
            RepositoryErrorKind::ConnectionFailed.to_string(),
            "connection_failed"
        );
        assert_eq!(
            RepositoryErrorKind::ValidationFailed.to_string(),
            "validation_failed"
        );
        assert_eq!(
            RepositoryErrorKind::SerializationError.to_string(),
            "serialization_error"
        );
    }

    #[test]
    fn test_with_operation_and_entity() {
        let error = RepositoryError::database_error(RepositoryOperation::FindById, "down")
            .with_operation(RepositoryOperation::Delete)
            .with_entity("Room", "room_2");
        assert_eq!(error.operation, RepositoryOperation::Delete);
        assert_eq!(error.kind, RepositoryErrorKind::DatabaseError);
        assert_eq!(error.entity_type.as_deref(), Some("Room"));
        assert_eq!(error.entity_id.as_deref(), Some("room_2"));
    }

    #[test]
    fn test_is_retriable() {
        assert!(RepositoryError::connection_failed("refused").is_retriable());
        assert!(
            !RepositoryError::database_error(RepositoryOperation::Count, "syntax").is_retriable()
        );
        assert!(
            !RepositoryError::validation_failed(RepositoryOperation::Update, "bad").is_retriable()
        );
    }

    #[test]
    fn test_display() {
        let plain =
            RepositoryError::database_error(RepositoryOperation::Create, "syntax").to_string();
        assert_eq!(plain, "Repository database_error error during create: syntax");

        let with_entity =
            RepositoryError::validation_failed(RepositoryOperation::Update, "bad")
                .with_entity("Room", "room_1")
                .to_string();
        assert!(with_entity.ends_with("[Room: room_1]"));
    }
}
