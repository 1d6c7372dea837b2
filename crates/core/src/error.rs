use crate::page_types::PageKind;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Page not found: slug '{0}'")]
    SlugNotFound(String),

    /// The page kind does not accept the requested parent kind.
    #[error("{kind} cannot be placed under {parent}")]
    InvalidParent { kind: PageKind, parent: PageKind },

    /// The parent kind does not accept the requested child kind.
    #[error("{parent} does not accept {kind} children")]
    InvalidChildType { kind: PageKind, parent: PageKind },

    #[error("At most {max} {kind} page(s) may exist")]
    CardinalityExceeded { kind: PageKind, max: usize },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
