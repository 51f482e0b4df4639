use thiserror::Error;

pub type ForumResult<T> = Result<T, ForumError>;

/// Errors surfaced to callers of the store and the engine. Both kinds are
/// local and recoverable; the caller decides how to present them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForumError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },
    #[error("validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Post,
    Category,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Post => f.write_str("post"),
            Entity::Category => f.write_str("category"),
        }
    }
}

impl ForumError {
    pub fn post_not_found(id: impl Into<String>) -> Self {
        ForumError::NotFound {
            entity: Entity::Post,
            id: id.into(),
        }
    }

    pub fn category_not_found(id: impl Into<String>) -> Self {
        ForumError::NotFound {
            entity: Entity::Category,
            id: id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ForumError::Validation(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ForumError::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ForumError::Validation(_))
    }
}
