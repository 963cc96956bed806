use ftui_sortable::{ReorderError, SortableError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sortable error: {0}")]
    Sortable(#[from] SortableError),

    #[error("unknown item: {label}")]
    UnknownItem { label: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("course and drag layer disagree on the order of {collection}")]
    Desync { collection: String },
}

impl From<ReorderError> for HarnessError {
    fn from(err: ReorderError) -> Self {
        Self::Sortable(err.into())
    }
}

impl HarnessError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. } | Self::UnknownItem { .. } => 2,
            Self::Desync { .. } => 3,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unknown(label: impl Into<String>) -> Self {
        Self::UnknownItem {
            label: label.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HarnessError;
    use ftui_sortable::{ReorderError, SortableError};

    #[test]
    fn usage_errors_exit_with_two() {
        assert_eq!(HarnessError::invalid("bad").exit_code(), 2);
        assert_eq!(HarnessError::unknown("Lesson-9-9").exit_code(), 2);
        assert_eq!(
            HarnessError::unknown("Lesson-9-9").to_string(),
            "unknown item: Lesson-9-9"
        );
    }

    #[test]
    fn reorder_errors_wrap_as_sortable() {
        let error = HarnessError::from(ReorderError::EmptyMoveSet);
        assert!(matches!(
            error,
            HarnessError::Sortable(SortableError::EmptyMoveSet)
        ));
        assert_eq!(error.exit_code(), 1);
    }
}
