use thiserror::Error;

use dq_model::CheckKind;

/// Failures inside one check engine (frame or relational).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("column {column:?} not found in {source}")]
    ColumnNotFound { source: String, column: String },

    #[error("table {table:?} not found; available: {}", available.join(", "))]
    TableNotFound { table: String, available: Vec<String> },

    #[error("parameter {name:?} is invalid: {reason}")]
    Parameter { name: String, reason: String },

    #[error("database error: {0}")]
    Sql(#[from] sqlx::Error),
}

impl EngineError {
    pub(crate) fn parameter(name: &str, reason: impl Into<String>) -> Self {
        EngineError::Parameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failures surfaced by [`dispatch`](crate::dispatch::dispatch).
///
/// `Execution` wraps a downstream engine error exactly once, with enough
/// context to render a single user-facing message. A failed check is not
/// an error and never appears here.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("check {kind} against {source} failed: {message}")]
    Execution {
        kind: CheckKind,
        source: String,
        column: Option<String>,
        message: String,
    },

    #[error("failed to persist check artifacts for {source}")]
    Persist {
        source: String,
        #[source]
        cause: anyhow::Error,
    },
}

impl DispatchError {
    pub(crate) fn execution(kind: CheckKind, source: &str, column: Option<&str>, error: &EngineError) -> Self {
        let message = match column {
            Some(column) => format!("column {column}: {error}"),
            None => error.to_string(),
        };
        DispatchError::Execution {
            kind,
            source: source.to_string(),
            column: column.map(str::to_string),
            message,
        }
    }
}
