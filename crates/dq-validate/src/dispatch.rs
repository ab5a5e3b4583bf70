//! Rule dispatch: resolve, coerce, execute, persist, normalize.
//!
//! One synchronous sequence per call from the caller's point of view:
//! no internal retry, no cancellation. Engine failures are wrapped exactly
//! once with kind/column/source context; persistence runs after execution
//! and is idempotent by check name.

use tracing::{info, warn};

use dq_model::{CheckKind, CheckOutcome, Rule, SourceSchema};
use dq_report::ReportStore;

use crate::error::{DispatchError, EngineError};
use crate::frame::FrameSource;
use crate::relational::{TableSource, is_text_type};

/// A data source bound for the current interaction.
///
/// At most one dispatch should be in flight per handle: concurrent regex
/// dispatches against the same table would race on the coercion view,
/// whose name is derived from the table and column only.
pub enum SourceHandle {
    Frame(FrameSource),
    Table(TableSource),
}

impl SourceHandle {
    pub fn name(&self) -> &str {
        match self {
            SourceHandle::Frame(frame) => frame.name(),
            SourceHandle::Table(table) => table.name(),
        }
    }

    /// Live schema for the generation prompt.
    pub async fn schema(&self) -> Result<SourceSchema, EngineError> {
        match self {
            SourceHandle::Frame(frame) => Ok(frame.schema()),
            SourceHandle::Table(table) => table.schema().await,
        }
    }
}

/// Execute one validated rule against the source and persist its
/// artifacts. Returns the normalized outcome; a failed check is a normal
/// return with `passed = false`.
pub async fn dispatch(
    rule: &Rule,
    source: &SourceHandle,
    store: &ReportStore,
) -> Result<CheckOutcome, DispatchError> {
    let source_name = source.name();
    info!(kind = %rule.kind, source = source_name, "dispatching check");

    let (effective, outcome) = match source {
        SourceHandle::Frame(frame) => {
            let outcome = frame
                .run_check(rule)
                .map_err(|e| wrap(rule, source_name, &e))?;
            (rule.clone(), outcome)
        }
        SourceHandle::Table(table) => {
            let (relation, effective) = coerce_if_needed(rule, table)
                .await
                .map_err(|e| wrap(rule, source_name, &e))?;
            let outcome = table
                .run_check(&relation, &effective)
                .await
                .map_err(|e| wrap(&effective, source_name, &e))?;
            (effective, outcome)
        }
    };

    persist(store, source_name, &effective, &outcome)?;

    if let Some(error) = &outcome.error {
        warn!(kind = %rule.kind, source = source_name, error, "check hit an evaluation fault");
    } else {
        info!(
            kind = %rule.kind,
            source = source_name,
            passed = outcome.passed,
            "check executed"
        );
    }
    Ok(outcome)
}

/// The regex type-coercion special case.
///
/// Pattern checks are defined over text; when the target column's declared
/// type is not text-family, the check runs against a scoped view that
/// widens the column instead of failing with a type error.
async fn coerce_if_needed(
    rule: &Rule,
    table: &TableSource,
) -> Result<(String, Rule), EngineError> {
    if rule.kind != CheckKind::ColumnValuesToMatchRegex {
        return Ok((table.name().to_string(), rule.clone()));
    }
    let Some(column) = rule.column() else {
        return Ok((table.name().to_string(), rule.clone()));
    };
    let declared = table.column_type(column).await?;
    match declared {
        Some(declared) if !is_text_type(&declared) => {
            let cast = table.ensure_cast_view(column).await?;
            Ok((cast.view, rule.with_column(&cast.column)))
        }
        _ => Ok((table.name().to_string(), rule.clone())),
    }
}

fn wrap(rule: &Rule, source: &str, error: &EngineError) -> DispatchError {
    DispatchError::execution(rule.kind, source, rule.column(), error)
}

fn persist(
    store: &ReportStore,
    source: &str,
    rule: &Rule,
    outcome: &CheckOutcome,
) -> Result<(), DispatchError> {
    let persist_error = |cause: anyhow::Error| DispatchError::Persist {
        source: source.to_string(),
        cause,
    };
    store.upsert_check(source, rule).map_err(persist_error)?;
    store.record_outcome(source, outcome).map_err(persist_error)?;
    let docs = store.write_docs(source).map_err(persist_error)?;
    info!(source, docs = %docs.display(), "artifacts updated");
    Ok(())
}
