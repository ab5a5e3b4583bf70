//! Relational check engine over live Postgres tables.
//!
//! Checks run in SQL against the current contents of the table. Values are
//! bound as parameters; identifiers (which cannot be bound) are always
//! routed through [`quote_ident`], so model-derived column names can never
//! smuggle SQL into a statement.

use std::collections::BTreeSet;

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{debug, info};

use dq_model::{CheckKind, CheckOutcome, Rule, SourceSchema, UNEXPECTED_SAMPLE_LIMIT};

use crate::checks;
use crate::error::EngineError;

/// Declared types that the text-pattern check can run on directly.
const TEXT_TYPES: [&str; 3] = ["text", "character varying", "varchar"];

/// True when a catalog-declared type is already text-family.
pub fn is_text_type(declared: &str) -> bool {
    TEXT_TYPES.contains(&declared.trim().to_ascii_lowercase().as_str())
}

/// Deterministic name of the coercion view for one table/column pair.
///
/// Derived only from the pair, so a re-run overwrites the previous view
/// instead of accumulating new ones.
pub fn cast_view_name(table: &str, column: &str) -> String {
    format!("dq_cast_{table}_{column}")
}

/// Double-quote an identifier, doubling any embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Open a connection pool against `DATABASE_URL`-style connection string.
pub async fn connect(database_url: &str) -> Result<PgPool, EngineError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// All base tables in the public schema, sorted.
pub async fn list_tables(pool: &PgPool) -> Result<Vec<String>, EngineError> {
    let tables = sqlx::query_scalar::<_, String>(
        "SELECT table_name FROM information_schema.tables \
         WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
         ORDER BY table_name",
    )
    .fetch_all(pool)
    .await?;
    Ok(tables)
}

/// The coercion view created for a regex check on a non-text column.
#[derive(Debug, Clone)]
pub struct CastView {
    /// View name to run the check against instead of the base table.
    pub view: String,
    /// Name of the text-cast column inside the view.
    pub column: String,
}

/// A named Postgres table bound for the current interaction.
#[derive(Debug, Clone)]
pub struct TableSource {
    name: String,
    pool: PgPool,
}

impl TableSource {
    pub fn new(name: impl Into<String>, pool: PgPool) -> Self {
        Self {
            name: name.into(),
            pool,
        }
    }

    /// Resolve a user-selected table name against the live catalog,
    /// case-insensitively.
    pub async fn resolve(pool: PgPool, requested: &str) -> Result<Self, EngineError> {
        let tables = list_tables(&pool).await?;
        let name = tables
            .iter()
            .find(|table| table.eq_ignore_ascii_case(requested))
            .cloned()
            .ok_or_else(|| EngineError::TableNotFound {
                table: requested.to_string(),
                available: tables.clone(),
            })?;
        Ok(Self::new(name, pool))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names with declared types, in ordinal order.
    pub async fn columns(&self) -> Result<Vec<(String, String)>, EngineError> {
        let rows = sqlx::query(
            "SELECT column_name, data_type FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = $1 \
             ORDER BY ordinal_position",
        )
        .bind(&self.name)
        .fetch_all(&self.pool)
        .await?;
        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            columns.push((row.try_get::<String, _>(0)?, row.try_get::<String, _>(1)?));
        }
        Ok(columns)
    }

    pub async fn schema(&self) -> Result<SourceSchema, EngineError> {
        let mut schema = SourceSchema::new(&self.name);
        for (name, declared_type) in self.columns().await? {
            schema = schema.with_column(name, declared_type);
        }
        Ok(schema)
    }

    /// Declared type of one column, from the catalog.
    pub async fn column_type(&self, column: &str) -> Result<Option<String>, EngineError> {
        let declared = sqlx::query_scalar::<_, String>(
            "SELECT data_type FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = $1 \
             AND lower(column_name) = lower($2)",
        )
        .bind(&self.name)
        .bind(column)
        .fetch_optional(&self.pool)
        .await?;
        Ok(declared)
    }

    /// Create (or replace) the scoped view that widens `column` to text.
    ///
    /// A stale view under the same name is dropped first; failure of that
    /// cleanup is expected when the view never existed and is not an error.
    pub async fn ensure_cast_view(&self, column: &str) -> Result<CastView, EngineError> {
        let view = cast_view_name(&self.name, column);
        let cast_column = format!("{column}_text");

        let drop_sql = format!("DROP VIEW IF EXISTS {}", quote_ident(&view));
        if let Err(error) = sqlx::query(&drop_sql).execute(&self.pool).await {
            debug!(view, %error, "stale cast view cleanup failed");
        }

        let create_sql = format!(
            "CREATE OR REPLACE VIEW {} AS SELECT *, CAST({} AS TEXT) AS {} FROM {}",
            quote_ident(&view),
            quote_ident(column),
            quote_ident(&cast_column),
            quote_ident(&self.name),
        );
        sqlx::query(&create_sql).execute(&self.pool).await?;
        info!(table = %self.name, column, view, "created text-cast view for regex check");

        Ok(CastView {
            view,
            column: cast_column,
        })
    }

    /// First `limit` rows with every column rendered as text.
    pub async fn preview(&self, limit: usize) -> Result<(Vec<String>, Vec<Vec<String>>), EngineError> {
        let columns = self.columns().await?;
        let names: Vec<String> = columns.into_iter().map(|(name, _)| name).collect();
        let select_list = names
            .iter()
            .map(|name| format!("CAST({} AS TEXT)", quote_ident(name)))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {select_list} FROM {} LIMIT {limit}",
            quote_ident(&self.name)
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            let mut rendered = Vec::with_capacity(names.len());
            for idx in 0..names.len() {
                rendered.push(row.try_get::<Option<String>, _>(idx)?.unwrap_or_default());
            }
            data.push(rendered);
        }
        Ok((names, data))
    }

    /// Evaluate one validated rule against `relation` (the base table, or
    /// the coercion view for a rewritten regex check).
    pub async fn run_check(&self, relation: &str, rule: &Rule) -> Result<CheckOutcome, EngineError> {
        if rule.kind.is_table_level() {
            return self.table_check(rule).await;
        }
        let column = rule
            .column()
            .ok_or_else(|| EngineError::parameter("column", "a column name is required"))?;
        let rel = quote_ident(relation);
        let col = quote_ident(column);

        match rule.kind {
            CheckKind::ColumnValuesToBeNull => {
                let total = self.scalar_i64(&format!("SELECT COUNT(*) FROM {rel}")).await?;
                let unexpected = self
                    .scalar_i64(&format!(
                        "SELECT COUNT(*) FROM {rel} WHERE {col} IS NOT NULL"
                    ))
                    .await?;
                let samples = self
                    .sample_strings(&format!(
                        "SELECT CAST({col} AS TEXT) FROM {rel} WHERE {col} IS NOT NULL \
                         LIMIT {UNEXPECTED_SAMPLE_LIMIT}"
                    ))
                    .await?;
                Ok(CheckOutcome::from_counts(
                    rule,
                    total as u64,
                    unexpected as u64,
                    samples,
                ))
            }
            CheckKind::ColumnValuesToNotBeNull => {
                let total = self.scalar_i64(&format!("SELECT COUNT(*) FROM {rel}")).await?;
                let unexpected = self
                    .scalar_i64(&format!("SELECT COUNT(*) FROM {rel} WHERE {col} IS NULL"))
                    .await?;
                Ok(CheckOutcome::from_counts(
                    rule,
                    total as u64,
                    unexpected as u64,
                    Vec::new(),
                ))
            }
            CheckKind::ColumnValuesToBeInSet | CheckKind::ColumnValuesToNotBeInSet => {
                let expected: Vec<String> = checks::expected_set(rule, "value_set")?
                    .into_iter()
                    .collect();
                let predicate = if rule.kind == CheckKind::ColumnValuesToBeInSet {
                    format!("NOT (CAST({col} AS TEXT) = ANY($1))")
                } else {
                    format!("CAST({col} AS TEXT) = ANY($1)")
                };
                let element = self.non_null_count(&rel, &col).await?;
                let unexpected = sqlx::query_scalar::<_, i64>(&format!(
                    "SELECT COUNT(*) FROM {rel} WHERE {col} IS NOT NULL AND {predicate}"
                ))
                .bind(&expected)
                .fetch_one(&self.pool)
                .await?;
                let samples = sqlx::query_scalar::<_, String>(&format!(
                    "SELECT CAST({col} AS TEXT) FROM {rel} WHERE {col} IS NOT NULL AND \
                     {predicate} LIMIT {UNEXPECTED_SAMPLE_LIMIT}"
                ))
                .bind(&expected)
                .fetch_all(&self.pool)
                .await?;
                Ok(CheckOutcome::from_counts(
                    rule,
                    element as u64,
                    unexpected as u64,
                    samples,
                ))
            }
            CheckKind::ColumnValuesToBeBetween => {
                let target = format!("CAST({col} AS DOUBLE PRECISION)");
                self.bounded_value_check(rule, &rel, &col, &target).await
            }
            CheckKind::ColumnValueLengthsToBeBetween => {
                let target = format!("LENGTH(CAST({col} AS TEXT))");
                self.bounded_value_check(rule, &rel, &col, &target).await
            }
            CheckKind::ColumnValueLengthsToEqual => {
                let expected = rule
                    .integer("value")
                    .ok_or_else(|| EngineError::parameter("value", "an integer is required"))?;
                let element = self.non_null_count(&rel, &col).await?;
                let predicate = format!("LENGTH(CAST({col} AS TEXT)) <> $1");
                let unexpected = sqlx::query_scalar::<_, i64>(&format!(
                    "SELECT COUNT(*) FROM {rel} WHERE {col} IS NOT NULL AND {predicate}"
                ))
                .bind(expected)
                .fetch_one(&self.pool)
                .await?;
                let samples = sqlx::query_scalar::<_, String>(&format!(
                    "SELECT CAST({col} AS TEXT) FROM {rel} WHERE {col} IS NOT NULL AND \
                     {predicate} LIMIT {UNEXPECTED_SAMPLE_LIMIT}"
                ))
                .bind(expected)
                .fetch_all(&self.pool)
                .await?;
                Ok(CheckOutcome::from_counts(
                    rule,
                    element as u64,
                    unexpected as u64,
                    samples,
                ))
            }
            CheckKind::ColumnValuesToMatchRegex => {
                let pattern = rule
                    .string("regex")
                    .ok_or_else(|| EngineError::parameter("regex", "a pattern is required"))?;
                let element = self.non_null_count(&rel, &col).await?;
                let predicate = format!("NOT ({col} ~ $1)");
                let unexpected = sqlx::query_scalar::<_, i64>(&format!(
                    "SELECT COUNT(*) FROM {rel} WHERE {col} IS NOT NULL AND {predicate}"
                ))
                .bind(pattern)
                .fetch_one(&self.pool)
                .await?;
                let samples = sqlx::query_scalar::<_, String>(&format!(
                    "SELECT CAST({col} AS TEXT) FROM {rel} WHERE {col} IS NOT NULL AND \
                     {predicate} LIMIT {UNEXPECTED_SAMPLE_LIMIT}"
                ))
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?;
                Ok(CheckOutcome::from_counts(
                    rule,
                    element as u64,
                    unexpected as u64,
                    samples,
                ))
            }
            CheckKind::ColumnValuesToBeUnique => {
                let element = self.non_null_count(&rel, &col).await?;
                let unexpected = self
                    .scalar_i64(&format!(
                        "SELECT COALESCE(SUM(cnt), 0) FROM (SELECT COUNT(*) AS cnt FROM {rel} \
                         WHERE {col} IS NOT NULL GROUP BY {col} HAVING COUNT(*) > 1) AS dup"
                    ))
                    .await?;
                let samples = self
                    .sample_strings(&format!(
                        "SELECT CAST({col} AS TEXT) FROM {rel} WHERE {col} IS NOT NULL \
                         GROUP BY {col} HAVING COUNT(*) > 1 LIMIT {UNEXPECTED_SAMPLE_LIMIT}"
                    ))
                    .await?;
                Ok(CheckOutcome::from_counts(
                    rule,
                    element as u64,
                    unexpected as u64,
                    samples,
                ))
            }
            CheckKind::ColumnMeanToBeBetween
            | CheckKind::ColumnMedianToBeBetween
            | CheckKind::ColumnMinToBeBetween
            | CheckKind::ColumnMaxToBeBetween
            | CheckKind::ColumnSumToBeBetween
            | CheckKind::ColumnStdevToBeBetween
            | CheckKind::ColumnQuantileToBeBetween => {
                self.aggregate_check(rule, &rel, &col).await
            }
            CheckKind::ColumnUniqueValueCountToBeBetween => {
                let observed = self
                    .scalar_i64(&format!("SELECT COUNT(DISTINCT {col}) FROM {rel}"))
                    .await?;
                Ok(checks::count_between(rule, observed as u64))
            }
            CheckKind::ColumnProportionOfUniqueValuesToBeBetween => {
                let observed = sqlx::query_scalar::<_, Option<f64>>(&format!(
                    "SELECT COUNT(DISTINCT {col})::DOUBLE PRECISION / NULLIF(COUNT({col}), 0) \
                     FROM {rel}"
                ))
                .fetch_one(&self.pool)
                .await?;
                match observed {
                    Some(observed) => Ok(checks::aggregate_between(rule, observed)),
                    None => Ok(CheckOutcome::from_evaluation_error(
                        rule,
                        "column has no non-null values",
                    )),
                }
            }
            CheckKind::ColumnDistinctValuesToBeInSet
            | CheckKind::ColumnDistinctValuesToContainSet
            | CheckKind::ColumnDistinctValuesToEqualSet => {
                let observed: BTreeSet<String> = self
                    .sample_strings(&format!(
                        "SELECT DISTINCT CAST({col} AS TEXT) FROM {rel} \
                         WHERE {col} IS NOT NULL ORDER BY 1"
                    ))
                    .await?
                    .into_iter()
                    .collect();
                checks::distinct_set(rule, observed)
            }
            _ => unreachable!("table-level kinds handled above"),
        }
    }

    async fn table_check(&self, rule: &Rule) -> Result<CheckOutcome, EngineError> {
        match rule.kind {
            CheckKind::TableRowCountToBeBetween | CheckKind::TableRowCountToEqual => {
                let observed = self
                    .scalar_i64(&format!("SELECT COUNT(*) FROM {}", quote_ident(&self.name)))
                    .await? as u64;
                if rule.kind == CheckKind::TableRowCountToBeBetween {
                    Ok(checks::count_between(rule, observed))
                } else {
                    checks::count_equals(rule, observed)
                }
            }
            CheckKind::TableColumnCountToBeBetween | CheckKind::TableColumnCountToEqual => {
                let observed = self.columns().await?.len() as u64;
                if rule.kind == CheckKind::TableColumnCountToBeBetween {
                    Ok(checks::count_between(rule, observed))
                } else {
                    checks::count_equals(rule, observed)
                }
            }
            CheckKind::TableColumnsToMatchOrderedList => {
                let names: Vec<String> = self
                    .columns()
                    .await?
                    .into_iter()
                    .map(|(name, _)| name)
                    .collect();
                checks::columns_ordered(rule, &names)
            }
            CheckKind::TableColumnsToMatchSet => {
                let names: Vec<String> = self
                    .columns()
                    .await?
                    .into_iter()
                    .map(|(name, _)| name)
                    .collect();
                checks::columns_set(rule, &names)
            }
            other => Err(EngineError::parameter(
                "kind",
                format!("{other} is not a table-level check"),
            )),
        }
    }

    /// Shared body for range checks whose target expression differs
    /// (numeric cast vs text length).
    async fn bounded_value_check(
        &self,
        rule: &Rule,
        rel: &str,
        col: &str,
        target: &str,
    ) -> Result<CheckOutcome, EngineError> {
        let (min, max) = rule.bounds();
        let element = self.non_null_count(rel, col).await?;
        let predicate = match (min, max) {
            (Some(_), Some(_)) => format!("NOT ({target} >= $1 AND {target} <= $2)"),
            (Some(_), None) => format!("NOT ({target} >= $1)"),
            (None, Some(_)) => format!("NOT ({target} <= $1)"),
            (None, None) => {
                // No bounds: every value is trivially in range.
                return Ok(CheckOutcome::from_counts(
                    rule,
                    element as u64,
                    0,
                    Vec::new(),
                ));
            }
        };

        let count_sql =
            format!("SELECT COUNT(*) FROM {rel} WHERE {col} IS NOT NULL AND {predicate}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for bound in [min, max].into_iter().flatten() {
            count_query = count_query.bind(bound);
        }
        let unexpected = count_query.fetch_one(&self.pool).await?;

        let sample_sql = format!(
            "SELECT CAST({col} AS TEXT) FROM {rel} WHERE {col} IS NOT NULL AND {predicate} \
             LIMIT {UNEXPECTED_SAMPLE_LIMIT}"
        );
        let mut sample_query = sqlx::query_scalar::<_, String>(&sample_sql);
        for bound in [min, max].into_iter().flatten() {
            sample_query = sample_query.bind(bound);
        }
        let samples = sample_query.fetch_all(&self.pool).await?;

        Ok(CheckOutcome::from_counts(
            rule,
            element as u64,
            unexpected as u64,
            samples,
        ))
    }

    async fn aggregate_check(
        &self,
        rule: &Rule,
        rel: &str,
        col: &str,
    ) -> Result<CheckOutcome, EngineError> {
        let target = format!("CAST({col} AS DOUBLE PRECISION)");
        let mut quantile = None;
        let expr = match rule.kind {
            CheckKind::ColumnMeanToBeBetween => format!("AVG({target})"),
            CheckKind::ColumnMedianToBeBetween => {
                format!("PERCENTILE_CONT(0.5) WITHIN GROUP (ORDER BY {target})")
            }
            CheckKind::ColumnQuantileToBeBetween => {
                let q = rule
                    .number("quantile")
                    .ok_or_else(|| EngineError::parameter("quantile", "a number is required"))?;
                if !(0.0..=1.0).contains(&q) {
                    return Err(EngineError::parameter("quantile", "must be between 0 and 1"));
                }
                quantile = Some(q);
                format!("PERCENTILE_CONT($1) WITHIN GROUP (ORDER BY {target})")
            }
            CheckKind::ColumnMinToBeBetween => format!("MIN({target})"),
            CheckKind::ColumnMaxToBeBetween => format!("MAX({target})"),
            CheckKind::ColumnSumToBeBetween => format!("SUM({target})"),
            CheckKind::ColumnStdevToBeBetween => format!("STDDEV_SAMP({target})"),
            other => {
                return Err(EngineError::parameter(
                    "kind",
                    format!("{other} is not an aggregate check"),
                ));
            }
        };

        let sql = format!("SELECT {expr} FROM {rel} WHERE {col} IS NOT NULL");
        let mut query = sqlx::query_scalar::<_, Option<f64>>(&sql);
        if let Some(q) = quantile {
            query = query.bind(q);
        }
        match query.fetch_one(&self.pool).await? {
            Some(observed) => Ok(checks::aggregate_between(rule, observed)),
            None => Ok(CheckOutcome::from_evaluation_error(
                rule,
                "aggregate is undefined for this column's current values",
            )),
        }
    }

    async fn non_null_count(&self, rel: &str, col: &str) -> Result<i64, EngineError> {
        self.scalar_i64(&format!(
            "SELECT COUNT(*) FROM {rel} WHERE {col} IS NOT NULL"
        ))
        .await
    }

    async fn scalar_i64(&self, sql: &str) -> Result<i64, EngineError> {
        let value = sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(value)
    }

    async fn sample_strings(&self, sql: &str) -> Result<Vec<String>, EngineError> {
        let values = sqlx::query_scalar::<_, String>(sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(values)
    }
}
