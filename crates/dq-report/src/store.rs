//! Durable artifacts for check suites and validation results.
//!
//! Everything is keyed by the stable check name, so re-running a check
//! overwrites its artifacts instead of accumulating copies. Writes go
//! through a sibling temp file and rename so a crash never leaves a
//! half-written JSON document behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use dq_model::{CheckOutcome, Rule};

/// The checks registered for one source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Suite {
    pub source: String,
    #[serde(default)]
    pub checks: BTreeMap<String, Rule>,
}

/// One recorded execution of a named check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedOutcome {
    pub run_at: String,
    pub outcome: CheckOutcome,
}

/// The latest outcome per check name for one source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationLog {
    pub source: String,
    #[serde(default)]
    pub results: BTreeMap<String, RecordedOutcome>,
}

/// File-system store rooted at one directory:
/// `suites/`, `validations/` and `docs/` per-source documents.
#[derive(Debug, Clone)]
pub struct ReportStore {
    root: PathBuf,
}

impl ReportStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        for sub in ["suites", "validations", "docs"] {
            std::fs::create_dir_all(root.join(sub))
                .with_context(|| format!("create {}", root.join(sub).display()))?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Register (or overwrite) a rule in the source's suite; returns the
    /// check name it was stored under.
    pub fn upsert_check(&self, source: &str, rule: &Rule) -> Result<String> {
        let mut suite = self.load_suite(source)?;
        suite.source = source.to_string();
        let name = rule.check_name();
        suite.checks.insert(name.clone(), rule.clone());
        write_json(&self.suite_path(source), &suite)?;
        debug!(source, check = %name, "suite updated");
        Ok(name)
    }

    /// Record the latest outcome for the check that produced it.
    pub fn record_outcome(&self, source: &str, outcome: &CheckOutcome) -> Result<()> {
        let mut log = self.load_validations(source)?;
        log.source = source.to_string();
        log.results.insert(
            outcome.check_name(),
            RecordedOutcome {
                run_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                outcome: outcome.clone(),
            },
        );
        write_json(&self.validations_path(source), &log)
    }

    pub fn load_suite(&self, source: &str) -> Result<Suite> {
        read_json(&self.suite_path(source))
    }

    pub fn load_validations(&self, source: &str) -> Result<ValidationLog> {
        read_json(&self.validations_path(source))
    }

    /// Regenerate the source's data-docs page from the stored suite and
    /// results; returns the page path.
    pub fn write_docs(&self, source: &str) -> Result<PathBuf> {
        let suite = self.load_suite(source)?;
        let log = self.load_validations(source)?;
        let path = self.docs_path(source);
        crate::docs::render_docs(&path, source, &suite, &log)?;
        Ok(path)
    }

    fn suite_path(&self, source: &str) -> PathBuf {
        self.root
            .join("suites")
            .join(format!("{}.json", file_key(source)))
    }

    fn validations_path(&self, source: &str) -> PathBuf {
        self.root
            .join("validations")
            .join(format!("{}.json", file_key(source)))
    }

    fn docs_path(&self, source: &str) -> PathBuf {
        self.root
            .join("docs")
            .join(format!("{}.html", file_key(source)))
    }
}

/// Source names come from file stems and table names; anything outside
/// `[A-Za-z0-9._-]` is flattened so it stays a safe file name.
fn file_key(source: &str) -> String {
    source
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn read_json<T: Default + for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let data =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parse {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_string_pretty(value).context("serialize artifact")?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, data).with_context(|| format!("write {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_key_flattens_awkward_names() {
        assert_eq!(file_key("orders"), "orders");
        assert_eq!(file_key("sales 2024/Q1"), "sales_2024_Q1");
    }
}
