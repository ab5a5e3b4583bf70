use std::path::PathBuf;

use dq_model::CheckOutcome;

/// Everything the CLI needs to render one completed check.
#[derive(Debug)]
pub struct CheckReport {
    pub source: String,
    pub outcome: CheckOutcome,
    pub docs: PathBuf,
}
