//! Rule generation: natural language in, candidate rule JSON out.

use tracing::{debug, info};

use dq_model::{CheckKind, SchemaSummary};

use crate::client::ChatClient;
use crate::error::GenerationError;

/// Turns a free-text check description plus a schema summary into a raw
/// model reply containing (hopefully) one rule object.
pub struct RuleGenerator {
    client: ChatClient,
}

impl RuleGenerator {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    pub fn from_env() -> Result<Self, GenerationError> {
        Ok(Self::new(ChatClient::from_env()?))
    }

    /// One chat request, full reply awaited. The reply is returned raw;
    /// sanitization and validation are separate steps.
    pub async fn generate(
        &self,
        description: &str,
        schema: &SchemaSummary,
    ) -> Result<String, GenerationError> {
        let instruction = build_instruction(schema);
        debug!(
            instruction_bytes = instruction.len(),
            "generating rule from description"
        );
        let reply = self.client.chat(&instruction, description).await?;
        info!(
            model = %self.client.model(),
            reply_bytes = reply.len(),
            "received generation reply"
        );
        Ok(reply)
    }
}

/// Assemble the fixed system instruction for rule generation.
///
/// The allow-list is restated verbatim from [`CheckKind::ALL`] so this
/// prompt can never drift from what the validator accepts.
pub fn build_instruction(schema: &SchemaSummary) -> String {
    let kinds_list = CheckKind::ALL
        .iter()
        .map(|kind| {
            let required = kind.required_parameters();
            if required.is_empty() {
                format!("- {kind}")
            } else {
                format!("- {kind} (requires: {})", required.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    let schema_block = render_schema_block(schema);

    format!(
        r#"You are an expert in tabular data quality. Convert the user's natural
language description of a data quality check into a single JSON rule object.

ONLY output the JSON object, nothing else. Produce ONE rule per request.

Output shape:
{{"kind": "<check kind>", "parameters": {{...}}}}

JSON formatting rules:
- Valid JSON with double quotes for all keys and strings
- For a missing or unlimited bound, use null (never None, undefined, or "")
- Example: {{"max_value": null}} not {{"max_value": None}}

Regex guidelines:
- Use expect_column_values_to_match_regex only for text pattern matching
- For numeric columns prefer expect_column_values_to_be_between or another
  numeric check
- Regex patterns must be valid POSIX regular expressions

Use ONLY these check kinds:
{kinds_list}

Available sources and their columns:
{schema_block}

Example input: 'Column price should be between 0 and 2000000.'
Example output: {{"kind": "expect_column_values_to_be_between", "parameters": {{"column": "price", "min_value": 0, "max_value": 2000000}}}}

Example input: 'Column price should be greater than 0.'
Example output: {{"kind": "expect_column_values_to_be_between", "parameters": {{"column": "price", "min_value": 0, "max_value": null}}}}

Example input: 'Column status must be one of [COMPLETED, PENDING, SHIPPED]'
Example output: {{"kind": "expect_column_values_to_be_in_set", "parameters": {{"column": "status", "value_set": ["COMPLETED", "PENDING", "SHIPPED"]}}}}

Example input: 'Column email should match email format'
Example output: {{"kind": "expect_column_values_to_match_regex", "parameters": {{"column": "email", "regex": "^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\\.[a-zA-Z]{{2,}}$"}}}}

Use the exact check kind names as listed above, and column names exactly as
they appear in the schema."#
    )
}

fn render_schema_block(schema: &SchemaSummary) -> String {
    if schema.is_empty() {
        return "  (no schema available; trust the user's column names)".to_string();
    }
    schema
        .sources
        .iter()
        .map(|source| {
            let columns = source
                .columns
                .iter()
                .map(|column| format!("{} ({})", column.name, column.declared_type))
                .collect::<Vec<_>>()
                .join(", ");
            format!("  - {}: {}", source.name, columns)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
