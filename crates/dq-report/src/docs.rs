//! Data-docs HTML rendering.
//!
//! One static page per source: the registered suite and the latest result
//! per check. Regenerated wholesale after every dispatch.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::store::{Suite, ValidationLog};

const PAGE_STYLE: &str = "body{font-family:sans-serif;margin:2rem;}\
table{border-collapse:collapse;width:100%;}\
th,td{border:1px solid #ccc;padding:0.4rem 0.6rem;text-align:left;vertical-align:top;}\
th{background:#f0f0f0;}\
.pass{color:#1a7f37;font-weight:bold;}\
.fail{color:#b00020;font-weight:bold;}\
.error{color:#8a6d00;font-weight:bold;}";

/// Render the docs page for one source.
pub fn render_docs(path: &Path, source: &str, suite: &Suite, log: &ValidationLog) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut html = Writer::new(BufWriter::new(file));

    start(&mut html, "html")?;
    start(&mut html, "head")?;
    text_element(&mut html, "title", &format!("Data docs: {source}"))?;
    text_element(&mut html, "style", PAGE_STYLE)?;
    end(&mut html, "head")?;
    start(&mut html, "body")?;

    text_element(&mut html, "h1", &format!("Data quality docs: {source}"))?;
    let generated = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    text_element(&mut html, "p", &format!("Generated at {generated}"))?;

    text_element(&mut html, "h2", "Latest results")?;
    if log.results.is_empty() {
        text_element(&mut html, "p", "No checks have been run yet.")?;
    } else {
        start(&mut html, "table")?;
        start(&mut html, "tr")?;
        for header in ["Check", "Status", "Observed", "Details", "Run at"] {
            text_element(&mut html, "th", header)?;
        }
        end(&mut html, "tr")?;
        for (name, recorded) in &log.results {
            start(&mut html, "tr")?;
            text_element(&mut html, "td", name)?;

            let (class, label) = if recorded.outcome.error.is_some() {
                ("error", "ERROR")
            } else if recorded.outcome.passed {
                ("pass", "PASS")
            } else {
                ("fail", "FAIL")
            };
            let mut cell = BytesStart::new("td");
            cell.push_attribute(("class", class));
            html.write_event(Event::Start(cell))?;
            html.write_event(Event::Text(BytesText::new(label)))?;
            end(&mut html, "td")?;

            let observed = recorded
                .outcome
                .observed_value
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            text_element(&mut html, "td", &observed)?;

            let details = if let Some(error) = &recorded.outcome.error {
                error.clone()
            } else {
                recorded
                    .outcome
                    .details
                    .iter()
                    .map(|(key, value)| format!("{key}={value}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            text_element(&mut html, "td", &details)?;
            text_element(&mut html, "td", &recorded.run_at)?;
            end(&mut html, "tr")?;
        }
        end(&mut html, "table")?;
    }

    text_element(&mut html, "h2", "Registered checks")?;
    if suite.checks.is_empty() {
        text_element(&mut html, "p", "The suite is empty.")?;
    } else {
        start(&mut html, "table")?;
        start(&mut html, "tr")?;
        for header in ["Check", "Kind", "Parameters"] {
            text_element(&mut html, "th", header)?;
        }
        end(&mut html, "tr")?;
        for (name, rule) in &suite.checks {
            start(&mut html, "tr")?;
            text_element(&mut html, "td", name)?;
            text_element(&mut html, "td", rule.kind.as_str())?;
            let parameters = serde_json::to_string(&rule.parameters).unwrap_or_default();
            text_element(&mut html, "td", &parameters)?;
            end(&mut html, "tr")?;
        }
        end(&mut html, "table")?;
    }

    end(&mut html, "body")?;
    end(&mut html, "html")?;
    Ok(())
}

fn start<W: std::io::Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn end<W: std::io::Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn text_element<W: std::io::Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
