use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use comfy_table::Table;
use polars::prelude::AnyValue;
use tracing::{info, warn};

use dq_ingest::{any_to_string, load_frame, resolve_source, source_map};
use dq_llm::{ChatClient, ChatConfig, ChatProvider, RuleGenerator, sanitize};
use dq_model::{CheckKind, RuleError, SchemaSummary, parse_rule};
use dq_report::ReportStore;
use dq_validate::{FrameSource, SourceHandle, TableSource, connect, dispatch, list_tables};

use crate::cli::{CheckArgs, PreviewArgs, SourcesArgs};
use crate::summary::{apply_table_style, print_preview};
use crate::types::CheckReport;

pub async fn run_check(args: &CheckArgs) -> Result<CheckReport> {
    let source = open_source(
        args.file.as_deref(),
        args.table.as_deref(),
        &args.data_dir,
        args.database_url.as_deref(),
    )
    .await?;
    let store = ReportStore::open(&args.store_dir)?;

    // =========================================================================
    // Stage 1: Obtain candidate rule text (generation or direct input)
    // =========================================================================
    let raw = match (&args.describe, &args.rule_json) {
        (Some(describe), _) => {
            let generator = RuleGenerator::new(chat_client(args)?);
            let mut schema = SchemaSummary::new();
            schema.push(source.schema().await?);
            generator
                .generate(describe, &schema)
                .await
                .context("rule generation failed; check that the chat endpoint is reachable")?
        }
        (None, Some(rule_json)) => rule_json.clone(),
        (None, None) => bail!("either --describe or --rule-json is required"),
    };

    // =========================================================================
    // Stage 2: Sanitize and validate
    // =========================================================================
    let sanitized = sanitize(&raw);
    if args.show_reply {
        println!("Raw reply:\n{raw}\n");
    }
    let rule = match parse_rule(&sanitized) {
        Ok(rule) => rule,
        Err(RuleError::Malformed { reason }) => {
            eprintln!("Raw reply:\n{raw}\n");
            eprintln!("Sanitized reply:\n{sanitized}\n");
            bail!("the reply contained no usable rule object: {reason}");
        }
        Err(RuleError::UnsupportedKind { kind, allowed }) => {
            eprintln!("Supported check kinds:");
            for name in &allowed {
                eprintln!("  - {name}");
            }
            bail!("unsupported check kind {kind:?}");
        }
        Err(error @ RuleError::MissingParameters { .. }) => return Err(error.into()),
    };
    println!(
        "Generated rule:\n{}\n",
        serde_json::to_string_pretty(&rule).context("render rule")?
    );

    // =========================================================================
    // Stage 3: Dispatch and persist
    // =========================================================================
    let outcome = dispatch(&rule, &source, &store).await?;
    let docs = store.write_docs(source.name())?;

    Ok(CheckReport {
        source: source.name().to_string(),
        outcome,
        docs,
    })
}

pub async fn run_preview(args: &PreviewArgs) -> Result<()> {
    match (&args.file, &args.table) {
        (Some(file), _) => {
            let (name, path) = resolve_source(&args.data_dir, file)?;
            let frame = load_frame(&path)?;
            let head = frame.head(Some(args.limit));
            let headers: Vec<String> = head
                .get_column_names_owned()
                .into_iter()
                .map(|name| name.to_string())
                .collect();
            let mut rows = Vec::with_capacity(head.height());
            for idx in 0..head.height() {
                let mut row = Vec::with_capacity(headers.len());
                for column in head.get_columns() {
                    row.push(any_to_string(&column.get(idx).unwrap_or(AnyValue::Null)));
                }
                rows.push(row);
            }
            println!("Preview of {name} ({} of {} rows):", head.height(), frame.height());
            print_preview(&headers, &rows);
        }
        (None, Some(table)) => {
            let url = connection_string(args.database_url.as_deref())?;
            let pool = connect(&url).await?;
            let source = TableSource::resolve(pool, table).await?;
            let (headers, rows) = source.preview(args.limit).await?;
            println!("Preview of {} ({} rows):", source.name(), rows.len());
            print_preview(&headers, &rows);
        }
        _ => bail!("either --file or --table is required"),
    }
    Ok(())
}

pub async fn run_sources(args: &SourcesArgs) -> Result<()> {
    match source_map(&args.data_dir) {
        Ok(mapping) if !mapping.is_empty() => {
            let mut table = Table::new();
            table.set_header(vec!["File source", "Path"]);
            apply_table_style(&mut table);
            for (name, path) in mapping {
                table.add_row(vec![name, path.display().to_string()]);
            }
            println!("{table}");
        }
        Ok(_) => println!("No CSV sources in {}", args.data_dir.display()),
        Err(error) => warn!(%error, "file source discovery failed"),
    }

    let url = args
        .database_url
        .clone()
        .or_else(|| std::env::var("DATABASE_URL").ok());
    match url {
        Some(url) => match connect(&url).await {
            Ok(pool) => {
                let tables = list_tables(&pool).await?;
                if tables.is_empty() {
                    println!("No base tables in the public schema.");
                } else {
                    let mut table = Table::new();
                    table.set_header(vec!["Database table"]);
                    apply_table_style(&mut table);
                    for name in tables {
                        table.add_row(vec![name]);
                    }
                    println!("{table}");
                }
            }
            Err(error) => warn!(%error, "database connection failed"),
        },
        None => println!("Set DATABASE_URL (or pass --database-url) to list database tables."),
    }
    Ok(())
}

pub fn run_kinds() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Check kind", "Level", "Required parameters"]);
    apply_table_style(&mut table);
    for kind in CheckKind::ALL {
        let level = if kind.is_table_level() { "table" } else { "column" };
        table.add_row(vec![
            kind.to_string(),
            level.to_string(),
            kind.required_parameters().join(", "),
        ]);
    }
    println!("{table}");
    Ok(())
}

async fn open_source(
    file: Option<&str>,
    table: Option<&str>,
    data_dir: &Path,
    database_url: Option<&str>,
) -> Result<SourceHandle> {
    if let Some(file) = file {
        let (name, path) = resolve_source(data_dir, file)?;
        let frame = load_frame(&path)?;
        info!(source = %name, path = %path.display(), "bound file source");
        Ok(SourceHandle::Frame(FrameSource::new(name, frame)))
    } else if let Some(table) = table {
        let url = connection_string(database_url)?;
        let pool = connect(&url).await?;
        let source = TableSource::resolve(pool, table).await?;
        info!(source = %source.name(), "bound table source");
        Ok(SourceHandle::Table(source))
    } else {
        bail!("either --file or --table is required")
    }
}

fn connection_string(explicit: Option<&str>) -> Result<String> {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .context("no connection string; pass --database-url or set DATABASE_URL")
}

fn chat_client(args: &CheckArgs) -> Result<ChatClient> {
    let mut config = ChatConfig::from_env()?;
    if let Some(provider) = &args.llm_provider {
        config.provider = ChatProvider::parse(provider)
            .ok_or_else(|| anyhow!("unknown provider {provider:?} (expected ollama or openai)"))?;
    }
    if let Some(base_url) = &args.llm_base_url {
        config.base_url = base_url.clone();
    }
    if let Some(model) = &args.llm_model {
        config.model = model.clone();
    }
    Ok(ChatClient::new(config)?)
}
