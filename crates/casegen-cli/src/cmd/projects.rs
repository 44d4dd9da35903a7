use crate::output::{print_json, print_table};
use anyhow::{bail, Context};
use casegen_core::config::Config;
use casegen_core::export;
use casegen_core::filter::RecordFilter;
use casegen_core::record::{group_by_title, ProjectRecord, ProjectStore};
use casegen_core::types::TestType;
use clap::Subcommand;
use std::path::Path;

const PREVIEW_CHARS: usize = 400;

#[derive(Subcommand)]
pub enum ProjectsSubcommand {
    /// List saved projects grouped by title, newest version first
    List {
        /// Owner email whose projects to show
        #[arg(long, env = "CASEGEN_OWNER")]
        owner: String,
    },
    /// Show one saved version
    Show {
        #[arg(long, env = "CASEGEN_OWNER")]
        owner: String,
        #[arg(long)]
        title: String,
        /// Version timestamp (YYYY-MM-DD_HH-MM-SS)
        #[arg(long)]
        timestamp: String,
    },
    /// Filter saved projects by keyword, title and test type
    Search {
        #[arg(long, env = "CASEGEN_OWNER")]
        owner: String,
        /// Case-insensitive keyword matched against output and title
        #[arg(long, short = 'q')]
        query: Option<String>,
        /// Case-insensitive title substring
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        test_type: Option<String>,
    },
    /// Write a saved version's output to stdout as txt or csv
    Export {
        #[arg(long, env = "CASEGEN_OWNER")]
        owner: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        timestamp: String,
        #[arg(long, default_value = "txt")]
        format: String,
    },
}

pub fn run(root: &Path, subcmd: ProjectsSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to read config.yaml")?;
    let store = ProjectStore::from_config(root, &config);
    match subcmd {
        ProjectsSubcommand::List { owner } => list(&store, &owner, json),
        ProjectsSubcommand::Show {
            owner,
            title,
            timestamp,
        } => show(&store, &owner, &title, &timestamp, json),
        ProjectsSubcommand::Search {
            owner,
            query,
            title,
            test_type,
        } => search(&store, &owner, query, title, test_type.as_deref(), json),
        ProjectsSubcommand::Export {
            owner,
            title,
            timestamp,
            format,
        } => export_one(&store, &owner, &title, &timestamp, &format),
    }
}

fn load_owned(
    store: &ProjectStore,
    owner: &str,
    title: &str,
    timestamp: &str,
) -> anyhow::Result<ProjectRecord> {
    let record = store.load(title, timestamp)?;
    if record.author_email != owner {
        bail!("project not found: {title} @ {timestamp}");
    }
    Ok(record)
}

fn list(store: &ProjectStore, owner: &str, json: bool) -> anyhow::Result<()> {
    let records = store.list(owner).context("failed to list projects")?;
    let groups = group_by_title(records);

    if json {
        let out: Vec<_> = groups
            .iter()
            .map(|(title, versions)| {
                serde_json::json!({
                    "title": title,
                    "versions": versions.iter().map(|(ts, _)| ts).collect::<Vec<_>>(),
                })
            })
            .collect();
        return print_json(&out);
    }

    if groups.is_empty() {
        println!("No saved projects for {owner}.");
        return Ok(());
    }
    let rows = groups
        .iter()
        .flat_map(|(title, versions)| {
            versions.iter().map(move |(ts, r)| {
                vec![
                    title.clone(),
                    ts.clone(),
                    r.test_type.to_string(),
                    r.format_type.to_string(),
                    r.author.clone(),
                ]
            })
        })
        .collect();
    print_table(&["TITLE", "TIMESTAMP", "TYPE", "FORMAT", "AUTHOR"], rows);
    Ok(())
}

fn show(
    store: &ProjectStore,
    owner: &str,
    title: &str,
    timestamp: &str,
    json: bool,
) -> anyhow::Result<()> {
    let record = load_owned(store, owner, title, timestamp)?;
    if json {
        return print_json(&record);
    }
    println!("Title:     {}", record.title);
    println!("Author:    {} <{}>", record.author, record.author_email);
    println!("Timestamp: {}", record.timestamp);
    println!("Test type: {}", record.test_type);
    println!("Format:    {}", record.format_type);
    if let Some(fw) = record.framework {
        println!("Framework: {fw}");
    }
    if let Some(style) = record.style {
        println!("Style:     {style}");
    }
    println!();
    println!("{}", record.output);
    Ok(())
}

fn search(
    store: &ProjectStore,
    owner: &str,
    query: Option<String>,
    title: Option<String>,
    test_type: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let test_type = test_type
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::parse::<TestType>)
        .transpose()?;
    let filter = RecordFilter {
        title,
        test_type,
        keyword: query,
    };
    let hits = filter.apply(store.list(owner).context("failed to list projects")?);

    if json {
        let out: Vec<_> = hits
            .iter()
            .map(|r| {
                serde_json::json!({
                    "title": r.title,
                    "timestamp": r.timestamp,
                    "test_type": r.test_type,
                    "preview": export::preview(&r.output, PREVIEW_CHARS),
                })
            })
            .collect();
        return print_json(&out);
    }

    if hits.is_empty() {
        println!("No matching projects.");
        return Ok(());
    }
    for r in &hits {
        println!("{} @ {} ({})", r.title, r.timestamp, r.test_type);
        println!("{}", export::preview(&r.output, PREVIEW_CHARS));
        println!();
    }
    Ok(())
}

fn export_one(
    store: &ProjectStore,
    owner: &str,
    title: &str,
    timestamp: &str,
    format: &str,
) -> anyhow::Result<()> {
    let record = load_owned(store, owner, title, timestamp)?;
    match format.to_ascii_lowercase().as_str() {
        "txt" => print!("{}", record.output),
        "csv" => match export::to_csv(&record.output)? {
            Some(csv) => print!("{csv}"),
            None => bail!("output has no numbered test cases to export"),
        },
        other => bail!("unknown export format '{other}': expected txt or csv"),
    }
    Ok(())
}
