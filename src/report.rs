use crate::cache::CommitStore;
use crate::cli::{CommonArgs, ReportArgs};
use crate::git::GitRepo;
use crate::model::{AuthorEntry, ReportOutput, SCHEMA_VERSION};
use crate::stats::{AggregateOptions, AuthorKey, AuthorStats, Statistics};
use anyhow::Context;
use chrono::Utc;
use console::style;
use std::path::Path;
use tracing::info;

pub fn exec(common: CommonArgs, args: ReportArgs) -> anyhow::Result<()> {
    let repo = GitRepo::open(common.repo.as_ref()).context("Failed to open git repository")?;
    let dir = common
        .cache
        .clone()
        .unwrap_or_else(|| CommitStore::default_dir(repo.path()));

    let options = AggregateOptions {
        key: if args.email { AuthorKey::Email } else { AuthorKey::Name },
        include_merges: args.merges,
    };
    let stats = aggregate(&dir, options)?;

    let ranked = stats.top_n(args.sort, args.top);
    let entries: Vec<AuthorEntry> = ranked
        .unwrap_or_default()
        .into_iter()
        .map(|(author, stats)| AuthorEntry {
            author: author.to_string(),
            stats: stats.clone(),
        })
        .collect();

    if args.json {
        output_json(&entries, repo.path(), &args)?;
    } else if args.ndjson {
        output_ndjson(&entries)?;
    } else {
        output_table(&entries, &args)?;
    }
    Ok(())
}

/// Folds every chunk under `dir` into author statistics.
pub fn aggregate(dir: &Path, options: AggregateOptions) -> anyhow::Result<Statistics> {
    let chunks = crate::cache::chunk_paths_in(dir)
        .with_context(|| format!("Failed to list chunks in {}", dir.display()))?;
    info!(chunks = chunks.len(), dir = %dir.display(), "aggregating");
    Statistics::from_chunks(&chunks, options).context("Failed to aggregate commit chunks")
}

fn output_json(entries: &[AuthorEntry], repo_path: &Path, args: &ReportArgs) -> anyhow::Result<()> {
    let output = ReportOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        repository_path: repo_path.to_string_lossy().to_string(),
        sort: args.sort.to_string(),
        by_email: args.email,
        include_merges: args.merges,
        authors: entries.to_vec(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_ndjson(entries: &[AuthorEntry]) -> anyhow::Result<()> {
    for e in entries {
        println!("{}", serde_json::to_string(e)?);
    }
    Ok(())
}

fn output_table(entries: &[AuthorEntry], args: &ReportArgs) -> anyhow::Result<()> {
    if entries.is_empty() {
        println!("No data to display");
        return Ok(());
    }

    let width = entries
        .iter()
        .map(|e| e.author.chars().count())
        .max()
        .unwrap_or(0)
        .max(6);

    println!(
        "{:<width$} {:>8} {:>7} {:>10} {:>10} {:>7} {:>7} {:>7} {:>6}",
        style("Author").bold(),
        style("Commits").bold(),
        style("Merges").bold(),
        style("Additions").bold(),
        style("Deletions").bold(),
        style("Create").bold(),
        style("Delete").bold(),
        style("Rename").bold(),
        style("Copy").bold(),
    );
    println!("{}", "─".repeat(width + 70));

    for e in entries {
        print_row(&e.author, &e.stats, width);
        if args.languages {
            for (language, l) in &e.stats.languages {
                println!(
                    "  {:<w$} {:>10} {:>10} {:>7}",
                    style(language).dim(),
                    style(l.additions).green(),
                    style(l.deletions).red(),
                    l.create,
                    w = width + 15,
                );
            }
        }
    }

    println!(
        "\nSorted by {}{}",
        style(args.sort).cyan(),
        if args.merges { ", merges included" } else { "" }
    );
    Ok(())
}

fn print_row(author: &str, s: &AuthorStats, width: usize) {
    println!(
        "{:<width$} {:>8} {:>7} {:>10} {:>10} {:>7} {:>7} {:>7} {:>6}",
        author,
        s.commits,
        s.merges,
        style(s.additions).green(),
        style(s.deletions).red(),
        s.create,
        s.delete,
        s.rename,
        s.copy,
    );
}
