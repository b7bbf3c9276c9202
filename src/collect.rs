use crate::cache::{CommitStore, StoreOptions};
use crate::cli::{CollectArgs, CommonArgs};
use crate::git::{GitRepo, LogOptions};
use crate::language::HeuristicClassifier;
use crate::pipeline::{Assembler, CollectSummary, CommitBuilder};
use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

pub fn exec(common: CommonArgs, args: CollectArgs) -> anyhow::Result<()> {
    let repo = GitRepo::open(common.repo.as_ref()).context("Failed to open git repository")?;
    let dir = common
        .cache
        .clone()
        .unwrap_or_else(|| CommitStore::default_dir(repo.path()));

    let mut store = CommitStore::open(
        &dir,
        &StoreOptions {
            limit: args.limit,
            fresh: args.fresh,
            pretty: args.pretty,
        },
    )
    .with_context(|| format!("Failed to open commit cache at {}", dir.display()))?;

    let branches = if args.branch {
        Vec::new()
    } else {
        repo.branches().context("Failed to list branches")?
    };
    let log = LogOptions {
        branches,
        since: args.since.clone(),
        until: args.until.clone(),
    };

    let summary = collect(&repo, &mut store, &log, common.quiet)?;
    info!(?summary, "collection finished");

    if !common.quiet {
        eprintln!(
            "{} {} commits into {} ({} already recorded, {} skipped, {} chunks)",
            style("Collected").green().bold(),
            summary.commits,
            dir.display(),
            summary.already_recorded,
            summary.rejected.total(),
            summary.chunks
        );
    }
    Ok(())
}

/// Streams `git log` through the pipeline into `store`.
pub fn collect(
    repo: &GitRepo,
    store: &mut CommitStore,
    log: &LogOptions,
    quiet: bool,
) -> anyhow::Result<CollectSummary> {
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {pos} commits {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb
    };

    let classifier = HeuristicClassifier;
    let builder = CommitBuilder::new(repo, &classifier);
    let mut stream = repo.log(log).context("Failed to start git log")?;

    let summary = Assembler::new(builder, repo, store)
        .with_progress(pb)
        .run(stream.by_ref())
        .context("Failed to collect commits from repository")?;

    stream.finish().context("git log did not complete")?;
    Ok(summary)
}
