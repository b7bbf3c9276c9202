use crate::stats::SortKey;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "git-statistics")]
#[command(about = "Per-author and per-language statistics from git history")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Path to git repository")]
    pub repo: Option<PathBuf>,

    #[arg(long, global = true, help = "Directory holding the commit chunks")]
    pub cache: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Log every extracted commit")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide progress and summary output")]
    pub quiet: bool,
}

#[derive(Args, Clone)]
pub struct CollectArgs {
    #[arg(short, long, default_value_t = 100, help = "Commits kept in memory before writing a chunk")]
    pub limit: usize,

    #[arg(short, long, help = "Discard previously collected chunks")]
    pub fresh: bool,

    #[arg(short, long, help = "Write indented JSON chunks")]
    pub pretty: bool,

    #[arg(short, long, help = "Only scan the current branch")]
    pub branch: bool,

    #[arg(long, help = "Only commits more recent than this date (any format git accepts)")]
    pub since: Option<String>,

    #[arg(long, help = "Only commits older than this date (any format git accepts)")]
    pub until: Option<String>,
}

#[derive(Args, Clone)]
pub struct ReportArgs {
    #[arg(short, long, help = "Group authors by email instead of name")]
    pub email: bool,

    #[arg(short, long, help = "Include merge commits")]
    pub merges: bool,

    #[arg(short, long, value_enum, default_value_t = SortKey::Commits, help = "Counter to rank authors by")]
    pub sort: SortKey,

    #[arg(short, long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..), help = "Show only the top N authors")]
    pub top: Option<usize>,

    #[arg(short = 'L', long, help = "Break each author down by language")]
    pub languages: bool,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,

    #[arg(long, help = "Output as NDJSON")]
    pub ndjson: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan history and write commit chunks
    Collect(CollectArgs),
    /// Aggregate collected chunks into author statistics
    Report(ReportArgs),
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Collect(args) => crate::collect::exec(self.common, args),
            Commands::Report(args) => crate::report::exec(self.common, args),
        }
    }
}
