use super::builder::{is_header, CommitBuilder, Header, Rejected};
use crate::cache::CommitStore;
use crate::error::Result;
use crate::git::RevisionView;
use crate::util::clean_line;
use indicatif::ProgressBar;
use serde::Serialize;
use std::io;
use tracing::{debug, warn};

/// Dropped commits, by reason.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RejectCounts {
    pub empty_buffer: usize,
    pub malformed_header: usize,
    pub invalid_sha: usize,
    pub fallback_mismatch: usize,
    pub no_changes: usize,
}

impl RejectCounts {
    pub fn record(&mut self, rejected: &Rejected) {
        let counter = match rejected {
            Rejected::EmptyBuffer => &mut self.empty_buffer,
            Rejected::MalformedHeader(_) => &mut self.malformed_header,
            Rejected::InvalidSha(_) => &mut self.invalid_sha,
            Rejected::FallbackMismatch(_) => &mut self.fallback_mismatch,
            Rejected::NoChanges(_) => &mut self.no_changes,
        };
        *counter += 1;
    }

    pub fn total(&self) -> usize {
        self.empty_buffer
            + self.malformed_header
            + self.invalid_sha
            + self.fallback_mismatch
            + self.no_changes
    }
}

/// Counts reported at the end of a scan.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CollectSummary {
    pub commits: usize,
    /// Commits skipped because an earlier scan already wrote them.
    pub already_recorded: usize,
    pub rejected: RejectCounts,
    pub fallbacks: usize,
    pub chunks: usize,
}

/// Slices the `git log` line stream into per-commit buffers and records each
/// finished commit in the store.
pub struct Assembler<'a> {
    builder: CommitBuilder<'a>,
    view: &'a dyn RevisionView,
    store: &'a mut CommitStore,
    buffer: Vec<String>,
    summary: CollectSummary,
    progress: ProgressBar,
}

impl<'a> Assembler<'a> {
    pub fn new(
        builder: CommitBuilder<'a>,
        view: &'a dyn RevisionView,
        store: &'a mut CommitStore,
    ) -> Self {
        Self {
            builder,
            view,
            store,
            buffer: Vec::new(),
            summary: CollectSummary::default(),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Consumes the whole stream, then flushes everything still buffered.
    ///
    /// A read error ends the scan, but only after the pending commit has been
    /// built and the store force-flushed.
    pub fn run<I>(mut self, lines: I) -> Result<CollectSummary>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        for line in lines {
            match line {
                Ok(line) => self.push_line(&line)?,
                Err(e) => {
                    self.finish()?;
                    return Err(e.into());
                }
            }
        }
        self.finish()
    }

    pub fn push_line(&mut self, line: &str) -> Result<()> {
        let line = clean_line(line);
        if line.is_empty() {
            return Ok(());
        }

        if is_header(line) {
            self.close_buffer();
            let written = self.store.flush(false)?;
            self.note_flush(written);
            self.buffer.push(line.to_string());
        } else if !self.buffer.is_empty() {
            self.buffer.push(line.to_string());
        }
        Ok(())
    }

    /// Closes the pending buffer and force-flushes the store.
    pub fn finish(&mut self) -> Result<CollectSummary> {
        self.close_buffer();
        let written = self.store.flush(true)?;
        self.note_flush(written);
        self.progress.finish_and_clear();
        Ok(self.summary.clone())
    }

    fn note_flush(&mut self, written: Option<std::path::PathBuf>) {
        if let Some(path) = written {
            debug!(path = %path.display(), "wrote chunk");
            self.summary.chunks += 1;
        }
    }

    fn close_buffer(&mut self) {
        let mut buffer = std::mem::take(&mut self.buffer);
        let Some(header) = buffer.first() else {
            return;
        };

        let sha = header_sha(header);
        if self.store.contains(sha) {
            debug!(%sha, "already recorded");
            self.summary.already_recorded += 1;
            return;
        }

        // `git log` omits the body of some merges; ask for that commit alone
        if buffer.len() == 1 {
            match self.fallback(&buffer[0]) {
                Ok(lines) => buffer = lines,
                Err(rejected) => {
                    self.reject(rejected);
                    return;
                }
            }
        }

        match self.builder.build(&buffer) {
            Ok(commit) => {
                self.progress.set_message(commit.sha.clone());
                self.progress.inc(1);
                self.store.insert(commit);
                self.summary.commits += 1;
            }
            Err(rejected) => self.reject(rejected),
        }
    }

    fn reject(&mut self, rejected: Rejected) {
        warn!(%rejected, "skipping commit");
        self.summary.rejected.record(&rejected);
    }

    fn fallback(&mut self, header: &str) -> std::result::Result<Vec<String>, Rejected> {
        let sha = header_sha(header).to_string();
        self.summary.fallbacks += 1;
        debug!(%sha, "header without body, querying single revision");

        let lines: Vec<String> = match self.view.show(&sha) {
            Ok(lines) => lines
                .iter()
                .map(|line| clean_line(line))
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) => {
                debug!(%sha, error = %e, "single revision query failed");
                return Err(Rejected::FallbackMismatch(sha));
            }
        };

        let same_commit = lines
            .first()
            .and_then(|first| Header::parse(first))
            .is_some_and(|found| found.sha == sha);
        if same_commit {
            Ok(lines)
        } else {
            Err(Rejected::FallbackMismatch(sha))
        }
    }
}

fn header_sha(header: &str) -> &str {
    header.split(',').next().unwrap_or_default().trim()
}
