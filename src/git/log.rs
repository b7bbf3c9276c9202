use crate::error::{GitStatsError, Result};
use std::io::{self, BufRead, BufReader};
use std::process::{Child, ChildStdout};

/// Header line layout: `sha,author,email,date,parents`.
pub const LOG_FORMAT: &str = "--format=%H,%an,%ae,%ad,%p";

const DIFF_ARGS: [&str; 6] = [
    "--date=iso",
    "--no-color",
    "--find-copies-harder",
    "--numstat",
    "--encoding=utf-8",
    "--summary",
];

/// Selection of history to stream through `git log`.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Branches to walk. Empty means the current HEAD only.
    pub branches: Vec<String>,
    pub since: Option<String>,
    pub until: Option<String>,
}

impl LogOptions {
    pub fn log_args(&self) -> Vec<String> {
        let mut args = vec!["--no-pager".to_string(), "log".to_string()];
        args.extend(self.branches.iter().cloned());
        args.push("--reverse".to_string());
        args.extend(DIFF_ARGS.iter().map(|a| a.to_string()));
        if let Some(since) = &self.since {
            args.push(format!("--since={since}"));
        }
        if let Some(until) = &self.until {
            args.push(format!("--until={until}"));
        }
        args.push(LOG_FORMAT.to_string());
        args
    }
}

/// Arguments for the single-revision view of `sha`.
pub fn show_args(sha: &str) -> Vec<String> {
    let mut args = vec!["--no-pager".to_string(), "show".to_string(), sha.to_string()];
    args.extend(DIFF_ARGS.iter().map(|a| a.to_string()));
    args.push(LOG_FORMAT.to_string());
    args
}

/// Produces the lines of a single commit when the main stream had none.
pub trait RevisionView {
    fn show(&self, sha: &str) -> Result<Vec<String>>;
}

/// Lines of a running `git log`, read one at a time from its stdout.
///
/// Invalid UTF-8 is replaced rather than failing the whole scan.
pub struct LogStream {
    child: Child,
    reader: BufReader<ChildStdout>,
}

impl LogStream {
    pub(crate) fn new(mut child: Child) -> Result<Self> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GitStatsError::GitCommand("git log has no stdout".to_string()))?;
        Ok(Self {
            child,
            reader: BufReader::new(stdout),
        })
    }

    /// Waits for `git` to exit and reports a non-zero status.
    pub fn finish(mut self) -> Result<()> {
        let status = self.child.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(GitStatsError::GitCommand(format!("git log exited with {status}")))
        }
    }
}

impl Iterator for LogStream {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => Some(Ok(String::from_utf8_lossy(&buf).into_owned())),
            Err(e) => Some(Err(e)),
        }
    }
}

impl Drop for LogStream {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
