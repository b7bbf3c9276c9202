use super::blob::{Blob, BlobResolver, Resolved};
use super::log::{show_args, LogOptions, LogStream, RevisionView};
use crate::error::{GitStatsError, Result};
use gix::{discover, ObjectId, Repository};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// A repository opened once and shared by every lookup of a scan.
pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at `path`, or current dir if `None`
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let repo_path = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or(std::env::current_dir()?);

        let repo = discover(&repo_path)?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn git(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.path);
        cmd
    }

    /// Local branch names, without the current-branch marker.
    pub fn branches(&self) -> Result<Vec<String>> {
        let output = self
            .git()
            .args(["--no-pager", "branch", "--no-color"])
            .output()?;
        if !output.status.success() {
            return Err(GitStatsError::GitCommand(format!(
                "git branch failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(parse_branches(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Starts `git log` and streams its output.
    pub fn log(&self, opts: &LogOptions) -> Result<LogStream> {
        let args = opts.log_args();
        debug!(?args, "spawning git log");
        let child = self
            .git()
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;
        LogStream::new(child)
    }
}

fn parse_branches(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.strip_prefix('*').unwrap_or(line).trim())
        // `(HEAD detached at 1a2b3c)` is not a ref name
        .filter(|name| !name.is_empty() && !name.starts_with('('))
        .map(str::to_string)
        .collect()
}

impl RevisionView for GitRepo {
    fn show(&self, sha: &str) -> Result<Vec<String>> {
        let output = self.git().args(show_args(sha)).output()?;
        if !output.status.success() {
            return Err(GitStatsError::GitCommand(format!(
                "git show {sha} failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }
}

impl BlobResolver for GitRepo {
    fn resolve(&self, sha: &str, path: &str) -> Result<Resolved> {
        let oid = ObjectId::from_hex(sha.as_bytes())
            .map_err(|e| GitStatsError::Parse(format!("Invalid commit ID: {e}")))?;
        let commit = match self.repo.find_commit(oid) {
            Ok(commit) => commit,
            Err(_) => return Ok(Resolved::NotFound),
        };
        let tree = commit.tree()?;

        let Some(entry) = tree.lookup_entry_by_path(path)? else {
            return Ok(Resolved::NotFound);
        };

        let mode = entry.mode();
        if mode.is_commit() {
            return Ok(Resolved::Submodule);
        }
        if mode.is_tree() {
            return Ok(Resolved::NotFound);
        }

        let object = entry.object()?;
        Ok(Resolved::Blob(Blob {
            path: path.to_string(),
            data: object.detach().data,
        }))
    }
}
