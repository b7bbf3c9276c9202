use crate::error::{GitStatsError, Result};
use crate::model::CommitRecord;
use crate::util::chunk_index;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory, relative to the work tree, holding the chunk files.
pub const CACHE_DIR: &str = ".git_statistics";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Commits held in memory before an unforced flush writes a chunk.
    pub limit: usize,
    /// Discard existing chunks when opening the store.
    pub fresh: bool,
    /// Write indented JSON.
    pub pretty: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            limit: 100,
            fresh: false,
            pretty: false,
        }
    }
}

/// Commits built during a scan, checkpointed to `<index>.json` chunk files.
pub struct CommitStore {
    dir: PathBuf,
    limit: usize,
    pretty: bool,
    commits: IndexMap<String, CommitRecord>,
    /// Shas already written to a chunk, by this or an earlier scan.
    recorded: HashSet<String>,
    next_chunk: usize,
}

impl CommitStore {
    pub fn default_dir<P: AsRef<Path>>(repo_path: P) -> PathBuf {
        repo_path.as_ref().join(CACHE_DIR)
    }

    pub fn open<P: AsRef<Path>>(dir: P, options: &StoreOptions) -> Result<Self> {
        if options.limit == 0 {
            return Err(GitStatsError::Cache(
                "flush limit must be a positive number of commits".to_string(),
            ));
        }
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        if options.fresh {
            for path in chunk_paths_in(&dir)?.into_iter().chain(temp_paths_in(&dir)?) {
                debug!(path = %path.display(), "removing stale chunk");
                fs::remove_file(path)?;
            }
        }

        let chunks = chunk_indices_in(&dir)?;
        let next_chunk = chunks.last().map(|(index, _)| index + 1).unwrap_or(0);
        let mut recorded = HashSet::new();
        for (_, path) in &chunks {
            recorded.extend(Self::read_chunk(path)?.into_iter().map(|c| c.sha));
        }
        if next_chunk > 0 {
            info!(
                dir = %dir.display(),
                next_chunk,
                recorded = recorded.len(),
                "resuming after existing chunks"
            );
        }

        Ok(Self {
            dir,
            limit: options.limit,
            pretty: options.pretty,
            commits: IndexMap::new(),
            recorded,
            next_chunk,
        })
    }

    /// Whether `sha` is buffered or already written to a chunk.
    pub fn contains(&self, sha: &str) -> bool {
        self.commits.contains_key(sha) || self.recorded.contains(sha)
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn get(&self, sha: &str) -> Option<&CommitRecord> {
        self.commits.get(sha)
    }

    pub fn insert(&mut self, commit: CommitRecord) -> Option<CommitRecord> {
        self.commits.insert(commit.sha.clone(), commit)
    }

    pub fn commits(&self) -> impl Iterator<Item = &CommitRecord> {
        self.commits.values()
    }

    /// Writes the buffered commits to the next chunk and clears them, when
    /// more than `limit` commits are held or `force` is set.
    ///
    /// Returns the path written, if any. An empty store never writes a chunk.
    pub fn flush(&mut self, force: bool) -> Result<Option<PathBuf>> {
        if !(force || self.commits.len() > self.limit) || self.commits.is_empty() {
            return Ok(None);
        }

        let path = self.dir.join(format!("{}.json", self.next_chunk));
        self.save(&path, self.pretty)?;
        info!(path = %path.display(), commits = self.commits.len(), "flushed commits");

        self.next_chunk += 1;
        self.recorded
            .extend(self.commits.drain(..).map(|(sha, _)| sha));
        Ok(Some(path))
    }

    /// Serializes the in-memory commits to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P, pretty: bool) -> Result<()> {
        let path = path.as_ref();
        let records: Vec<&CommitRecord> = self.commits.values().collect();
        let mut json = if pretty {
            serde_json::to_string_pretty(&records)?
        } else {
            serde_json::to_string(&records)?
        };
        json.push('\n');

        // the temporary name does not parse as a chunk index
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Adds every commit found in the given chunk files.
    pub fn load<I, P>(&mut self, paths: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for path in paths {
            for commit in Self::read_chunk(path)? {
                self.insert(commit);
            }
        }
        Ok(self)
    }

    /// Loads all chunks of this store's directory, oldest first.
    pub fn load_chunks(&mut self) -> Result<&mut Self> {
        let paths = self.chunk_paths()?;
        self.load(paths)
    }

    pub fn chunk_paths(&self) -> Result<Vec<PathBuf>> {
        chunk_paths_in(&self.dir)
    }

    pub fn chunk_count(&self) -> Result<usize> {
        Ok(chunk_indices_in(&self.dir)?.len())
    }

    pub fn read_chunk<P: AsRef<Path>>(path: P) -> Result<Vec<CommitRecord>> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| {
            GitStatsError::Cache(format!("Corrupt chunk {}: {e}", path.display()))
        })
    }
}

/// Chunk files under `dir` in index order; a missing directory has none.
pub fn chunk_paths_in(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(chunk_indices_in(dir)?
        .into_iter()
        .map(|(_, path)| path)
        .collect())
}

/// Leftover `<index>.json.tmp` files from an interrupted save.
fn temp_paths_in(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let is_temp = name
            .to_str()
            .and_then(|n| n.strip_suffix(".tmp"))
            .and_then(chunk_index)
            .is_some();
        if is_temp && entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    Ok(paths)
}

fn chunk_indices_in(dir: &Path) -> Result<Vec<(usize, PathBuf)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut chunks = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(index) = entry.file_name().to_str().and_then(chunk_index) {
            chunks.push((index, entry.path()));
        }
    }
    chunks.sort_by_key(|(index, _)| *index);
    Ok(chunks)
}
