//! Per-author and per-language aggregation of commit records.

use crate::cache::CommitStore;
use crate::error::{GitStatsError, Result};
use crate::model::{CommitRecord, FileChange};
use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageStats {
    pub additions: u64,
    pub deletions: u64,
    pub create: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorStats {
    pub commits: u64,
    pub merges: u64,
    pub additions: u64,
    pub deletions: u64,
    pub create: u64,
    pub delete: u64,
    pub rename: u64,
    pub copy: u64,
    pub languages: BTreeMap<String, LanguageStats>,
}

impl AuthorStats {
    /// Adds one commit's totals.
    pub fn add_commit(mut self, commit: &CommitRecord) -> Self {
        self.commits += 1;
        if commit.merge {
            self.merges += 1;
        }
        self.additions += commit.additions;
        self.deletions += commit.deletions;
        self.create += commit.create;
        self.delete += commit.delete;
        self.rename += commit.rename;
        self.copy += commit.copy;
        self
    }

    /// Adds one file to the bucket of its language.
    pub fn add_language(mut self, file: &FileChange) -> Self {
        let language = self.languages.entry(file.language.clone()).or_default();
        language.additions += file.additions;
        language.deletions += file.deletions;
        if file.is_created() {
            language.create += 1;
        }
        self
    }

    pub fn language(&self, name: &str) -> Option<&LanguageStats> {
        self.languages.get(name)
    }

    pub fn value(&self, key: SortKey) -> u64 {
        match key {
            SortKey::Commits => self.commits,
            SortKey::Merges => self.merges,
            SortKey::Additions => self.additions,
            SortKey::Deletions => self.deletions,
            SortKey::Create => self.create,
            SortKey::Delete => self.delete,
            SortKey::Rename => self.rename,
            SortKey::Copy => self.copy,
        }
    }
}

/// Which header field identifies an author.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthorKey {
    #[default]
    Name,
    Email,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Commits,
    Merges,
    Additions,
    Deletions,
    Create,
    Delete,
    Rename,
    Copy,
}

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        SortKey::Commits,
        SortKey::Merges,
        SortKey::Additions,
        SortKey::Deletions,
        SortKey::Create,
        SortKey::Delete,
        SortKey::Rename,
        SortKey::Copy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Commits => "commits",
            SortKey::Merges => "merges",
            SortKey::Additions => "additions",
            SortKey::Deletions => "deletions",
            SortKey::Create => "create",
            SortKey::Delete => "delete",
            SortKey::Rename => "rename",
            SortKey::Copy => "copy",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = GitStatsError;

    fn from_str(s: &str) -> Result<Self> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| GitStatsError::InvalidSortKey(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateOptions {
    pub key: AuthorKey,
    pub include_merges: bool,
}

/// Running totals for every author seen so far.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    options: AggregateOptions,
    authors: IndexMap<String, AuthorStats>,
}

impl Statistics {
    pub fn new(options: AggregateOptions) -> Self {
        Self {
            options,
            authors: IndexMap::new(),
        }
    }

    /// Folds one commit and each of its files into the author's totals.
    /// Merges are skipped entirely unless they are included.
    pub fn fold(&mut self, commit: &CommitRecord) {
        if commit.merge && !self.options.include_merges {
            return;
        }
        let author = match self.options.key {
            AuthorKey::Name => &commit.author,
            AuthorKey::Email => &commit.author_email,
        };

        let entry = self.authors.entry(author.clone()).or_default();
        let mut stats = std::mem::take(entry).add_commit(commit);
        for file in &commit.files {
            stats = stats.add_language(file);
        }
        *entry = stats;
    }

    pub fn fold_all<'c, I>(&mut self, commits: I)
    where
        I: IntoIterator<Item = &'c CommitRecord>,
    {
        for commit in commits {
            self.fold(commit);
        }
    }

    /// Aggregates chunk files one at a time, so only one chunk is in memory.
    ///
    /// A sha found in more than one chunk is counted once.
    pub fn from_chunks<I, P>(paths: I, options: AggregateOptions) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut stats = Self::new(options);
        let mut seen = HashSet::new();
        for path in paths {
            for commit in CommitStore::read_chunk(path)? {
                if seen.insert(commit.sha.clone()) {
                    stats.fold(&commit);
                }
            }
        }
        Ok(stats)
    }

    pub fn get(&self, author: &str) -> Option<&AuthorStats> {
        self.authors.get(author)
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    /// Authors ranked by `key`, highest first, ties by identifier.
    ///
    /// `None` when nothing has been aggregated.
    pub fn top_n(&self, key: SortKey, n: Option<usize>) -> Option<Vec<(&str, &AuthorStats)>> {
        if self.authors.is_empty() {
            return None;
        }
        let mut ranked: Vec<(&str, &AuthorStats)> = self
            .authors
            .iter()
            .map(|(author, stats)| (author.as_str(), stats))
            .collect();
        ranked.sort_by(|a, b| b.1.value(key).cmp(&a.1.value(key)).then_with(|| a.0.cmp(b.0)));
        if let Some(n) = n {
            ranked.truncate(n);
        }
        Some(ranked)
    }
}
