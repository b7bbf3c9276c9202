use crate::stats::AuthorStats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

pub const UNKNOWN_LANGUAGE: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Modified,
    Created,
    Deleted,
    Renamed,
    Copied,
}

impl FileStatus {
    /// Maps the verb used by `git log --summary` (`create`, `delete`, `rename`, `copy`).
    pub fn from_summary_verb(verb: &str) -> Option<Self> {
        match verb {
            "create" => Some(FileStatus::Created),
            "delete" => Some(FileStatus::Deleted),
            "rename" => Some(FileStatus::Renamed),
            "copy" => Some(FileStatus::Copied),
            _ => None,
        }
    }
}

/// One file touched by a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_name: Option<String>,
    pub additions: u64,
    pub deletions: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FileStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similar: Option<u32>,
    #[serde(default)]
    pub binary: bool,
    #[serde(default)]
    pub image: bool,
    #[serde(default)]
    pub vendored: bool,
    #[serde(default)]
    pub generated: bool,
    #[serde(default = "unknown_language")]
    pub language: String,
}

fn unknown_language() -> String {
    UNKNOWN_LANGUAGE.to_string()
}

impl FileChange {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            old_name: None,
            additions: 0,
            deletions: 0,
            status: None,
            similar: None,
            binary: false,
            image: false,
            vendored: false,
            generated: false,
            language: unknown_language(),
        }
    }

    pub fn with_counts(mut self, additions: u64, deletions: u64) -> Self {
        self.additions = additions;
        self.deletions = deletions;
        self
    }

    pub fn with_status(mut self, status: FileStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn is_created(&self) -> bool {
        self.status == Some(FileStatus::Created)
    }
}

/// A validated commit with its per-file changes and derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    pub author: String,
    pub author_email: String,
    pub time: String,
    pub merge: bool,
    pub additions: u64,
    pub deletions: u64,
    pub create: u64,
    pub delete: u64,
    pub rename: u64,
    pub copy: u64,
    pub files: Vec<FileChange>,
}

impl CommitRecord {
    pub fn new(
        sha: impl Into<String>,
        author: impl Into<String>,
        author_email: impl Into<String>,
        time: impl Into<String>,
        merge: bool,
    ) -> Self {
        Self {
            sha: sha.into(),
            author: author.into(),
            author_email: author_email.into(),
            time: time.into(),
            merge,
            additions: 0,
            deletions: 0,
            create: 0,
            delete: 0,
            rename: 0,
            copy: 0,
            files: Vec::new(),
        }
    }

    /// Appends a file and tallies its counts and status onto the commit totals.
    pub fn record_file(&mut self, file: FileChange) {
        self.additions += file.additions;
        self.deletions += file.deletions;
        match file.status {
            Some(FileStatus::Created) => self.create += 1,
            Some(FileStatus::Deleted) => self.delete += 1,
            Some(FileStatus::Renamed) => self.rename += 1,
            Some(FileStatus::Copied) => self.copy += 1,
            Some(FileStatus::Modified) | None => {}
        }
        self.files.push(file);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorEntry {
    pub author: String,
    #[serde(flatten)]
    pub stats: AuthorStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub sort: String,
    pub by_email: bool,
    pub include_merges: bool,
    pub authors: Vec<AuthorEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_file_tallies_status_counters() {
        let mut commit = CommitRecord::new("a".repeat(40), "Ann", "ann@example.com", "2013-01-01", false);
        commit.record_file(FileChange::new("a.rb").with_counts(3, 1).with_status(FileStatus::Created));
        commit.record_file(FileChange::new("b.rb").with_counts(0, 9).with_status(FileStatus::Deleted));
        commit.record_file(FileChange::new("c.rb").with_counts(2, 2));

        assert_eq!(commit.additions, 5);
        assert_eq!(commit.deletions, 12);
        assert_eq!(commit.create, 1);
        assert_eq!(commit.delete, 1);
        assert_eq!(commit.rename, 0);
        assert_eq!(commit.files.len(), 3);
    }

    #[test]
    fn optional_fields_are_omitted_when_unset() {
        let json = serde_json::to_string(&FileChange::new("README.md")).unwrap();
        assert!(!json.contains("old_name"));
        assert!(!json.contains("status"));
        assert!(json.contains("\"language\":\"Unknown\""));
    }

    #[test]
    fn summary_verbs_map_to_statuses() {
        assert_eq!(FileStatus::from_summary_verb("copy"), Some(FileStatus::Copied));
        assert_eq!(FileStatus::from_summary_verb("modify"), None);
    }
}
