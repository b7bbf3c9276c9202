use super::changeset::ChangeSet;
use super::classify::classify;
use crate::git::{BlobResolver, Resolved};
use crate::language::FileClassifier;
use crate::model::CommitRecord;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Number of comma-separated fields in a commit header line.
const HEADER_FIELDS: usize = 5;

/// Why a buffer did not produce a commit record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    #[error("empty buffer")]
    EmptyBuffer,
    #[error("malformed header line {0:?}")]
    MalformedHeader(String),
    #[error("invalid commit sha {0:?}")]
    InvalidSha(String),
    #[error("fallback view of {0} returned a different commit")]
    FallbackMismatch(String),
    #[error("no files were changed in {0}")]
    NoChanges(String),
}

/// The `sha,author,email,date,parents` line that opens every commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header<'a> {
    pub sha: &'a str,
    pub author: &'a str,
    pub email: &'a str,
    pub date: &'a str,
    pub parents: Vec<&'a str>,
}

impl<'a> Header<'a> {
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut fields = line.split(',');
        let (Some(sha), Some(author), Some(email), Some(date), Some(parents), None) = (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) else {
            return None;
        };
        Some(Self {
            sha: sha.trim(),
            author: author.trim(),
            email: email.trim(),
            date: date.trim(),
            parents: parents.split_whitespace().collect(),
        })
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn first_parent(&self) -> Option<&'a str> {
        self.parents.first().copied()
    }
}

pub fn is_header(line: &str) -> bool {
    line.split(',').count() == HEADER_FIELDS
}

pub fn is_valid_sha(sha: &str) -> bool {
    sha.len() == 40 && sha.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Turns one commit's buffered lines into a [`CommitRecord`].
pub struct CommitBuilder<'a> {
    resolver: &'a dyn BlobResolver,
    classifier: &'a dyn FileClassifier,
}

impl<'a> CommitBuilder<'a> {
    pub fn new(resolver: &'a dyn BlobResolver, classifier: &'a dyn FileClassifier) -> Self {
        Self {
            resolver,
            classifier,
        }
    }

    pub fn build<S: AsRef<str>>(&self, buffer: &[S]) -> Result<CommitRecord, Rejected> {
        let (first, body) = buffer.split_first().ok_or(Rejected::EmptyBuffer)?;
        let first = first.as_ref();
        let header =
            Header::parse(first).ok_or_else(|| Rejected::MalformedHeader(first.to_string()))?;

        if !is_valid_sha(header.sha) {
            return Err(Rejected::InvalidSha(header.sha.to_string()));
        }

        let changes: ChangeSet = body.iter().filter_map(|line| classify(line.as_ref())).collect();
        if changes.is_empty() {
            return Err(Rejected::NoChanges(header.sha.to_string()));
        }

        let mut commit = CommitRecord::new(
            header.sha,
            header.author,
            header.email,
            header.date,
            header.is_merge(),
        );

        for mut file in changes.into_files() {
            match self.resolve(&header, &file.name) {
                Resolved::Blob(blob) => {
                    self.classifier.classify(&blob).apply_to(&mut file);
                    commit.record_file(file);
                }
                Resolved::Submodule => {
                    info!(sha = header.sha, path = %file.name, "ignoring submodule");
                }
                Resolved::NotFound => {
                    warn!(sha = header.sha, path = %file.name, "problem processing file");
                }
            }
        }

        debug!(sha = %commit.sha, files = commit.files.len(), "extracted commit");
        Ok(commit)
    }

    /// Looks the path up at the commit, then at its first parent for deleted files.
    fn resolve(&self, header: &Header<'_>, path: &str) -> Resolved {
        match self.lookup(header.sha, path) {
            Resolved::NotFound => match header.first_parent() {
                Some(parent) => self.lookup(parent, path),
                None => Resolved::NotFound,
            },
            found => found,
        }
    }

    fn lookup(&self, sha: &str, path: &str) -> Resolved {
        match self.resolver.resolve(sha, path) {
            Ok(resolved) => resolved,
            Err(e) => {
                debug!(sha, path, error = %e, "blob lookup failed");
                Resolved::NotFound
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{GitStatsError, Result};
    use crate::git::Blob;
    use crate::language::HeuristicClassifier;
    use crate::model::FileStatus;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    pub const SHA: &str = "7d6c29f0ad5860d3238debbaaf696e361bf8c541";
    pub const PARENT: &str = "1940ef1c613a04f855d3867b874a4267d3e2c011";
    pub const OTHER_PARENT: &str = "0123456789abcdef0123456789abcdef01234567";

    /// In-memory trees keyed by `(sha, path)`.
    #[derive(Default)]
    pub struct FakeRepo {
        pub entries: HashMap<(String, String), Resolved>,
    }

    impl FakeRepo {
        pub fn with_blob(mut self, sha: &str, path: &str, data: &str) -> Self {
            self.entries.insert(
                (sha.to_string(), path.to_string()),
                Resolved::Blob(Blob {
                    path: path.to_string(),
                    data: data.as_bytes().to_vec(),
                }),
            );
            self
        }

        pub fn with_submodule(mut self, sha: &str, path: &str) -> Self {
            self.entries
                .insert((sha.to_string(), path.to_string()), Resolved::Submodule);
            self
        }
    }

    impl BlobResolver for FakeRepo {
        fn resolve(&self, sha: &str, path: &str) -> Result<Resolved> {
            if sha == "broken" {
                return Err(GitStatsError::Parse("broken".into()));
            }
            Ok(self
                .entries
                .get(&(sha.to_string(), path.to_string()))
                .cloned()
                .unwrap_or(Resolved::NotFound))
        }
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn header_fields_and_merge_flag() {
        let line = format!("{SHA},Kevin Jalbert,kevin.j.jalbert@gmail.com,2012-10-24 23:22:44 -0400,{PARENT} {OTHER_PARENT}");
        let header = Header::parse(&line).unwrap();
        assert_eq!(header.author, "Kevin Jalbert");
        assert!(header.is_merge());
        assert_eq!(header.first_parent(), Some(PARENT));

        let root = format!("{SHA},A,a@b.c,2012-10-24 23:22:44 -0400,");
        let header = Header::parse(&root).unwrap();
        assert!(!header.is_merge());
        assert_eq!(header.first_parent(), None);

        assert!(Header::parse("3\t4\tlib/a.rb").is_none());
    }

    #[test]
    fn valid_shas() {
        assert!(is_valid_sha(SHA));
        assert!(!is_valid_sha("7d6c29f"));
        assert!(!is_valid_sha("zd6c29f0ad5860d3238debbaaf696e361bf8c541"));
        assert!(!is_valid_sha("7D6C29F0AD5860D3238DEBBAAF696E361BF8C541"));
        assert!(!is_valid_sha(&format!("{SHA}0")));
    }

    #[test]
    fn builds_commit_with_classified_files() {
        let repo = FakeRepo::default()
            .with_blob(SHA, "README.md", "# title\n")
            .with_blob(SHA, "lib/stats.rb", "class Stats\nend\n");
        let builder = CommitBuilder::new(&repo, &HeuristicClassifier);

        let buffer = lines(&[
            &format!("{SHA},Kevin Jalbert,kevin.j.jalbert@gmail.com,2012-10-24 23:22:44 -0400,{PARENT}"),
            "11\t0\tREADME.md",
            "62\t0\tlib/stats.rb",
            "create mode 100644 README.md",
            "create mode 100644 lib/stats.rb",
        ]);
        let commit = builder.build(&buffer).unwrap();

        assert_eq!(commit.sha, SHA);
        assert_eq!(commit.author, "Kevin Jalbert");
        assert_eq!(commit.time, "2012-10-24 23:22:44 -0400");
        assert!(!commit.merge);
        assert_eq!(commit.additions, 73);
        assert_eq!(commit.deletions, 0);
        assert_eq!(commit.create, 2);
        assert_eq!(commit.files[0].language, "Markdown");
        assert_eq!(commit.files[1].language, "Ruby");
        assert_eq!(commit.files[1].status, Some(FileStatus::Created));
    }

    #[test]
    fn invalid_sha_is_rejected() {
        let repo = FakeRepo::default();
        let builder = CommitBuilder::new(&repo, &HeuristicClassifier);
        let buffer = lines(&["not-a-sha,A,a@b.c,2012-10-24 23:22:44 -0400,", "1\t1\ta.rb"]);
        assert_eq!(
            builder.build(&buffer),
            Err(Rejected::InvalidSha("not-a-sha".into()))
        );
    }

    #[test]
    fn commit_without_changes_is_rejected() {
        let repo = FakeRepo::default();
        let builder = CommitBuilder::new(&repo, &HeuristicClassifier);
        let header = format!("{SHA},A,a@b.c,2012-10-24 23:22:44 -0400,{PARENT}");
        assert_eq!(
            builder.build(&lines(&[&header, "", "not a diff line"])),
            Err(Rejected::NoChanges(SHA.into()))
        );
        let empty: Vec<String> = Vec::new();
        assert_eq!(builder.build(&empty), Err(Rejected::EmptyBuffer));
    }

    #[test]
    fn deleted_file_falls_back_to_parent() {
        let repo = FakeRepo::default().with_blob(PARENT, "old.rb", "puts 1\n");
        let builder = CommitBuilder::new(&repo, &HeuristicClassifier);
        let buffer = lines(&[
            &format!("{SHA},A,a@b.c,2012-10-24 23:22:44 -0400,{PARENT}"),
            "0\t1\told.rb",
            "delete mode 100644 old.rb",
        ]);
        let commit = builder.build(&buffer).unwrap();
        assert_eq!(commit.files.len(), 1);
        assert_eq!(commit.delete, 1);
        assert_eq!(commit.deletions, 1);
        assert_eq!(commit.files[0].language, "Ruby");
    }

    #[test]
    fn unresolvable_and_submodule_files_are_skipped() {
        let repo = FakeRepo::default()
            .with_blob(SHA, "kept.rb", "1\n")
            .with_submodule(SHA, "Spoon-Knife");
        let builder = CommitBuilder::new(&repo, &HeuristicClassifier);
        let buffer = lines(&[
            &format!("{SHA},A,a@b.c,2012-10-24 23:22:44 -0400,{PARENT}"),
            "1\t0\tkept.rb",
            "1\t0\tSpoon-Knife",
            "4\t0\tmissing.rb",
        ]);
        let commit = builder.build(&buffer).unwrap();
        assert_eq!(commit.files.len(), 1);
        assert_eq!(commit.files[0].name, "kept.rb");
        assert_eq!(commit.additions, 1);
    }

    #[test]
    fn resolver_errors_skip_only_the_file() {
        let repo = FakeRepo::default();
        let builder = CommitBuilder::new(&repo, &HeuristicClassifier);
        let buffer = lines(&[
            &format!("{SHA},A,a@b.c,2012-10-24 23:22:44 -0400,broken"),
            "1\t0\ta.rb",
        ]);
        let commit = builder.build(&buffer).unwrap();
        assert!(commit.files.is_empty());
        assert_eq!(commit.additions, 0);
    }
}
