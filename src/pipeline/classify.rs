//! Classification of `--numstat` / `--summary` lines.
//!
//! Each line is tried against an ordered table of rules and the first rule that
//! matches wins. The order goes from the most specific shape to the least, so a
//! numstat line carrying a rename arrow is never mistaken for a plain count line.

use crate::model::FileStatus;
use crate::util::{clean_line, split_old_new_file};
use regex::Regex;
use std::sync::LazyLock;

// `12  3  lib/{old => new}/file.rb` or `-  -  {a.png => b.png}`
static MODIFIED_RENAMED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-|\d+)\s+(-|\d+)\s+(.+)\s+=>\s+(.+)$").expect("valid numstat rename pattern")
});

// `12  3  lib/file.rb`
static MODIFIED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-|\d+)\s+(-|\d+)\s+(.+)$").expect("valid numstat pattern"));

// `create mode 100644 lib/file.rb`
static CREATED_DELETED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(create|delete) mode \d+ ([^\\]+)$").expect("valid create/delete pattern")
});

// `rename lib/{old => new}/file.rb (92%)`
static RENAMED_COPIED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(rename|copy)\s+(.+)\s+=>\s+(.+)\s+\((\d+)%\)$")
        .expect("valid rename/copy pattern")
});

/// The change shape expressed by one diff-summary line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    /// Line counts for a file that was also renamed or copied.
    ModifiedRenamed {
        additions: u64,
        deletions: u64,
        old_path: String,
        path: String,
    },
    /// Line counts for a single path.
    Modified {
        additions: u64,
        deletions: u64,
        path: String,
    },
    /// A file came into or went out of existence.
    CreatedDeleted { status: FileStatus, path: String },
    /// Rename or copy confirmation with its similarity score.
    RenamedCopied {
        status: FileStatus,
        old_path: String,
        path: String,
        similarity: u32,
    },
}

impl DiffLine {
    /// Final path of the file the line talks about.
    pub fn path(&self) -> &str {
        match self {
            DiffLine::ModifiedRenamed { path, .. }
            | DiffLine::Modified { path, .. }
            | DiffLine::CreatedDeleted { path, .. }
            | DiffLine::RenamedCopied { path, .. } => path,
        }
    }
}

type Rule = fn(&str) -> Option<DiffLine>;

/// Rules in precedence order.
const RULES: [Rule; 4] = [
    modified_renamed,
    modified,
    created_deleted,
    renamed_copied,
];

/// Classifies a single line, or returns `None` when it matches no known shape.
pub fn classify(line: &str) -> Option<DiffLine> {
    let line = clean_line(line);
    if line.is_empty() {
        return None;
    }
    RULES.iter().find_map(|rule| rule(line))
}

fn modified_renamed(line: &str) -> Option<DiffLine> {
    let caps = MODIFIED_RENAMED_RE.captures(line)?;
    let additions = parse_count(&caps[1])?;
    let deletions = parse_count(&caps[2])?;
    let split = split_old_new_file(clean_line(&caps[3]), clean_line(&caps[4]));
    Some(DiffLine::ModifiedRenamed {
        additions,
        deletions,
        old_path: split.old_path,
        path: split.new_path,
    })
}

fn modified(line: &str) -> Option<DiffLine> {
    let caps = MODIFIED_RE.captures(line)?;
    Some(DiffLine::Modified {
        additions: parse_count(&caps[1])?,
        deletions: parse_count(&caps[2])?,
        path: clean_line(&caps[3]).to_string(),
    })
}

fn created_deleted(line: &str) -> Option<DiffLine> {
    let caps = CREATED_DELETED_RE.captures(line)?;
    Some(DiffLine::CreatedDeleted {
        status: FileStatus::from_summary_verb(&caps[1])?,
        path: clean_line(&caps[2]).to_string(),
    })
}

fn renamed_copied(line: &str) -> Option<DiffLine> {
    let caps = RENAMED_COPIED_RE.captures(line)?;
    let status = FileStatus::from_summary_verb(&caps[1])?;
    let split = split_old_new_file(clean_line(&caps[2]), clean_line(&caps[3]));
    Some(DiffLine::RenamedCopied {
        status,
        old_path: split.old_path,
        path: split.new_path,
        similarity: caps[4].parse().ok()?,
    })
}

/// Binary files report `-` instead of a count.
fn parse_count(raw: &str) -> Option<u64> {
    if raw == "-" {
        Some(0)
    } else {
        raw.parse().ok()
    }
}
