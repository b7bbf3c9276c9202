use super::classify::DiffLine;
use crate::model::FileChange;
use indexmap::IndexMap;

/// Merges the classified lines of one commit into one [`FileChange`] per path.
///
/// Count lines and summary markers for the same file may arrive in any order;
/// whichever comes second fills in what the first one lacked.
#[derive(Debug, Default)]
pub struct ChangeSet {
    files: IndexMap<String, FileChange>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn apply(&mut self, line: DiffLine) {
        match line {
            DiffLine::ModifiedRenamed {
                additions,
                deletions,
                old_path,
                path,
            } => {
                let entry = self.entry(path);
                entry.additions = additions;
                entry.deletions = deletions;
                entry.old_name = Some(old_path);
            }
            DiffLine::Modified {
                additions,
                deletions,
                path,
            } => {
                let entry = self.entry(path);
                entry.additions = additions;
                entry.deletions = deletions;
            }
            DiffLine::CreatedDeleted { status, path } => {
                self.entry(path).status = Some(status);
            }
            DiffLine::RenamedCopied {
                status,
                old_path,
                path,
                similarity,
            } => {
                let entry = self.entry(path);
                entry.status = Some(status);
                entry.old_name = Some(old_path);
                entry.similar = Some(similarity);
            }
        }
    }

    fn entry(&mut self, path: String) -> &mut FileChange {
        let name = path.clone();
        self.files
            .entry(path)
            .or_insert_with(|| FileChange::new(name))
    }

    /// File changes in order of first appearance.
    pub fn into_files(self) -> Vec<FileChange> {
        self.files.into_values().collect()
    }
}

impl Extend<DiffLine> for ChangeSet {
    fn extend<T: IntoIterator<Item = DiffLine>>(&mut self, iter: T) {
        for line in iter {
            self.apply(line);
        }
    }
}

impl FromIterator<DiffLine> for ChangeSet {
    fn from_iter<T: IntoIterator<Item = DiffLine>>(iter: T) -> Self {
        let mut set = ChangeSet::new();
        set.extend(iter);
        set
    }
}
