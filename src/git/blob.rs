use crate::error::Result;

/// Contents of a regular file at some revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub path: String,
    pub data: Vec<u8>,
}

/// Outcome of looking a path up in a revision's tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Blob(Blob),
    Submodule,
    NotFound,
}

/// Looks up file contents by revision and path.
pub trait BlobResolver {
    fn resolve(&self, sha: &str, path: &str) -> Result<Resolved>;
}
