use thiserror::Error;

pub type Result<T> = std::result::Result<T, GitStatsError>;

#[derive(Error, Debug)]
pub enum GitStatsError {
    #[error("Git command failed: {0}")]
    GitCommand(String),
    #[error("Cache error: {0}")]
    Cache(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Unknown sort key: {0}")]
    InvalidSortKey(String),
    #[error("Object find error: {0}")]
    ObjectFind(#[from] Box<gix::object::find::existing::Error>),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
    #[error("Git discover error: {0}")]
    GitDiscover(#[from] Box<gix::discover::Error>),
}

// Manual From implementations for unboxed to boxed conversions
impl From<gix::object::find::existing::Error> for GitStatsError {
    fn from(err: gix::object::find::existing::Error) -> Self {
        GitStatsError::ObjectFind(Box::new(err))
    }
}

impl From<gix::object::commit::Error> for GitStatsError {
    fn from(err: gix::object::commit::Error) -> Self {
        GitStatsError::Commit(Box::new(err))
    }
}

impl From<gix::discover::Error> for GitStatsError {
    fn from(err: gix::discover::Error) -> Self {
        GitStatsError::GitDiscover(Box::new(err))
    }
}
