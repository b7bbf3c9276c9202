//! The log-stream-to-commit pipeline.
//!
//! Lines from `git log` are cut into per-commit buffers by the [`Assembler`],
//! each buffer is turned into a [`CommitRecord`](crate::model::CommitRecord) by
//! the [`CommitBuilder`], and the records land in the
//! [`CommitStore`](crate::cache::CommitStore).

pub mod assembler;
pub mod builder;
pub mod changeset;
pub mod classify;

pub use assembler::{Assembler, CollectSummary, RejectCounts};
pub use builder::{is_header, is_valid_sha, CommitBuilder, Header, Rejected};
pub use changeset::ChangeSet;
pub use classify::{classify, DiffLine};
