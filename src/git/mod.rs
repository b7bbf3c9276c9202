pub mod blob;
pub mod log;
pub mod repo;

pub use blob::{Blob, BlobResolver, Resolved};
pub use log::{LogOptions, LogStream, RevisionView};
pub use repo::GitRepo;
