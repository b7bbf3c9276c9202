pub mod cache;
pub mod cli;
pub mod collect;
pub mod error;
pub mod git;
pub mod language;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod util;
