#![forbid(unsafe_code)]

pub mod chunk;

pub use chunk::{group_count, group_len, partition, partition_with_progress, rebase};
