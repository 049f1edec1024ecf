//! OFF/PLY point cloud ingestion and partitioning into renderer-sized point
//! groups.
//!
//! The pieces live in member crates; this crate re-exports them under one
//! name.

#![forbid(unsafe_code)]

pub use pointgroups_convert as convert;
pub use pointgroups_core as core;
pub use pointgroups_io as io;
pub use pointgroups_partition as partition;

pub use pointgroups_convert::{convert, Converter};
pub use pointgroups_core::{ConversionResult, ConvertConfig, ParseError, PointGroup, PointRecord};
