#![forbid(unsafe_code)]

pub mod loader;
pub mod pipeline;
pub mod store;
pub mod worker;

pub use loader::{load_or_convert, source_id, LoadError};
pub use pipeline::{convert, convert_batch, Converter};
pub use store::{DirStore, MemoryStore, ResultStore, StoreError};
pub use worker::{spawn_conversion, ConversionHandle};
