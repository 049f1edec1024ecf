#![forbid(unsafe_code)]

pub mod bounds;
pub mod config;
pub mod error;
pub mod group;
pub mod point;
pub mod progress;

pub use bounds::BoundsTracker;
pub use config::{ConfigError, ConvertConfig, DEFAULT_CAPACITY};
pub use error::{ErrorKind, ParseError, Result};
pub use group::{ConversionResult, PointGroup};
pub use point::{PointRecord, DEFAULT_COLOR};
pub use progress::{CancelToken, NoProgress, ProgressEvent, ProgressSink, ProgressThrottle};
