use pointgroups_core::ParseError;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use crate::header::Format;

/// Extensions tried, in order, when the caller passes an extension-less base.
pub const SOURCE_EXTENSIONS: [&str; 2] = ["off", "ply"];

fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut s = OsString::from(base.as_os_str());
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Finds the source file for `base`: `base.off`, then `base.ply`.
///
/// A `base` that already names an existing `.off`/`.ply` file is accepted
/// as-is.
pub fn resolve_source(base: impl AsRef<Path>) -> Result<PathBuf, ParseError> {
    let base = base.as_ref();

    if format_of(base).is_some() && base.is_file() {
        return Ok(base.to_path_buf());
    }

    SOURCE_EXTENSIONS
        .iter()
        .map(|ext| with_suffix(base, ext))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ParseError::FileNotFound {
            base: base.to_path_buf(),
        })
}

/// Format implied by a path's extension, if any.
pub fn format_of(path: &Path) -> Option<Format> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(Format::from_extension)
}

/// Opens a resolved source for buffered reading. The file is closed when the
/// reader is dropped, on every exit path.
pub fn open_source(path: &Path) -> Result<BufReader<File>, ParseError> {
    match File::open(path) {
        Ok(f) => Ok(BufReader::new(f)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ParseError::FileNotFound {
            base: path.to_path_buf(),
        }),
        Err(e) => Err(e.into()),
    }
}
