use pointgroups_core::{ConversionResult, ParseError, ProgressSink};
use std::path::Path;
use tracing::{info, warn};

use crate::pipeline::Converter;
use crate::store::{ResultStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Identifier a source is stored under: its file name without extension.
pub fn source_id(base: &Path) -> String {
    match (base.file_stem(), base.extension()) {
        (Some(stem), Some(ext)) if ext == "off" || ext == "ply" => {
            stem.to_string_lossy().into_owned()
        }
        _ => base
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

/// Reuses a stored result for `id` when one loads cleanly, otherwise converts
/// `base` afresh and stores the outcome. `force_reload` discards any stored
/// entry first.
pub fn load_or_convert<S: ResultStore + ?Sized>(
    id: &str,
    base: &Path,
    store: &mut S,
    converter: &Converter,
    force_reload: bool,
    progress: &mut dyn ProgressSink,
) -> Result<ConversionResult, LoadError> {
    if force_reload {
        info!(id, "discarding stored point cloud");
        store.remove(id)?;
    } else if store.contains(id) {
        match store.load(id) {
            Ok(Some(result)) => {
                info!(id, groups = result.groups.len(), "loaded stored point cloud");
                return Ok(result);
            }
            Ok(None) => warn!(id, "stored point cloud vanished, converting source"),
            Err(e) => warn!(id, error = %e, "failed to load stored point cloud, converting source"),
        }
    }

    let result = converter.convert_path(base, progress)?;
    store.store(id, &result)?;
    Ok(result)
}
