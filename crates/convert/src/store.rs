use hashbrown::HashMap;
use pointgroups_core::{ConversionResult, ConvertConfig, ParseError, PointGroup};
use pointgroups_io::{open_source, read_header, write_group_ply, Format, Vertices};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufWriter, Write as _};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("stored group '{}' is unreadable: {source}", path.display())]
    Group {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("stored result is inconsistent: {0}")]
    Corrupt(String),

    #[error("'{0}' cannot name a stored entry")]
    InvalidId(String),
}

/// Persistence collaborator. Keyed by a source identifier; the conversion
/// core never consults it.
pub trait ResultStore {
    fn contains(&self, id: &str) -> bool;

    /// `Ok(None)` when nothing is stored under `id`.
    fn load(&self, id: &str) -> Result<Option<ConversionResult>, StoreError>;

    fn store(&mut self, id: &str, result: &ConversionResult) -> Result<(), StoreError>;

    fn remove(&mut self, id: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, ConversionResult>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResultStore for MemoryStore {
    fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    fn load(&self, id: &str) -> Result<Option<ConversionResult>, StoreError> {
        Ok(self.entries.get(id).cloned())
    }

    fn store(&mut self, id: &str, result: &ConversionResult) -> Result<(), StoreError> {
        self.entries.insert(id.to_string(), result.clone());
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        self.entries.remove(id);
        Ok(())
    }
}

const MANIFEST: &str = "manifest.json";

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    total_points: u32,
    origin: Option<[f64; 3]>,
    group_sizes: Vec<u32>,
}

/// Directory-backed store: `<root>/<id>/manifest.json` plus one binary PLY
/// per group, `<root>/<id>/<id><index>.ply`.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// An id must name exactly one directory directly under the root.
    fn entry_dir(&self, id: &str) -> Result<PathBuf, StoreError> {
        if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.root.join(id))
    }

    pub fn group_path(&self, id: &str, index: u32) -> Result<PathBuf, StoreError> {
        Ok(self.entry_dir(id)?.join(format!("{}{}.ply", id, index)))
    }

    fn read_group(&self, id: &str, index: u32, expected: u32) -> Result<PointGroup, StoreError> {
        let path = self.group_path(id, index)?;
        let wrap = |source: ParseError| StoreError::Group {
            path: path.clone(),
            source,
        };

        let mut reader = open_source(&path).map_err(wrap)?;
        let header = read_header(&mut reader, Some(Format::Ply)).map_err(wrap)?;
        if header.vertex_count != expected {
            return Err(StoreError::Corrupt(format!(
                "group {} holds {} points, manifest says {}",
                index, header.vertex_count, expected
            )));
        }

        let mut positions = Vec::with_capacity(expected as usize);
        let mut colors = Vec::with_capacity(expected as usize);
        for record in Vertices::new(reader, &header, ConvertConfig::default()) {
            let record = record.map_err(wrap)?;
            let [x, y, z] = record.position;
            positions.push([x as f32, y as f32, z as f32]);
            colors.push(record.color);
        }
        Ok(PointGroup::new(index, positions, colors))
    }
}

impl ResultStore for DirStore {
    fn contains(&self, id: &str) -> bool {
        self.entry_dir(id)
            .map(|dir| dir.join(MANIFEST).is_file())
            .unwrap_or(false)
    }

    fn load(&self, id: &str) -> Result<Option<ConversionResult>, StoreError> {
        let manifest_path = self.entry_dir(id)?.join(MANIFEST);
        if !manifest_path.is_file() {
            return Ok(None);
        }

        let manifest: Manifest = serde_json::from_slice(&fs::read(manifest_path)?)?;

        let groups = manifest
            .group_sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| self.read_group(id, i as u32, size))
            .collect::<Result<Vec<_>, _>>()?;

        let stored: u64 = groups.iter().map(|g| g.len() as u64).sum();
        if stored != manifest.total_points as u64 {
            return Err(StoreError::Corrupt(format!(
                "groups hold {} points, manifest says {}",
                stored, manifest.total_points
            )));
        }

        Ok(Some(ConversionResult {
            total_points: manifest.total_points,
            groups,
            origin: manifest.origin,
        }))
    }

    fn store(&mut self, id: &str, result: &ConversionResult) -> Result<(), StoreError> {
        self.remove(id)?;
        let dir = self.entry_dir(id)?;
        fs::create_dir_all(&dir)?;

        for group in &result.groups {
            let file = fs::File::create(self.group_path(id, group.index)?)?;
            write_group_ply(BufWriter::new(file), group)?;
        }

        // Manifest goes last so a half-written entry is never reported as present.
        let manifest = Manifest {
            total_points: result.total_points,
            origin: result.origin,
            group_sizes: result.groups.iter().map(|g| g.len() as u32).collect(),
        };
        let mut w = BufWriter::new(fs::File::create(dir.join(MANIFEST))?);
        serde_json::to_writer_pretty(&mut w, &manifest)?;
        w.flush()?;
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        let dir = self.entry_dir(id)?;
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        Ok(())
    }
}
