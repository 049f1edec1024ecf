use pointgroups_core::{
    BoundsTracker, CancelToken, ConversionResult, ConvertConfig, NoProgress, ParseError,
    PointRecord, ProgressSink, ProgressThrottle,
};
use pointgroups_io::{format_of, open_source, read_header, resolve_source, Format, Vertices};
use pointgroups_partition::partition_with_progress;
use rayon::prelude::*;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::info;

/// Upper bound on records reserved up front from the header's declared count.
const MAX_PREALLOC: usize = 1 << 20;

/// Runs header parse, decode and partition for one source.
///
/// Always performs a fresh conversion; caching decisions belong to a
/// [`ResultStore`](crate::ResultStore).
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConvertConfig,
    cancel: Option<CancelToken>,
}

impl Converter {
    pub fn new(config: ConvertConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Resolves `base` (`.off` first, then `.ply`) and converts it.
    pub fn convert_path(
        &self,
        base: impl AsRef<Path>,
        progress: &mut dyn ProgressSink,
    ) -> Result<ConversionResult, ParseError> {
        self.config.validate()?;
        let path = resolve_source(base)?;
        info!(source = %path.display(), "converting point cloud");
        let reader = open_source(&path)?;
        self.convert_reader(reader, format_of(&path), progress)
    }

    pub fn convert_reader<R: BufRead>(
        &self,
        mut reader: R,
        hint: Option<Format>,
        progress: &mut dyn ProgressSink,
    ) -> Result<ConversionResult, ParseError> {
        self.config.validate()?;
        let header = read_header(&mut reader, hint)?;
        let total = header.vertex_count;

        let mut vertices = Vertices::new(reader, &header, self.config);
        if let Some(cancel) = &self.cancel {
            vertices = vertices.with_cancel(cancel.clone());
        }

        let throttle = ProgressThrottle::new(total);
        let mut bounds = BoundsTracker::new();
        let mut records: Vec<PointRecord> = Vec::with_capacity((total as usize).min(MAX_PREALLOC));
        for (i, record) in vertices.enumerate() {
            let record = record?;
            bounds.update(record.position);
            records.push(record);

            let i = i as u32;
            if throttle.should_report(i) {
                progress.report(throttle.fraction(i), &format!("{} out of {} loaded", i, total));
            }
        }

        let origin = bounds.finish();
        let groups = partition_with_progress(
            &records,
            origin.unwrap_or([0.0; 3]),
            self.config.capacity,
            progress,
        )?;

        info!(
            points = total,
            groups = groups.len(),
            origin = ?origin,
            "conversion finished"
        );

        Ok(ConversionResult {
            total_points: total,
            groups,
            origin,
        })
    }
}

/// Converts `base` without progress reporting or cancellation.
pub fn convert(
    base: impl AsRef<Path>,
    config: &ConvertConfig,
) -> Result<ConversionResult, ParseError> {
    Converter::new(*config).convert_path(base, &mut NoProgress)
}

/// Converts independent sources in parallel. Results are in input order.
pub fn convert_batch(
    bases: &[PathBuf],
    config: &ConvertConfig,
) -> Vec<Result<ConversionResult, ParseError>> {
    bases.par_iter().map(|base| convert(base, config)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointgroups_core::ErrorKind;
    use std::fs;
    use std::io::Cursor;

    const TRIANGLE: &str = "OFF\n3 0\n0 0 0\n1 0 0\n0 1 0\n";

    fn convert_str(src: &str, config: ConvertConfig) -> Result<ConversionResult, ParseError> {
        Converter::new(config).convert_reader(Cursor::new(src.as_bytes()), None, &mut NoProgress)
    }

    #[test]
    fn triangle_is_one_group() {
        let result = convert_str(TRIANGLE, ConvertConfig::default()).unwrap();
        assert_eq!(result.total_points, 3);
        assert_eq!(result.origin, Some([0.0; 3]));
        assert_eq!(result.groups.len(), 1);
        assert_eq!(
            result.groups[0].positions,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
        );
    }

    #[test]
    fn empty_source_has_no_origin() {
        let result = convert_str("OFF\n0 0\n", ConvertConfig::default()).unwrap();
        assert_eq!(result, ConversionResult::empty());
    }

    #[test]
    fn invalid_capacity_fails_before_reading() {
        let config = ConvertConfig {
            capacity: 0,
            ..Default::default()
        };
        let err = convert_str("garbage", config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCapacity);
    }

    #[test]
    fn decode_progress_reaches_one() {
        let mut events = Vec::new();
        let mut sink = |f: f32, m: &str| events.push((f, m.to_string()));
        Converter::default()
            .convert_reader(Cursor::new(TRIANGLE.as_bytes()), None, &mut sink)
            .unwrap();
        assert_eq!(events[0], (0.0, "0 out of 3 loaded".to_string()));
        assert_eq!(events[2], (1.0, "2 out of 3 loaded".to_string()));
        assert_eq!(events.last().unwrap().1, "1 out of 1 point groups built");
    }

    #[test]
    fn cancelled_conversion_returns_no_result() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = Converter::default()
            .with_cancel(cancel)
            .convert_reader(Cursor::new(TRIANGLE.as_bytes()), None, &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, ParseError::Cancelled { decoded: 0 }));
    }

    #[test]
    fn convert_path_resolves_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tri.off"), TRIANGLE).unwrap();
        let result = convert(dir.path().join("tri"), &ConvertConfig::default()).unwrap();
        assert_eq!(result.total_points, 3);
    }

    #[test]
    fn batch_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.off"), TRIANGLE).unwrap();
        fs::write(dir.path().join("b.off"), "OFF\n1 0\n5 5 5\n").unwrap();
        let bases = vec![
            dir.path().join("a"),
            dir.path().join("missing"),
            dir.path().join("b"),
        ];
        let results = convert_batch(&bases, &ConvertConfig::default());
        assert_eq!(results[0].as_ref().unwrap().total_points, 3);
        assert_eq!(results[1].as_ref().unwrap_err().kind(), ErrorKind::FileNotFound);
        assert_eq!(results[2].as_ref().unwrap().origin, Some([5.0, 5.0, 5.0]));
    }
}
