use pointgroups_core::{NoProgress, ParseError, PointGroup, PointRecord, ProgressSink};
use tracing::debug;

/// Groups built between two progress reports.
const REPORT_EVERY_GROUPS: u32 = 10;

/// `ceil(total / capacity)`; zero points need zero groups.
pub fn group_count(total: u32, capacity: u32) -> Result<u32, ParseError> {
    if capacity == 0 {
        return Err(ParseError::InvalidCapacity);
    }
    Ok(total.div_ceil(capacity))
}

/// Number of points that land in group `index`. Every group but the last is
/// full; the last holds the remainder, which is `capacity` itself when
/// `total` is an exact multiple.
pub fn group_len(index: u32, total: u32, capacity: u32) -> Result<u32, ParseError> {
    let count = group_count(total, capacity)?;
    if index >= count {
        return Ok(0);
    }
    if index + 1 < count {
        Ok(capacity)
    } else {
        Ok(total - index * capacity)
    }
}

/// Splits `records` into contiguous, index-ordered groups of at most
/// `capacity` points, re-based by `origin` and narrowed to `f32`.
pub fn partition(
    records: &[PointRecord],
    origin: [f64; 3],
    capacity: u32,
) -> Result<Vec<PointGroup>, ParseError> {
    partition_with_progress(records, origin, capacity, &mut NoProgress)
}

pub fn partition_with_progress(
    records: &[PointRecord],
    origin: [f64; 3],
    capacity: u32,
    progress: &mut dyn ProgressSink,
) -> Result<Vec<PointGroup>, ParseError> {
    let total = u32::try_from(records.len()).map_err(|_| {
        ParseError::MalformedHeader(format!("{} points exceed the u32 range", records.len()))
    })?;
    let count = group_count(total, capacity)?;

    let mut groups = Vec::with_capacity(count as usize);
    for (index, chunk) in records.chunks(capacity as usize).enumerate() {
        let index = index as u32;
        let mut positions = Vec::with_capacity(chunk.len());
        let mut colors = Vec::with_capacity(chunk.len());
        for r in chunk {
            positions.push(rebase(r.position, origin));
            colors.push(r.color);
        }
        debug!(group = index, points = chunk.len(), "built point group");
        groups.push(PointGroup::new(index, positions, colors));

        if index % REPORT_EVERY_GROUPS == 0 || index + 1 == count {
            progress.report(
                (index + 1) as f32 / count as f32,
                &format!("{} out of {} point groups built", index + 1, count),
            );
        }
    }

    debug_assert_eq!(groups.len() as u32, count);
    Ok(groups)
}

/// `position - origin`, computed in `f64` and narrowed once.
pub fn rebase(position: [f64; 3], origin: [f64; 3]) -> [f32; 3] {
    [
        (position[0] - origin[0]) as f32,
        (position[1] - origin[1]) as f32,
        (position[2] - origin[2]) as f32,
    ]
}
