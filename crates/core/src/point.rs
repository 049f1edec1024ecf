/// Colour assigned to every point whose source carries no complete RGB set.
pub const DEFAULT_COLOR: [u8; 3] = [0, 255, 255];

/// One decoded vertex.
///
/// Positions stay at double precision until the partitioner re-bases them;
/// narrowing to `f32` any earlier loses precision on large survey coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRecord {
    pub position: [f64; 3],
    pub color: [u8; 3],
}

impl PointRecord {
    pub fn new(position: [f64; 3], color: [u8; 3]) -> Self {
        Self { position, color }
    }

    pub fn uncolored(position: [f64; 3]) -> Self {
        Self {
            position,
            color: DEFAULT_COLOR,
        }
    }
}
