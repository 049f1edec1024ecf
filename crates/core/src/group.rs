/// One renderable buffer: at most `capacity` points, re-based to the
/// conversion's origin and narrowed to single precision.
#[derive(Debug, Clone, PartialEq)]
pub struct PointGroup {
    pub index: u32,
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[u8; 3]>,
}

impl PointGroup {
    pub fn new(index: u32, positions: Vec<[f32; 3]>, colors: Vec<[u8; 3]>) -> Self {
        assert_eq!(
            positions.len(),
            colors.len(),
            "positions and colors must have same length"
        );
        Self {
            index,
            positions,
            colors,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Point-topology index buffer: `0..len`, one index per vertex.
    pub fn indices(&self) -> Vec<u32> {
        (0..self.len() as u32).collect()
    }

    /// Colours normalised to `[0, 1]` for renderers that want float vertex colours.
    pub fn normalized_colors(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.colors.iter().map(|c| {
            [
                c[0] as f32 / 255.0,
                c[1] as f32 / 255.0,
                c[2] as f32 / 255.0,
            ]
        })
    }

    /// Undo the re-basing for point `i`.
    pub fn absolute_position(&self, i: usize, origin: [f64; 3]) -> [f64; 3] {
        let p = self.positions[i];
        [
            p[0] as f64 + origin[0],
            p[1] as f64 + origin[1],
            p[2] as f64 + origin[2],
        ]
    }
}

/// The complete output of one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    pub total_points: u32,
    pub groups: Vec<PointGroup>,
    /// Minimum corner subtracted from every position. `None` only when the
    /// source held no finite point.
    pub origin: Option<[f64; 3]>,
}

impl ConversionResult {
    pub fn empty() -> Self {
        Self {
            total_points: 0,
            groups: Vec::new(),
            origin: None,
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn iter_points(&self) -> impl Iterator<Item = ([f32; 3], [u8; 3])> + '_ {
        self.groups
            .iter()
            .flat_map(|g| g.positions.iter().copied().zip(g.colors.iter().copied()))
    }
}
