/// Running component-wise minimum over streamed positions.
///
/// Seeded by the first finite point rather than by the origin, so a cloud that
/// lies entirely in the positive octant is not anchored at `(0, 0, 0)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundsTracker {
    min: Option<[f64; 3]>,
    seen: u64,
}

impl BoundsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, point: [f64; 3]) {
        if !point.iter().all(|v| v.is_finite()) {
            return;
        }

        self.seen += 1;
        match self.min.as_mut() {
            None => self.min = Some(point),
            Some(min) => {
                for (axis, &val) in point.iter().enumerate() {
                    min[axis] = min[axis].min(val);
                }
            }
        }
    }

    /// Number of finite points folded in so far.
    pub fn count(&self) -> u64 {
        self.seen
    }

    /// Freezes the fold. `None` means no finite point was ever seen.
    pub fn finish(self) -> Option<[f64; 3]> {
        self.min
    }

    pub fn from_positions<'a>(positions: impl IntoIterator<Item = &'a [f64; 3]>) -> Self {
        let mut tracker = Self::new();
        for p in positions {
            tracker.update(*p);
        }
        tracker
    }
}
