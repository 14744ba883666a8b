//! Compact columnar frame derived from one particle batch

/// One renderable snapshot of a particle batch.
///
/// `coords` is always present: three columns (x, y, z), one entry per
/// particle. `sizes` and `colors` exist only when the batch's first record
/// carried the corresponding optional fields; when present their length
/// equals the coordinate column length.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterFrame {
    /// x, y, z columns.
    pub coords: [Vec<f64>; 3],
    /// Display sizes (marker areas), one per particle.
    pub sizes: Option<Vec<f64>>,
    /// Display colors in (r, g, b) order, one per particle.
    pub colors: Option<Vec<[f64; 3]>>,
}

impl ScatterFrame {
    /// Number of particles in the frame.
    pub fn len(&self) -> usize {
        self.coords[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords[0].is_empty()
    }
}
