use num_complex::Complex64;

/// Per-worker accumulation arena for complex harmonic sums.
///
/// Each parallel worker owns one arena exclusively while a pass runs, so
/// accumulation needs no synchronization; the reduction barrier merges the
/// arenas additively into a single canonical instance. Alongside the
/// (particle, m) complex sums the arena tracks each particle's divisor, the
/// neighbor count or the bond-weight total in weighted mode.
#[derive(Debug, Clone, Default)]
pub struct HarmonicArena {
    width: usize,
    qlm: Vec<Complex64>,
    divisor: Vec<f64>,
}

impl HarmonicArena {
    pub fn new(width: usize, num_points: usize) -> Self {
        Self {
            width,
            qlm: vec![Complex64::new(0.0, 0.0); width * num_points],
            divisor: vec![0.0; num_points],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn num_points(&self) -> usize {
        self.divisor.len()
    }

    /// Adds a weighted harmonic row into `point`'s slot and grows its divisor.
    ///
    /// Out-of-range indices and mismatched row widths are caller preconditions,
    /// enforced upstream by `NeighborList` validation.
    pub fn accumulate(&mut self, point: usize, values: &[Complex64], weight: f64) {
        debug_assert_eq!(values.len(), self.width);
        let row = &mut self.qlm[point * self.width..(point + 1) * self.width];
        for (slot, value) in row.iter_mut().zip(values) {
            *slot += *value * weight;
        }
        self.divisor[point] += weight;
    }

    /// Additively merges another worker's arena into this one.
    pub fn merge_from(&mut self, other: &HarmonicArena) {
        debug_assert_eq!(self.width, other.width);
        debug_assert_eq!(self.num_points(), other.num_points());
        for (slot, value) in self.qlm.iter_mut().zip(&other.qlm) {
            *slot += *value;
        }
        for (slot, value) in self.divisor.iter_mut().zip(&other.divisor) {
            *slot += value;
        }
    }

    /// Zeroes all storage, reallocating only if the particle count changed.
    pub fn reset(&mut self, width: usize, num_points: usize) {
        if self.width != width || self.num_points() != num_points {
            self.width = width;
            self.qlm = vec![Complex64::new(0.0, 0.0); width * num_points];
            self.divisor = vec![0.0; num_points];
            return;
        }
        self.qlm.fill(Complex64::new(0.0, 0.0));
        self.divisor.fill(0.0);
    }

    pub fn row(&self, point: usize) -> &[Complex64] {
        &self.qlm[point * self.width..(point + 1) * self.width]
    }

    pub fn divisor(&self, point: usize) -> f64 {
        self.divisor[point]
    }
}
