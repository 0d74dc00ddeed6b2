use super::accumulator::HarmonicArena;
use super::config::SteinhardtConfig;
use crate::common::constants::FOUR_PI;
use crate::locality::NeighborList;
use crate::numerics::kahan_sum;
use crate::numerics::special::{Wigner3jTable, spherical_harmonic_band};
use num_complex::Complex64;
use rayon::prelude::*;

/// Steinhardt bond-orientational order-parameter engine.
///
/// For a particle i with neighbors j, the engine accumulates the complex
/// harmonic moments
/// `Qlm(i) = (1/W) * sum_j w_j * Y_lm(theta_ij, phi_ij)`
/// (W the neighbor count, or the bond-weight total in weighted mode) and
/// derives the rotationally invariant scalar
/// `Ql(i) = sqrt(4*pi/(2l+1) * sum_m |Qlm(i)[m]|^2)`.
///
/// With `average` enabled a second pass replaces each particle's moments by
/// the mean of its direct neighbors' already-reduced moments before the
/// invariant is taken. With `wl` enabled the third-order invariant is formed
/// by contracting moment triples through Wigner 3j coefficients; it separates
/// structures that share similar Ql values (FCC, HCP, BCC).
///
/// One engine is reusable across frames: `compute` overwrites the previous
/// results in place, reallocating per-particle storage only when the particle
/// count changes. All failure modes live in [`SteinhardtConfig`] and
/// [`NeighborList`] construction, so a `compute` call always completes and
/// never leaves partially-updated results behind.
#[derive(Debug)]
pub struct Steinhardt {
    config: SteinhardtConfig,
    num_points: usize,
    scratch: HarmonicArena,
    qlmi: Vec<Complex64>,
    qlmi_ave: Vec<Complex64>,
    qli: Vec<f64>,
    qli_ave: Vec<f64>,
    wli: Vec<f64>,
    qlm_system: Vec<Complex64>,
    norm: f64,
    wigner_table: Option<Wigner3jTable>,
}

impl Steinhardt {
    pub fn new(config: SteinhardtConfig) -> Self {
        let wigner_table = config
            .is_wl()
            .then(|| Wigner3jTable::new(config.degree()));
        Self {
            config,
            num_points: 0,
            scratch: HarmonicArena::default(),
            qlmi: Vec::new(),
            qlmi_ave: Vec::new(),
            qli: Vec::new(),
            qli_ave: Vec::new(),
            wli: Vec::new(),
            qlm_system: vec![Complex64::new(0.0, 0.0); config.harmonic_width()],
            norm: 0.0,
            wigner_table,
        }
    }

    pub fn config(&self) -> &SteinhardtConfig {
        &self.config
    }

    /// Particle count of the last computation; zero before the first call.
    pub fn num_particles(&self) -> usize {
        self.num_points
    }

    /// Runs all passes for the given bond set and publishes the results.
    ///
    /// Bonds outside `[r_min, r_max)` are ignored. A particle with no
    /// contributing bonds gets an all-zero moment vector and a zero invariant;
    /// an empty particle set yields empty result arrays.
    pub fn compute(&mut self, neighbors: &NeighborList) {
        let num_points = neighbors.num_points();
        let width = self.config.harmonic_width();
        self.reallocate(num_points);

        // Base accumulation: per-worker arenas merged once at the barrier.
        self.scratch.reset(width, num_points);
        let merged = accumulate_direct(&self.config, neighbors, width, num_points);
        self.scratch.merge_from(&merged);
        publish_reduced(&self.scratch, &mut self.qlmi, &mut self.qli, width);

        if self.config.is_average() {
            // The second shell reads only the reduced first-pass moments; the
            // publish above is the ordering barrier between the passes.
            self.scratch.reset(width, num_points);
            let merged =
                accumulate_second_shell(&self.config, neighbors, &self.qlmi, width, num_points);
            self.scratch.merge_from(&merged);
            publish_reduced(&self.scratch, &mut self.qlmi_ave, &mut self.qli_ave, width);
        }

        let active = if self.config.is_average() {
            &self.qlmi_ave
        } else {
            &self.qlmi
        };
        self.qlm_system = system_mean(active, width, num_points);
        self.norm = second_order_invariant(&self.qlm_system);

        if let Some(table) = &self.wigner_table {
            let source = if self.config.is_average() {
                &self.qlmi_ave
            } else {
                &self.qlmi
            };
            self.wli
                .par_iter_mut()
                .enumerate()
                .for_each(|(particle, out)| {
                    let row = &source[particle * width..(particle + 1) * width];
                    *out = third_order_invariant(row, table);
                });
        }
    }

    fn reallocate(&mut self, num_points: usize) {
        if self.num_points == num_points {
            return;
        }
        let width = self.config.harmonic_width();
        let zero = Complex64::new(0.0, 0.0);
        self.qlmi.resize(num_points * width, zero);
        self.qli.resize(num_points, 0.0);
        if self.config.is_average() {
            self.qlmi_ave.resize(num_points * width, zero);
            self.qli_ave.resize(num_points, 0.0);
        }
        if self.config.is_wl() {
            self.wli.resize(num_points, 0.0);
        }
        self.num_points = num_points;
    }

    /// The order parameter selected by the configuration: Wl when enabled,
    /// else the second-shell averaged Ql when enabled, else Ql.
    pub fn order(&self) -> &[f64] {
        if self.config.is_wl() { &self.wli } else { self.ql() }
    }

    /// Ql per particle; the second-shell averaged variant when `average` is
    /// configured.
    pub fn ql(&self) -> &[f64] {
        if self.config.is_average() {
            &self.qli_ave
        } else {
            &self.qli
        }
    }

    /// The direct-neighbor Ql, regardless of the `average` flag.
    pub fn ql_raw(&self) -> &[f64] {
        &self.qli
    }

    /// Second-shell averaged Ql; falls back to the direct-neighbor Ql when
    /// averaging is not configured.
    pub fn ql_ave(&self) -> &[f64] {
        if self.config.is_average() {
            &self.qli_ave
        } else {
            &self.qli
        }
    }

    /// Wl per particle; falls back to the configured Ql variant when the
    /// third-order invariant is not enabled.
    pub fn wl(&self) -> &[f64] {
        if self.config.is_wl() { &self.wli } else { self.ql() }
    }

    /// The per-particle moment vectors the invariants were derived from
    /// (second-shell averaged when `average` is configured), 2l+1 values per
    /// particle ordered by m from -l to l.
    pub fn particle_harmonics(&self) -> &[Complex64] {
        if self.config.is_average() {
            &self.qlmi_ave
        } else {
            &self.qlmi
        }
    }

    /// Mean moment vector over all particles of the last computation.
    pub fn system_harmonics(&self) -> &[Complex64] {
        &self.qlm_system
    }

    /// Scalar invariant of the system-mean moment vector.
    ///
    /// Exposed read-only; `ql` is never rescaled by it implicitly. Use
    /// [`Self::normalized_ql`] for the system-normalized variant.
    pub fn system_norm(&self) -> f64 {
        self.norm
    }

    /// Ql rescaled by the system-level norm; all zeros when the norm is zero.
    pub fn normalized_ql(&self) -> Vec<f64> {
        if self.norm == 0.0 {
            return vec![0.0; self.num_points];
        }
        self.ql().iter().map(|value| value / self.norm).collect()
    }
}

fn accumulate_direct(
    config: &SteinhardtConfig,
    neighbors: &NeighborList,
    width: usize,
    num_points: usize,
) -> HarmonicArena {
    neighbors
        .bonds()
        .par_iter()
        .filter(|bond| config.in_shell(bond.distance))
        .fold(
            || HarmonicArena::new(width, num_points),
            |mut arena, bond| {
                let (theta, phi) = bond.polar_angles();
                let band = spherical_harmonic_band(config.degree(), theta, phi);
                let weight = if config.is_weighted() { bond.weight } else { 1.0 };
                arena.accumulate(bond.query_index, &band, weight);
                arena
            },
        )
        .reduce(
            || HarmonicArena::new(width, num_points),
            |mut left, right| {
                left.merge_from(&right);
                left
            },
        )
}

fn accumulate_second_shell(
    config: &SteinhardtConfig,
    neighbors: &NeighborList,
    qlmi: &[Complex64],
    width: usize,
    num_points: usize,
) -> HarmonicArena {
    neighbors
        .bonds()
        .par_iter()
        .filter(|bond| config.in_shell(bond.distance))
        .fold(
            || HarmonicArena::new(width, num_points),
            |mut arena, bond| {
                let row = &qlmi[bond.point_index * width..(bond.point_index + 1) * width];
                let weight = if config.is_weighted() { bond.weight } else { 1.0 };
                arena.accumulate(bond.query_index, row, weight);
                arena
            },
        )
        .reduce(
            || HarmonicArena::new(width, num_points),
            |mut left, right| {
                left.merge_from(&right);
                left
            },
        )
}

/// Divides the merged sums by their divisors and derives the scalar
/// invariant; zero-divisor particles short-circuit to all-zero results.
fn publish_reduced(
    arena: &HarmonicArena,
    qlm_out: &mut [Complex64],
    ql_out: &mut [f64],
    width: usize,
) {
    qlm_out
        .par_chunks_mut(width)
        .zip(ql_out.par_iter_mut())
        .enumerate()
        .for_each(|(particle, (row, ql))| {
            let divisor = arena.divisor(particle);
            if divisor > 0.0 {
                for (slot, sum) in row.iter_mut().zip(arena.row(particle)) {
                    *slot = *sum / divisor;
                }
            } else {
                row.fill(Complex64::new(0.0, 0.0));
            }
            *ql = second_order_invariant(row);
        });
}

fn second_order_invariant(row: &[Complex64]) -> f64 {
    let magnitude = kahan_sum(row.iter().map(|value| value.norm_sqr()));
    (FOUR_PI / row.len() as f64 * magnitude).sqrt()
}

fn system_mean(source: &[Complex64], width: usize, num_points: usize) -> Vec<Complex64> {
    if num_points == 0 {
        return vec![Complex64::new(0.0, 0.0); width];
    }
    (0..width)
        .map(|m| {
            let re = kahan_sum((0..num_points).map(|particle| source[particle * width + m].re));
            let im = kahan_sum((0..num_points).map(|particle| source[particle * width + m].im));
            Complex64::new(re, im) / num_points as f64
        })
        .collect()
}

/// Contracts a moment vector with the Wigner 3j table over all triples with
/// m1 + m2 + m3 = 0. The imaginary part cancels by the symmetry of the
/// coefficients and is not retained.
fn third_order_invariant(row: &[Complex64], table: &Wigner3jTable) -> f64 {
    let l = table.degree() as i32;
    let mut total = Complex64::new(0.0, 0.0);
    for m1 in -l..=l {
        for m2 in (-l).max(-l - m1)..=l.min(l - m1) {
            let m3 = -m1 - m2;
            let Some(coefficient) = table.get(m1, m2) else {
                continue;
            };
            let product = row[(m1 + l) as usize] * row[(m2 + l) as usize] * row[(m3 + l) as usize];
            total += product * coefficient;
        }
    }
    total.re
}
