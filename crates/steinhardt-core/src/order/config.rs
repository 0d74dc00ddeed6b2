use crate::domain::{OrderError, OrderResult};
use serde::Serialize;

/// Immutable configuration of a [`Steinhardt`](super::Steinhardt) engine.
///
/// Validated at construction; no engine can exist with an invalid
/// configuration. Neighbor bonds contribute only when their distance falls in
/// `[r_min, r_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SteinhardtConfig {
    r_max: f64,
    r_min: f64,
    degree: u32,
    average: bool,
    wl: bool,
    weighted: bool,
}

impl SteinhardtConfig {
    /// Minimal configuration: outer cutoff and harmonic degree, inner cutoff
    /// zero, all refinement flags off.
    pub fn new(r_max: f64, degree: u32) -> OrderResult<Self> {
        let config = Self {
            r_max,
            r_min: 0.0,
            degree,
            average: false,
            wl: false,
            weighted: false,
        };
        config.validate()?;
        Ok(config)
    }

    /// Replaces the inner cutoff, re-validating the radii pair.
    pub fn with_r_min(mut self, r_min: f64) -> OrderResult<Self> {
        self.r_min = r_min;
        self.validate()?;
        Ok(self)
    }

    /// Enables averaging Qlm over each particle's second neighbor shell.
    pub fn with_average(mut self, average: bool) -> Self {
        self.average = average;
        self
    }

    /// Enables the third-order invariant Wl.
    pub fn with_wl(mut self, wl: bool) -> Self {
        self.wl = wl;
        self
    }

    /// Weights neighbor contributions by bond weight instead of unit counts.
    pub fn with_weighted(mut self, weighted: bool) -> Self {
        self.weighted = weighted;
        self
    }

    fn validate(&self) -> OrderResult<()> {
        if self.degree < 2 {
            return Err(OrderError::DegreeTooSmall {
                degree: self.degree,
            });
        }
        if !self.r_min.is_finite()
            || !self.r_max.is_finite()
            || self.r_min < 0.0
            || self.r_min >= self.r_max
        {
            return Err(OrderError::InvalidCutoffs {
                r_min: self.r_min,
                r_max: self.r_max,
            });
        }
        Ok(())
    }

    pub fn r_max(&self) -> f64 {
        self.r_max
    }

    pub fn r_min(&self) -> f64 {
        self.r_min
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    pub fn is_average(&self) -> bool {
        self.average
    }

    pub fn is_wl(&self) -> bool {
        self.wl
    }

    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    /// Width of every harmonic vector for this configuration: 2l+1.
    pub fn harmonic_width(&self) -> usize {
        (2 * self.degree + 1) as usize
    }

    /// Whether a bond at `distance` contributes to the accumulation.
    pub fn in_shell(&self, distance: f64) -> bool {
        distance >= self.r_min && distance < self.r_max
    }
}
