//! Steinhardt bond-orientational order parameters for particle configurations.
//!
//! The engine consumes a validated neighbor-bond set and produces one scalar
//! order parameter per particle: the second-order invariant Ql, optionally the
//! second-shell averaged variant, and optionally the third-order invariant Wl
//! obtained by contracting the harmonic moments through Wigner 3j coefficients.
//! Neighbor discovery and box/periodicity handling stay with the caller; the
//! bond set carries the separation vectors it was built from.

pub mod common;
pub mod domain;
pub mod locality;
pub mod numerics;
pub mod order;

pub use domain::{OrderError, OrderResult};
pub use locality::{NeighborBond, NeighborList};
pub use order::{Steinhardt, SteinhardtConfig};
