pub mod harmonics;
pub mod wigner;

pub use harmonics::{spherical_harmonic_band, y_lm};
pub use wigner::{Wigner3jInput, Wigner3jTable, wigner_3j};
