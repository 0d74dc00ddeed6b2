pub type OrderResult<T> = Result<T, OrderError>;

/// Failures surfaced at the engine boundary.
///
/// Configuration errors fail construction synchronously; bond errors fail
/// `NeighborList` construction before any computation is attempted. Degenerate
/// inputs (zero neighbors, zero particles) are not errors and never appear
/// here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("spherical-harmonic degree must be 2 or greater, got {degree}")]
    DegreeTooSmall { degree: u32 },

    #[error("cutoff radii must satisfy 0 <= r_min < r_max, got r_min={r_min}, r_max={r_max}")]
    InvalidCutoffs { r_min: f64, r_max: f64 },

    #[error(
        "bond {bond_index} references query particle {query_index} outside the \
         {num_points}-particle set"
    )]
    QueryIndexOutOfRange {
        bond_index: usize,
        query_index: usize,
        num_points: usize,
    },

    #[error(
        "bond {bond_index} references neighbor particle {point_index} outside the \
         {num_points}-particle set"
    )]
    NeighborIndexOutOfRange {
        bond_index: usize,
        point_index: usize,
        num_points: usize,
    },

    #[error("bond {bond_index} is malformed: {reason}")]
    MalformedBond { bond_index: usize, reason: String },
}
