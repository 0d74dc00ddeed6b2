use anyhow::{Context, bail};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use steinhardt_core::NeighborBond;
use tracing::warn;

/// Single-frame particle snapshot.
///
/// `box` holds orthorhombic box lengths for periodic systems; omit it for
/// open boundaries. `weights` optionally assigns each particle a weight that
/// becomes the weight of every bond pointing at it.
#[derive(Debug, Deserialize)]
pub(super) struct Snapshot {
    #[serde(rename = "box", default)]
    pub box_lengths: Option<[f64; 3]>,
    pub positions: Vec<[f64; 3]>,
    #[serde(default)]
    pub weights: Option<Vec<f64>>,
}

pub(super) fn load_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot '{}'", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&source)
        .with_context(|| format!("failed to parse snapshot '{}'", path.display()))?;

    if let Some(lengths) = snapshot.box_lengths
        && lengths.iter().any(|length| !(*length > 0.0))
    {
        bail!(
            "snapshot '{}' has non-positive box lengths {:?}",
            path.display(),
            lengths
        );
    }
    if snapshot
        .positions
        .iter()
        .flatten()
        .any(|component| !component.is_finite())
    {
        bail!(
            "snapshot '{}' contains a non-finite position component",
            path.display()
        );
    }
    if let Some(weights) = &snapshot.weights
        && weights.len() != snapshot.positions.len()
    {
        bail!(
            "snapshot '{}' has {} weights for {} positions",
            path.display(),
            weights.len(),
            snapshot.positions.len()
        );
    }

    Ok(snapshot)
}

/// Brute-force cutoff bond builder with orthorhombic minimum-image wrapping.
///
/// Produces each qualifying directed bond exactly once per query particle.
/// This is a convenience for snapshot-sized inputs; the engine itself never
/// searches for neighbors.
pub(super) fn cutoff_bonds(snapshot: &Snapshot, r_max: f64) -> Vec<NeighborBond> {
    if let Some(lengths) = snapshot.box_lengths
        && lengths.iter().any(|length| *length < 2.0 * r_max)
    {
        warn!(
            ?lengths,
            r_max, "box shorter than 2*r_max on some axis; minimum image may miss neighbors"
        );
    }

    let positions = &snapshot.positions;
    let mut bonds = Vec::new();
    for (query_index, query) in positions.iter().enumerate() {
        for (point_index, point) in positions.iter().enumerate() {
            if query_index == point_index {
                continue;
            }

            let mut delta = [
                point[0] - query[0],
                point[1] - query[1],
                point[2] - query[2],
            ];
            if let Some(lengths) = snapshot.box_lengths {
                for axis in 0..3 {
                    delta[axis] -= lengths[axis] * (delta[axis] / lengths[axis]).round();
                }
            }

            let weight = snapshot
                .weights
                .as_ref()
                .map_or(1.0, |weights| weights[point_index]);
            let bond = NeighborBond::new(query_index, point_index, delta, weight);
            if bond.distance > 0.0 && bond.distance < r_max {
                bonds.push(bond);
            }
        }
    }

    bonds
}

pub(super) fn write_report(path: &Path, report: &impl serde::Serialize) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create report directory '{}'", parent.display()))?;
    }
    let rendered = serde_json::to_string_pretty(report).context("failed to render report")?;
    fs::write(path, rendered)
        .with_context(|| format!("failed to write report '{}'", path.display()))
}
