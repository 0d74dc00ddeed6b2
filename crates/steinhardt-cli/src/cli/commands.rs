use super::CliError;
use super::helpers::{cutoff_bonds, load_snapshot, write_report};
use serde::Serialize;
use std::path::PathBuf;
use steinhardt_core::{NeighborList, Steinhardt, SteinhardtConfig};
use tracing::info;

#[derive(clap::Args)]
pub(super) struct ComputeArgs {
    /// Snapshot JSON input path
    #[arg(long)]
    input: PathBuf,

    /// Report JSON output path
    #[arg(long)]
    output: PathBuf,

    /// Spherical-harmonic degree l
    #[arg(long, default_value_t = 6)]
    l: u32,

    /// Outer neighbor cutoff
    #[arg(long)]
    r_max: f64,

    /// Inner neighbor cutoff
    #[arg(long, default_value_t = 0.0)]
    r_min: f64,

    /// Average Qlm over the second neighbor shell
    #[arg(long)]
    average: bool,

    /// Compute the third-order invariant Wl
    #[arg(long)]
    wl: bool,

    /// Weight neighbor contributions by the snapshot's particle weights
    #[arg(long)]
    weighted: bool,

    /// Include the system-normalized Ql array in the report
    #[arg(long)]
    normalize: bool,
}

#[derive(Serialize)]
struct ComputeReport<'a> {
    config: &'a SteinhardtConfig,
    num_particles: usize,
    num_bonds: usize,
    system_norm: f64,
    ql: &'a [f64],
    #[serde(skip_serializing_if = "Option::is_none")]
    ql_ave: Option<&'a [f64]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wl: Option<&'a [f64]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    normalized_ql: Option<Vec<f64>>,
}

pub(super) fn run_compute_command(args: ComputeArgs) -> Result<i32, CliError> {
    let config = SteinhardtConfig::new(args.r_max, args.l)?
        .with_r_min(args.r_min)?
        .with_average(args.average)
        .with_wl(args.wl)
        .with_weighted(args.weighted);

    let snapshot = load_snapshot(&args.input)?;
    info!(
        particles = snapshot.positions.len(),
        periodic = snapshot.box_lengths.is_some(),
        "loaded snapshot"
    );

    let bonds = cutoff_bonds(&snapshot, config.r_max());
    info!(bonds = bonds.len(), "built cutoff bonds");
    let neighbors = NeighborList::new(snapshot.positions.len(), bonds)?;

    let mut engine = Steinhardt::new(config);
    engine.compute(&neighbors);
    info!(
        degree = config.degree(),
        system_norm = engine.system_norm(),
        "computed order parameters"
    );

    let report = ComputeReport {
        config: engine.config(),
        num_particles: engine.num_particles(),
        num_bonds: neighbors.len(),
        system_norm: engine.system_norm(),
        ql: engine.ql_raw(),
        ql_ave: config.is_average().then(|| engine.ql_ave()),
        wl: config.is_wl().then(|| engine.wl()),
        normalized_ql: args.normalize.then(|| engine.normalized_ql()),
    };
    write_report(&args.output, &report)?;

    println!(
        "Wrote order parameters for {} particles to {}",
        engine.num_particles(),
        args.output.display()
    );
    Ok(0)
}
