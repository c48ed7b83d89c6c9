use super::{create, display_name};
use clap::Args;
use sahga::graph::{ProximityGraph, WeightingPolicy};
use sahga::io::{read_points, write_mpg};
use sahga::SahgaResult;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct MpgArgs {
    #[arg(short, long)]
    pub points: PathBuf,

    /// Neighborhood radius in kilometres.
    #[arg(short, long, default_value_t = 5.0)]
    pub radius: f64,

    #[arg(long, default_value = "half-radius")]
    pub policy: WeightingPolicy,

    #[arg(short, long)]
    pub out: PathBuf,
}

pub fn run(args: MpgArgs) -> SahgaResult<()> {
    let points = read_points(&args.points)?;
    let graph = ProximityGraph::create_mpg(&points, args.radius, args.policy)?;

    let mut w = create(&args.out)?;
    write_mpg(&graph, &display_name(&args.points), args.radius, &mut w)?;
    w.flush()?;

    info!(
        "🕸️  MPG with {} nodes and {} edges written to {}",
        graph.len(),
        graph.edge_count(),
        args.out.display()
    );
    Ok(())
}
