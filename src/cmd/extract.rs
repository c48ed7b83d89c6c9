use super::{create, display_name};
use clap::Args;
use sahga::io::{read_points, write_layer_data, Layer};
use sahga::{SahgaError, SahgaResult};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(short, long)]
    pub points: PathBuf,

    /// Directory of ESRI ASCII grids; every file in it is loaded.
    #[arg(short, long)]
    pub layers: PathBuf,

    #[arg(short, long)]
    pub out: PathBuf,
}

pub fn run(args: ExtractArgs) -> SahgaResult<()> {
    let points = read_points(&args.points)?;

    let mut paths: Vec<PathBuf> = fs::read_dir(&args.layers)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    // Directory order is platform dependent; columns follow file names.
    paths.sort();

    let layers = paths
        .iter()
        .map(|p| Layer::load(p))
        .collect::<SahgaResult<Vec<Layer>>>()?;
    if layers.is_empty() {
        return Err(SahgaError::Config(format!(
            "no layer files found in {}",
            args.layers.display()
        )));
    }
    for layer in &layers {
        debug!("   layer {}: {}x{}", layer.name, layer.rows, layer.cols);
    }

    let mut w = create(&args.out)?;
    write_layer_data(&points, &layers, &display_name(&args.points), &mut w)?;
    w.flush()?;

    info!(
        "🗺️  Sampled {} layers at {} points into {}",
        layers.len(),
        points.rows(),
        args.out.display()
    );
    Ok(())
}
