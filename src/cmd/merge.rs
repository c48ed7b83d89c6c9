use super::create;
use clap::Args;
use sahga::io::{merge_layer_data, read_layer_data, read_mpg, write_graph_table};
use sahga::SahgaResult;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    #[arg(short, long)]
    pub mpg: PathBuf,

    #[arg(short, long)]
    pub layers_data: PathBuf,

    #[arg(short, long)]
    pub out: PathBuf,
}

pub fn run(args: MergeArgs) -> SahgaResult<()> {
    let graph = read_mpg(&args.mpg)?;
    let layer_data = read_layer_data(&args.layers_data)?;
    let table = merge_layer_data(&graph, &layer_data)?;

    let mut w = create(&args.out)?;
    write_graph_table(&graph, &table, &mut w)?;
    w.flush()?;

    info!(
        "🔗 Merged {} rows x {} columns into {}",
        table.rows(),
        table.cols(),
        args.out.display()
    );
    Ok(())
}
