use crate::reports;
use clap::Args;
use sahga::io::{read_graph_table, read_result};
use sahga::SahgaResult;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    /// Combined graph+table file of the held-out points.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Result file written by `fit --out`.
    #[arg(short, long)]
    pub result: PathBuf,

    /// The input was fitted without normalization.
    #[arg(long, default_value_t = false)]
    pub no_normalize: bool,
}

pub fn run(args: PredictArgs) -> SahgaResult<()> {
    let saved = read_result(&args.result)?;
    let (graph, mut table) = read_graph_table(&args.input)?;

    if !args.no_normalize {
        // Test rows are standardized with the training statistics.
        table.set_stats(&saved.means, &saved.std_devs)?;
        table.apply_normalization(true)?;
    }

    let outcome = saved.outcome();
    let summary = outcome.evaluate(&table, &graph)?;
    info!(
        "🔎 {} model applied to {} rows",
        outcome.model,
        table.rows()
    );
    reports::print_confusion(&summary);
    Ok(())
}
