use super::{create, display_name};
use crate::reports;
use clap::Args;
use sahga::config::{FitParams, GasaConfig};
use sahga::graph::ProximityGraph;
use sahga::io::{read_graph_table, write_result};
use sahga::optimizer::{FitOutcome, Gasa};
use sahga::table::ObservationTable;
use sahga::SahgaResult;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct FitArgs {
    /// Combined graph+table file produced by `merge`.
    #[arg(short, long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub params: FitParams,

    /// Fit on raw covariates instead of standardized ones.
    #[arg(long, default_value_t = false)]
    pub no_normalize: bool,

    /// Result file with coefficients and column statistics.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// JSON summary with the configuration and generation trace.
    #[arg(long)]
    pub json: Option<PathBuf>,
}

/// Fit input with the statistics of the raw columns.
pub(crate) struct Prepared {
    pub graph: ProximityGraph,
    pub table: ObservationTable,
    pub means: Vec<f64>,
    pub std_devs: Vec<f64>,
}

/// Loads the combined file and standardizes every covariate column.
pub(crate) fn prepare(input: &Path, normalize: bool) -> SahgaResult<Prepared> {
    let (graph, mut table) = read_graph_table(input)?;
    table.update_stats()?;
    let means = table.means();
    let std_devs = table.std_devs();
    if normalize {
        table.normalize(true)?;
    }
    Ok(Prepared {
        graph,
        table,
        means,
        std_devs,
    })
}

#[derive(Serialize)]
struct FitSummary<'a> {
    input: String,
    config: &'a GasaConfig,
    outcome: &'a FitOutcome,
    means: &'a [f64],
    std_devs: &'a [f64],
}

pub fn run(args: FitArgs, seed: Option<u64>) -> SahgaResult<()> {
    let data = prepare(&args.input, !args.no_normalize)?;
    let config = args.params.to_config(seed);

    info!(
        "🚀 Fitting {} model ({}) on {} rows: population {}, {} generations",
        config.model,
        config.objective,
        data.table.rows(),
        config.population_size,
        config.max_generations
    );

    let start = Instant::now();
    let mut gasa = Gasa::new(&data.table, &data.graph, config.clone())?;
    let outcome = gasa.run()?;
    let elapsed = start.elapsed();

    let summary = outcome.evaluate(&data.table, &data.graph)?;
    reports::print_fit_report(&outcome, &summary, elapsed);

    if let Some(path) = &args.out {
        let mut w = create(path)?;
        write_result(
            &outcome,
            &data.means,
            &data.std_devs,
            &display_name(&args.input),
            &mut w,
        )?;
        w.flush()?;
        info!("💾 Result saved to {}", path.display());
    }

    if let Some(path) = &args.json {
        let mut w = create(path)?;
        let doc = FitSummary {
            input: display_name(&args.input),
            config: &config,
            outcome: &outcome,
            means: &data.means,
            std_devs: &data.std_devs,
        };
        serde_json::to_writer_pretty(&mut w, &doc)?;
        w.flush()?;
        info!("💾 Summary saved to {}", path.display());
    }
    Ok(())
}
