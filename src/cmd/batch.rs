use super::fit::prepare;
use crate::reports::{self, BatchRow};
use clap::Args;
use rayon::prelude::*;
use sahga::config::{FitParams, GasaConfig};
use sahga::io::{read_batch_jobs, BatchJob};
use sahga::optimizer::Gasa;
use sahga::SahgaResult;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    #[arg(short, long)]
    pub input: PathBuf,

    /// Lines of `id;population;generations;objective`.
    #[arg(short, long)]
    pub params: PathBuf,

    /// Defaults for everything a job line does not set.
    #[command(flatten)]
    pub fit: FitParams,

    #[arg(long, default_value_t = false)]
    pub no_normalize: bool,
}

fn job_config(base: &GasaConfig, job: &BatchJob, seed: Option<u64>) -> GasaConfig {
    GasaConfig {
        population_size: job.population,
        max_generations: job.generations,
        objective: job.objective,
        seed: seed.map(|s| s.wrapping_add(job.id)),
        ..base.clone()
    }
}

pub fn run(args: BatchArgs, seed: Option<u64>) -> SahgaResult<()> {
    let data = prepare(&args.input, !args.no_normalize)?;
    let jobs = read_batch_jobs(&args.params)?;
    let base = args.fit.to_config(None);

    info!("📦 Running {} jobs on {} rows", jobs.len(), data.table.rows());

    let rows: Vec<BatchRow> = jobs
        .par_iter()
        .map(|job| {
            let config = job_config(&base, job, seed);
            let start = Instant::now();
            let result = Gasa::new(&data.table, &data.graph, config).and_then(|mut g| g.run());
            if let Err(e) = &result {
                warn!("job {} failed: {}", job.id, e);
            }
            BatchRow {
                job: *job,
                result: result.map(|o| o.fitness()).map_err(|e| e.to_string()),
                elapsed: start.elapsed(),
            }
        })
        .collect();

    reports::print_batch_report(&rows);
    Ok(())
}
