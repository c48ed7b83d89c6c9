use super::create;
use clap::Args;
use sahga::io::{self, split_points};
use sahga::rng::RandomSource;
use sahga::SahgaResult;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    /// Tab-separated points file with a header line.
    #[arg(short, long)]
    pub points: PathBuf,

    #[arg(long)]
    pub train: PathBuf,

    #[arg(long)]
    pub test: PathBuf,

    /// Percentage of points sent to the training set.
    #[arg(short, long, default_value_t = 75.0)]
    pub ratio: f64,

    /// Keep class proportions in both sets.
    #[arg(long, default_value_t = false)]
    pub stratify: bool,
}

pub fn run(args: SplitArgs, seed: Option<u64>) -> SahgaResult<()> {
    let lines = io::read_data_lines(&args.points)?;
    let mut rng = RandomSource::new(seed);
    let split = split_points(&lines, args.ratio, args.stratify, &mut rng)?;

    let mut w = create(&args.train)?;
    split.write_train(&mut w)?;
    w.flush()?;

    let mut w = create(&args.test)?;
    split.write_test(&mut w)?;
    w.flush()?;

    info!(
        "✂️  {} points -> {} train ({}), {} test ({})",
        split.train.len() + split.test.len(),
        split.train.len(),
        args.train.display(),
        split.test.len(),
        args.test.display()
    );
    Ok(())
}
