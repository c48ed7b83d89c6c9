use clap::{Parser, Subcommand};
use std::process;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,

    /// Seed for every random draw; omitted means entropy-seeded.
    #[arg(global = true, short = 'S', long)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Shuffle a points file into train and test sets.
    Split(cmd::split::SplitArgs),
    /// Build the proximity graph of a points file.
    Mpg(cmd::mpg::MpgArgs),
    /// Sample raster layers at every point.
    Extract(cmd::extract::ExtractArgs),
    /// Join an MPG with layer data into the fit input.
    Merge(cmd::merge::MergeArgs),
    /// Fit a model with the hybrid GA/SA optimizer.
    Fit(cmd::fit::FitArgs),
    /// Run independent fits listed in a parameter file.
    Batch(cmd::batch::BatchArgs),
    /// Score a saved model against another data set.
    Predict(cmd::predict::PredictArgs),
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Split(args) => cmd::split::run(args, cli.seed),
        Commands::Mpg(args) => cmd::mpg::run(args),
        Commands::Extract(args) => cmd::extract::run(args),
        Commands::Merge(args) => cmd::merge::run(args),
        Commands::Fit(args) => cmd::fit::run(args, cli.seed),
        Commands::Batch(args) => cmd::batch::run(args, cli.seed),
        Commands::Predict(args) => cmd::predict::run(args),
    };

    if let Err(e) = result {
        error!("❌ {}", e);
        process::exit(1);
    }
}
