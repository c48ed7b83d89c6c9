pub mod config;
pub mod error;
pub mod graph;
pub mod io;
pub mod optimizer;
pub mod ranking;
pub mod rng;
pub mod table;

pub use config::{GasaConfig, ModelType, Objective, Preset};
pub use error::{SahgaError, SahgaResult};
pub use graph::{ProximityGraph, WeightingPolicy};
pub use optimizer::{FitOutcome, Gasa};
pub use table::ObservationTable;
