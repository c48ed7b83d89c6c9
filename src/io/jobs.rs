use super::{fields, open, parse_usize, record_line, semicolon_reader};
use crate::config::Objective;
use crate::error::{SahgaError, SahgaResult};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use strum::IntoEnumIterator;

/// One independent fit of a batch: `id;population;generations;objective`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchJob {
    pub id: u64,
    pub population: usize,
    pub generations: usize,
    pub objective: Objective,
}

/// Objective by name (`minboth`) or by its numeric code (`2`).
fn parse_objective(field: &str, line: u64) -> SahgaResult<Objective> {
    if let Ok(objective) = Objective::from_str(field) {
        return Ok(objective);
    }
    field
        .parse::<usize>()
        .ok()
        .and_then(|code| Objective::iter().nth(code))
        .ok_or_else(|| {
            SahgaError::MalformedInput(format!("line {}: unknown objective '{}'", line, field))
        })
}

pub fn read_batch_jobs(path: &Path) -> SahgaResult<Vec<BatchJob>> {
    read_batch_jobs_from_reader(open(path)?)
}

pub fn read_batch_jobs_from_reader<R: Read>(reader: R) -> SahgaResult<Vec<BatchJob>> {
    let mut rdr = semicolon_reader(reader);
    let mut jobs = Vec::new();
    for result in rdr.records() {
        let rec = result?;
        let line = record_line(&rec);
        let f = fields(&rec);
        if f.len() != 4 {
            return Err(SahgaError::MalformedInput(format!(
                "line {}: expected id;population;generations;objective",
                line
            )));
        }
        jobs.push(BatchJob {
            id: parse_usize(f[0], line, "job id")? as u64,
            population: parse_usize(f[1], line, "population")?,
            generations: parse_usize(f[2], line, "generations")?,
            objective: parse_objective(f[3], line)?,
        });
    }
    if jobs.is_empty() {
        return Err(SahgaError::MalformedInput("parameter file lists no jobs".into()));
    }
    Ok(jobs)
}
