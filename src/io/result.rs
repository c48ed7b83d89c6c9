use super::{open, parse_f64};
use crate::config::{ModelType, Objective};
use crate::error::{SahgaError, SahgaResult};
use crate::optimizer::FitOutcome;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::str::FromStr;

const MODEL_KEY: &str = "// Model:";
const OBJECTIVE_KEY: &str = "// Objective:";
const EPSILON_KEY: &str = "// Epsilon:";
const FITNESS_KEY: &str = "// Final fitness =";

/// Contents of a saved model: coefficients plus the column statistics used
/// to normalize the training data.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultFile {
    pub model: ModelType,
    pub objective: Objective,
    pub epsilon: f64,
    pub fitness: f64,
    pub coefficients: Vec<f64>,
    pub means: Vec<f64>,
    pub std_devs: Vec<f64>,
}

impl ResultFile {
    pub fn outcome(&self) -> FitOutcome {
        FitOutcome::from_coefficients(
            self.model,
            self.objective,
            self.epsilon,
            &self.coefficients,
            self.fitness,
        )
    }
}

fn write_values<W: Write>(values: &[f64], w: &mut W) -> SahgaResult<()> {
    for v in values {
        write!(w, "{:.8};", v)?;
    }
    writeln!(w)?;
    Ok(())
}

pub fn write_result<W: Write>(
    outcome: &FitOutcome,
    means: &[f64],
    std_devs: &[f64],
    source_name: &str,
    w: &mut W,
) -> SahgaResult<()> {
    writeln!(w, "// Model fitted for input file: {}", source_name)?;
    writeln!(w, "{} {}", MODEL_KEY, outcome.model)?;
    writeln!(w, "{} {}", OBJECTIVE_KEY, outcome.objective)?;
    writeln!(w, "{} {}", EPSILON_KEY, outcome.epsilon)?;
    writeln!(w, "{} {:.8}", FITNESS_KEY, outcome.fitness())?;
    writeln!(w, "// Coefficients --> c1;c2;...;cn;constant;[lambda]")?;
    write_values(&outcome.coefficients(), w)?;
    writeln!(w, "// Column means --> x0;x1;...;xn")?;
    write_values(means, w)?;
    writeln!(w, "// Column standard deviations --> s0;s1;...;sn")?;
    write_values(std_devs, w)?;
    Ok(())
}

pub fn read_result(path: &Path) -> SahgaResult<ResultFile> {
    read_result_from_reader(open(path)?)
}

pub fn read_result_from_reader<R: Read>(reader: R) -> SahgaResult<ResultFile> {
    let mut model = None;
    let mut objective = Objective::default();
    let mut epsilon = 0.1;
    let mut fitness = f64::NAN;
    let mut data: Vec<Vec<f64>> = Vec::new();

    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let line_no = idx as u64 + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix(MODEL_KEY) {
            model = Some(ModelType::from_str(rest.trim()).map_err(|_| {
                SahgaError::MalformedInput(format!("line {}: unknown model '{}'", line_no, rest.trim()))
            })?);
        } else if let Some(rest) = line.strip_prefix(OBJECTIVE_KEY) {
            objective = Objective::from_str(rest.trim()).map_err(|_| {
                SahgaError::MalformedInput(format!(
                    "line {}: unknown objective '{}'",
                    line_no,
                    rest.trim()
                ))
            })?;
        } else if let Some(rest) = line.strip_prefix(EPSILON_KEY) {
            epsilon = parse_f64(rest, line_no, "epsilon")?;
        } else if let Some(rest) = line.strip_prefix(FITNESS_KEY) {
            fitness = parse_f64(rest, line_no, "fitness")?;
        } else if !line.starts_with("//") {
            let values = line
                .split(';')
                .filter(|f| !f.trim().is_empty())
                .map(|f| parse_f64(f, line_no, "value"))
                .collect::<SahgaResult<Vec<f64>>>()?;
            data.push(values);
        }
    }

    let model = model.ok_or_else(|| SahgaError::MalformedInput("result has no model line".into()))?;
    let [coefficients, means, std_devs]: [Vec<f64>; 3] = data.try_into().map_err(|d: Vec<_>| {
        SahgaError::MalformedInput(format!(
            "result needs coefficient, mean and deviation lines, found {} data lines",
            d.len()
        ))
    })?;
    if means.len() != std_devs.len() {
        return Err(SahgaError::MalformedInput(format!(
            "{} means but {} deviations",
            means.len(),
            std_devs.len()
        )));
    }
    if means.is_empty() {
        return Err(SahgaError::MalformedInput(
            "result has no column statistics".into(),
        ));
    }
    let expected = model.gene_size(means.len());
    if coefficients.len() != expected {
        return Err(SahgaError::MalformedInput(format!(
            "{} model over {} columns needs {} coefficients, found {}",
            model,
            means.len(),
            expected,
            coefficients.len()
        )));
    }

    Ok(ResultFile {
        model,
        objective,
        epsilon,
        fitness,
        coefficients,
        means,
        std_devs,
    })
}
