//! Text formats exchanged between the pipeline steps.

pub mod graph_table;
pub mod jobs;
pub mod layer;
pub mod mpg;
pub mod points;
pub mod result;
pub mod split;

pub use self::graph_table::{
    merge_layer_data, read_graph_table, read_graph_table_from_reader, write_graph_table,
};
pub use self::jobs::{read_batch_jobs, BatchJob};
pub use self::layer::{read_layer_data, write_layer_data, Layer};
pub use self::mpg::{read_mpg, read_mpg_from_reader, write_mpg};
pub use self::points::{read_points, read_points_from_reader};
pub use self::result::{read_result, read_result_from_reader, write_result, ResultFile};
pub use self::split::{split_points, PointsSplit};

use crate::error::{SahgaError, SahgaResult};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use strum_macros::{Display, EnumIter};

/// Field separator of the graph, layer-data and result files.
pub const FIELD_SEPARATOR: u8 = b';';

/// Supported on-disk encodings, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum FileFormat {
    Text,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> SahgaResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("txt") | Some("csv") | Some("tsv") => Ok(FileFormat::Text),
            Some(other) => Err(SahgaError::Config(format!(
                "unknown file format '.{}' for {}",
                other,
                path.display()
            ))),
            None => Err(SahgaError::Config(format!(
                "file name without extension: {}",
                path.display()
            ))),
        }
    }
}

/// Opens `path` after checking its format is supported.
pub(crate) fn open(path: &Path) -> SahgaResult<File> {
    match FileFormat::from_path(path)? {
        FileFormat::Text => Ok(File::open(path)?),
    }
}

/// `;`-separated reader that skips `//` comment lines. Blank lines are
/// dropped by the csv reader itself.
pub(crate) fn semicolon_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(FIELD_SEPARATOR)
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'/'))
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Record fields with the trailing empty field of a `;`-terminated line
/// removed.
pub(crate) fn fields(record: &csv::StringRecord) -> Vec<&str> {
    let mut out: Vec<&str> = record.iter().collect();
    while out.last().is_some_and(|f| f.is_empty()) {
        out.pop();
    }
    out
}

pub(crate) fn parse_f64(field: &str, line: u64, what: &str) -> SahgaResult<f64> {
    field.trim().parse::<f64>().map_err(|_| {
        SahgaError::MalformedInput(format!("line {}: invalid {} '{}'", line, what, field))
    })
}

pub(crate) fn parse_usize(field: &str, line: u64, what: &str) -> SahgaResult<usize> {
    field.trim().parse::<usize>().map_err(|_| {
        SahgaError::MalformedInput(format!("line {}: invalid {} '{}'", line, what, field))
    })
}

pub(crate) fn record_line(record: &csv::StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}

/// Non-blank, non-comment lines of a text file, in order.
pub fn read_data_lines(path: &Path) -> SahgaResult<Vec<String>> {
    let reader = BufReader::new(open(path)?);
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() || trimmed.starts_with("//") {
            continue;
        }
        lines.push(trimmed.to_string());
    }
    Ok(lines)
}
