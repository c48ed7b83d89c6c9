use super::{open, parse_f64, record_line};
use crate::error::{SahgaError, SahgaResult};
use crate::table::ObservationTable;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Columns of a points file: id, species label, longitude, latitude, class.
const POINT_FIELDS: usize = 5;

/// Loads a tab-separated points file into an `[id, lon, lat, class]` table.
pub fn read_points(path: &Path) -> SahgaResult<ObservationTable> {
    debug!("Loading points from {}", path.display());
    read_points_from_reader(open(path)?)
}

/// The first line is a header. The species label is dropped.
pub fn read_points_from_reader<R: Read>(reader: R) -> SahgaResult<ObservationTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let rec = result?;
        let line = record_line(&rec);
        if rec.len() < POINT_FIELDS {
            return Err(SahgaError::MalformedInput(format!(
                "line {}: expected {} tab-separated fields, got {}",
                line,
                POINT_FIELDS,
                rec.len()
            )));
        }
        rows.push(vec![
            parse_f64(&rec[0], line, "id")?,
            parse_f64(&rec[2], line, "longitude")?,
            parse_f64(&rec[3], line, "latitude")?,
            parse_f64(&rec[4], line, "class")?,
        ]);
    }

    if rows.is_empty() {
        return Err(SahgaError::MalformedInput("points file has no data rows".into()));
    }
    debug!("   {} points read", rows.len());
    ObservationTable::from_rows(&rows)
}
