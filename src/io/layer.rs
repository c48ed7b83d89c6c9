use super::{fields, open, parse_f64, record_line, semicolon_reader};
use crate::error::{SahgaError, SahgaResult};
use crate::graph::{COL_CLASS, COL_ID, COL_LATITUDE, COL_LONGITUDE};
use crate::table::ObservationTable;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use tracing::debug;

/// Environmental raster in ESRI ASCII grid form.
///
/// Row 0 of `grid` is the northernmost row. `no_data` cells are skipped by
/// every statistic and transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub cols: usize,
    pub rows: usize,
    pub x_corner: f64,
    pub y_corner: f64,
    pub cell_size: f64,
    pub no_data: f64,
    pub grid: ObservationTable,
    pub mean: f64,
    pub std_dev: f64,
}

impl Layer {
    pub fn load(path: &Path) -> SahgaResult<Self> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!("Loading layer {} from {}", name, path.display());
        Self::from_reader(name, File::open(path)?)
    }

    pub fn from_reader<R: Read>(name: String, reader: R) -> SahgaResult<Self> {
        let mut cols = None;
        let mut rows = None;
        let mut x_corner = None;
        let mut y_corner = None;
        let mut cell_size = None;
        let mut no_data = None;
        let mut values = Vec::new();

        for (idx, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            let line_no = idx as u64 + 1;
            let mut tokens = line.split_whitespace().peekable();
            let Some(first) = tokens.peek() else {
                continue;
            };

            if first.starts_with(|c: char| c.is_ascii_alphabetic()) {
                let key = first.to_ascii_uppercase();
                tokens.next();
                let value = tokens.next().ok_or_else(|| {
                    SahgaError::MalformedInput(format!("line {}: {} has no value", line_no, key))
                })?;
                let value = parse_f64(value, line_no, &key)?;
                match key.as_str() {
                    "NCOLS" => cols = Some(value as usize),
                    "NROWS" => rows = Some(value as usize),
                    "XLLCORNER" => x_corner = Some(value),
                    "YLLCORNER" => y_corner = Some(value),
                    "CELLSIZE" => cell_size = Some(value),
                    "NODATA_VALUE" => no_data = Some(value),
                    other => debug!("   ignoring grid header {}", other),
                }
                continue;
            }

            for token in tokens {
                values.push(parse_f64(token, line_no, "cell value")?);
            }
        }

        let missing = |key: &str| SahgaError::MalformedInput(format!("grid header {} missing", key));
        let cols = cols.ok_or_else(|| missing("NCOLS"))?;
        let rows = rows.ok_or_else(|| missing("NROWS"))?;
        let cell_size = cell_size.ok_or_else(|| missing("CELLSIZE"))?;
        if !(cell_size > 0.0) {
            return Err(SahgaError::MalformedInput(format!(
                "cell size must be positive, got {}",
                cell_size
            )));
        }
        if values.len() != rows * cols {
            return Err(SahgaError::MalformedInput(format!(
                "grid declares {}x{} cells, found {} values",
                rows,
                cols,
                values.len()
            )));
        }

        let mut grid = ObservationTable::with_shape(rows, cols)?;
        for (i, chunk) in values.chunks_exact(cols).enumerate() {
            grid.set_row(i, chunk)?;
        }

        Ok(Self {
            name,
            cols,
            rows,
            x_corner: x_corner.ok_or_else(|| missing("XLLCORNER"))?,
            y_corner: y_corner.ok_or_else(|| missing("YLLCORNER"))?,
            cell_size,
            no_data: no_data.unwrap_or(-9999.0),
            grid,
            mean: 0.0,
            std_dev: 0.0,
        })
    }

    pub fn save<W: Write>(&self, w: &mut W) -> SahgaResult<()> {
        writeln!(w, "NCOLS {}", self.cols)?;
        writeln!(w, "NROWS {}", self.rows)?;
        writeln!(w, "XLLCORNER {:.6}", self.x_corner)?;
        writeln!(w, "YLLCORNER {:.6}", self.y_corner)?;
        writeln!(w, "CELLSIZE {:.6}", self.cell_size)?;
        writeln!(w, "NODATA_VALUE {}", self.no_data)?;
        for i in 0..self.rows {
            let row: Vec<String> = self.grid.row(i).iter().map(|v| v.to_string()).collect();
            writeln!(w, "{}", row.join(" "))?;
        }
        Ok(())
    }

    fn x_max(&self) -> f64 {
        self.x_corner + (self.cols as f64 - 1.0) * self.cell_size
    }

    fn y_max(&self) -> f64 {
        self.y_corner + (self.rows as f64 - 1.0) * self.cell_size
    }

    /// Grid column holding `longitude`, if inside the extent.
    pub fn cell_x(&self, longitude: f64) -> Option<usize> {
        if longitude < self.x_corner || longitude > self.x_max() {
            return None;
        }
        let x = ((longitude - self.x_corner) / self.cell_size) as usize;
        Some(x.min(self.cols - 1))
    }

    /// Grid row holding `latitude`, counted from the top, if inside the extent.
    pub fn cell_y(&self, latitude: f64) -> Option<usize> {
        if latitude < self.y_corner || latitude > self.y_max() {
            return None;
        }
        let from_bottom = ((latitude - self.y_corner) / self.cell_size) as usize;
        Some(self.rows - 1 - from_bottom.min(self.rows - 1))
    }

    pub fn cell_longitude(&self, x: usize) -> f64 {
        self.x_corner + x as f64 * self.cell_size
    }

    pub fn cell_latitude(&self, y: usize) -> f64 {
        self.y_corner + (self.rows as f64 - 1.0 - y as f64) * self.cell_size
    }

    /// Cell value at a coordinate, or `no_data` outside the grid.
    pub fn value_at(&self, longitude: f64, latitude: f64) -> f64 {
        match (self.cell_x(longitude), self.cell_y(latitude)) {
            (Some(x), Some(y)) => self.grid.at(y, x),
            _ => self.no_data,
        }
    }

    fn valid_cells(&self) -> impl Iterator<Item = f64> + '_ {
        let no_data = self.no_data;
        (0..self.rows)
            .flat_map(move |i| self.grid.row(i).iter().copied())
            .filter(move |v| *v != no_data)
    }

    pub fn update_stats(&mut self) -> SahgaResult<()> {
        let mut n = 0usize;
        let mut sum = 0.0;
        let mut sum_squares = 0.0;
        for v in self.valid_cells() {
            n += 1;
            sum += v;
            sum_squares += v * v;
        }
        if n <= 1 {
            return Err(SahgaError::InsufficientRows { rows: n });
        }
        let n = n as f64;
        self.mean = sum / n;
        self.std_dev = ((1.0 / (n - 1.0)) * (sum_squares - sum * sum / n))
            .max(0.0)
            .sqrt();
        Ok(())
    }

    pub fn set_stats(&mut self, mean: f64, std_dev: f64) {
        self.mean = mean;
        self.std_dev = std_dev;
    }

    /// Standardizes every valid cell with the current mean and deviation.
    pub fn normalize(&mut self) -> SahgaResult<()> {
        if self.std_dev == 0.0 || !self.std_dev.is_finite() {
            return Err(SahgaError::DegenerateColumn { column: 0 });
        }
        let (mean, sd) = (self.mean, self.std_dev);
        self.map_valid(|v| (v - mean) / sd)
    }

    /// Rescales valid cells linearly onto `[min, max]`, rounded to integers.
    pub fn scale(&mut self, min: f64, max: f64) -> SahgaResult<()> {
        let (lo, hi) = self
            .min_max()
            .ok_or(SahgaError::InsufficientRows { rows: 0 })?;
        if hi == lo {
            return Err(SahgaError::DegenerateColumn { column: 0 });
        }
        self.map_valid(|v| (((v - lo) / (hi - lo)) * (max - min) + min + 0.5).floor())
    }

    /// Smallest and largest valid cell, `None` when every cell is no-data.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.valid_cells().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    fn map_valid<F: Fn(f64) -> f64>(&mut self, f: F) -> SahgaResult<()> {
        for i in 0..self.rows {
            for j in 0..self.cols {
                let v = self.grid.at(i, j);
                if v != self.no_data {
                    self.grid.set(i, j, f(v))?;
                }
            }
        }
        Ok(())
    }
}

/// Samples every layer at each point of an `[id, lon, lat, class]` table and
/// writes `id;long;lat;class;x0;..;xn;` lines.
pub fn write_layer_data<W: Write>(
    points: &ObservationTable,
    layers: &[Layer],
    source_name: &str,
    w: &mut W,
) -> SahgaResult<()> {
    writeln!(w, "// Data extracted from layer set for: {}", source_name)?;
    let names: Vec<&str> = layers.iter().map(|l| l.name.as_str()).collect();
    writeln!(w, "// Data format --> #id;long;lat;class;{}", names.join(";"))?;

    for i in 0..points.rows() {
        let lon = points.at(i, COL_LONGITUDE);
        let lat = points.at(i, COL_LATITUDE);
        write!(
            w,
            "{:.0};{:.6};{:.6};{:.0};",
            points.at(i, COL_ID),
            lon,
            lat,
            points.at(i, COL_CLASS)
        )?;
        for layer in layers {
            write!(w, "{:.3};", layer.value_at(lon, lat))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

pub fn read_layer_data(path: &Path) -> SahgaResult<ObservationTable> {
    read_layer_data_from_reader(open(path)?)
}

pub fn read_layer_data_from_reader<R: Read>(reader: R) -> SahgaResult<ObservationTable> {
    let mut rdr = semicolon_reader(reader);
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for result in rdr.records() {
        let rec = result?;
        let line = record_line(&rec);
        let row = fields(&rec)
            .iter()
            .map(|f| parse_f64(f, line, "value"))
            .collect::<SahgaResult<Vec<f64>>>()?;
        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(SahgaError::MalformedInput(format!(
                    "line {}: expected {} fields, got {}",
                    line,
                    first.len(),
                    row.len()
                )));
            }
        }
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(SahgaError::MalformedInput("layer data file is empty".into()));
    }
    ObservationTable::from_rows(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3 columns x 2 rows, 1-degree cells, lower-left corner at (10, 20).
    const GRID: &str = "ncols 3\n\
        nrows 2\n\
        xllcorner 10\n\
        yllcorner 20\n\
        cellsize 1\n\
        NODATA_value -9999\n\
        1 2 3\n\
        4 -9999 6\n";

    fn grid() -> Layer {
        Layer::from_reader("bio1".into(), GRID.as_bytes()).unwrap()
    }

    #[test]
    fn test_header_and_cells() {
        let layer = grid();
        assert_eq!((layer.cols, layer.rows), (3, 2));
        assert_eq!(layer.no_data, -9999.0);
        assert_eq!(layer.grid.row(1), &[4.0, -9999.0, 6.0]);
    }

    #[test]
    fn test_value_lookup() {
        let layer = grid();
        // Top row is the northern one.
        assert_eq!(layer.value_at(10.0, 21.0), 1.0);
        assert_eq!(layer.value_at(12.0, 21.0), 3.0);
        assert_eq!(layer.value_at(10.0, 20.0), 4.0);
        assert_eq!(layer.value_at(11.5, 20.5), -9999.0);
        assert_eq!(layer.value_at(9.9, 20.5), -9999.0);
        assert_eq!(layer.value_at(10.5, 21.5), -9999.0);
        assert_eq!(layer.cell_longitude(2), 12.0);
        assert_eq!(layer.cell_latitude(0), 21.0);
    }

    #[test]
    fn test_stats_skip_no_data() {
        let mut layer = grid();
        layer.update_stats().unwrap();
        assert!((layer.mean - 3.2).abs() < 1e-12);
        assert_eq!(layer.min_max(), Some((1.0, 6.0)));

        layer.normalize().unwrap();
        layer.update_stats().unwrap();
        assert!(layer.mean.abs() < 1e-12);
        assert!((layer.std_dev - 1.0).abs() < 1e-12);
        assert_eq!(layer.grid.at(1, 1), -9999.0);
    }

    #[test]
    fn test_scale_and_min_max_on_negative_grid() {
        let text = "NCOLS 2\nNROWS 1\nXLLCORNER 0\nYLLCORNER 0\nCELLSIZE 1\nNODATA_VALUE -9999\n-5 -1\n";
        let mut layer = Layer::from_reader("neg".into(), text.as_bytes()).unwrap();
        assert_eq!(layer.min_max(), Some((-5.0, -1.0)));
        layer.scale(0.0, 100.0).unwrap();
        assert_eq!(layer.grid.row(0), &[0.0, 100.0]);
    }

    #[test]
    fn test_cell_count_mismatch() {
        let text = "NCOLS 2\nNROWS 2\nXLLCORNER 0\nYLLCORNER 0\nCELLSIZE 1\n1 2 3\n";
        assert!(Layer::from_reader("bad".into(), text.as_bytes()).is_err());
    }

    #[test]
    fn test_save_reload() {
        let layer = grid();
        let mut out = Vec::new();
        layer.save(&mut out).unwrap();
        let back = Layer::from_reader("bio1".into(), out.as_slice()).unwrap();
        assert_eq!(back, layer);
    }

    #[test]
    fn test_layer_data_lines() {
        let points =
            ObservationTable::from_rows(&[vec![1.0, 10.0, 21.0, 1.0], vec![2.0, 50.0, 50.0, 0.0]])
                .unwrap();
        let mut out = Vec::new();
        write_layer_data(&points, &[grid()], "train.txt", &mut out).unwrap();
        let text = String::from_utf8(out.clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[2], "1;10.000000;21.000000;1;1.000;");
        assert_eq!(lines[3], "2;50.000000;50.000000;0;-9999.000;");

        let table = read_layer_data_from_reader(out.as_slice()).unwrap();
        assert_eq!(table.cols(), 5);
        assert_eq!(table.at(1, 4), -9999.0);
    }
}
