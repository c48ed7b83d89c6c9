use crate::error::{SahgaError, SahgaResult};
use crate::ranking::{quicksort, Rankable, SortOrder};
use serde::{Deserialize, Serialize};

/// Summary statistics of one table column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub mean: f64,
    pub std_dev: f64,
    pub sum: f64,
    pub sum_squares: f64,
}

/// Row-major matrix of observations. Column 0 holds the dependent variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
    stats: Vec<ColumnStats>,
}

impl ObservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shape(rows: usize, cols: usize) -> SahgaResult<Self> {
        let mut table = Self::new();
        table.reset(rows, cols)?;
        Ok(table)
    }

    /// Builds a table from equally sized rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> SahgaResult<Self> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut table = Self::with_shape(rows.len(), cols)?;
        for (i, row) in rows.iter().enumerate() {
            table.set_row(i, row)?;
        }
        Ok(table)
    }

    /// Reallocates the buffer for `rows x cols` zeros, dropping prior contents.
    pub fn reset(&mut self, rows: usize, cols: usize) -> SahgaResult<()> {
        if rows == 0 || cols == 0 {
            return Err(SahgaError::Allocation { rows, cols });
        }
        let len = rows
            .checked_mul(cols)
            .ok_or(SahgaError::Allocation { rows, cols })?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| SahgaError::Allocation { rows, cols })?;
        data.resize(len, 0.0);

        self.rows = rows;
        self.cols = cols;
        self.data = data;
        self.stats = vec![ColumnStats::default(); cols];
        Ok(())
    }

    /// Deep copy of `src` into `self`.
    pub fn copy_from(&mut self, src: &ObservationTable) {
        self.rows = src.rows;
        self.cols = src.cols;
        self.data.clone_from(&src.data);
        self.stats.clone_from(&src.stats);
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn stats(&self) -> &[ColumnStats] {
        &self.stats
    }

    pub fn means(&self) -> Vec<f64> {
        self.stats.iter().map(|s| s.mean).collect()
    }

    pub fn std_devs(&self) -> Vec<f64> {
        self.stats.iter().map(|s| s.std_dev).collect()
    }

    /// Hot-path accessor. Panics on out-of-range indices like slice indexing.
    #[inline(always)]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        debug_assert!(col < self.cols);
        self.data[row * self.cols + col]
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> SahgaResult<()> {
        if row >= self.rows || col >= self.cols {
            return Err(SahgaError::MalformedInput(format!(
                "cell ({}, {}) outside {}x{} table",
                row, col, self.rows, self.cols
            )));
        }
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    #[inline(always)]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    pub fn set_row(&mut self, row: usize, values: &[f64]) -> SahgaResult<()> {
        if row >= self.rows || values.len() != self.cols {
            return Err(SahgaError::MalformedInput(format!(
                "row {} with {} values does not fit {}x{} table",
                row,
                values.len(),
                self.rows,
                self.cols
            )));
        }
        let start = row * self.cols;
        self.data[start..start + self.cols].copy_from_slice(values);
        Ok(())
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|r| self.at(r, col)).collect()
    }

    /// Location of the first non-finite cell, if any.
    pub fn first_non_finite(&self) -> Option<(usize, usize)> {
        self.data
            .iter()
            .position(|v| !v.is_finite())
            .map(|idx| (idx / self.cols, idx % self.cols))
    }

    /// Recomputes sum, sum of squares, mean and sample standard deviation for
    /// every column.
    pub fn update_stats(&mut self) -> SahgaResult<()> {
        if self.rows <= 1 {
            return Err(SahgaError::InsufficientRows { rows: self.rows });
        }
        let n = self.rows as f64;

        self.stats.clear();
        for j in 0..self.cols {
            let mut sum = 0.0;
            let mut sum_squares = 0.0;
            for i in 0..self.rows {
                let x = self.at(i, j);
                sum += x;
                sum_squares += x * x;
            }
            let mean = sum / n;
            // Rounding can push the variance a hair below zero for constant columns.
            let variance = ((1.0 / (n - 1.0)) * (sum_squares - (sum * sum) / n)).max(0.0);

            self.stats.push(ColumnStats {
                mean,
                std_dev: variance.sqrt(),
                sum,
                sum_squares,
            });
        }
        Ok(())
    }

    /// Installs externally known means and deviations, e.g. the training
    /// statistics when normalizing a test split.
    pub fn set_stats(&mut self, means: &[f64], std_devs: &[f64]) -> SahgaResult<()> {
        if means.len() != self.cols || std_devs.len() != self.cols {
            return Err(SahgaError::MalformedInput(format!(
                "expected {} column statistics, got {} means and {} deviations",
                self.cols,
                means.len(),
                std_devs.len()
            )));
        }
        self.stats.resize(self.cols, ColumnStats::default());
        for (j, stat) in self.stats.iter_mut().enumerate() {
            stat.mean = means[j];
            stat.std_dev = std_devs[j];
        }
        Ok(())
    }

    /// Standardizes columns to `(x - mean) / std_dev` using the current
    /// statistics, then refreshes them. Column 0 is left alone when
    /// `skip_dependent` is set.
    pub fn normalize(&mut self, skip_dependent: bool) -> SahgaResult<()> {
        self.apply_normalization(skip_dependent)?;
        self.update_stats()
    }

    /// Same as [`normalize`](Self::normalize) but keeps the installed
    /// statistics afterwards.
    pub fn apply_normalization(&mut self, skip_dependent: bool) -> SahgaResult<()> {
        if self.stats.len() != self.cols {
            return Err(SahgaError::MalformedInput(
                "column statistics missing; call update_stats first".into(),
            ));
        }
        let first = if skip_dependent { 1 } else { 0 };

        for j in first..self.cols {
            let sd = self.stats[j].std_dev;
            if sd == 0.0 || !sd.is_finite() {
                return Err(SahgaError::DegenerateColumn { column: j });
            }
        }

        for i in 0..self.rows {
            let start = i * self.cols;
            for j in first..self.cols {
                let stat = &self.stats[j];
                let cell = &mut self.data[start + j];
                *cell = (*cell - stat.mean) / stat.std_dev;
            }
        }
        Ok(())
    }

    /// Sorts rows `[lo, hi]` in place by `column`, largest first.
    pub fn rank_rows_by_column(&mut self, column: usize, lo: usize, hi: usize) -> SahgaResult<()> {
        if column >= self.cols || hi >= self.rows || lo > hi {
            return Err(SahgaError::MalformedInput(format!(
                "cannot rank rows [{}, {}] by column {} in {}x{} table",
                lo, hi, column, self.rows, self.cols
            )));
        }
        let mut view = ColumnView {
            table: self,
            column,
        };
        quicksort(&mut view, lo, hi, SortOrder::Descending);
        Ok(())
    }
}

struct ColumnView<'a> {
    table: &'a mut ObservationTable,
    column: usize,
}

impl Rankable for ColumnView<'_> {
    fn key(&self, idx: usize) -> f64 {
        self.table.at(idx, self.column)
    }

    fn swap_items(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let cols = self.table.cols;
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.table.data.split_at_mut(hi * cols);
        head[lo * cols..(lo + 1) * cols].swap_with_slice(&mut tail[..cols]);
    }
}
