//! Parameter grids and their evaluated errors

use crate::{Error, Result};
use log::warn;
use lumps_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// `number` evenly spaced values from `range.0` to `range.1` inclusive.
///
/// A `number` of one (or zero) gives only the start of the range.
pub fn parameter_space(range: (FloatValue, FloatValue), number: usize) -> Vec<FloatValue> {
    let (start, end) = range;
    if number <= 1 {
        return vec![start];
    }
    let step = (end - start) / (number - 1) as FloatValue;
    (0..number)
        .map(|i| {
            if i == number - 1 {
                end
            } else {
                start + step * i as FloatValue
            }
        })
        .collect()
}

/// Cartesian product of the axes, with the first axis varying slowest.
pub fn scan_order(axes: &[Vec<FloatValue>]) -> Vec<Vec<FloatValue>> {
    axes.iter().fold(vec![Vec::new()], |cells, axis| {
        cells
            .iter()
            .flat_map(|cell| {
                axis.iter().map(move |value| {
                    let mut next = cell.clone();
                    next.push(*value);
                    next
                })
            })
            .collect()
    })
}

/// A single evaluated grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRow {
    pub params: Vec<FloatValue>,
    pub error: FloatValue,
}

/// Errors for every cell of a grid search, in scan order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridResults {
    param_names: Vec<String>,
    rows: Vec<GridRow>,
}

impl GridResults {
    pub fn new(param_names: Vec<String>, rows: Vec<GridRow>) -> Self {
        Self { param_names, rows }
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    /// The cell with the smallest finite error.
    ///
    /// Ties go to the cell scanned first. Non-finite cells are skipped; if no
    /// cell is finite the search is degenerate.
    pub fn best(&self) -> Result<&GridRow> {
        let mut best: Option<&GridRow> = None;
        for row in &self.rows {
            if !row.error.is_finite() {
                warn!(
                    "Skipping non-finite error {} at {:?}={:?}",
                    row.error, self.param_names, row.params
                );
                continue;
            }
            if best.map_or(true, |b| row.error < b.error) {
                best = Some(row);
            }
        }
        best.ok_or_else(|| {
            Error::NumericalDegeneracy(format!(
                "None of the {} cells over {:?} produced a finite error",
                self.rows.len(),
                self.param_names
            ))
        })
    }

    /// Write the table as CSV with one column per parameter and an `error` column.
    pub fn write_csv<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "{},error", self.param_names.join(","))?;
        for row in &self.rows {
            let params: Vec<String> = row.params.iter().map(|p| p.to_string()).collect();
            writeln!(writer, "{},{}", params.join(","), row.error)?;
        }
        Ok(())
    }

    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_csv(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn results(errors: &[f64]) -> GridResults {
        GridResults::new(
            vec!["alpha".to_string()],
            errors
                .iter()
                .enumerate()
                .map(|(i, e)| GridRow {
                    params: vec![i as f64],
                    error: *e,
                })
                .collect(),
        )
    }

    #[test]
    fn test_parameter_space() {
        let space = parameter_space((0.0, 1.5), 4);
        assert_eq!(space.len(), 4);
        assert_relative_eq!(space[1], 0.5);
        assert_eq!(space[3], 1.5);

        assert_eq!(parameter_space((2.0, 9.0), 1), vec![2.0]);
        assert_eq!(parameter_space((2.0, 9.0), 0), vec![2.0]);
    }

    #[test]
    fn test_scan_order() {
        let cells = scan_order(&[vec![0.0, 1.0], vec![10.0, 20.0, 30.0]]);
        assert_eq!(
            cells,
            vec![
                vec![0.0, 10.0],
                vec![0.0, 20.0],
                vec![0.0, 30.0],
                vec![1.0, 10.0],
                vec![1.0, 20.0],
                vec![1.0, 30.0],
            ]
        );
    }

    #[test]
    fn test_best_skips_nan_and_prefers_first() {
        let grid = results(&[f64::NAN, 0.4, 0.2, f64::INFINITY, 0.2]);
        let best = grid.best().unwrap();
        assert_eq!(best.params, vec![2.0]);
    }

    #[test]
    fn test_all_nan_is_degenerate() {
        let grid = results(&[f64::NAN, f64::NAN]);
        assert!(matches!(grid.best(), Err(Error::NumericalDegeneracy(_))));
        assert!(matches!(
            results(&[]).best(),
            Err(Error::NumericalDegeneracy(_))
        ));
    }

    #[test]
    fn test_write_csv() {
        let grid = GridResults::new(
            vec!["alpha".to_string(), "beta".to_string()],
            vec![GridRow {
                params: vec![0.5, 10.0],
                error: 1.25,
            }],
        );
        let mut buffer = Vec::new();
        grid.write_csv(&mut buffer).unwrap();

        assert_eq!(String::from_utf8(buffer).unwrap(), "alpha,beta,error\n0.5,10,1.25\n");
    }
}
