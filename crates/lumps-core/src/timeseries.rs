//! Time-indexed energy balance table.
//!
//! [`EnergyBalanceSeries`] is the unit of exchange between the data loaders, the
//! model components and the calibration engine. It holds a single UTC time axis
//! and any number of named `f64` columns of the same length. Components never
//! mutate a series in place; they return new columns which are merged into a
//! copy (see [`Component`](crate::component::Component)).

use crate::errors::{LumpsError, LumpsResult};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use indexmap::IndexMap;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub type FloatValue = f64;

/// Time-ordered table of observed and modelled energy balance terms.
///
/// Column order is insertion order and is preserved on export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyBalanceSeries {
    time: Vec<DateTime<Utc>>,
    columns: IndexMap<String, Array1<FloatValue>>,
}

impl EnergyBalanceSeries {
    /// Create an empty table over the given time axis.
    pub fn new(time: Vec<DateTime<Utc>>) -> Self {
        Self {
            time,
            columns: IndexMap::new(),
        }
    }

    /// Create a table from instants in any time zone, converting them to UTC.
    pub fn from_times<Tz: TimeZone>(times: impl IntoIterator<Item = DateTime<Tz>>) -> Self {
        Self::new(times.into_iter().map(|t| t.with_timezone(&Utc)).collect())
    }

    /// Builder form of [`EnergyBalanceSeries::insert_column`].
    pub fn with_column(
        mut self,
        name: &str,
        values: impl Into<Array1<FloatValue>>,
    ) -> LumpsResult<Self> {
        self.insert_column(name, values.into())?;
        Ok(self)
    }

    /// Add a column, replacing any existing column of the same name in place.
    ///
    /// Returns an error if the number of values does not match the time axis.
    pub fn insert_column(&mut self, name: &str, values: Array1<FloatValue>) -> LumpsResult<()> {
        if values.len() != self.time.len() {
            return Err(LumpsError::ColumnLengthMismatch {
                name: name.to_string(),
                expected: self.time.len(),
                actual: values.len(),
            });
        }
        self.columns.insert(name.to_string(), values);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[DateTime<Utc>] {
        &self.time
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Array1<FloatValue>> {
        self.columns.get(name)
    }

    /// Get a column, failing with [`LumpsError::MissingColumn`] if it is absent.
    pub fn require_column(&self, name: &str) -> LumpsResult<&Array1<FloatValue>> {
        self.column(name)
            .ok_or_else(|| LumpsError::MissingColumn(name.to_string()))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    /// Seconds elapsed since the first instant, for each row.
    pub fn elapsed_seconds(&self) -> Array1<FloatValue> {
        match self.time.first() {
            Some(start) => self
                .time
                .iter()
                .map(|t| (*t - *start).num_milliseconds() as FloatValue / 1000.0)
                .collect(),
            None => Array1::zeros(0),
        }
    }

    /// Write the table as CSV with an RFC 3339 `time` column first.
    pub fn write_csv<W: Write>(&self, writer: &mut W) -> LumpsResult<()> {
        let mut header = vec!["time"];
        header.extend(self.column_names());
        writeln!(writer, "{}", header.join(","))?;

        for (i, t) in self.time.iter().enumerate() {
            write!(writer, "{}", t.to_rfc3339_opts(SecondsFormat::Secs, true))?;
            for values in self.columns.values() {
                write!(writer, ",{}", values[i])?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Save the table to a CSV file, creating or truncating it.
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> LumpsResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_csv(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
