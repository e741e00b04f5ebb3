//! Model stages operating on an [`EnergyBalanceSeries`].
//!
//! A [`Component`] declares which columns it reads and writes, and computes its
//! output columns from the current series. Components hold their parameters
//! and are otherwise stateless, so one instance can be solved against many
//! series (the calibration engine does this for every grid cell).

use crate::errors::{LumpsError, LumpsResult};
use crate::standard_variables::StandardVariable;
use crate::timeseries::{EnergyBalanceSeries, FloatValue};
use indexmap::IndexMap;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequirementType {
    /// Column that must be present before the component is solved
    Input,
    /// Column produced (or replaced) by the component
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementDefinition {
    pub variable_name: String,
    pub unit: String,
    pub requirement_type: RequirementType,
}

impl RequirementDefinition {
    pub fn new(name: &str, unit: &str, requirement_type: RequirementType) -> Self {
        Self {
            variable_name: name.to_string(),
            unit: unit.to_string(),
            requirement_type,
        }
    }

    pub fn input(variable: &StandardVariable) -> Self {
        Self::new(variable.name, variable.unit, RequirementType::Input)
    }

    pub fn output(variable: &StandardVariable) -> Self {
        Self::new(variable.name, variable.unit, RequirementType::Output)
    }
}

/// Columns produced by a single component, in output order.
pub type OutputColumns = IndexMap<String, Array1<FloatValue>>;

/// A stage of the energy balance model.
#[typetag::serde(tag = "type")]
pub trait Component: Debug + Send + Sync {
    fn definitions(&self) -> Vec<RequirementDefinition>;

    fn inputs(&self) -> Vec<RequirementDefinition> {
        self.definitions()
            .into_iter()
            .filter(|d| d.requirement_type == RequirementType::Input)
            .collect()
    }

    fn input_names(&self) -> Vec<String> {
        self.inputs().into_iter().map(|d| d.variable_name).collect()
    }

    fn outputs(&self) -> Vec<RequirementDefinition> {
        self.definitions()
            .into_iter()
            .filter(|d| d.requirement_type == RequirementType::Output)
            .collect()
    }

    fn output_names(&self) -> Vec<String> {
        self.outputs().into_iter().map(|d| d.variable_name).collect()
    }

    /// Compute the output columns from the current series.
    ///
    /// Implementations may assume every input column is present; use
    /// [`apply_component`] to check this first.
    fn solve(&self, series: &EnergyBalanceSeries) -> LumpsResult<OutputColumns>;
}

/// Solve a component and return a copy of `series` extended with its outputs.
///
/// Fails with [`LumpsError::MissingColumn`] before solving if an input column is
/// absent.
pub fn apply_component(
    component: &dyn Component,
    series: &EnergyBalanceSeries,
) -> LumpsResult<EnergyBalanceSeries> {
    if let Some(missing) = component
        .input_names()
        .into_iter()
        .find(|name| !series.has_column(name))
    {
        return Err(LumpsError::MissingColumn(missing));
    }

    let outputs = component.solve(series)?;
    let mut updated = series.clone();
    for (name, values) in outputs {
        updated.insert_column(&name, values)?;
    }
    Ok(updated)
}
