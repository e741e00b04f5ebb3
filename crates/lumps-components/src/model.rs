//! Model pipeline
//!
//! A [`LumpsModel`] is an ordered list of components. Running it passes an
//! observation series through each component in turn; every stage appends (or
//! replaces) columns on a fresh copy so the caller's series is never mutated.
//!
//! The pipeline is normally assembled from a [`ModelConfiguration`]:
//!
//! 1. [`LongwaveRadiation`], when a longwave model is enabled
//! 2. [`StorageHeatFlux`]
//! 3. [`SensibleLatentPartition`], when storage comes from the model

use crate::parameters::LongwaveParameters;
use crate::penman_monteith::SensibleLatentPartition;
use crate::radiation::LongwaveRadiation;
use crate::storage::StorageHeatFlux;
use indexmap::IndexSet;
use log::debug;
use lumps_core::component::{apply_component, Component};
use lumps_core::config::{LongwaveModel, PenmanMonteithParams};
use lumps_core::errors::{LumpsError, LumpsResult};
use lumps_core::surface::{MaterialCoefficients, SurfaceComposition};
use lumps_core::timeseries::EnergyBalanceSeries;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where the storage heat flux used downstream comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageSource {
    /// The OHM estimate feeds the Penman-Monteith partition; modelled sensible
    /// and latent heat are scored against the observations.
    #[default]
    ModelStorage,
    /// The partition is not run. The OHM estimate is scored against the
    /// observed residual $Q^* - Q_H - Q_E$, which is used as the storage target
    /// when fitting surface materials.
    ResidualStorage,
}

/// Everything needed to build a model for a single run.
///
/// Calibration never updates a configuration in place; each step derives a new
/// one with the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfiguration {
    pub surface: SurfaceComposition,
    pub penman_monteith: PenmanMonteithParams,
    pub longwave_model: LongwaveModel,
    pub longwave_parameters: LongwaveParameters,
    pub storage_source: StorageSource,
}

impl ModelConfiguration {
    pub fn new(surface: SurfaceComposition, penman_monteith: PenmanMonteithParams) -> Self {
        Self {
            surface,
            penman_monteith,
            longwave_model: LongwaveModel::default(),
            longwave_parameters: LongwaveParameters::default(),
            storage_source: StorageSource::default(),
        }
    }

    pub fn with_surface(self, surface: SurfaceComposition) -> Self {
        Self { surface, ..self }
    }

    /// Replace the surface with a single material using `coefficients`.
    pub fn with_learned_materials(self, coefficients: MaterialCoefficients) -> Self {
        self.with_surface(SurfaceComposition::learned(coefficients))
    }

    pub fn with_penman_monteith(self, penman_monteith: PenmanMonteithParams) -> Self {
        Self {
            penman_monteith,
            ..self
        }
    }

    pub fn with_longwave(self, model: LongwaveModel, parameters: LongwaveParameters) -> Self {
        Self {
            longwave_model: model,
            longwave_parameters: parameters,
            ..self
        }
    }

    pub fn with_storage_source(self, storage_source: StorageSource) -> Self {
        Self {
            storage_source,
            ..self
        }
    }

    pub fn build(&self) -> LumpsModel {
        let mut builder = ModelBuilder::new();
        if self.longwave_model.is_enabled() {
            builder.with_component(Arc::new(LongwaveRadiation::from_parameters(
                self.longwave_parameters,
            )));
        }
        builder.with_component(Arc::new(StorageHeatFlux::from_parameters(
            self.surface.clone(),
        )));
        if self.storage_source == StorageSource::ModelStorage {
            builder.with_component(Arc::new(SensibleLatentPartition::from_parameters(
                self.penman_monteith,
            )));
        }
        builder.build()
    }
}

/// Build a [`LumpsModel`] from components in the order they should run.
#[derive(Debug, Default, Clone)]
pub struct ModelBuilder {
    components: Vec<Arc<dyn Component>>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component(&mut self, component: Arc<dyn Component>) -> &mut Self {
        self.components.push(component);
        self
    }

    pub fn build(&self) -> LumpsModel {
        LumpsModel {
            components: self.components.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LumpsModel {
    components: Vec<Arc<dyn Component>>,
}

impl LumpsModel {
    pub fn components(&self) -> &[Arc<dyn Component>] {
        &self.components
    }

    /// Columns that must be present in the series passed to [`LumpsModel::run`].
    ///
    /// These are the component inputs not produced by an earlier component.
    pub fn required_inputs(&self) -> Vec<String> {
        let mut produced = IndexSet::new();
        let mut required = IndexSet::new();
        for component in &self.components {
            for name in component.input_names() {
                if !produced.contains(&name) {
                    required.insert(name);
                }
            }
            produced.extend(component.output_names());
        }
        required.into_iter().collect()
    }

    /// Fails with [`LumpsError::MissingColumn`] naming the first required input
    /// absent from `observations`.
    pub fn check_inputs(&self, observations: &EnergyBalanceSeries) -> LumpsResult<()> {
        match self
            .required_inputs()
            .into_iter()
            .find(|name| !observations.has_column(name))
        {
            Some(missing) => Err(LumpsError::MissingColumn(missing)),
            None => Ok(()),
        }
    }

    /// Run every component over `observations`, returning the enriched series.
    pub fn run(&self, observations: &EnergyBalanceSeries) -> LumpsResult<EnergyBalanceSeries> {
        self.check_inputs(observations)?;

        let mut series = observations.clone();
        for component in &self.components {
            debug!("Solving {:?}", component);
            series = apply_component(component.as_ref(), &series)?;
        }
        Ok(series)
    }
}
