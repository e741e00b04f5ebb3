//! Surface material composition consumed by the Objective Hysteresis Model.

use crate::errors::{LumpsError, LumpsResult};
use crate::timeseries::FloatValue;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// OHM regression coefficients for a single material.
///
/// $$\Delta Q_S = a_1 Q^* + a_2 \frac{\partial Q^*}{\partial t} + a_3$$
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialCoefficients {
    /// Weight of net radiation (dimensionless)
    pub a1: FloatValue,
    /// Weight of the net radiation rate of change (s)
    pub a2: FloatValue,
    /// Offset (W / m^2)
    pub a3: FloatValue,
}

impl MaterialCoefficients {
    pub fn new(a1: FloatValue, a2: FloatValue, a3: FloatValue) -> Self {
        Self { a1, a2, a3 }
    }
}

/// One surface type with its coverage fraction and material coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMaterialRow {
    pub surface_type: String,
    pub fraction: FloatValue,
    #[serde(flatten)]
    pub coefficients: MaterialCoefficients,
}

/// Ordered collection of surface rows.
///
/// Fractions do not have to sum to one; the whole site might not have a known
/// material, so they are treated as weights and renormalised when used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceComposition {
    rows: Vec<SurfaceMaterialRow>,
}

impl SurfaceComposition {
    pub fn new(rows: Vec<SurfaceMaterialRow>) -> Self {
        Self { rows }
    }

    /// A single fully covering surface with the given coefficients.
    ///
    /// This is the composition the calibration engine fits.
    pub fn learned(coefficients: MaterialCoefficients) -> Self {
        Self::new(vec![SurfaceMaterialRow {
            surface_type: "learned".to_string(),
            fraction: 1.0,
            coefficients,
        }])
    }

    /// Join surface fractions against a surface type to material mapping and a
    /// material coefficient table.
    ///
    /// Surface types without a mapping, or mapped to an unknown material, are
    /// dropped rather than treated as errors.
    pub fn from_mapping(
        fractions: &[(String, FloatValue)],
        mapping: &IndexMap<String, String>,
        materials: &IndexMap<String, MaterialCoefficients>,
    ) -> Self {
        let rows = fractions
            .iter()
            .filter_map(|(surface_type, fraction)| {
                let coefficients = mapping
                    .get(surface_type)
                    .and_then(|material| materials.get(material));
                if coefficients.is_none() {
                    debug!("Dropping unmapped surface type {}", surface_type);
                }
                coefficients.map(|c| SurfaceMaterialRow {
                    surface_type: surface_type.clone(),
                    fraction: *fraction,
                    coefficients: *c,
                })
            })
            .collect();
        Self::new(rows)
    }

    pub fn rows(&self) -> &[SurfaceMaterialRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of the coverage fractions.
    ///
    /// Fails if the sum is not positive, since the fractions could not then be
    /// used as weights.
    pub fn normalization_factor(&self) -> LumpsResult<FloatValue> {
        let total: FloatValue = self.rows.iter().map(|row| row.fraction).sum();
        if total > 0.0 {
            Ok(total)
        } else {
            Err(LumpsError::InvalidArgument(format!(
                "Surface coverage fractions must sum to a positive value, got {}",
                total
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn materials() -> IndexMap<String, MaterialCoefficients> {
        IndexMap::from([
            ("grass".to_string(), MaterialCoefficients::new(0.32, 0.54, -27.4)),
            ("asphalt".to_string(), MaterialCoefficients::new(0.36, 0.23, -19.3)),
        ])
    }

    #[test]
    fn test_inner_join_drops_unmapped() {
        let fractions = vec![
            ("Lawn".to_string(), 0.6),
            ("Road".to_string(), 0.3),
            ("Pond".to_string(), 0.1),
        ];
        let mapping = IndexMap::from([
            ("Lawn".to_string(), "grass".to_string()),
            ("Road".to_string(), "asphalt".to_string()),
            ("Pond".to_string(), "water".to_string()),
        ]);

        let composition = SurfaceComposition::from_mapping(&fractions, &mapping, &materials());

        assert_eq!(composition.len(), 2);
        assert_eq!(composition.rows()[0].surface_type, "Lawn");
        assert_eq!(composition.rows()[1].coefficients.a3, -19.3);
        assert!(is_close!(composition.normalization_factor().unwrap(), 0.9));
    }

    #[test]
    fn test_zero_sum_is_invalid() {
        let empty = SurfaceComposition::default();
        assert!(matches!(
            empty.normalization_factor(),
            Err(LumpsError::InvalidArgument(_))
        ));

        let mut rows = SurfaceComposition::learned(MaterialCoefficients::new(0.3, 0.1, 5.0))
            .rows()
            .to_vec();
        rows[0].fraction = 0.0;
        assert!(SurfaceComposition::new(rows).normalization_factor().is_err());
    }
}
