//! Trace settings.

use std::collections::BTreeMap;

use quadcell_geom::DistanceSolver;
use quadcell_math::Tolerance;
use quadcell_object::Probe;
use quadcell_rules::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};

use crate::attenuation::{MaterialLibrary, NeutronMaterial};
use crate::error::{Error, Result};

/// Tolerances, probe steps and materials for a geometry.
///
/// Loadable from TOML:
///
/// ```toml
/// tolerance = 1e-6
/// # boundary_step and crossing_step default to 5x and 25x the tolerance
/// distance_solver = "exact"
///
/// [materials.1]
/// number_density = 0.0722
/// scattering_xs = 5.1
/// absorption_xs = 5.08
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    /// Band around zero within which a point is on a surface.
    pub tolerance: f64,
    /// Normal offset for boundary tests; 5 x `tolerance` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary_step: Option<f64>,
    /// Along-ray offset for classifying crossings; 25 x `tolerance` when
    /// unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crossing_step: Option<f64>,
    /// Nesting limit for cell complement references.
    pub max_complement_depth: usize,
    /// Distance method for general quadrics.
    pub distance_solver: DistanceSolver,
    /// Materials by id (TOML keys are strings).
    pub materials: BTreeMap<String, NeutronMaterial>,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::DEFAULT.linear,
            boundary_step: None,
            crossing_step: None,
            max_complement_depth: DEFAULT_MAX_DEPTH,
            distance_solver: DistanceSolver::default(),
            materials: BTreeMap::new(),
        }
    }
}

impl TraceSettings {
    /// Parse and validate TOML settings.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.tolerance <= 0.0 {
            return Err(Error::InvalidSettings("tolerance must be positive".into()));
        }
        let probe = self.probe();
        if probe.boundary_step <= self.tolerance {
            return Err(Error::InvalidSettings(
                "boundary_step must exceed tolerance".into(),
            ));
        }
        if probe.crossing_step <= self.tolerance {
            return Err(Error::InvalidSettings(
                "crossing_step must exceed tolerance".into(),
            ));
        }
        if self.max_complement_depth == 0 {
            return Err(Error::InvalidSettings(
                "max_complement_depth must be at least 1".into(),
            ));
        }
        for (key, m) in &self.materials {
            if key.parse::<i32>().is_err() {
                return Err(Error::InvalidSettings(format!(
                    "material id '{key}' is not an integer"
                )));
            }
            if m.number_density < 0.0 || m.scattering_xs < 0.0 || m.absorption_xs < 0.0 {
                return Err(Error::InvalidSettings(format!(
                    "material {key} has a negative density or cross section"
                )));
            }
        }
        Ok(())
    }

    /// Probe steps for cells, filling unset steps from the tolerance.
    pub fn probe(&self) -> Probe {
        let derived = Probe::from_tolerance(&Tolerance {
            linear: self.tolerance,
        });
        Probe {
            boundary_step: self.boundary_step.unwrap_or(derived.boundary_step),
            crossing_step: self.crossing_step.unwrap_or(derived.crossing_step),
        }
    }

    /// The configured materials.
    pub fn material_library(&self) -> Result<MaterialLibrary> {
        let mut library = MaterialLibrary::new();
        for (key, m) in &self.materials {
            let id = key.parse::<i32>().map_err(|_| {
                Error::InvalidSettings(format!("material id '{key}' is not an integer"))
            })?;
            library.insert(id, *m);
        }
        Ok(library)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MaterialTable;

    #[test]
    fn test_defaults_validate() {
        let s = TraceSettings::default();
        assert!(s.validate().is_ok());
        let probe = s.probe();
        assert!((probe.boundary_step - 5e-6).abs() < 1e-18);
        assert!((probe.crossing_step - 2.5e-5).abs() < 1e-18);
        assert_eq!(s.distance_solver, DistanceSolver::Gradient);
    }

    #[test]
    fn test_from_toml() {
        let s = TraceSettings::from_toml_str(
            r#"
            distance_solver = "exact"
            max_complement_depth = 4

            [materials.3]
            number_density = 0.0722
            scattering_xs = 5.1
            absorption_xs = 5.08
            "#,
        )
        .unwrap();
        assert_eq!(s.distance_solver, DistanceSolver::Exact);
        assert_eq!(s.max_complement_depth, 4);
        assert!((s.tolerance - 1e-6).abs() < 1e-18);

        let lib = s.material_library().unwrap();
        assert!(lib.get(3).is_some());
        assert!(lib.transmission_factor(3, 1.0) < 1.0);
    }

    #[test]
    fn test_steps_follow_tolerance() {
        let s = TraceSettings::from_toml_str("tolerance = 1e-3").unwrap();
        let probe = s.probe();
        assert!((probe.boundary_step - 5e-3).abs() < 1e-15);
        assert!((probe.crossing_step - 2.5e-2).abs() < 1e-15);

        let s = TraceSettings::from_toml_str("tolerance = 1e-3\nboundary_step = 0.01").unwrap();
        assert!((s.probe().boundary_step - 0.01).abs() < 1e-15);
        assert!((s.probe().crossing_step - 2.5e-2).abs() < 1e-15);
    }

    #[test]
    fn test_invalid_settings() {
        let mut s = TraceSettings::default();
        s.tolerance = 0.0;
        assert!(matches!(s.validate(), Err(Error::InvalidSettings(_))));

        let mut s = TraceSettings::default();
        s.crossing_step = Some(1e-7);
        assert!(s.validate().is_err());

        assert!(matches!(
            TraceSettings::from_toml_str("[materials.steel]\nnumber_density = 1.0\nscattering_xs = 1.0\nabsorption_xs = 1.0"),
            Err(Error::InvalidSettings(_))
        ));
        assert!(matches!(
            TraceSettings::from_toml_str("tolerance = \"small\""),
            Err(Error::Toml(_))
        ));
    }
}
