//! Beer-Lambert attenuation along a track.

use std::collections::BTreeMap;

use quadcell_object::Track;
use serde::{Deserialize, Serialize};

/// Wavelength in ångström at which absorption cross sections are tabulated
/// (2200 m/s neutrons).
pub const REFERENCE_WAVELENGTH: f64 = 1.7982;

/// Source of per-unit-length transmission factors.
pub trait MaterialTable {
    /// Fraction of the beam that survives one unit of path through
    /// `material` at `wavelength`. Must lie in `(0, 1]`.
    fn transmission_factor(&self, material: i32, wavelength: f64) -> f64;
}

/// A material described by its number density and neutron cross sections.
///
/// With the number density in atoms per Å³, cross sections in barns and path
/// lengths in cm, `n σ L` is dimensionless.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeutronMaterial {
    /// Atoms per Å³.
    pub number_density: f64,
    /// Total scattering cross section (barn).
    pub scattering_xs: f64,
    /// Absorption cross section at [`REFERENCE_WAVELENGTH`] (barn).
    pub absorption_xs: f64,
}

impl NeutronMaterial {
    /// Linear attenuation coefficient at `wavelength`. Absorption scales
    /// linearly with wavelength.
    pub fn attenuation_coefficient(&self, wavelength: f64) -> f64 {
        self.number_density
            * (self.scattering_xs + self.absorption_xs * wavelength / REFERENCE_WAVELENGTH)
    }

    /// Transmission through one unit of path.
    pub fn transmission_factor(&self, wavelength: f64) -> f64 {
        (-self.attenuation_coefficient(wavelength)).exp()
    }
}

/// Materials keyed by material id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialLibrary {
    materials: BTreeMap<i32, NeutronMaterial>,
}

impl MaterialLibrary {
    /// An empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a material.
    pub fn insert(&mut self, id: i32, material: NeutronMaterial) {
        self.materials.insert(id, material);
    }

    /// The material with this id.
    pub fn get(&self, id: i32) -> Option<&NeutronMaterial> {
        self.materials.get(&id)
    }

    /// Number of materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// True if no materials are defined.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl MaterialTable for MaterialLibrary {
    /// Unknown materials are transparent.
    fn transmission_factor(&self, material: i32, wavelength: f64) -> f64 {
        match self.materials.get(&material) {
            Some(m) => m.transmission_factor(wavelength),
            None => {
                tracing::debug!(material, "no material data; treated as void");
                1.0
            }
        }
    }
}

/// Transmitted fraction along `track`: the product over its spans of the
/// material's factor raised to the span length. Material 0 is void.
pub fn integrate_attenuation(track: &Track, wavelength: f64, materials: &dyn MaterialTable) -> f64 {
    track
        .links()
        .iter()
        .filter(|link| link.material != 0)
        .map(|link| materials.transmission_factor(link.material, wavelength).powf(link.length()))
        .product()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vanadium() -> NeutronMaterial {
        NeutronMaterial {
            number_density: 0.0722,
            scattering_xs: 5.1,
            absorption_xs: 5.08,
        }
    }

    #[test]
    fn test_attenuation_coefficient() {
        let v = vanadium();
        let mu = v.attenuation_coefficient(REFERENCE_WAVELENGTH);
        assert!((mu - 0.0722 * 10.18).abs() < 1e-12);
        let mu2 = v.attenuation_coefficient(2.0 * REFERENCE_WAVELENGTH);
        assert!((mu2 - 0.0722 * (5.1 + 2.0 * 5.08)).abs() < 1e-12);
    }

    #[test]
    fn test_library_unknown_is_transparent() {
        let mut lib = MaterialLibrary::new();
        lib.insert(1, vanadium());
        assert_eq!(lib.len(), 1);
        assert!((lib.transmission_factor(2, 1.0) - 1.0).abs() < 1e-15);
        let f = lib.transmission_factor(1, 1.0);
        assert!(f > 0.0 && f < 1.0);
    }
}
