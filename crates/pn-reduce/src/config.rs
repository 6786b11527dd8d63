//! Reduction and resistance-derivation settings.

use pn_core::constants::{PA2_PER_BAR2, STANDARD_ATMOSPHERE_BAR};
use pn_core::{Density, Temperature, k, kgpm3};
use serde::{Deserialize, Serialize};

/// Which invariant checker runs after each destructive step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Skip checks entirely.
    Off,
    /// Degree-vs-connection check plus full table validation.
    #[default]
    Full,
}

/// Reduction configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReduceConfig {
    /// Gas density at normal conditions, converts volumetric bounds to mass flow (kg/m³)
    pub normal_density_kg_per_m3: f64,
    /// Floor for a propagated lower squared pressure (bar²)
    pub lower_pressure_sq_floor_bar2: f64,
    /// Floor for a propagated upper squared pressure (bar²)
    pub upper_pressure_sq_floor_bar2: f64,
    pub validation: ValidationMode,
    pub resistance: ResistanceConfig,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            normal_density_kg_per_m3: 0.82,
            lower_pressure_sq_floor_bar2: 1.0267,
            upper_pressure_sq_floor_bar2: STANDARD_ATMOSPHERE_BAR,
            validation: ValidationMode::Full,
            resistance: ResistanceConfig::default(),
        }
    }
}

impl ReduceConfig {
    pub fn normal_density(&self) -> Density {
        kgpm3(self.normal_density_kg_per_m3)
    }

    /// Lower squared-pressure floor in Pa².
    pub fn lower_floor_pa2(&self) -> f64 {
        self.lower_pressure_sq_floor_bar2 * PA2_PER_BAR2
    }

    /// Upper squared-pressure floor in Pa².
    pub fn upper_floor_pa2(&self) -> f64 {
        self.upper_pressure_sq_floor_bar2 * PA2_PER_BAR2
    }
}

/// Gas properties used to derive a pipe's resistance coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResistanceConfig {
    pub temperature_k: f64,
    /// Specific gas constant (J/(kg·K))
    pub gas_constant: f64,
    pub compressibility: f64,
    /// Used when a pipe declares no roughness (mm)
    pub default_roughness_mm: f64,
}

impl ResistanceConfig {
    pub fn temperature(&self) -> Temperature {
        k(self.temperature_k)
    }
}

impl Default for ResistanceConfig {
    fn default() -> Self {
        Self {
            temperature_k: 283.15,
            gas_constant: 518.28,
            compressibility: 0.9,
            default_roughness_mm: 0.012,
        }
    }
}
