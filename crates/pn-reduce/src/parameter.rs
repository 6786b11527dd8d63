//! Resistance coefficients and their serial/parallel composition.
//!
//! A passive connector obeys `p_start² - p_end² = β·m·|m|` for mass flow `m`
//! from start to end. Chaining two connectors adds their β; joining two in
//! parallel adds the conductances `1/√β`.

use pn_core::{EdgeId, Length, Real, ensure_non_negative, mm};
use pn_graph::GraphError;

use crate::config::ResistanceConfig;
use crate::error::{ReduceError, ReduceResult};
use crate::model::{ConnectorKind, GasNetwork};

/// β of two connectors in series.
pub fn serial_compose(p1: Real, p2: Real) -> Real {
    p1 + p2
}

/// β of two connectors in parallel: `p1·p2 / (√p1 + √p2)²`.
///
/// A zero-resistance branch short-circuits the other, so the result is 0
/// whenever either side is 0.
pub fn parallel_compose(p1: Real, p2: Real) -> Real {
    if p1 <= 0.0 || p2 <= 0.0 {
        return 0.0;
    }
    let denom = p1.sqrt() + p2.sqrt();
    p1 * p2 / denom.powi(2)
}

/// Fold a multiset of parallel β pairwise from the left.
pub fn parallel_compose_all(params: &[Real]) -> Option<Real> {
    let (first, rest) = params.split_first()?;
    Some(rest.iter().fold(*first, |acc, p| parallel_compose(acc, *p)))
}

/// Current β of an edge.
pub fn parameter(net: &GasNetwork, edge: EdgeId) -> ReduceResult<Real> {
    net.edge_data(edge)
        .map(|c| c.parameter)
        .ok_or(ReduceError::Graph(GraphError::UnknownEdge { edge }))
}

/// Physical dimensions of a pipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeGeometry {
    pub length: Length,
    pub diameter: Length,
    /// Absolute wall roughness; `None` uses the configured default
    pub roughness: Option<Length>,
}

/// Derives a connector's β once, when the network is loaded.
pub trait ResistanceModel {
    fn coefficient(
        &self,
        name: &str,
        kind: ConnectorKind,
        geometry: Option<&PipeGeometry>,
    ) -> ReduceResult<Real>;
}

/// Isothermal pipe coefficient with a Nikuradse friction factor:
///
/// `λ = (2·log10(D/k) + 1.138)⁻²`, `β = 16·λ·R·z·T·L / (π²·D⁵)`.
///
/// Connectors other than pipes get β = 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiamCoefficient {
    pub config: ResistanceConfig,
}

impl SiamCoefficient {
    pub fn new(config: ResistanceConfig) -> Self {
        Self { config }
    }

    pub fn friction_factor(diameter: Real, roughness: Real) -> Real {
        (2.0 * (diameter / roughness).log10() + 1.138).powi(-2)
    }

    fn pipe_coefficient(&self, geometry: &PipeGeometry) -> ReduceResult<Real> {
        let length = ensure_non_negative(geometry.length.value, "pipe length")?;
        let diameter = ensure_non_negative(geometry.diameter.value, "pipe diameter")?;
        let roughness = geometry
            .roughness
            .unwrap_or_else(|| mm(self.config.default_roughness_mm))
            .value;
        if diameter == 0.0 || roughness <= 0.0 {
            return Err(pn_core::PnError::InvalidArg {
                what: "pipe diameter and roughness must be positive",
            }
            .into());
        }

        let c = &self.config;
        let lambda = Self::friction_factor(diameter, roughness);
        let rzt = c.gas_constant * c.compressibility * c.temperature().value;
        let beta = 16.0 * lambda * rzt * length / (std::f64::consts::PI.powi(2) * diameter.powi(5));
        ensure_non_negative(beta, "pipe coefficient").map_err(ReduceError::from)
    }
}

impl ResistanceModel for SiamCoefficient {
    fn coefficient(
        &self,
        name: &str,
        kind: ConnectorKind,
        geometry: Option<&PipeGeometry>,
    ) -> ReduceResult<Real> {
        match kind {
            ConnectorKind::Pipe => {
                let geometry = geometry.ok_or_else(|| ReduceError::MissingGeometry {
                    edge: name.to_string(),
                })?;
                self.pipe_coefficient(geometry)
            }
            _ => Ok(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pn_core::{Tolerances, km, m, nearly_equal};

    fn tol() -> Tolerances {
        Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        }
    }

    #[test]
    fn serial_adds() {
        assert_eq!(serial_compose(2.0, 3.0), 5.0);
    }

    #[test]
    fn parallel_of_equal_pipes_is_a_quarter() {
        assert!(nearly_equal(parallel_compose(4.0, 4.0), 1.0, tol()));
        assert!(nearly_equal(parallel_compose(1.0, 1.0), 0.25, tol()));
    }

    #[test]
    fn parallel_with_zero_is_zero() {
        assert_eq!(parallel_compose(0.0, 7.0), 0.0);
        assert_eq!(parallel_compose(7.0, 0.0), 0.0);
        assert_eq!(parallel_compose(0.0, 0.0), 0.0);
    }

    #[test]
    fn parallel_all_folds() {
        assert_eq!(parallel_compose_all(&[]), None);
        assert_eq!(parallel_compose_all(&[3.0]), Some(3.0));
        let three = parallel_compose_all(&[9.0, 9.0, 9.0]).unwrap();
        assert!(nearly_equal(three, 1.0, tol()));
    }

    #[test]
    fn siam_coefficient_scales_with_length() {
        let model = SiamCoefficient::default();
        let short = PipeGeometry {
            length: km(1.0),
            diameter: m(0.5),
            roughness: Some(mm(0.012)),
        };
        let long = PipeGeometry {
            length: km(2.0),
            ..short
        };
        let b1 = model.coefficient("p1", ConnectorKind::Pipe, Some(&short)).unwrap();
        let b2 = model.coefficient("p2", ConnectorKind::Pipe, Some(&long)).unwrap();
        assert!(b1 > 0.0);
        assert!(nearly_equal(b2, 2.0 * b1, tol()));
    }

    #[test]
    fn siam_coefficient_matches_formula() {
        let model = SiamCoefficient::default();
        let geometry = PipeGeometry {
            length: m(1000.0),
            diameter: m(0.5),
            roughness: None,
        };
        let lambda = SiamCoefficient::friction_factor(0.5, 0.012e-3);
        let expected = 16.0 * lambda * 518.28 * 0.9 * 283.15 * 1000.0
            / (std::f64::consts::PI.powi(2) * 0.5_f64.powi(5));
        let beta = model.coefficient("p", ConnectorKind::Pipe, Some(&geometry)).unwrap();
        assert!(nearly_equal(beta, expected, tol()));
    }

    #[test]
    fn non_pipes_have_zero_coefficient() {
        let model = SiamCoefficient::default();
        for kind in [
            ConnectorKind::ShortPipe,
            ConnectorKind::Valve,
            ConnectorKind::Compressor,
            ConnectorKind::Resistor,
        ] {
            assert_eq!(model.coefficient("c", kind, None).unwrap(), 0.0);
        }
    }

    #[test]
    fn pipe_without_geometry_is_rejected() {
        let model = SiamCoefficient::default();
        assert_eq!(
            model.coefficient("p9", ConnectorKind::Pipe, None),
            Err(ReduceError::MissingGeometry { edge: "p9".into() })
        );
    }

    #[test]
    fn zero_diameter_is_rejected() {
        let model = SiamCoefficient::default();
        let geometry = PipeGeometry {
            length: m(10.0),
            diameter: m(0.0),
            roughness: None,
        };
        assert!(matches!(
            model.coefficient("p", ConnectorKind::Pipe, Some(&geometry)),
            Err(ReduceError::Numeric(_))
        ));
    }
}
