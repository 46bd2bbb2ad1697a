//! Current and conductance coupling to the host solver

use crate::decay::ConductanceState;

/// Voltage perturbation used for the finite-difference derivative (mV)
pub const FD_PERTURBATION: f64 = 1e-3;

/// Converts point-process current per area (nA / µm²) to mA/cm²
pub const AREA_SCALE: f64 = 1e2;

/// Synaptic current at membrane voltage `v` (nA)
pub fn current(conductance: &ConductanceState, e: f64, v: f64) -> f64 {
    conductance.conductance() * (v - e)
}

/// Current and its voltage derivative at one solver iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentSample {
    /// Current at `v` (nA)
    pub i: f64,
    /// Finite-difference `di/dv` (µS)
    pub di_dv: f64,
}

impl CurrentSample {
    /// Evaluate the current at `v` and `v + FD_PERTURBATION`.
    ///
    /// Only valid for the accumulator values it was computed from; recompute
    /// every solver iteration.
    pub fn at(conductance: &ConductanceState, e: f64, v: f64) -> Self {
        let i_perturbed = current(conductance, e, v + FD_PERTURBATION);
        let i = current(conductance, e, v);
        Self {
            i,
            di_dv: (i_perturbed - i) / FD_PERTURBATION,
        }
    }

    /// Scale onto a node of `area` µm²
    pub fn to_node(self, area: f64) -> NodeContribution {
        let scale = AREA_SCALE / area;
        NodeContribution {
            rhs: self.i * scale,
            d: self.di_dv * scale,
        }
    }
}

/// Area-normalized contribution to one node of the host's linear system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeContribution {
    /// Subtracted from the node's right-hand side (mA/cm²)
    pub rhs: f64,
    /// Added to the node's diagonal (S/cm²)
    pub d: f64,
}
