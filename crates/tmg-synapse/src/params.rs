//! Instance parameters for the synapse mechanism

use crate::error::*;

/// Registration limits for a single parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamBound {
    /// Parameter name as exposed to the host
    pub name: &'static str,
    /// Inclusive lower limit
    pub min: f64,
    /// Inclusive upper limit
    pub max: f64,
    /// Units string
    pub units: &'static str,
}

impl ParamBound {
    /// Check a value against this bound
    pub fn check(&self, value: f64) -> Result<()> {
        if (self.min..=self.max).contains(&value) {
            Ok(())
        } else {
            Err(SynapseError::invalid_parameter(
                self.name,
                value.to_string(),
                format!("in [{:e}, {:e}] {}", self.min, self.max, self.units),
            ))
        }
    }
}

/// Host-facing limits on the range parameters
pub const PARAM_BOUNDS: [ParamBound; 7] = [
    ParamBound {
        name: "e",
        min: f64::MIN,
        max: f64::MAX,
        units: "mV",
    },
    ParamBound {
        name: "tau_1",
        min: 1e-9,
        max: 1e9,
        units: "ms",
    },
    ParamBound {
        name: "tau_2",
        min: 1e-9,
        max: 1e9,
        units: "ms",
    },
    ParamBound {
        name: "tau_rec",
        min: 1e-9,
        max: 1e9,
        units: "ms",
    },
    ParamBound {
        name: "tau_facil",
        min: 0.0,
        max: 1e9,
        units: "ms",
    },
    ParamBound {
        name: "U",
        min: 0.0,
        max: 1.0,
        units: "1",
    },
    ParamBound {
        name: "u0",
        min: 0.0,
        max: 1.0,
        units: "1",
    },
];

/// Parameters for one synapse instance
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TmgParams {
    /// Reversal potential (mV)
    pub e: f64,
    /// Rise time constant of the conductance kernel (ms)
    pub tau_1: f64,
    /// Decay time constant of the conductance kernel (ms)
    pub tau_2: f64,
    /// Recovery time constant from depression (ms)
    pub tau_rec: f64,
    /// Facilitation decay time constant (ms), 0 disables facilitation
    pub tau_facil: f64,
    /// Baseline utilization of synaptic efficacy
    #[cfg_attr(feature = "serde", serde(rename = "U"))]
    pub utilization: f64,
    /// Initial facilitation for fresh connections
    pub u0: f64,
}

impl Default for TmgParams {
    fn default() -> Self {
        Self {
            e: -90.0,          // inhibitory reversal
            tau_1: 2.0,        // 2ms rise
            tau_2: 20.0,       // 20ms decay
            tau_rec: 100.0,    // 100ms recovery
            tau_facil: 1000.0, // 1s facilitation
            utilization: 0.04,
            u0: 0.0,
        }
    }
}

impl TmgParams {
    /// Create new parameters with validation
    pub fn new(
        e: f64,
        tau_1: f64,
        tau_2: f64,
        tau_rec: f64,
        tau_facil: f64,
        utilization: f64,
        u0: f64,
    ) -> Result<Self> {
        let params = Self {
            e,
            tau_1,
            tau_2,
            tau_rec,
            tau_facil,
            utilization,
            u0,
        };
        params.validate()?;
        Ok(params)
    }

    /// Validate parameters against [`PARAM_BOUNDS`]
    pub fn validate(&self) -> Result<()> {
        for (bound, value) in PARAM_BOUNDS.iter().zip(self.values()) {
            bound.check(value)?;
        }
        Ok(())
    }

    /// Parameter values in [`PARAM_BOUNDS`] order
    pub fn values(&self) -> [f64; 7] {
        [
            self.e,
            self.tau_1,
            self.tau_2,
            self.tau_rec,
            self.tau_facil,
            self.utilization,
            self.u0,
        ]
    }

    /// Whether facilitation dynamics are enabled
    pub fn facilitates(&self) -> bool {
        self.tau_facil > 0.0
    }

    /// Set reversal potential
    pub fn with_reversal(mut self, e: f64) -> Self {
        self.e = e;
        self
    }

    /// Set kernel time constants
    pub fn with_kernel(mut self, tau_1: f64, tau_2: f64) -> Self {
        self.tau_1 = tau_1;
        self.tau_2 = tau_2;
        self
    }

    /// Set recovery time constant
    pub fn with_recovery(mut self, tau_rec: f64) -> Self {
        self.tau_rec = tau_rec;
        self
    }

    /// Set facilitation time constant
    pub fn with_facilitation(mut self, tau_facil: f64) -> Self {
        self.tau_facil = tau_facil;
        self
    }

    /// Set baseline utilization
    pub fn with_utilization(mut self, utilization: f64) -> Self {
        self.utilization = utilization;
        self
    }

    /// Set initial facilitation
    pub fn with_u0(mut self, u0: f64) -> Self {
        self.u0 = u0;
        self
    }
}
