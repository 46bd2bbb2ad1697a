//! Event-driven bi-exponential synapse with Tsodyks-Markram short-term plasticity
//!
//! A synapse instance holds two exponentially decaying accumulators whose
//! difference is the emitted conductance. The host advances them once per
//! accepted time step and delivers spikes per upstream connection; each
//! connection carries its own depression and facilitation state. The host
//! solver reads back the current and a finite-difference `di/dv`.
//!
//! Times are in ms, conductances in µS, voltages in mV and currents in nA.

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod params;
pub mod kernel;
pub mod decay;
pub mod stream;
pub mod event;
pub mod current;
pub mod synapse;
pub mod simulation;
#[cfg(feature = "serde")]
pub mod config;

// Re-export essential types
pub use error::{SynapseError, Result};
pub use params::{TmgParams, ParamBound, PARAM_BOUNDS};
pub use kernel::Kernel;
pub use decay::ConductanceState;
pub use stream::{ConnectionId, StreamState};
pub use event::{EventOutcome, EventProcessor};
pub use current::{CurrentSample, NodeContribution};
pub use synapse::TmgSynapse;
pub use simulation::{SimulationEngine, SimulationParams, SimulationResult, SpikeTrain};
#[cfg(feature = "serde")]
pub use config::SynapseConfig;
