//! Per-event plasticity recurrence
//!
//! Each connection carries three resource fractions: recovered `x`, active `y`
//! and inactive `z`, with `x + y + z = 1` at every event boundary. Between
//! events `y` decays into `z` with `tau_1` and `z` recovers into `x` with
//! `tau_rec`; both are advanced in closed form from the connection's last event.
//! At the event a fraction `u` of `x` is released, producing a conductance
//! impulse proportional to `x * u`.
//!
//! Facilitation `u` decays with `tau_facil` and is incremented by
//! `U * (1 - u)` at every event. The decay is applied before the increment;
//! the reverse order drives the first response after a long silence towards
//! zero. With `tau_facil == 0`, `u` is pinned to `U`.

use crate::{
    decay::ConductanceState,
    error::*,
    kernel::Kernel,
    params::TmgParams,
    stream::{ConnectionId, StreamState},
};

/// Smallest allowed `|tau_1 / tau_rec - 1|`
pub const RECOVERY_DEGENERACY_TOLERANCE: f64 = 1e-9;

/// What one event did to its connection and to the accumulators
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventOutcome {
    /// Time since the connection's previous event (ms)
    pub delta: f64,
    /// Recovered fraction available for release
    pub x: f64,
    /// Facilitation after the increment
    pub u: f64,
    /// Impulse added to both accumulators (µS)
    pub impulse: f64,
}

/// Applies events to connection state using one instance's constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventProcessor {
    tau_1: f64,
    tau_rec: f64,
    tau_facil: f64,
    utilization: f64,
    factor: f64,
    coupling: f64,
}

impl EventProcessor {
    /// Derive the per-event constants.
    ///
    /// `tau_1` is taken from the clamped kernel. Rejects `tau_1 == tau_rec`,
    /// where the inactive-fraction update divides by zero.
    pub fn new(params: &TmgParams, kernel: &Kernel) -> Result<Self> {
        let tau_1 = kernel.tau_1();
        let coupling = tau_1 / params.tau_rec - 1.0;
        if coupling.abs() < RECOVERY_DEGENERACY_TOLERANCE {
            return Err(SynapseError::degenerate(format!(
                "tau_1 ({}) equals tau_rec ({})",
                tau_1, params.tau_rec
            )));
        }

        Ok(Self {
            tau_1,
            tau_rec: params.tau_rec,
            tau_facil: params.tau_facil,
            utilization: params.utilization,
            factor: kernel.factor(),
            coupling,
        })
    }

    /// Advance `stream` to `event_time` and inject the release into `conductance`.
    ///
    /// Fails with [`SynapseError::OrderingViolation`] if `event_time` precedes the
    /// stream's last event; nothing is modified in that case.
    pub fn process(
        &self,
        connection: ConnectionId,
        stream: &mut StreamState,
        conductance: &mut ConductanceState,
        event_time: f64,
        weight: f64,
    ) -> Result<EventOutcome> {
        if !event_time.is_finite() {
            return Err(SynapseError::invalid_parameter(
                "event_time",
                event_time.to_string(),
                "finite",
            ));
        }
        if !weight.is_finite() {
            return Err(SynapseError::invalid_parameter("weight", weight.to_string(), "finite"));
        }
        if event_time < stream.tsyn {
            return Err(SynapseError::OrderingViolation {
                connection,
                event_time,
                last_event_time: stream.tsyn,
            });
        }

        let delta = event_time - stream.tsyn;
        let decay_active = (-delta / self.tau_1).exp();
        let decay_rec = (-delta / self.tau_rec).exp();

        stream.z = stream.z * decay_rec + stream.y * (decay_active - decay_rec) / self.coupling;
        stream.y *= decay_active;
        let x = 1.0 - stream.y - stream.z;

        if self.tau_facil > 0.0 {
            stream.u *= (-delta / self.tau_facil).exp();
            stream.u += self.utilization * (1.0 - stream.u);
        } else {
            stream.u = self.utilization;
        }

        let impulse = weight * self.factor * x * stream.u;
        conductance.inject(impulse);

        stream.y += x * stream.u;
        stream.tsyn = event_time;

        Ok(EventOutcome {
            delta,
            x,
            u: stream.u,
            impulse,
        })
    }
}
