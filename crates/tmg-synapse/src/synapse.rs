//! Synapse instance tying the kernel, accumulators and connections together

use crate::{
    current::{CurrentSample, NodeContribution},
    decay::ConductanceState,
    error::*,
    event::{EventOutcome, EventProcessor},
    kernel::Kernel,
    params::TmgParams,
    stream::{ConnectionId, StreamState},
};
use std::collections::HashMap;

/// One bi-exponential synapse with per-connection short-term plasticity
#[derive(Debug, Clone)]
pub struct TmgSynapse {
    /// Instance parameters as configured
    params: TmgParams,
    /// Normalized kernel for the current run
    kernel: Kernel,
    /// Per-event constants for the current run
    processor: EventProcessor,
    /// Shared accumulators
    conductance: ConductanceState,
    /// Plasticity state of every connection that has delivered an event
    streams: HashMap<ConnectionId, StreamState>,
    /// Initialization time; fresh connections start here (ms)
    t0: f64,
    /// Set after an ordering violation
    halted: bool,
    /// Current from the last solver evaluation (nA)
    last_current: f64,
}

impl TmgSynapse {
    /// Create a synapse initialized at time 0
    pub fn new(params: TmgParams) -> Result<Self> {
        Self::new_at(params, 0.0)
    }

    /// Create a synapse initialized at `t0` ms
    pub fn new_at(params: TmgParams, t0: f64) -> Result<Self> {
        let (kernel, processor) = Self::derive(&params)?;
        Ok(Self {
            params,
            kernel,
            processor,
            conductance: ConductanceState::new(),
            streams: HashMap::new(),
            t0,
            halted: false,
            last_current: 0.0,
        })
    }

    fn derive(params: &TmgParams) -> Result<(Kernel, EventProcessor)> {
        params.validate()?;
        let kernel = Kernel::new(params.tau_1, params.tau_2)?;
        let processor = EventProcessor::new(params, &kernel)?;
        Ok((kernel, processor))
    }

    /// Start a new run at `t0` ms.
    ///
    /// Re-derives the kernel, zeroes the accumulators, returns every known
    /// connection to its rested state and clears a previous halt.
    pub fn initialize(&mut self, t0: f64) -> Result<()> {
        let (kernel, processor) = Self::derive(&self.params)?;
        self.kernel = kernel;
        self.processor = processor;
        self.conductance.reset();
        for stream in self.streams.values_mut() {
            stream.reset(self.params.u0, t0);
        }
        self.t0 = t0;
        self.halted = false;
        self.last_current = 0.0;
        log::debug!(
            "synapse initialized at t={}ms with {} connections",
            t0,
            self.streams.len()
        );
        Ok(())
    }

    /// Replace the parameters between runs and re-initialize at the current start time
    pub fn set_params(&mut self, params: TmgParams) -> Result<()> {
        Self::derive(&params)?;
        self.params = params;
        self.initialize(self.t0)
    }

    /// Decay the accumulators over one accepted step of `dt` ms
    pub fn advance_decay(&mut self, dt: f64) {
        self.conductance
            .advance(dt, self.kernel.tau_1(), self.kernel.tau_2());
    }

    /// Deliver an event from `connection` arriving at `event_time` ms.
    ///
    /// The first event from a connection creates its state. An event earlier
    /// than the connection's previous one is rejected without touching any
    /// state and halts the instance until the next [`initialize`](Self::initialize).
    pub fn on_event(
        &mut self,
        connection: ConnectionId,
        event_time: f64,
        weight: f64,
    ) -> Result<EventOutcome> {
        if self.halted {
            return Err(SynapseError::InstanceHalted { connection });
        }

        let mut stream = self
            .streams
            .get(&connection)
            .copied()
            .unwrap_or_else(|| StreamState::new(self.params.u0, self.t0));
        let mut conductance = self.conductance;

        match self
            .processor
            .process(connection, &mut stream, &mut conductance, event_time, weight)
        {
            Ok(outcome) => {
                self.streams.insert(connection, stream);
                self.conductance = conductance;
                log::trace!(
                    "event {} t={} w={} x={} u={} impulse={}",
                    connection,
                    event_time,
                    weight,
                    outcome.x,
                    outcome.u,
                    outcome.impulse
                );
                Ok(outcome)
            }
            Err(err) => {
                log::error!("{}", err);
                if err.is_fatal() {
                    self.halted = true;
                }
                Err(err)
            }
        }
    }

    /// Current and finite-difference derivative at membrane voltage `v` mV
    pub fn current_and_derivative(&mut self, v: f64) -> CurrentSample {
        let sample = CurrentSample::at(&self.conductance, self.params.e, v);
        self.last_current = sample.i;
        sample
    }

    /// Solver contribution at `v` mV onto a node of `area` µm²
    pub fn node_contribution(&mut self, v: f64, area: f64) -> NodeContribution {
        self.current_and_derivative(v).to_node(area)
    }

    /// Fast accumulator (µS)
    pub fn a(&self) -> f64 {
        self.conductance.a
    }

    /// Slow accumulator (µS)
    pub fn b(&self) -> f64 {
        self.conductance.b
    }

    /// Emitted conductance `B - A` (µS)
    pub fn conductance(&self) -> f64 {
        self.conductance.conductance()
    }

    /// Current from the last solver evaluation (nA)
    pub fn current(&self) -> f64 {
        self.last_current
    }

    /// Accumulator state
    pub fn conductance_state(&self) -> &ConductanceState {
        &self.conductance
    }

    /// Configured parameters
    pub fn params(&self) -> &TmgParams {
        &self.params
    }

    /// Kernel derived at initialization
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Plasticity state of `connection`, if it has delivered an event
    pub fn stream(&self, connection: ConnectionId) -> Option<&StreamState> {
        self.streams.get(&connection)
    }

    /// Number of connections that have delivered events
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Initialization time of the current run (ms)
    pub fn start_time(&self) -> f64 {
        self.t0
    }

    /// Whether an ordering violation halted event processing
    pub fn is_halted(&self) -> bool {
        self.halted
    }
}
