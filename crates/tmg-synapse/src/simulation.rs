//! Fixed-step driver for a single synapse under voltage clamp

use crate::{error::*, stream::ConnectionId, synapse::TmgSynapse};
use std::time::Instant;

/// `duration / dt` within this of an integer counts as a whole number of steps
const STEP_ROUNDING_TOLERANCE: f64 = 1e-9;

/// Driver parameters
#[derive(Debug, Clone)]
pub struct SimulationParams {
    /// Time step (ms)
    pub dt: f64,
    /// Total duration (ms)
    pub duration: f64,
    /// Clamped membrane voltage (mV)
    pub v_clamp: f64,
    /// Area of the node the synapse sits on (µm²)
    pub area: f64,
    /// Record one sample every this many steps
    pub record_every: usize,
    /// Enable performance sampling
    pub perf_enabled: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            dt: 0.025,          // 25µs step
            duration: 100.0,    // 100ms
            v_clamp: -65.0,     // near rest
            area: 100.0,        // 100µm² node
            record_every: 1,
            perf_enabled: false,
        }
    }
}

impl SimulationParams {
    /// Create new driver parameters with validation
    pub fn new(dt: f64, duration: f64) -> Result<Self> {
        let params = Self {
            dt,
            duration,
            ..Default::default()
        };
        params.validate()?;
        Ok(params)
    }

    /// Set clamped voltage
    pub fn with_v_clamp(mut self, v_clamp: f64) -> Self {
        self.v_clamp = v_clamp;
        self
    }

    /// Set node area
    pub fn with_area(mut self, area: f64) -> Self {
        self.area = area;
        self
    }

    /// Set recording stride
    pub fn with_record_every(mut self, record_every: usize) -> Self {
        self.record_every = record_every;
        self
    }

    /// Enable or disable performance sampling
    pub fn with_perf(mut self, enabled: bool) -> Self {
        self.perf_enabled = enabled;
        self
    }

    /// Get number of simulation steps
    ///
    /// A trailing partial step is run in full, so the last step ends at or after `duration`.
    pub fn num_steps(&self) -> usize {
        let steps = self.duration / self.dt;
        let nearest = steps.round();
        if (steps - nearest).abs() < STEP_ROUNDING_TOLERANCE {
            nearest as usize
        } else {
            steps.ceil() as usize
        }
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(SynapseError::invalid_parameter("dt", self.dt.to_string(), "> 0.0"));
        }
        if !(self.duration >= self.dt && self.duration.is_finite()) {
            return Err(SynapseError::invalid_parameter(
                "duration",
                format!("{} (with dt={})", self.duration, self.dt),
                ">= dt",
            ));
        }
        if !(self.area > 0.0) {
            return Err(SynapseError::invalid_parameter("area", self.area.to_string(), "> 0.0"));
        }
        if self.record_every == 0 {
            return Err(SynapseError::invalid_parameter("record_every", "0", "> 0"));
        }
        Ok(())
    }
}

/// Presynaptic spike times delivered over one connection
#[derive(Debug, Clone)]
pub struct SpikeTrain {
    /// Connection the spikes arrive on
    pub connection: ConnectionId,
    /// Connection weight (µS)
    pub weight: f64,
    /// Arrival times (ms)
    pub times: Vec<f64>,
}

impl SpikeTrain {
    /// Create a spike train
    pub fn new(connection: ConnectionId, weight: f64, times: Vec<f64>) -> Self {
        Self {
            connection,
            weight,
            times,
        }
    }

    /// Regular train of `count` spikes at `rate_hz`, starting at `start` ms
    pub fn regular(
        connection: ConnectionId,
        weight: f64,
        start: f64,
        rate_hz: f64,
        count: usize,
    ) -> Self {
        let isi = 1000.0 / rate_hz;
        let times = (0..count).map(|k| start + k as f64 * isi).collect();
        Self::new(connection, weight, times)
    }
}

/// Recorded accumulator sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConductanceSample {
    /// Sample time (ms)
    pub time: f64,
    /// Fast accumulator (µS)
    pub a: f64,
    /// Slow accumulator (µS)
    pub b: f64,
    /// Conductance (µS)
    pub g: f64,
    /// Current at the clamped voltage (nA)
    pub i: f64,
    /// Current density on the node (mA/cm²)
    pub i_node: f64,
}

/// Performance metrics collected during simulation steps
#[derive(Debug, Clone)]
pub struct PerfReport {
    /// Average step time in nanoseconds
    pub avg_step_ns: u64,
    /// Max step time in nanoseconds
    pub max_step_ns: u64,
    /// Steps sampled
    pub steps: usize,
}

/// Simulation results
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Recorded samples
    pub samples: Vec<ConductanceSample>,
    /// Simulated duration (ms)
    pub duration: f64,
    /// Number of steps executed
    pub steps_executed: usize,
    /// Number of events delivered to the synapse
    pub events_delivered: usize,
    /// Optional performance report
    pub perf: Option<PerfReport>,
}

impl SimulationResult {
    /// Create a new empty result
    pub fn new(duration: f64) -> Self {
        Self {
            samples: Vec::new(),
            duration,
            steps_executed: 0,
            events_delivered: 0,
            perf: None,
        }
    }

    /// Sample with the largest conductance
    pub fn peak_conductance(&self) -> Option<ConductanceSample> {
        self.samples
            .iter()
            .copied()
            .max_by(|l, r| l.g.total_cmp(&r.g))
    }

    /// Samples recorded in `[start, end)` ms
    pub fn samples_between(&self, start: f64, end: f64) -> Vec<&ConductanceSample> {
        self.samples
            .iter()
            .filter(|s| s.time >= start && s.time < end)
            .collect()
    }

    /// Export the trace as `(time, g)` pairs
    pub fn conductance_trace(&self) -> Vec<(f64, f64)> {
        self.samples.iter().map(|s| (s.time, s.g)).collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct ScheduledEvent {
    time: f64,
    connection: ConnectionId,
    weight: f64,
}

/// Fixed-step engine driving one synapse
#[derive(Debug)]
pub struct SimulationEngine {
    synapse: TmgSynapse,
    params: SimulationParams,
    trains: Vec<SpikeTrain>,
    results: SimulationResult,
    perf_samples: Vec<u64>,
}

impl SimulationEngine {
    /// Create a new simulation engine
    pub fn new(synapse: TmgSynapse, params: SimulationParams) -> Result<Self> {
        params.validate()?;
        let results = SimulationResult::new(params.duration);
        Ok(Self {
            synapse,
            params,
            trains: Vec::new(),
            results,
            perf_samples: Vec::new(),
        })
    }

    /// Add an input spike train
    ///
    /// Every spike must be finite and no earlier than the synapse's start time.
    pub fn add_train(&mut self, train: SpikeTrain) -> Result<()> {
        check_train(&train, self.synapse.start_time())?;
        self.trains.push(train);
        Ok(())
    }

    /// Run the complete simulation
    pub fn run(&mut self) -> Result<SimulationResult> {
        log::info!(
            "Starting simulation: {}ms with {}ms timestep, {} trains",
            self.params.duration,
            self.params.dt,
            self.trains.len()
        );

        let t0 = self.synapse.start_time();
        self.synapse.initialize(t0)?;
        self.results = SimulationResult::new(self.params.duration);
        self.perf_samples.clear();

        let events = self.schedule(t0)?;
        let num_steps = self.params.num_steps();
        let dt = self.params.dt;
        let mut now = t0;
        let mut next_event = 0;

        self.record(now);

        for step in 0..num_steps {
            let step_start = Instant::now();
            let step_end = t0 + (step + 1) as f64 * dt;

            while let Some(event) = events.get(next_event).filter(|e| e.time < step_end) {
                self.synapse.advance_decay(event.time - now);
                now = event.time;
                self.synapse.on_event(event.connection, event.time, event.weight)?;
                self.results.events_delivered += 1;
                next_event += 1;
            }

            self.synapse.advance_decay(step_end - now);
            now = step_end;

            if (step + 1) % self.params.record_every == 0 {
                self.record(now);
            }

            if self.params.perf_enabled {
                self.perf_samples.push(step_start.elapsed().as_nanos() as u64);
            }

            if step % (num_steps / 10).max(1) == 0 {
                let progress = (step as f64 / num_steps as f64) * 100.0;
                log::debug!("Simulation progress: {:.1}%", progress);
            }
        }

        self.results.steps_executed = num_steps;

        log::info!(
            "Simulation completed: {} events in {} steps",
            self.results.events_delivered,
            self.results.steps_executed
        );

        if self.params.perf_enabled && !self.perf_samples.is_empty() {
            let steps = self.perf_samples.len();
            let sum: u128 = self.perf_samples.iter().map(|v| *v as u128).sum();
            let avg = (sum / steps as u128) as u64;
            let max = self.perf_samples.iter().copied().max().unwrap_or(0);
            self.results.perf = Some(PerfReport {
                avg_step_ns: avg,
                max_step_ns: max,
                steps,
            });
        }

        Ok(self.results.clone())
    }

    /// Merge all trains into one time-ordered event list within `[t0, t0 + duration)`
    fn schedule(&self, t0: f64) -> Result<Vec<ScheduledEvent>> {
        for train in &self.trains {
            check_train(train, t0)?;
        }

        let end = t0 + self.params.duration;
        let mut events: Vec<ScheduledEvent> = self
            .trains
            .iter()
            .flat_map(|train| {
                train.times.iter().map(move |&time| ScheduledEvent {
                    time,
                    connection: train.connection,
                    weight: train.weight,
                })
            })
            .filter(|e| e.time < end)
            .collect();
        events.sort_by(|l, r| l.time.total_cmp(&r.time));
        Ok(events)
    }

    fn record(&mut self, time: f64) {
        let sample = self.synapse.current_and_derivative(self.params.v_clamp);
        let node = sample.to_node(self.params.area);
        let state = self.synapse.conductance_state();
        self.results.samples.push(ConductanceSample {
            time,
            a: state.a,
            b: state.b,
            g: state.conductance(),
            i: sample.i,
            i_node: node.rhs,
        });
    }

    /// Get reference to the synapse
    pub fn synapse(&self) -> &TmgSynapse {
        &self.synapse
    }

    /// Get mutable reference to the synapse
    pub fn synapse_mut(&mut self) -> &mut TmgSynapse {
        &mut self.synapse
    }

    /// Get simulation parameters
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Get current results
    pub fn results(&self) -> &SimulationResult {
        &self.results
    }
}

fn check_train(train: &SpikeTrain, t0: f64) -> Result<()> {
    match train.times.iter().find(|t| !(t.is_finite() && **t >= t0)) {
        Some(bad) => Err(SynapseError::invalid_simulation(format!(
            "spike time {} on {} is not a finite time at or after the start time {}",
            bad, train.connection, t0
        ))),
        None => Ok(()),
    }
}

/// Run a fixed-step simulation of `synapse` driven by `trains`
pub fn run_fixed_step(
    synapse: TmgSynapse,
    params: SimulationParams,
    trains: Vec<SpikeTrain>,
) -> Result<SimulationResult> {
    let mut engine = SimulationEngine::new(synapse, params)?;
    for train in trains {
        engine.add_train(train)?;
    }
    engine.run()
}
