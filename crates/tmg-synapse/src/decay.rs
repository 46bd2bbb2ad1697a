//! Conductance accumulators and their exact decay

/// The two decaying accumulators behind the emitted conductance
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConductanceState {
    /// Fast accumulator, decays with `tau_1` (µS)
    pub a: f64,
    /// Slow accumulator, decays with `tau_2` (µS)
    pub b: f64,
}

impl ConductanceState {
    /// Create zeroed accumulators
    pub fn new() -> Self {
        Self::default()
    }

    /// Decay both accumulators over `dt` ms with no input.
    ///
    /// Exact solution of `dA/dt = -A/tau_1`, `dB/dt = -B/tau_2`, stable for
    /// any step size.
    pub fn advance(&mut self, dt: f64, tau_1: f64, tau_2: f64) {
        if dt <= 0.0 {
            return;
        }
        self.a *= (-dt / tau_1).exp();
        self.b *= (-dt / tau_2).exp();
    }

    /// Add the same impulse to both accumulators
    pub fn inject(&mut self, impulse: f64) {
        self.a += impulse;
        self.b += impulse;
    }

    /// Emitted conductance `B - A` (µS)
    pub fn conductance(&self) -> f64 {
        self.b - self.a
    }

    /// Zero both accumulators
    pub fn reset(&mut self) {
        self.a = 0.0;
        self.b = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_step_is_noop() {
        let mut state = ConductanceState { a: 0.3, b: 0.5 };
        state.advance(0.0, 2.0, 20.0);
        assert_eq!(state, ConductanceState { a: 0.3, b: 0.5 });
    }

    #[test]
    fn test_single_tau_decay() {
        let mut state = ConductanceState::new();
        state.inject(1.0);
        state.advance(2.0, 2.0, 20.0);

        assert!((state.a - (-1.0f64).exp()).abs() < 1e-15);
        assert!((state.b - (-0.1f64).exp()).abs() < 1e-15);
        assert!(state.conductance() > 0.0);
    }

    #[test]
    fn test_split_steps_match_single_step() {
        let mut split = ConductanceState { a: 0.7, b: 0.7 };
        let mut whole = split;

        split.advance(0.025, 2.0, 20.0);
        split.advance(3.1, 2.0, 20.0);
        whole.advance(3.125, 2.0, 20.0);

        assert!((split.a - whole.a).abs() < 1e-14);
        assert!((split.b - whole.b).abs() < 1e-14);
    }

    #[test]
    fn test_reset() {
        let mut state = ConductanceState { a: 1.0, b: 2.0 };
        state.reset();
        assert_eq!(state.conductance(), 0.0);
    }
}
