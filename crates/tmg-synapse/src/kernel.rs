//! Bi-exponential kernel normalization
//!
//! The kernel `exp(-t/tau_2) - exp(-t/tau_1)` peaks at
//! `tp = tau_1*tau_2/(tau_2 - tau_1) * ln(tau_2/tau_1)`. The normalization
//! factor rescales it so a unit impulse produces unit peak conductance.

use crate::error::*;

/// Largest allowed `tau_1 / tau_2` ratio
pub const MAX_TAU_RATIO: f64 = 0.9999;

/// Smallest allowed `tau_1 / tau_2` ratio
pub const MIN_TAU_RATIO: f64 = 1e-9;

/// Clamp `tau_1` so that `tau_1 / tau_2` lies in `[MIN_TAU_RATIO, MAX_TAU_RATIO]`
pub fn clamp_tau_1(tau_1: f64, tau_2: f64) -> f64 {
    let ratio = tau_1 / tau_2;
    if ratio > MAX_TAU_RATIO {
        MAX_TAU_RATIO * tau_2
    } else if ratio < MIN_TAU_RATIO {
        tau_2 * MIN_TAU_RATIO
    } else {
        tau_1
    }
}

/// Time of the kernel peak (ms)
pub fn time_to_peak(tau_1: f64, tau_2: f64) -> f64 {
    (tau_1 * tau_2) / (tau_2 - tau_1) * (tau_2 / tau_1).ln()
}

/// Peak-normalization factor for the kernel
pub fn peak_factor(tau_1: f64, tau_2: f64) -> f64 {
    let tp = time_to_peak(tau_1, tau_2);
    1.0 / (-(-tp / tau_1).exp() + (-tp / tau_2).exp())
}

/// Normalized kernel derived once per initialization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel {
    tau_1: f64,
    tau_2: f64,
    tp: f64,
    factor: f64,
}

impl Kernel {
    /// Clamp the ratio and derive the peak factor
    pub fn new(tau_1: f64, tau_2: f64) -> Result<Self> {
        if !(tau_1 > 0.0 && tau_2 > 0.0) {
            return Err(SynapseError::invalid_parameter(
                "tau_1/tau_2",
                format!("{}/{}", tau_1, tau_2),
                "both > 0",
            ));
        }

        let clamped = clamp_tau_1(tau_1, tau_2);
        if clamped != tau_1 {
            log::warn!(
                "tau_1 clamped from {} to {} (tau_2 = {})",
                tau_1,
                clamped,
                tau_2
            );
        }

        let tp = time_to_peak(clamped, tau_2);
        let factor = peak_factor(clamped, tau_2);
        if !factor.is_finite() {
            return Err(SynapseError::degenerate(format!(
                "kernel factor is not finite for tau_1={} tau_2={}",
                clamped, tau_2
            )));
        }

        log::debug!("kernel initialized: tp={}ms factor={}", tp, factor);

        Ok(Self {
            tau_1: clamped,
            tau_2,
            tp,
            factor,
        })
    }

    /// Effective rise time constant after clamping (ms)
    pub fn tau_1(&self) -> f64 {
        self.tau_1
    }

    /// Decay time constant (ms)
    pub fn tau_2(&self) -> f64 {
        self.tau_2
    }

    /// Time from impulse to peak conductance (ms)
    pub fn time_to_peak(&self) -> f64 {
        self.tp
    }

    /// Normalization factor applied to every impulse
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Normalized kernel value `t` ms after a unit impulse
    pub fn shape(&self, t: f64) -> f64 {
        if t < 0.0 {
            return 0.0;
        }
        self.factor * ((-t / self.tau_2).exp() - (-t / self.tau_1).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_tau_1() {
        // Within range is untouched
        assert_eq!(clamp_tau_1(2.0, 20.0), 2.0);

        // Equal time constants hit the upper clamp
        assert_eq!(clamp_tau_1(20.0, 20.0), MAX_TAU_RATIO * 20.0);

        // Larger rise than decay also clamps
        assert_eq!(clamp_tau_1(40.0, 20.0), MAX_TAU_RATIO * 20.0);

        // Vanishing rise hits the lower clamp
        assert_eq!(clamp_tau_1(1e-12, 20.0), 20.0 * MIN_TAU_RATIO);
    }

    #[test]
    fn test_peak_is_unity() {
        let kernel = Kernel::new(2.0, 20.0).unwrap();
        let tp = kernel.time_to_peak();
        assert!((kernel.shape(tp) - 1.0).abs() < 1e-12);

        // Neighbouring points lie below the peak
        assert!(kernel.shape(tp - 0.01) < 1.0);
        assert!(kernel.shape(tp + 0.01) < 1.0);
    }

    #[test]
    fn test_default_time_to_peak() {
        let kernel = Kernel::new(2.0, 20.0).unwrap();
        let expected = 40.0 / 18.0 * 10.0f64.ln();
        assert!((kernel.time_to_peak() - expected).abs() < 1e-12);
        assert!(kernel.factor() > 1.0);
    }

    #[test]
    fn test_equal_time_constants_are_clamped() {
        let kernel = Kernel::new(5.0, 5.0).unwrap();
        assert!(kernel.tau_1() < kernel.tau_2());
        assert!(kernel.factor().is_finite());
        assert!((kernel.shape(kernel.time_to_peak()) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(Kernel::new(0.0, 20.0).is_err());
        assert!(Kernel::new(2.0, -1.0).is_err());
    }

    #[test]
    fn test_shape_before_impulse() {
        let kernel = Kernel::new(2.0, 20.0).unwrap();
        assert_eq!(kernel.shape(-1.0), 0.0);
        assert_eq!(kernel.shape(0.0), 0.0);
    }
}
