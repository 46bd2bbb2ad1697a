//! Per-connection plasticity state

use core::fmt;

/// Identifier of an upstream connection delivering events to a synapse
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionId(pub u64);

impl ConnectionId {
    /// Create a new connection ID
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// Plasticity variables carried by one connection between its events.
///
/// The recovered fraction is not stored; it is always `1 - y - z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamState {
    /// Active fraction of resources
    pub y: f64,
    /// Inactive fraction of resources
    pub z: f64,
    /// Facilitation variable
    pub u: f64,
    /// Time of the last processed event (ms)
    pub tsyn: f64,
}

impl StreamState {
    /// Fully recovered stream with initial facilitation `u0`
    pub fn new(u0: f64, t0: f64) -> Self {
        Self {
            y: 0.0,
            z: 0.0,
            u: u0,
            tsyn: t0,
        }
    }

    /// Recovered fraction `1 - y - z`
    pub fn recovered(&self) -> f64 {
        1.0 - self.y - self.z
    }

    /// Return to the fully recovered state
    pub fn reset(&mut self, u0: f64, t0: f64) {
        *self = Self::new(u0, t0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id() {
        let id = ConnectionId::new(12);
        assert_eq!(id.raw(), 12);
        assert_eq!(format!("{}", id), "C12");
        assert!(ConnectionId::new(1) < ConnectionId::new(2));
    }

    #[test]
    fn test_fresh_stream_is_recovered() {
        let stream = StreamState::new(0.25, 3.0);
        assert_eq!(stream.recovered(), 1.0);
        assert_eq!(stream.u, 0.25);
        assert_eq!(stream.tsyn, 3.0);
    }

    #[test]
    fn test_reset() {
        let mut stream = StreamState {
            y: 0.2,
            z: 0.3,
            u: 0.9,
            tsyn: 50.0,
        };
        stream.reset(0.0, 0.0);
        assert_eq!(stream, StreamState::new(0.0, 0.0));
    }
}
