//! Error types for the synapse core

use crate::ConnectionId;
use thiserror::Error;

/// Result type for synapse operations
pub type Result<T> = std::result::Result<T, SynapseError>;

/// Errors that can occur while configuring or driving a synapse
#[derive(Error, Debug)]
pub enum SynapseError {
    /// Invalid parameter value
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Parameter combination that makes a closed-form update singular
    #[error("Degenerate parameters: {reason}")]
    DegenerateParameters {
        /// Reason the combination is singular
        reason: String,
    },

    /// Event delivered earlier than the previous event on the same connection
    #[error(
        "Ordering violation on connection {connection}: event at {event_time}ms \
         precedes last event at {last_event_time}ms"
    )]
    OrderingViolation {
        /// Offending connection
        connection: ConnectionId,
        /// Arrival time of the rejected event (ms)
        event_time: f64,
        /// Last accepted event time on that connection (ms)
        last_event_time: f64,
    },

    /// Instance refuses events after an ordering violation
    #[error("Synapse halted after an ordering violation; event on connection {connection} refused")]
    InstanceHalted {
        /// Connection whose event was refused
        connection: ConnectionId,
    },

    /// Invalid driver setup
    #[error("Invalid simulation setup: {reason}")]
    InvalidSimulation {
        /// Reason for the invalid setup
        reason: String,
    },

    /// Configuration file could not be parsed or written
    #[error("Configuration error: {reason}")]
    Config {
        /// Reason for the configuration failure
        reason: String,
    },

    /// I/O error while reading or writing configuration
    #[error("I/O error: {source}")]
    Io {
        #[from]
        /// Source I/O error
        source: std::io::Error,
    },
}

impl SynapseError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create a degenerate parameters error
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateParameters {
            reason: reason.into(),
        }
    }

    /// Create an invalid simulation error
    pub fn invalid_simulation(reason: impl Into<String>) -> Self {
        Self::InvalidSimulation {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Whether this error halts further event processing on the instance
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::OrderingViolation { .. } | Self::InstanceHalted { .. }
        )
    }
}
