//! Error types for ad5932-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

use crate::sequence::Step;

/// A caller supplied value that failed range validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    /// Start frequency (1..=2^31-1 Hz, below the clock)
    StartFrequency,
    /// Delta frequency (0..=2^31-1 Hz, below the clock)
    DeltaFrequency,
    /// Number of increments (2..=4095)
    IncrementCount,
    /// Increment interval (2..=2047)
    IncrementInterval,
}

/// The reason a single programming step did not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// A value for this step was out of range
    ParameterOutOfRange(Parameter),
    /// The bus was still busy with a previous transfer
    BusBusy,
    /// The bus transfer primitive reported a fault
    BusError(i32),
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A caller supplied value violates its documented range
    ParameterOutOfRange(Parameter),
    /// A transfer was attempted while a prior transfer is still in flight
    ///
    /// Nothing was sent and no pin was touched, the caller may retry.
    BusBusy,
    /// The transport reported a fault, the code is passed through unmodified
    BusError(i32),
    /// A multi-step sequence aborted at `step`
    ///
    /// Registers written by earlier steps remain programmed on the device.
    StepFailed {
        /// The step that failed
        step: Step,
        /// Why it failed
        cause: Fault,
    },
    /// The reference clock frequency must be nonzero
    InvalidClock,
}

impl Error {
    /// Tag this error with the sequence step it occurred in
    ///
    /// Errors that already carry a step are returned unchanged.
    pub fn at_step(self, step: Step) -> Self {
        match self.fault() {
            Some(cause) if !matches!(self, Self::StepFailed { .. }) => {
                Self::StepFailed { step, cause }
            }
            _ => self,
        }
    }

    /// The single-step fault behind this error, if any
    pub fn fault(&self) -> Option<Fault> {
        match *self {
            Self::ParameterOutOfRange(param) => Some(Fault::ParameterOutOfRange(param)),
            Self::BusBusy => Some(Fault::BusBusy),
            Self::BusError(code) => Some(Fault::BusError(code)),
            Self::StepFailed { cause, .. } => Some(cause),
            Self::InvalidClock => None,
        }
    }

    /// Returns true if retrying the same operation later may succeed
    pub fn is_busy(&self) -> bool {
        matches!(self.fault(), Some(Fault::BusBusy))
    }
}

impl From<Fault> for Error {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::ParameterOutOfRange(param) => Self::ParameterOutOfRange(param),
            Fault::BusBusy => Self::BusBusy,
            Fault::BusError(code) => Self::BusError(code),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartFrequency => write!(f, "start frequency"),
            Self::DeltaFrequency => write!(f, "delta frequency"),
            Self::IncrementCount => write!(f, "increment count"),
            Self::IncrementInterval => write!(f, "increment interval"),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParameterOutOfRange(param) => write!(f, "{} out of range", param),
            Self::BusBusy => write!(f, "bus busy"),
            Self::BusError(code) => write!(f, "bus error {}", code),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParameterOutOfRange(param) => write!(f, "{} out of range", param),
            Self::BusBusy => write!(f, "bus busy"),
            Self::BusError(code) => write!(f, "bus error {}", code),
            Self::StepFailed { step, cause } => {
                write!(f, "step {} ({}) failed: {}", step.index(), step, cause)
            }
            Self::InvalidClock => write!(f, "reference clock frequency must be nonzero"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_step_wraps_bus_faults() {
        let err = Error::BusError(-3).at_step(Step::DeltaFrequency);
        assert_eq!(
            err,
            Error::StepFailed {
                step: Step::DeltaFrequency,
                cause: Fault::BusError(-3),
            }
        );
        // Already tagged errors keep their original step
        assert_eq!(err.at_step(Step::IncrementCount), err);
    }

    #[test]
    fn test_busy_is_retryable() {
        assert!(Error::BusBusy.is_busy());
        assert!(Error::BusBusy.at_step(Step::Control).is_busy());
        assert!(!Error::BusError(1).is_busy());
        assert!(!Error::InvalidClock.is_busy());
    }

    #[test]
    fn test_invalid_clock_has_no_fault() {
        assert_eq!(Error::InvalidClock.fault(), None);
        assert_eq!(Error::InvalidClock.at_step(Step::Control), Error::InvalidClock);
    }
}
