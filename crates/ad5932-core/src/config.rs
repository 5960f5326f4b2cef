//! Device configuration - the reference clock the part runs from

use core::num::NonZeroU32;

use crate::error::{Error, Result};

/// Static configuration of one AD5932 instance
///
/// All frequency to register conversions depend on the MCLK frequency, so
/// the driver owns one of these for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    mclk: NonZeroU32,
}

impl DeviceConfig {
    /// Create a configuration for the given MCLK frequency in Hz
    ///
    /// Returns `Error::InvalidClock` if `clock_hz` is zero.
    pub fn new(clock_hz: u32) -> Result<Self> {
        NonZeroU32::new(clock_hz)
            .map(|mclk| Self { mclk })
            .ok_or(Error::InvalidClock)
    }

    /// The MCLK frequency in Hz
    pub fn clock_hz(&self) -> u32 {
        self.mclk.get()
    }

    /// Frequency resolution of the part in millihertz (MCLK / 2^24)
    pub fn resolution_mhz(&self) -> u64 {
        self.mclk.get() as u64 * 1000 / crate::register::ACCUMULATOR_RESOLUTION
    }
}
