//! Protocol driver
//!
//! `Ad5932` owns the serial bus, the control pins and the device
//! configuration. It knows how to frame a single command word with FSYNC
//! and how to pulse CTRL and INTERRUPT; the ordering of whole programming
//! sequences lives in [`crate::sequence`].
//!
//! Uses `maybe_async` to support both sync and async modes:
//! - With `is_sync` feature: blocking/synchronous
//! - Without `is_sync` feature: async (the bus transfer and the pulse
//!   delay become suspension points)

use crate::bus::{BusStatus, ControlPins, SerialBus};
use crate::config::DeviceConfig;
use crate::error::{Error, Result};
use crate::register::CommandWord;
use maybe_async::maybe_async;

/// Minimum time CTRL is held high so the part latches the trigger
pub const TRIGGER_PULSE_US: u32 = 100;

/// Time INTERRUPT is held high for a reset
pub const RESET_PULSE_US: u32 = 100;

/// Driver for one AD5932
///
/// The driver assumes exclusive ownership of the bus for the duration of
/// every sequence. Interleaving foreign transfers between the words of a
/// sequence breaks the part's register write ordering.
pub struct Ad5932<B, P> {
    bus: B,
    pins: P,
    config: DeviceConfig,
    last_command: Option<CommandWord>,
}

impl<B: SerialBus, P: ControlPins> Ad5932<B, P> {
    /// Bring the control lines into their idle state and store the clock
    ///
    /// CTRL and INTERRUPT are driven low, FSYNC high (idle) and STANDBY
    /// low (powered up). Returns `Error::InvalidClock` without touching
    /// any pin if `clock_hz` is zero.
    pub fn initialize(bus: B, pins: P, clock_hz: u32) -> Result<Self> {
        let config = DeviceConfig::new(clock_hz)?;
        Ok(Self::with_config(bus, pins, config))
    }

    /// Same as [`initialize`](Self::initialize) with an existing configuration
    pub fn with_config(bus: B, mut pins: P, config: DeviceConfig) -> Self {
        pins.set_control(false);
        pins.set_interrupt(false);
        pins.set_frame_select(true);
        pins.set_standby(false);

        log::debug!("ad5932: Initialized with MCLK {} Hz", config.clock_hz());

        Self {
            bus,
            pins,
            config,
            last_command: None,
        }
    }

    /// Transmit one command word inside an FSYNC frame
    ///
    /// If the bus reports busy, nothing is sent and FSYNC is left alone.
    /// Otherwise FSYNC is pulled low for the transfer and released again
    /// whether or not the transfer succeeded; transfer errors are returned
    /// unmodified.
    #[maybe_async]
    pub async fn write_word(&mut self, word: CommandWord) -> Result<()> {
        if self.bus.status() == BusStatus::Busy {
            log::warn!("ad5932: Bus busy, {} not sent", word);
            return Err(Error::BusBusy);
        }

        self.last_command = Some(word);
        log::debug!("ad5932: Write {} ({:?})", word, word.register());

        self.pins.set_frame_select(false);
        let result = self.bus.transfer(word.raw()).await;
        self.pins.set_frame_select(true);

        if let Err(e) = result {
            log::debug!("ad5932: Transfer of {} failed: {}", word, e);
        }
        result
    }

    /// Transmit several words in order, stopping at the first failure
    #[maybe_async]
    pub async fn write_words(&mut self, words: &[CommandWord]) -> Result<()> {
        for &word in words {
            self.write_word(word).await?;
        }
        Ok(())
    }

    /// Pulse CTRL to start the programmed output
    ///
    /// In external trigger mode the same pulse advances the sweep by one
    /// increment.
    #[maybe_async]
    pub async fn trigger(&mut self) {
        log::debug!("ad5932: Trigger");
        self.pins.set_control(true);
        self.bus.delay_us(TRIGGER_PULSE_US).await;
        self.pins.set_control(false);
    }

    /// Pulse INTERRUPT to abort a running sweep
    ///
    /// The part resets its state machine and parks the DAC at midscale.
    /// Register contents are kept, so a following [`trigger`](Self::trigger)
    /// restarts the same sweep.
    #[maybe_async]
    pub async fn reset(&mut self) {
        log::debug!("ad5932: Reset");
        self.pins.set_interrupt(true);
        self.bus.delay_us(RESET_PULSE_US).await;
        self.pins.set_interrupt(false);
    }

    /// Enter (`true`) or leave (`false`) standby
    pub fn set_standby(&mut self, standby: bool) {
        log::debug!("ad5932: Standby {}", if standby { "on" } else { "off" });
        self.pins.set_standby(standby);
    }

    /// Drive CTRL low ahead of programming
    pub(crate) fn release_control(&mut self) {
        self.pins.set_control(false);
    }
}

impl<B, P> Ad5932<B, P> {
    /// Get the device configuration
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// The last command word handed to the bus, if any
    pub fn last_command(&self) -> Option<CommandWord> {
        self.last_command
    }

    /// Get a reference to the underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Get a mutable reference to the underlying bus
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Get a reference to the control pins
    pub fn pins(&self) -> &P {
        &self.pins
    }

    /// Get a mutable reference to the control pins
    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }

    /// Consume the driver and return the bus and pins
    pub fn release(self) -> (B, P) {
        (self.bus, self.pins)
    }
}
