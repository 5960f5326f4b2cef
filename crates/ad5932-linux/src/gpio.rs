//! Control lines via the GPIO character device
//!
//! FSYNC, CTRL, INTERRUPT and STANDBY are requested together as outputs on
//! one gpiochip. Initial levels match the idle state the driver establishes
//! on initialization, so the part never sees a glitch while the lines are
//! being claimed.

use crate::error::{LinuxError, Result};

use ad5932_core::bus::ControlPins;

use gpiocdev::line::{Offset, Value};
use gpiocdev::request::{Config, Request};

/// Configuration for the control lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxGpioConfig {
    /// Device path (e.g., "/dev/gpiochip0")
    pub chip: String,
    /// FSYNC line offset
    pub fsync: Offset,
    /// CTRL line offset
    pub ctrl: Offset,
    /// INTERRUPT line offset
    pub interrupt: Offset,
    /// STANDBY line offset, if wired (otherwise tied low on the board)
    pub standby: Option<Offset>,
}

impl LinuxGpioConfig {
    /// Create a new configuration with the required lines
    pub fn new(chip: impl Into<String>, fsync: Offset, ctrl: Offset, interrupt: Offset) -> Self {
        Self {
            chip: chip.into(),
            fsync,
            ctrl,
            interrupt,
            standby: None,
        }
    }

    /// Set the STANDBY line
    pub fn with_standby(mut self, standby: Offset) -> Self {
        self.standby = Some(standby);
        self
    }
}

fn level(high: bool) -> Value {
    if high {
        Value::Active
    } else {
        Value::Inactive
    }
}

/// Control pins backed by a gpiocdev line request
pub struct LinuxGpioPins {
    request: Request,
    fsync: Offset,
    ctrl: Offset,
    interrupt: Offset,
    standby: Option<Offset>,
}

impl LinuxGpioPins {
    /// Request the control lines
    pub fn open(config: &LinuxGpioConfig) -> Result<Self> {
        if config.chip.is_empty() {
            return Err(LinuxError::MissingParameter("gpiochip"));
        }

        log::debug!("ad5932_linux: Requesting control lines on {}", config.chip);

        let mut req_config = Config::default();
        req_config.with_line(config.fsync).as_output(Value::Active);
        req_config.with_line(config.ctrl).as_output(Value::Inactive);
        req_config.with_line(config.interrupt).as_output(Value::Inactive);
        if let Some(standby) = config.standby {
            req_config.with_line(standby).as_output(Value::Inactive);
        }

        let request = Request::from_config(req_config)
            .on_chip(&config.chip)
            .with_consumer("ad5932")
            .request()
            .map_err(|e| LinuxError::LineRequestFailed {
                chip: config.chip.clone(),
                source: e,
            })?;

        log::info!(
            "ad5932_linux: Control lines on {} (fsync={}, ctrl={}, int={}, standby={:?})",
            config.chip,
            config.fsync,
            config.ctrl,
            config.interrupt,
            config.standby
        );

        Ok(Self {
            request,
            fsync: config.fsync,
            ctrl: config.ctrl,
            interrupt: config.interrupt,
            standby: config.standby,
        })
    }

    fn set_line(&mut self, name: &str, offset: Offset, high: bool) {
        log::trace!("ad5932_linux: {} -> {}", name, high);
        if let Err(e) = self.request.set_value(offset, level(high)) {
            log::error!("ad5932_linux: Failed to set {}: {}", name, e);
        }
    }
}

impl ControlPins for LinuxGpioPins {
    fn set_frame_select(&mut self, high: bool) {
        self.set_line("fsync", self.fsync, high);
    }

    fn set_control(&mut self, high: bool) {
        self.set_line("ctrl", self.ctrl, high);
    }

    fn set_interrupt(&mut self, high: bool) {
        self.set_line("int", self.interrupt, high);
    }

    fn set_standby(&mut self, high: bool) {
        match self.standby {
            Some(offset) => self.set_line("standby", offset, high),
            None if high => log::warn!("ad5932_linux: STANDBY line not configured"),
            None => {}
        }
    }
}
