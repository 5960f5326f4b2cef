//! ad5932-linux - Linux backend for the AD5932 driver
//!
//! Drives the part from a Linux host: command words go out through a
//! spidev device and FSYNC, CTRL, INTERRUPT and STANDBY are GPIO lines
//! requested through the character device interface (gpiocdev).
//!
//! # Example
//!
//! ```no_run
//! use ad5932_core::params::SweepParams;
//! use ad5932_core::sequence;
//! use ad5932_linux::{LinuxGpioConfig, LinuxSpiConfig};
//!
//! let spi = LinuxSpiConfig::new("/dev/spidev0.0").with_speed(1_000_000);
//! let gpio = LinuxGpioConfig::new("/dev/gpiochip0", 8, 23, 24).with_standby(25);
//! let mut dev = ad5932_linux::open(&spi, &gpio, 50_000_000)?;
//!
//! sequence::configure_sweep(&mut dev, &SweepParams::new(1_000, 500).with_increments(100))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Wiring
//!
//! | AD5932 Pin | Host             |
//! |------------|------------------|
//! | SCLK       | SPI SCLK         |
//! | SDATA      | SPI MOSI         |
//! | FSYNC      | GPIO (`fsync=`)  |
//! | CTRL       | GPIO (`ctrl=`)   |
//! | INTERRUPT  | GPIO (`int=`)    |
//! | STANDBY    | GPIO (`standby=`) or GND |
//!
//! # System Requirements
//!
//! - Linux kernel with spidev support enabled (`CONFIG_SPI_SPIDEV`)
//! - GPIO character device support (kernel 5.5+ for the v2 API)
//! - Read/write access to `/dev/spidevX.Y` and `/dev/gpiochipN`

pub mod error;
pub mod gpio;
pub mod spi;

use ad5932_core::Ad5932;

// Re-exports
pub use error::{LinuxError, Result};
pub use gpio::{LinuxGpioConfig, LinuxGpioPins};
pub use spi::{mode, LinuxSpiBus, LinuxSpiConfig};

/// A driver wired to the Linux backend
pub type LinuxAd5932 = Ad5932<LinuxSpiBus, LinuxGpioPins>;

/// Everything needed to open a Linux-attached AD5932
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxConfig {
    /// spidev settings
    pub spi: LinuxSpiConfig,
    /// Control line settings
    pub gpio: LinuxGpioConfig,
    /// MCLK frequency in Hz
    pub clock_hz: u32,
}

/// Open the bus and lines, then initialize the driver
pub fn open(spi: &LinuxSpiConfig, gpio: &LinuxGpioConfig, clock_hz: u32) -> Result<LinuxAd5932> {
    // Reject the clock before claiming any hardware
    let config = ad5932_core::DeviceConfig::new(clock_hz)?;
    let pins = LinuxGpioPins::open(gpio)?;
    let bus = LinuxSpiBus::open(spi)?;
    Ok(Ad5932::with_config(bus, pins, config))
}

/// Open a device from (key, value) option pairs
///
/// See [`parse_options`] for the supported keys.
pub fn open_from_options(options: &[(&str, &str)]) -> Result<LinuxAd5932> {
    let config = parse_options(options)?;
    open(&config.spi, &config.gpio, config.clock_hz)
}

fn parse_value<T: core::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| LinuxError::InvalidParameter(format!("Invalid {} value: {}", key, value)))
}

/// Parse backend options from a list of key-value pairs
///
/// # Supported Options
///
/// - `dev=/dev/spidevX.Y` - spidev device path (required)
/// - `spispeed=N` - SPI speed in kHz (optional, default 2000)
/// - `mode=N` - SPI mode 0-3 (optional, default 2)
/// - `gpiochip=N` or `gpiochip=/dev/gpiochipN` - GPIO chip (required)
/// - `fsync=N`, `ctrl=N`, `int=N` - line offsets (required)
/// - `standby=N` - line offset (optional)
/// - `mclk=N` - reference clock in Hz (required)
pub fn parse_options(options: &[(&str, &str)]) -> Result<LinuxConfig> {
    let mut spi = LinuxSpiConfig::default();
    let mut chip = None;
    let mut fsync = None;
    let mut ctrl = None;
    let mut interrupt = None;
    let mut standby = None;
    let mut clock_hz = None;

    for (key, value) in options {
        match *key {
            "dev" => spi.device = value.to_string(),
            "spispeed" => {
                let speed_khz: u32 = parse_value(key, value)?;
                spi.speed_hz = speed_khz.checked_mul(1000).ok_or_else(|| {
                    LinuxError::InvalidParameter(format!("spispeed too large: {}", value))
                })?;
            }
            "mode" => {
                let mode: u8 = parse_value(key, value)?;
                if mode > mode::MODE_3 {
                    return Err(LinuxError::InvalidParameter(format!(
                        "Invalid SPI mode: {} (must be 0-3)",
                        mode
                    )));
                }
                spi.mode = mode;
            }
            "gpiochip" => {
                chip = Some(if value.starts_with('/') {
                    value.to_string()
                } else {
                    let n: u32 = parse_value(key, value)?;
                    format!("/dev/gpiochip{}", n)
                });
            }
            "fsync" => fsync = Some(parse_value(key, value)?),
            "ctrl" => ctrl = Some(parse_value(key, value)?),
            "int" => interrupt = Some(parse_value(key, value)?),
            "standby" => standby = Some(parse_value(key, value)?),
            "mclk" => clock_hz = Some(parse_value(key, value)?),
            _ => {
                log::warn!("ad5932_linux: Unknown option: {}={}", key, value);
            }
        }
    }

    if spi.device.is_empty() {
        return Err(LinuxError::MissingParameter("dev"));
    }

    let mut gpio = LinuxGpioConfig::new(
        chip.ok_or(LinuxError::MissingParameter("gpiochip"))?,
        fsync.ok_or(LinuxError::MissingParameter("fsync"))?,
        ctrl.ok_or(LinuxError::MissingParameter("ctrl"))?,
        interrupt.ok_or(LinuxError::MissingParameter("int"))?,
    );
    gpio.standby = standby;

    let clock_hz = clock_hz.ok_or(LinuxError::MissingParameter("mclk"))?;

    Ok(LinuxConfig {
        spi,
        gpio,
        clock_hz,
    })
}
