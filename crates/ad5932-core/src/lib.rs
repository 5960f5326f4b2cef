//! ad5932-core - Core driver for the AD5932 frequency sweep generator
//!
//! This crate turns high level sweep parameters into the AD5932's 16-bit
//! command words and sequences the FSYNC/CTRL pin protocol needed to
//! program and start the part. It is designed to be `no_std` compatible
//! for use on microcontrollers.
//!
//! The crate is split along the same lines as the hardware interaction:
//!
//! - [`encoder`] - pure parameter to register translation
//! - [`sequence`] - ordered multi-word programming operations
//! - [`driver`] - frame-wrapped transfers and the trigger pulse
//! - [`bus`] - the collaborator traits a platform has to implement
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable heap allocation
//! - `is_sync` - Compile the bus-facing operations as blocking functions
//!   instead of `async fn`
//!
//! # Example
//!
//! ```ignore
//! use ad5932_core::{driver::Ad5932, sequence, params::SweepParams};
//!
//! fn start_sweep<B: SerialBus, P: ControlPins>(bus: B, pins: P) -> ad5932_core::Result<()> {
//!     let mut dev = Ad5932::initialize(bus, pins, 25_000_000)?;
//!     let params = SweepParams::new(10_000, 100)
//!         .with_increments(500)
//!         .with_interval(100);
//!     sequence::configure_sweep(&mut dev, &params)
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
// Allow async fn in traits - we use maybe-async for dual sync/async support
#![allow(async_fn_in_trait)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bus;
pub mod config;
pub mod driver;
pub mod encoder;
pub mod error;
pub mod params;
pub mod register;
pub mod sequence;

pub use config::DeviceConfig;
pub use driver::Ad5932;
pub use error::{Error, Result};
