//! Collaborator traits a platform implements to drive the part
//!
//! The driver only needs three things from its environment: a way to shift
//! out one 16-bit word, four digital outputs and a microsecond delay.
//!
//! These traits use `maybe_async` to support both sync and async modes.
//! - By default, traits are async (suitable for Embassy, tokio)
//! - With the `is_sync` feature, traits become synchronous

use crate::error::Result;
use maybe_async::maybe_async;

/// State of the serial bus as reported by a non-blocking poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusStatus {
    /// No transfer in flight
    #[default]
    Clear,
    /// A previous transfer has not completed yet
    Busy,
}

/// Serial bus trait (sync or async depending on `is_sync` feature)
///
/// This represents the synchronous serial port the part is attached to.
/// Frame select is **not** handled here, the driver toggles it through
/// [`ControlPins`] around every call to [`transfer`](SerialBus::transfer).
///
/// ## Example
///
/// ```ignore
/// #[maybe_async]
/// impl SerialBus for Ssp0 {
///     fn status(&self) -> BusStatus {
///         if self.regs.sr.read().bsy() { BusStatus::Busy } else { BusStatus::Clear }
///     }
///
///     async fn transfer(&mut self, word: u16) -> Result<()> {
///         self.write_u16(word).await.map_err(|e| Error::BusError(e.code()))
///     }
///
///     async fn delay_us(&mut self, us: u32) {
///         Timer::after_micros(us as u64).await
///     }
/// }
/// ```
#[maybe_async(AFIT)]
pub trait SerialBus {
    /// Poll whether a transfer is currently in flight
    fn status(&self) -> BusStatus;

    /// Shift out a single 16-bit word, MSB first
    ///
    /// Blocks until the transfer completes. Implementations report
    /// `Error::BusBusy` or `Error::BusError(code)` on failure; the driver
    /// passes the error on without interpreting it.
    async fn transfer(&mut self, word: u16) -> Result<()>;

    /// Delay for the specified number of microseconds
    async fn delay_us(&mut self, us: u32);
}

/// The four digital outputs wired to the part
///
/// Levels are electrical: `true` drives the line high. FSYNC is active
/// low, so the driver calls `set_frame_select(false)` to open a frame.
pub trait ControlPins {
    /// Drive the FSYNC line
    fn set_frame_select(&mut self, high: bool);

    /// Drive the CTRL line (starts a sweep or steps it in external mode)
    fn set_control(&mut self, high: bool);

    /// Drive the INTERRUPT line (aborts the sweep, resets to midscale)
    fn set_interrupt(&mut self, high: bool);

    /// Drive the STANDBY line (powers down when high)
    fn set_standby(&mut self, high: bool);
}

#[maybe_async(AFIT)]
impl<T: SerialBus + ?Sized> SerialBus for &mut T {
    fn status(&self) -> BusStatus {
        (**self).status()
    }

    async fn transfer(&mut self, word: u16) -> Result<()> {
        (**self).transfer(word).await
    }

    async fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us).await
    }
}

impl<T: ControlPins + ?Sized> ControlPins for &mut T {
    fn set_frame_select(&mut self, high: bool) {
        (**self).set_frame_select(high)
    }

    fn set_control(&mut self, high: bool) {
        (**self).set_control(high)
    }

    fn set_interrupt(&mut self, high: bool) {
        (**self).set_interrupt(high)
    }

    fn set_standby(&mut self, high: bool) {
        (**self).set_standby(high)
    }
}

// Blanket impl for boxed buses to allow trait objects (sync mode only)
// In async mode, traits with async fn are not object-safe
#[cfg(all(feature = "alloc", feature = "is_sync"))]
impl SerialBus for alloc::boxed::Box<dyn SerialBus + Send> {
    fn status(&self) -> BusStatus {
        (**self).status()
    }

    fn transfer(&mut self, word: u16) -> Result<()> {
        (**self).transfer(word)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

#[cfg(feature = "alloc")]
impl ControlPins for alloc::boxed::Box<dyn ControlPins + Send> {
    fn set_frame_select(&mut self, high: bool) {
        (**self).set_frame_select(high)
    }

    fn set_control(&mut self, high: bool) {
        (**self).set_control(high)
    }

    fn set_interrupt(&mut self, high: bool) {
        (**self).set_interrupt(high)
    }

    fn set_standby(&mut self, high: bool) {
        (**self).set_standby(high)
    }
}
