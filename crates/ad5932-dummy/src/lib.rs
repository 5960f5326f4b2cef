//! ad5932-dummy - In-memory AD5932 emulator for testing
//!
//! This crate provides a dummy AD5932 that decodes command words into a
//! register file and records every pin edge. It's useful for testing and
//! development without real hardware.
//!
//! `DummyAd5932` is a cheap handle around shared state, so the same chip
//! can be handed to the driver as both the bus and the pins:
//!
//! ```
//! use ad5932_core::{sequence, Ad5932};
//! use ad5932_dummy::DummyAd5932;
//!
//! let chip = DummyAd5932::new();
//! let mut dev = Ad5932::initialize(chip.clone(), chip.clone(), 16_000_000).unwrap();
//! sequence::self_test(&mut dev).unwrap();
//! assert_eq!(chip.trigger_count(), 1);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use ad5932_core::bus::{BusStatus, ControlPins, SerialBus};
use ad5932_core::encoder::accumulator_from_words;
use ad5932_core::error::{Error, Result};
use ad5932_core::params::{ControlSettings, IntervalBasis, SweepDirection};
use ad5932_core::register::{
    CommandWord, ControlBits, Register, ACCUMULATOR_RESOLUTION, DELTA_DECREMENT_BIT,
};

/// A digital line of the part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pin {
    /// FSYNC, active low frame select
    FrameSelect,
    /// CTRL, trigger input
    Control,
    /// INTERRUPT, abort input
    Interrupt,
    /// STANDBY, power down input
    Standby,
}

/// Something the emulator observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A pin was driven to a level
    Pin(Pin, bool),
    /// A word was shifted in
    Word(u16),
    /// The driver asked for a delay
    Delay(u32),
}

/// A deviation from the serial protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// A word arrived while FSYNC was high
    WordOutsideFrame(u16),
    /// A word used a selector the part does not define
    UnknownSelector(u16),
    /// A frequency write arrived before the control register was set up
    /// for 24-bit writes
    NotConfigured(u16),
}

/// Injected failure for one transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Injected {
    Busy,
    Error(i32),
}

/// Decoded register file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registers {
    /// Control register payload
    pub control: Option<u16>,
    /// Start frequency LOW payload
    pub start_low: Option<u16>,
    /// Start frequency HIGH payload
    pub start_high: Option<u16>,
    /// Delta frequency LOW payload
    pub delta_low: Option<u16>,
    /// Delta frequency HIGH payload, direction bit included
    pub delta_high: Option<u16>,
    /// Number of increments
    pub increments: Option<u16>,
    /// Increment interval and what it counts
    pub interval: Option<(IntervalBasis, u16)>,
}

#[derive(Debug, Default)]
struct Chip {
    registers: Registers,
    events: Vec<Event>,
    violations: Vec<Violation>,
    fsync: bool,
    ctrl: bool,
    interrupt: bool,
    standby: bool,
    running: bool,
    triggers: usize,
    resets: usize,
    transfers: usize,
    delay_us: u64,
    busy: bool,
    busy_polls: usize,
    injected: Vec<(usize, Injected)>,
}

impl Chip {
    fn latch(&mut self, raw: u16) {
        let word = CommandWord::from_raw(raw);
        let Some(register) = word.register() else {
            log::warn!("dummy: Unknown selector in 0x{:04X}", raw);
            self.violations.push(Violation::UnknownSelector(raw));
            return;
        };

        let payload = word.payload();
        let regs = &mut self.registers;
        match register {
            Register::Control => {
                regs.control = Some(payload);
                // A control write resets the state machine, like INTERRUPT
                self.running = false;
            }
            Register::IncrementCount => regs.increments = Some(payload),
            Register::IntervalWaveformCycles => {
                regs.interval = Some((IntervalBasis::WaveformCycles, payload))
            }
            Register::IntervalClockCycles => {
                regs.interval = Some((IntervalBasis::ClockCycles, payload))
            }
            Register::StartFrequencyLow
            | Register::StartFrequencyHigh
            | Register::DeltaFrequencyLow
            | Register::DeltaFrequencyHigh => {
                let b24 = regs
                    .control
                    .is_some_and(|c| ControlBits::from_bits_retain(c).contains(ControlBits::B24));
                if !b24 {
                    self.violations.push(Violation::NotConfigured(raw));
                }
                match register {
                    Register::StartFrequencyLow => regs.start_low = Some(payload),
                    Register::StartFrequencyHigh => regs.start_high = Some(payload),
                    Register::DeltaFrequencyLow => regs.delta_low = Some(payload),
                    _ => regs.delta_high = Some(payload),
                }
            }
        }
    }

    fn set_pin(&mut self, pin: Pin, high: bool) {
        log::trace!("dummy: {:?} -> {}", pin, high);
        self.events.push(Event::Pin(pin, high));

        let level = match pin {
            Pin::FrameSelect => &mut self.fsync,
            Pin::Control => &mut self.ctrl,
            Pin::Interrupt => &mut self.interrupt,
            Pin::Standby => &mut self.standby,
        };
        let rising = high && !*level;
        *level = high;

        if rising {
            match pin {
                Pin::Control => {
                    self.triggers += 1;
                    self.running = self.registers.control.is_some();
                }
                Pin::Interrupt => {
                    self.resets += 1;
                    self.running = false;
                }
                _ => {}
            }
        }
    }
}

/// Dummy AD5932
///
/// Emulates the register interface of the part in memory. Clones share
/// the same state.
#[derive(Debug, Clone)]
pub struct DummyAd5932 {
    chip: Rc<RefCell<Chip>>,
}

impl Default for DummyAd5932 {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyAd5932 {
    /// Create a powered-up chip with FSYNC idle high and empty registers
    pub fn new() -> Self {
        let chip = Chip {
            fsync: true,
            ..Default::default()
        };
        Self {
            chip: Rc::new(RefCell::new(chip)),
        }
    }

    // ------------------------------------------------------------------
    // Fault injection
    // ------------------------------------------------------------------

    /// Report the bus as busy on every poll until cleared
    pub fn set_busy(&self, busy: bool) {
        self.chip.borrow_mut().busy = busy;
    }

    /// Report the bus as busy for the next `polls` status polls
    pub fn busy_for_polls(&self, polls: usize) {
        self.chip.borrow_mut().busy_polls = polls;
    }

    /// Make transfer number `index` (0-based, counting every attempt) fail
    /// with `Error::BusError(code)`
    pub fn fail_transfer(&self, index: usize, code: i32) {
        self.chip
            .borrow_mut()
            .injected
            .push((index, Injected::Error(code)));
    }

    /// Make transfer number `index` report busy from inside the transfer
    pub fn busy_transfer(&self, index: usize) {
        self.chip.borrow_mut().injected.push((index, Injected::Busy));
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Everything observed so far, in order
    pub fn events(&self) -> Vec<Event> {
        self.chip.borrow().events.clone()
    }

    /// Words that reached the part, in order
    pub fn words(&self) -> Vec<u16> {
        self.chip
            .borrow()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Word(w) => Some(*w),
                _ => None,
            })
            .collect()
    }

    /// Protocol violations seen so far
    pub fn violations(&self) -> Vec<Violation> {
        self.chip.borrow().violations.clone()
    }

    /// Forget recorded events and violations, registers are kept
    pub fn clear_log(&self) {
        let mut chip = self.chip.borrow_mut();
        chip.events.clear();
        chip.violations.clear();
    }

    /// Snapshot of the register file
    pub fn registers(&self) -> Registers {
        self.chip.borrow().registers.clone()
    }

    /// Number of CTRL rising edges
    pub fn trigger_count(&self) -> usize {
        self.chip.borrow().triggers
    }

    /// Number of INTERRUPT rising edges
    pub fn reset_count(&self) -> usize {
        self.chip.borrow().resets
    }

    /// Number of transfer attempts, failed ones included
    pub fn transfer_count(&self) -> usize {
        self.chip.borrow().transfers
    }

    /// Total requested delay in microseconds
    pub fn total_delay_us(&self) -> u64 {
        self.chip.borrow().delay_us
    }

    /// Current level of a pin
    pub fn pin(&self, pin: Pin) -> bool {
        let chip = self.chip.borrow();
        match pin {
            Pin::FrameSelect => chip.fsync,
            Pin::Control => chip.ctrl,
            Pin::Interrupt => chip.interrupt,
            Pin::Standby => chip.standby,
        }
    }

    /// Whether output is running (triggered since the last control write
    /// or reset)
    pub fn is_running(&self) -> bool {
        self.chip.borrow().running
    }

    /// Decoded control register
    pub fn control(&self) -> Option<ControlSettings> {
        self.chip
            .borrow()
            .registers
            .control
            .map(|c| ControlSettings::from_bits(ControlBits::from_bits_retain(c)))
    }

    /// Start frequency accumulator value, once both halves are written
    pub fn start_accumulator(&self) -> Option<u32> {
        let regs = self.registers();
        let low = CommandWord::new(Register::StartFrequencyLow, regs.start_low?);
        let high = CommandWord::new(Register::StartFrequencyHigh, regs.start_high?);
        Some(accumulator_from_words(low, high))
    }

    /// Delta frequency accumulator value, once both halves are written
    pub fn delta_accumulator(&self) -> Option<u32> {
        let regs = self.registers();
        let low = CommandWord::new(Register::DeltaFrequencyLow, regs.delta_low?);
        let high = CommandWord::new(Register::DeltaFrequencyHigh, regs.delta_high?);
        Some(accumulator_from_words(low, high))
    }

    /// Sweep direction from the delta frequency HIGH word
    pub fn direction(&self) -> Option<SweepDirection> {
        let high = self.registers().delta_high?;
        Some(if high & DELTA_DECREMENT_BIT != 0 {
            SweepDirection::Decrementing
        } else {
            SweepDirection::Incrementing
        })
    }

    /// Programmed start frequency in Hz for the given MCLK (rounded down)
    pub fn start_frequency_hz(&self, clock_hz: u32) -> Option<u32> {
        self.start_accumulator()
            .map(|acc| accumulator_to_hz(acc, clock_hz))
    }

    /// Programmed delta frequency in Hz for the given MCLK (rounded down)
    pub fn delta_frequency_hz(&self, clock_hz: u32) -> Option<u32> {
        self.delta_accumulator()
            .map(|acc| accumulator_to_hz(acc, clock_hz))
    }
}

fn accumulator_to_hz(acc: u32, clock_hz: u32) -> u32 {
    (acc as u64 * clock_hz as u64 / ACCUMULATOR_RESOLUTION) as u32
}

impl SerialBus for DummyAd5932 {
    fn status(&self) -> BusStatus {
        let mut chip = self.chip.borrow_mut();
        if chip.busy {
            return BusStatus::Busy;
        }
        if chip.busy_polls > 0 {
            chip.busy_polls -= 1;
            return BusStatus::Busy;
        }
        BusStatus::Clear
    }

    fn transfer(&mut self, word: u16) -> Result<()> {
        let mut chip = self.chip.borrow_mut();
        let index = chip.transfers;
        chip.transfers += 1;

        if let Some(&(_, injected)) = chip.injected.iter().find(|(i, _)| *i == index) {
            log::trace!("dummy: Injected {:?} on transfer {}", injected, index);
            return Err(match injected {
                Injected::Busy => Error::BusBusy,
                Injected::Error(code) => Error::BusError(code),
            });
        }

        chip.events.push(Event::Word(word));
        if chip.fsync {
            chip.violations.push(Violation::WordOutsideFrame(word));
            return Ok(());
        }
        chip.latch(word);
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        let mut chip = self.chip.borrow_mut();
        chip.events.push(Event::Delay(us));
        chip.delay_us += us as u64;
    }
}

impl ControlPins for DummyAd5932 {
    fn set_frame_select(&mut self, high: bool) {
        self.chip.borrow_mut().set_pin(Pin::FrameSelect, high);
    }

    fn set_control(&mut self, high: bool) {
        self.chip.borrow_mut().set_pin(Pin::Control, high);
    }

    fn set_interrupt(&mut self, high: bool) {
        self.chip.borrow_mut().set_pin(Pin::Interrupt, high);
    }

    fn set_standby(&mut self, high: bool) {
        self.chip.borrow_mut().set_pin(Pin::Standby, high);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad5932_core::error::{Fault, Parameter};
    use ad5932_core::params::{SingleToneParams, SweepParams, TriggerMode};
    use ad5932_core::sequence::{self, Step};
    use ad5932_core::Ad5932;

    fn setup(clock_hz: u32) -> (Ad5932<DummyAd5932, DummyAd5932>, DummyAd5932) {
        let chip = DummyAd5932::new();
        let dev = Ad5932::initialize(chip.clone(), chip.clone(), clock_hz).unwrap();
        chip.clear_log();
        (dev, chip)
    }

    /// Every word must sit inside its own FSYNC frame
    fn assert_framed(chip: &DummyAd5932) {
        let events = chip.events();
        for (i, event) in events.iter().enumerate() {
            if let Event::Word(w) = event {
                assert!(i > 0 && i + 1 < events.len(), "0x{:04X} not framed", w);
                assert_eq!(events[i - 1], Event::Pin(Pin::FrameSelect, false));
                assert_eq!(events[i + 1], Event::Pin(Pin::FrameSelect, true));
            }
        }
        assert!(chip.violations().is_empty(), "{:?}", chip.violations());
    }

    #[test]
    fn test_initialize_idle_levels() {
        let chip = DummyAd5932::new();
        let _dev = Ad5932::initialize(chip.clone(), chip.clone(), 25_000_000).unwrap();
        assert!(chip.pin(Pin::FrameSelect));
        assert!(!chip.pin(Pin::Control));
        assert!(!chip.pin(Pin::Interrupt));
        assert!(!chip.pin(Pin::Standby));
        assert_eq!(chip.transfer_count(), 0);
        assert_eq!(chip.trigger_count(), 0);
    }

    #[test]
    fn test_single_frequency_1khz_at_50mhz() {
        let (mut dev, chip) = setup(50_000_000);
        let params = SingleToneParams::new(1000).with_msb_out(true);
        sequence::configure_single_frequency(&mut dev, &params).unwrap();

        assert_eq!(chip.words(), [0x0FDF, 0xC14F, 0xD000]);
        assert_eq!(chip.start_accumulator(), Some(335));
        assert_eq!(chip.start_frequency_hz(50_000_000), Some(998));
        assert_eq!(chip.trigger_count(), 1);
        assert_eq!(chip.total_delay_us(), 100);
        assert!(chip.is_running());
        assert!(!chip.pin(Pin::Control));
        assert_framed(&chip);

        let control = chip.control().unwrap();
        assert!(control.msb_out);
        assert_eq!(control.trigger, TriggerMode::Automatic);
    }

    #[test]
    fn test_self_test_at_16mhz() {
        let (mut dev, chip) = setup(16_000_000);
        sequence::self_test(&mut dev).unwrap();

        assert_eq!(
            chip.words(),
            [0x0FDF, 0xC418, 0xD000, 0x2418, 0x3000, 0x47D0, 0x1002]
        );
        assert_eq!(chip.trigger_count(), 1);
        let regs = chip.registers();
        assert_eq!(regs.increments, Some(2));
        assert_eq!(regs.interval, Some((IntervalBasis::WaveformCycles, 2000)));
        assert_eq!(chip.delta_accumulator(), Some(1048));
        assert_eq!(chip.direction(), Some(SweepDirection::Incrementing));
        assert_framed(&chip);
    }

    #[test]
    fn test_sweep_stops_at_failing_step() {
        let (mut dev, chip) = setup(25_000_000);
        // Transfers: control, start LOW, start HIGH, delta LOW
        chip.fail_transfer(3, -5);

        let result = sequence::configure_sweep(&mut dev, &SweepParams::default());
        assert_eq!(
            result,
            Err(Error::StepFailed {
                step: Step::DeltaFrequency,
                cause: Fault::BusError(-5),
            })
        );
        assert_eq!(Step::DeltaFrequency.index(), 2);

        // Earlier steps stay programmed, nothing after the failure is sent
        assert_eq!(chip.transfer_count(), 4);
        assert_eq!(chip.start_accumulator(), Some(671));
        assert_eq!(chip.delta_accumulator(), None);
        assert_eq!(chip.registers().increments, None);
        assert_eq!(chip.trigger_count(), 0);
        assert!(chip.pin(Pin::FrameSelect));
    }

    #[test]
    fn test_busy_bus_reports_busy_without_framing() {
        let (mut dev, chip) = setup(25_000_000);
        chip.set_busy(true);

        let err = sequence::configure_sweep(&mut dev, &SweepParams::default()).unwrap_err();
        assert_eq!(
            err,
            Error::StepFailed {
                step: Step::Control,
                cause: Fault::BusBusy,
            }
        );
        assert!(err.is_busy());
        assert_eq!(chip.transfer_count(), 0);
        assert!(!chip
            .events()
            .iter()
            .any(|e| matches!(e, Event::Pin(Pin::FrameSelect, _))));

        // Busy is recoverable
        chip.set_busy(false);
        sequence::configure_sweep(&mut dev, &SweepParams::default()).unwrap();
        assert_eq!(chip.words().len(), 7);
        assert_eq!(chip.trigger_count(), 1);
    }

    #[test]
    fn test_busy_for_one_poll() {
        let (mut dev, chip) = setup(25_000_000);
        chip.busy_for_polls(1);
        let word = CommandWord::new(Register::IncrementCount, 100);
        assert_eq!(dev.write_word(word), Err(Error::BusBusy));
        assert_eq!(dev.write_word(word), Ok(()));
        assert_eq!(chip.registers().increments, Some(100));
    }

    #[test]
    fn test_busy_inside_transfer() {
        let (mut dev, chip) = setup(25_000_000);
        chip.busy_transfer(0);
        let result = sequence::configure_single_frequency(&mut dev, &SingleToneParams::new(1000));
        assert_eq!(
            result,
            Err(Error::StepFailed {
                step: Step::Control,
                cause: Fault::BusBusy,
            })
        );
        assert_eq!(chip.transfer_count(), 1);
        assert!(chip.words().is_empty());
        assert!(chip.pin(Pin::FrameSelect));
    }

    #[test]
    fn test_out_of_range_sends_nothing() {
        let (mut dev, chip) = setup(25_000_000);

        let params = SweepParams::default().with_increments(1);
        assert_eq!(
            sequence::configure_sweep(&mut dev, &params),
            Err(Error::ParameterOutOfRange(Parameter::IncrementCount))
        );
        let params = SweepParams::default().with_interval(2048);
        assert_eq!(
            sequence::configure_sweep(&mut dev, &params),
            Err(Error::ParameterOutOfRange(Parameter::IncrementInterval))
        );
        assert_eq!(
            sequence::configure_single_frequency(&mut dev, &SingleToneParams::new(0)),
            Err(Error::ParameterOutOfRange(Parameter::StartFrequency))
        );
        assert_eq!(
            sequence::configure_single_frequency(&mut dev, &SingleToneParams::new(25_000_000)),
            Err(Error::ParameterOutOfRange(Parameter::StartFrequency))
        );

        assert_eq!(chip.transfer_count(), 0);
        assert!(chip.events().is_empty());
    }

    #[test]
    fn test_decrementing_sweep() {
        let (mut dev, chip) = setup(25_000_000);
        let params = SweepParams::new(5000, 100).with_direction(SweepDirection::Decrementing);
        sequence::configure_sweep(&mut dev, &params).unwrap();

        assert_eq!(chip.direction(), Some(SweepDirection::Decrementing));
        assert_eq!(chip.registers().delta_high, Some(0x800));
        assert_eq!(chip.delta_accumulator(), Some(67));
        assert_eq!(chip.delta_frequency_hz(25_000_000), Some(99));
    }

    #[test]
    fn test_clock_based_interval() {
        let (mut dev, chip) = setup(25_000_000);
        let params = SweepParams::default().with_clock_interval(500);
        sequence::configure_sweep(&mut dev, &params).unwrap();
        assert_eq!(
            chip.registers().interval,
            Some((IntervalBasis::ClockCycles, 500))
        );
        assert!(chip.words().contains(&0x61F4));
    }

    #[test]
    fn test_external_trigger_is_left_to_caller() {
        let (mut dev, chip) = setup(25_000_000);
        let params = SweepParams::default().with_trigger(TriggerMode::External);
        sequence::configure_sweep(&mut dev, &params).unwrap();

        assert_eq!(chip.trigger_count(), 0);
        assert!(!chip.is_running());
        assert_eq!(chip.control().unwrap().trigger, TriggerMode::External);

        // Each CTRL pulse steps the sweep by one increment
        dev.trigger();
        dev.trigger();
        assert_eq!(chip.trigger_count(), 2);
        assert_eq!(chip.total_delay_us(), 200);
    }

    #[test]
    fn test_sequence_drives_ctrl_low_first() {
        let (mut dev, chip) = setup(25_000_000);
        sequence::self_test(&mut dev).unwrap();
        assert_eq!(chip.events()[0], Event::Pin(Pin::Control, false));
    }

    #[test]
    fn test_reset_and_standby() {
        let (mut dev, chip) = setup(25_000_000);
        sequence::self_test(&mut dev).unwrap();
        assert!(chip.is_running());

        dev.reset();
        assert_eq!(chip.reset_count(), 1);
        assert!(!chip.is_running());
        assert!(!chip.pin(Pin::Interrupt));
        // Registers survive a reset
        assert_eq!(chip.registers().increments, Some(2));

        dev.set_standby(true);
        assert!(chip.pin(Pin::Standby));
        dev.set_standby(false);
        assert!(!chip.pin(Pin::Standby));
    }

    #[test]
    fn test_single_register_writes() {
        let (mut dev, chip) = setup(25_000_000);
        sequence::write_control(&mut dev, &ControlSettings::default()).unwrap();
        sequence::write_start_frequency(&mut dev, 10_000).unwrap();
        sequence::write_increment_count(&mut dev, 300).unwrap();
        sequence::write_increment_interval(&mut dev, 40, IntervalBasis::WaveformCycles).unwrap();
        sequence::write_delta_frequency(&mut dev, 250, SweepDirection::Incrementing).unwrap();

        assert_eq!(chip.start_frequency_hz(25_000_000), Some(9998));
        assert_eq!(chip.registers().increments, Some(300));
        assert_eq!(
            chip.registers().interval,
            Some((IntervalBasis::WaveformCycles, 40))
        );
        assert_eq!(
            dev.last_command().and_then(|w| w.register()),
            Some(Register::DeltaFrequencyHigh)
        );
        assert_eq!(chip.trigger_count(), 0);
        assert_framed(&chip);
    }

    #[test]
    fn test_frequency_before_control_is_flagged() {
        let (mut dev, chip) = setup(25_000_000);
        sequence::write_start_frequency(&mut dev, 1000).unwrap();
        assert_eq!(
            chip.violations(),
            [Violation::NotConfigured(0xC29F), Violation::NotConfigured(0xD000)]
        );
    }

    #[test]
    fn test_word_outside_frame_is_flagged() {
        let mut chip = DummyAd5932::new();
        chip.transfer(0x1002).unwrap();
        assert_eq!(chip.violations(), [Violation::WordOutsideFrame(0x1002)]);
        assert_eq!(chip.registers().increments, None);
    }
}
