//! Programming sequences
//!
//! Every operation here is a fixed, strictly linear list of command words.
//! The whole list is encoded (and therefore validated) before the first
//! word goes out, so a range error never leaves the part half programmed.
//! Bus errors are a different matter: the sequence stops at the first
//! failing word and reports which [`Step`] it was in. Nothing is rolled
//! back, registers written by earlier steps stay programmed.
//!
//! The control register is always written first because writing it resets
//! the part's internal state machine.

use core::fmt;

use crate::bus::{ControlPins, SerialBus};
use crate::config::DeviceConfig;
use crate::driver::Ad5932;
use crate::encoder;
use crate::error::Result;
use crate::params::{
    ControlSettings, IntervalBasis, SingleToneParams, SweepDirection, SweepParams, SyncSelect,
    TriggerMode, Waveform,
};
use crate::register::CommandWord;
use heapless::Vec;
use maybe_async::maybe_async;

/// Maximum number of words in a sequence (a full sweep setup)
pub const MAX_SEQUENCE_WORDS: usize = 7;

/// A logical step of a programming sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Control register (1 word)
    Control,
    /// Start frequency (2 words)
    StartFrequency,
    /// Delta frequency and direction (2 words)
    DeltaFrequency,
    /// Increment interval (1 word)
    IncrementInterval,
    /// Number of increments (1 word)
    IncrementCount,
}

impl Step {
    /// Zero-based position of this step in a sweep setup
    pub const fn index(self) -> u8 {
        match self {
            Step::Control => 0,
            Step::StartFrequency => 1,
            Step::DeltaFrequency => 2,
            Step::IncrementInterval => 3,
            Step::IncrementCount => 4,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Control => write!(f, "control register"),
            Step::StartFrequency => write!(f, "start frequency"),
            Step::DeltaFrequency => write!(f, "delta frequency"),
            Step::IncrementInterval => write!(f, "increment interval"),
            Step::IncrementCount => write!(f, "increment count"),
        }
    }
}

/// A fully encoded programming sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    words: Vec<(Step, CommandWord), MAX_SEQUENCE_WORDS>,
    trigger: bool,
}

impl Plan {
    fn new(trigger: bool) -> Self {
        Self {
            words: Vec::new(),
            trigger,
        }
    }

    fn push(&mut self, step: Step, words: &[CommandWord]) {
        for &word in words {
            // Capacity covers the longest sequence, a sweep setup
            let _ = self.words.push((step, word));
        }
    }

    /// The words to send, each tagged with its step
    pub fn words(&self) -> &[(Step, CommandWord)] {
        &self.words
    }

    /// Whether CTRL is pulsed after the last word
    pub fn triggers(&self) -> bool {
        self.trigger
    }
}

/// Encode a single-frequency setup: control, start frequency
pub fn plan_single_frequency(params: &SingleToneParams, config: &DeviceConfig) -> Result<Plan> {
    let control = encoder::encode_control(&params.control());
    let start = encoder::encode_start_frequency(params.frequency, config)?;

    let mut plan = Plan::new(params.trigger == TriggerMode::Automatic);
    plan.push(Step::Control, &[control]);
    plan.push(Step::StartFrequency, &start);
    Ok(plan)
}

/// Encode a sweep setup: control, start, delta, interval, increment count
pub fn plan_sweep(params: &SweepParams, config: &DeviceConfig) -> Result<Plan> {
    params.validate()?;

    let control = encoder::encode_control(&params.control());
    let start = encoder::encode_start_frequency(params.start_frequency, config)?;
    let delta = encoder::encode_delta_frequency(params.delta_frequency, params.direction, config)?;
    let interval = encoder::encode_increment_interval(params.interval, params.interval_basis)?;
    let count = encoder::encode_increment_count(params.increments)?;

    let mut plan = Plan::new(params.trigger == TriggerMode::Automatic);
    plan.push(Step::Control, &[control]);
    plan.push(Step::StartFrequency, &start);
    plan.push(Step::DeltaFrequency, &delta);
    plan.push(Step::IncrementInterval, &[interval]);
    plan.push(Step::IncrementCount, &[count]);
    Ok(plan)
}

/// Parameters used by [`self_test`]
///
/// Continuous sine sweeps from 1 kHz in 1 kHz steps, two increments of
/// 2000 output cycles each.
pub fn self_test_params() -> SweepParams {
    SweepParams {
        start_frequency: 1000,
        delta_frequency: 1000,
        increments: 2,
        interval_basis: IntervalBasis::WaveformCycles,
        interval: 2000,
        direction: SweepDirection::Incrementing,
        waveform: Waveform::Sine,
        msb_out: true,
        trigger: TriggerMode::Automatic,
        sync_select: SyncSelect::EndOfSweep,
        sync_out: true,
    }
}

/// Send an encoded plan, then trigger if the plan asks for it
#[maybe_async]
pub async fn execute<B: SerialBus, P: ControlPins>(
    dev: &mut Ad5932<B, P>,
    plan: &Plan,
) -> Result<()> {
    dev.release_control();

    for &(step, word) in plan.words() {
        if let Err(e) = dev.write_word(word).await {
            log::warn!("ad5932: Sequence stopped at step {} ({}): {}", step.index(), step, e);
            return Err(e.at_step(step));
        }
    }

    if plan.triggers() {
        dev.trigger().await;
    }
    Ok(())
}

/// Configure continuous output at a single frequency
///
/// Writes the control register and the start frequency. In automatic
/// trigger mode CTRL is pulsed afterwards to start the output.
#[maybe_async]
pub async fn configure_single_frequency<B: SerialBus, P: ControlPins>(
    dev: &mut Ad5932<B, P>,
    params: &SingleToneParams,
) -> Result<()> {
    let plan = plan_single_frequency(params, dev.config())?;
    log::debug!("ad5932: Single frequency {} Hz", params.frequency);
    execute(dev, &plan).await
}

/// Configure a frequency sweep
///
/// Writes seven words (control, start LOW/HIGH, delta LOW/HIGH, interval,
/// increment count). In automatic trigger mode CTRL is pulsed afterwards
/// to start the sweep.
#[maybe_async]
pub async fn configure_sweep<B: SerialBus, P: ControlPins>(
    dev: &mut Ad5932<B, P>,
    params: &SweepParams,
) -> Result<()> {
    let plan = plan_sweep(params, dev.config())?;
    log::debug!(
        "ad5932: Sweep from {} Hz, {} x {} Hz ({:?})",
        params.start_frequency,
        params.increments,
        params.delta_frequency,
        params.direction
    );
    execute(dev, &plan).await
}

/// Program a fixed sweep to check the wiring, always triggers on success
#[maybe_async]
pub async fn self_test<B: SerialBus, P: ControlPins>(dev: &mut Ad5932<B, P>) -> Result<()> {
    let plan = plan_sweep(&self_test_params(), dev.config())?;
    log::info!("ad5932: Running self test");
    execute(dev, &plan).await
}

// ============================================================================
// Single register writes
// ============================================================================

/// Write the control register
///
/// Note that this resets the part's state machine and parks the output at
/// midscale until the next trigger.
#[maybe_async]
pub async fn write_control<B: SerialBus, P: ControlPins>(
    dev: &mut Ad5932<B, P>,
    settings: &ControlSettings,
) -> Result<()> {
    dev.write_word(encoder::encode_control(settings)).await
}

/// Write the start frequency registers
#[maybe_async]
pub async fn write_start_frequency<B: SerialBus, P: ControlPins>(
    dev: &mut Ad5932<B, P>,
    frequency: u32,
) -> Result<()> {
    let words = encoder::encode_start_frequency(frequency, dev.config())?;
    dev.write_words(&words).await
}

/// Write the delta frequency registers and the sweep direction
#[maybe_async]
pub async fn write_delta_frequency<B: SerialBus, P: ControlPins>(
    dev: &mut Ad5932<B, P>,
    frequency: u32,
    direction: SweepDirection,
) -> Result<()> {
    let words = encoder::encode_delta_frequency(frequency, direction, dev.config())?;
    dev.write_words(&words).await
}

/// Write the increment interval register
#[maybe_async]
pub async fn write_increment_interval<B: SerialBus, P: ControlPins>(
    dev: &mut Ad5932<B, P>,
    interval: u16,
    basis: IntervalBasis,
) -> Result<()> {
    let word = encoder::encode_increment_interval(interval, basis)?;
    dev.write_word(word).await
}

/// Write the number of increments
#[maybe_async]
pub async fn write_increment_count<B: SerialBus, P: ControlPins>(
    dev: &mut Ad5932<B, P>,
    count: u16,
) -> Result<()> {
    let word = encoder::encode_increment_count(count)?;
    dev.write_word(word).await
}
