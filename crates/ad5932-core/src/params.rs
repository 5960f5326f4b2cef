//! Sweep parameter types
//!
//! These are plain value objects. Range checks live in [`SweepParams::validate`]
//! and in the encoder, so a value can be built freely and is only rejected
//! when it is about to be programmed.

use crate::encoder;
use crate::error::Result;
use crate::register::ControlBits;

/// Output waveform shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    /// Sine wave
    #[default]
    Sine,
    /// Triangle wave
    Triangle,
}

/// How frequency increments are triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerMode {
    /// The part steps on its own; the driver pulses CTRL once after programming
    #[default]
    Automatic,
    /// Each increment waits for an external pulse on CTRL
    External,
}

/// When the SYNCOUT pin pulses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncSelect {
    /// High at the end of the scan, low again when the next scan starts
    #[default]
    EndOfSweep,
    /// A 4 x MCLK pulse at each frequency increment
    EachIncrement,
}

/// What the increment interval counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntervalBasis {
    /// Fixed number of output waveform cycles
    #[default]
    WaveformCycles,
    /// Fixed number of MCLK periods
    ClockCycles,
}

/// Sweep direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepDirection {
    /// Low to high
    #[default]
    Incrementing,
    /// High to low
    Decrementing,
}

/// Contents of the control register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSettings {
    /// DAC output enabled
    pub dac_enable: bool,
    /// Output waveform
    pub waveform: Waveform,
    /// MSBOUT pin enabled
    pub msb_out: bool,
    /// Increment trigger
    pub trigger: TriggerMode,
    /// SYNCOUT pulse behaviour
    pub sync_select: SyncSelect,
    /// SYNCOUT pin enabled
    pub sync_out: bool,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            dac_enable: true,
            waveform: Waveform::Sine,
            msb_out: false,
            trigger: TriggerMode::Automatic,
            sync_select: SyncSelect::EndOfSweep,
            sync_out: true,
        }
    }
}

impl ControlSettings {
    /// Payload bits for these settings, fixed bits included
    pub fn bits(&self) -> ControlBits {
        let mut bits = ControlBits::FIXED;
        bits.set(ControlBits::SYNCOUT_EN, self.sync_out);
        bits.set(
            ControlBits::SYNCSEL,
            self.sync_select == SyncSelect::EndOfSweep,
        );
        bits.set(ControlBits::EXT_INCR, self.trigger == TriggerMode::External);
        bits.set(ControlBits::MSBOUT_EN, self.msb_out);
        bits.set(ControlBits::SINE, self.waveform == Waveform::Sine);
        bits.set(ControlBits::DAC_EN, self.dac_enable);
        bits
    }

    /// Decode settings from a control payload
    pub fn from_bits(bits: ControlBits) -> Self {
        Self {
            dac_enable: bits.contains(ControlBits::DAC_EN),
            waveform: if bits.contains(ControlBits::SINE) {
                Waveform::Sine
            } else {
                Waveform::Triangle
            },
            msb_out: bits.contains(ControlBits::MSBOUT_EN),
            trigger: if bits.contains(ControlBits::EXT_INCR) {
                TriggerMode::External
            } else {
                TriggerMode::Automatic
            },
            sync_select: if bits.contains(ControlBits::SYNCSEL) {
                SyncSelect::EndOfSweep
            } else {
                SyncSelect::EachIncrement
            },
            sync_out: bits.contains(ControlBits::SYNCOUT_EN),
        }
    }
}

/// Parameters for continuous fixed-frequency output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleToneParams {
    /// Output frequency in Hz
    pub frequency: u32,
    /// Output waveform
    pub waveform: Waveform,
    /// MSBOUT pin enabled
    pub msb_out: bool,
    /// Start trigger
    pub trigger: TriggerMode,
}

impl SingleToneParams {
    /// Sine output at `frequency` Hz, started automatically
    pub fn new(frequency: u32) -> Self {
        Self {
            frequency,
            waveform: Waveform::Sine,
            msb_out: false,
            trigger: TriggerMode::Automatic,
        }
    }

    /// Set the output waveform
    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    /// Enable or disable the MSBOUT pin
    pub fn with_msb_out(mut self, enable: bool) -> Self {
        self.msb_out = enable;
        self
    }

    /// Set the start trigger
    pub fn with_trigger(mut self, trigger: TriggerMode) -> Self {
        self.trigger = trigger;
        self
    }

    /// Control register contents for this output
    pub fn control(&self) -> ControlSettings {
        ControlSettings {
            waveform: self.waveform,
            msb_out: self.msb_out,
            trigger: self.trigger,
            ..ControlSettings::default()
        }
    }
}

/// Parameters for a frequency sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepParams {
    /// Start frequency in Hz (1..=2^31-1)
    pub start_frequency: u32,
    /// Frequency step in Hz (0..=2^31-1)
    pub delta_frequency: u32,
    /// Number of increments (2..=4095)
    pub increments: u16,
    /// What the increment interval counts
    pub interval_basis: IntervalBasis,
    /// Increment interval (2..=2047)
    pub interval: u16,
    /// Sweep direction
    pub direction: SweepDirection,
    /// Output waveform
    pub waveform: Waveform,
    /// MSBOUT pin enabled
    pub msb_out: bool,
    /// Increment trigger
    pub trigger: TriggerMode,
    /// SYNCOUT pulse behaviour
    pub sync_select: SyncSelect,
    /// SYNCOUT pin enabled
    pub sync_out: bool,
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            start_frequency: 1000,
            delta_frequency: 1000,
            increments: 2,
            interval_basis: IntervalBasis::WaveformCycles,
            interval: 2,
            direction: SweepDirection::Incrementing,
            waveform: Waveform::Sine,
            msb_out: false,
            trigger: TriggerMode::Automatic,
            sync_select: SyncSelect::EndOfSweep,
            sync_out: true,
        }
    }
}

impl SweepParams {
    /// Create sweep parameters with the given start and delta frequency
    pub fn new(start_frequency: u32, delta_frequency: u32) -> Self {
        Self {
            start_frequency,
            delta_frequency,
            ..Default::default()
        }
    }

    /// Set the number of increments
    pub fn with_increments(mut self, increments: u16) -> Self {
        self.increments = increments;
        self
    }

    /// Set the increment interval counted in output waveform cycles
    pub fn with_interval(mut self, interval: u16) -> Self {
        self.interval = interval;
        self.interval_basis = IntervalBasis::WaveformCycles;
        self
    }

    /// Set the increment interval counted in MCLK periods
    pub fn with_clock_interval(mut self, interval: u16) -> Self {
        self.interval = interval;
        self.interval_basis = IntervalBasis::ClockCycles;
        self
    }

    /// Set the sweep direction
    pub fn with_direction(mut self, direction: SweepDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Set the output waveform
    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    /// Enable or disable the MSBOUT pin
    pub fn with_msb_out(mut self, enable: bool) -> Self {
        self.msb_out = enable;
        self
    }

    /// Set the increment trigger
    pub fn with_trigger(mut self, trigger: TriggerMode) -> Self {
        self.trigger = trigger;
        self
    }

    /// Configure the SYNCOUT pin
    pub fn with_sync(mut self, select: SyncSelect, enable: bool) -> Self {
        self.sync_select = select;
        self.sync_out = enable;
        self
    }

    /// Control register contents for this sweep
    pub fn control(&self) -> ControlSettings {
        ControlSettings {
            dac_enable: true,
            waveform: self.waveform,
            msb_out: self.msb_out,
            trigger: self.trigger,
            sync_select: self.sync_select,
            sync_out: self.sync_out,
        }
    }

    /// Check the ranges that do not depend on the clock
    ///
    /// Frequencies are additionally checked against the clock when they are
    /// encoded.
    pub fn validate(&self) -> Result<()> {
        encoder::check_start_frequency(self.start_frequency)?;
        encoder::check_delta_frequency(self.delta_frequency)?;
        encoder::check_increment_count(self.increments)?;
        encoder::check_increment_interval(self.interval)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Parameter};

    #[test]
    fn test_control_bits_roundtrip() {
        let settings = ControlSettings {
            dac_enable: false,
            waveform: Waveform::Triangle,
            msb_out: true,
            trigger: TriggerMode::External,
            sync_select: SyncSelect::EachIncrement,
            sync_out: false,
        };
        assert_eq!(ControlSettings::from_bits(settings.bits()), settings);
    }

    #[test]
    fn test_sweep_validate() {
        assert!(SweepParams::default().validate().is_ok());

        let err = SweepParams::default().with_increments(1).validate();
        assert_eq!(err, Err(Error::ParameterOutOfRange(Parameter::IncrementCount)));

        let err = SweepParams::default().with_clock_interval(2048).validate();
        assert_eq!(
            err,
            Err(Error::ParameterOutOfRange(Parameter::IncrementInterval))
        );

        let err = SweepParams::new(0, 10).validate();
        assert_eq!(err, Err(Error::ParameterOutOfRange(Parameter::StartFrequency)));

        let err = SweepParams::new(10, 0x8000_0000).validate();
        assert_eq!(err, Err(Error::ParameterOutOfRange(Parameter::DeltaFrequency)));
    }

    #[test]
    fn test_single_tone_control() {
        let ctrl = SingleToneParams::new(1000)
            .with_waveform(Waveform::Triangle)
            .with_trigger(TriggerMode::External)
            .control();
        assert!(ctrl.dac_enable);
        assert_eq!(ctrl.waveform, Waveform::Triangle);
        assert_eq!(ctrl.trigger, TriggerMode::External);
    }
}
