//! Command encoder
//!
//! Pure functions that map sweep parameters onto command words. Nothing
//! in here touches the bus; the only input besides the parameters is the
//! [`DeviceConfig`] that holds the reference clock.
//!
//! Frequencies are converted to the 24-bit phase accumulator increment
//! `floor(f * 2^24 / MCLK)` and then split across a LOW and a HIGH
//! register of 12 bits each.

use crate::config::DeviceConfig;
use crate::error::{Error, Parameter, Result};
use crate::params::{ControlSettings, IntervalBasis, SweepDirection};
use crate::register::{
    CommandWord, Register, ACCUMULATOR_MAX, ACCUMULATOR_RESOLUTION, DELTA_ACCUMULATOR_MAX,
    DELTA_DECREMENT_BIT, PAYLOAD_BITS, PAYLOAD_MASK,
};

/// Largest frequency argument accepted, in Hz
pub const MAX_FREQUENCY_HZ: u32 = 0x7FFF_FFFF;

/// Valid range for the number of increments
pub const INCREMENT_COUNT_RANGE: core::ops::RangeInclusive<u16> = 2..=4095;

/// Valid range for the increment interval
pub const INCREMENT_INTERVAL_RANGE: core::ops::RangeInclusive<u16> = 2..=2047;

/// Encode the control register
pub fn encode_control(settings: &ControlSettings) -> CommandWord {
    CommandWord::new(Register::Control, settings.bits().bits())
}

/// Convert a frequency in Hz to the phase accumulator increment
///
/// Returns `ParameterOutOfRange` if `frequency` is above 2^31-1 or if the
/// result does not fit the 24-bit register (frequency at or above MCLK).
/// The parameter reported is `param`, so callers can tell start and delta
/// apart.
pub fn frequency_to_accumulator(
    frequency: u32,
    config: &DeviceConfig,
    param: Parameter,
) -> Result<u32> {
    if frequency > MAX_FREQUENCY_HZ {
        return Err(Error::ParameterOutOfRange(param));
    }

    // 2^31 * 2^24 needs 55 bits
    let acc = frequency as u64 * ACCUMULATOR_RESOLUTION / config.clock_hz() as u64;
    if acc > ACCUMULATOR_MAX as u64 {
        return Err(Error::ParameterOutOfRange(param));
    }

    Ok(acc as u32)
}

/// Reassemble the accumulator value from the LOW and HIGH payloads
///
/// The direction bit of the delta-frequency HIGH word is ignored.
pub fn accumulator_from_words(low: CommandWord, high: CommandWord) -> u32 {
    let high_payload = match high.register() {
        Some(Register::DeltaFrequencyHigh) => high.payload() & !DELTA_DECREMENT_BIT,
        _ => high.payload(),
    };
    ((high_payload as u32) << PAYLOAD_BITS) | low.payload() as u32
}

fn split_accumulator(acc: u32, low: Register, high: Register) -> [CommandWord; 2] {
    [
        CommandWord::new(low, (acc as u16) & PAYLOAD_MASK),
        CommandWord::new(high, ((acc >> PAYLOAD_BITS) as u16) & PAYLOAD_MASK),
    ]
}

/// Check a start frequency without a clock (1..=2^31-1)
pub fn check_start_frequency(frequency: u32) -> Result<()> {
    if frequency == 0 || frequency > MAX_FREQUENCY_HZ {
        return Err(Error::ParameterOutOfRange(Parameter::StartFrequency));
    }
    Ok(())
}

/// Check a delta frequency without a clock (0..=2^31-1)
pub fn check_delta_frequency(frequency: u32) -> Result<()> {
    if frequency > MAX_FREQUENCY_HZ {
        return Err(Error::ParameterOutOfRange(Parameter::DeltaFrequency));
    }
    Ok(())
}

/// Check the number of increments (2..=4095)
pub fn check_increment_count(count: u16) -> Result<()> {
    if !INCREMENT_COUNT_RANGE.contains(&count) {
        return Err(Error::ParameterOutOfRange(Parameter::IncrementCount));
    }
    Ok(())
}

/// Check the increment interval (2..=2047)
pub fn check_increment_interval(interval: u16) -> Result<()> {
    if !INCREMENT_INTERVAL_RANGE.contains(&interval) {
        return Err(Error::ParameterOutOfRange(Parameter::IncrementInterval));
    }
    Ok(())
}

/// Encode the start frequency as a LOW, HIGH word pair
pub fn encode_start_frequency(frequency: u32, config: &DeviceConfig) -> Result<[CommandWord; 2]> {
    check_start_frequency(frequency)?;
    let acc = frequency_to_accumulator(frequency, config, Parameter::StartFrequency)?;
    Ok(split_accumulator(
        acc,
        Register::StartFrequencyLow,
        Register::StartFrequencyHigh,
    ))
}

/// Encode the delta frequency as a LOW, HIGH word pair
///
/// A decrementing sweep sets bit 11 of the HIGH payload, which leaves 23
/// bits for the step itself (below MCLK / 2).
pub fn encode_delta_frequency(
    frequency: u32,
    direction: SweepDirection,
    config: &DeviceConfig,
) -> Result<[CommandWord; 2]> {
    check_delta_frequency(frequency)?;
    let acc = frequency_to_accumulator(frequency, config, Parameter::DeltaFrequency)?;
    if acc > DELTA_ACCUMULATOR_MAX {
        return Err(Error::ParameterOutOfRange(Parameter::DeltaFrequency));
    }
    let [low, high] = split_accumulator(
        acc,
        Register::DeltaFrequencyLow,
        Register::DeltaFrequencyHigh,
    );
    let high = match direction {
        SweepDirection::Incrementing => high,
        SweepDirection::Decrementing => CommandWord::new(
            Register::DeltaFrequencyHigh,
            high.payload() | DELTA_DECREMENT_BIT,
        ),
    };
    Ok([low, high])
}

/// Encode the number of increments
pub fn encode_increment_count(count: u16) -> Result<CommandWord> {
    check_increment_count(count)?;
    Ok(CommandWord::new(Register::IncrementCount, count))
}

/// Encode the increment interval, the basis picks the register
pub fn encode_increment_interval(interval: u16, basis: IntervalBasis) -> Result<CommandWord> {
    check_increment_interval(interval)?;
    let register = match basis {
        IntervalBasis::WaveformCycles => Register::IntervalWaveformCycles,
        IntervalBasis::ClockCycles => Register::IntervalClockCycles,
    };
    Ok(CommandWord::new(register, interval))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{SyncSelect, TriggerMode, Waveform};

    fn cfg(clock_hz: u32) -> DeviceConfig {
        DeviceConfig::new(clock_hz).unwrap()
    }

    #[test]
    fn test_single_tone_scenario_words() {
        // 1000 Hz at 50 MHz: floor(1000 * 2^24 / 50e6) = 335
        let [low, high] = encode_start_frequency(1000, &cfg(50_000_000)).unwrap();
        assert_eq!(low.raw(), 0xC000 | 0x14F);
        assert_eq!(high.raw(), 0xD000);
        assert_eq!(accumulator_from_words(low, high), 335);
    }

    #[test]
    fn test_accumulator_reconstruction() {
        let clocks = [1_000_000u32, 16_000_000, 25_000_000, 50_000_000, 75_000_000];
        for &mclk in &clocks {
            let config = cfg(mclk);
            let freqs = [1u32, 2, 999, 1000, 12_345, mclk / 3, mclk / 2, mclk - 1];
            for &f in &freqs {
                let [low, high] = encode_start_frequency(f, &config).unwrap();
                let acc = accumulator_from_words(low, high);
                let expected = (f as u64 * (1 << 24) / mclk as u64) as u32;
                assert_eq!(acc, expected, "f={} mclk={}", f, mclk);
                assert!(acc < 1 << 24);
            }
        }
    }

    #[test]
    fn test_frequency_at_clock_rejected() {
        // f == mclk would need acc == 2^24, one bit too many
        assert_eq!(
            encode_start_frequency(16_000_000, &cfg(16_000_000)),
            Err(Error::ParameterOutOfRange(Parameter::StartFrequency))
        );
    }

    #[test]
    fn test_frequency_above_31_bits_rejected() {
        let config = cfg(u32::MAX);
        for f in [0x8000_0000u32, 0xFFFF_FFFF] {
            assert_eq!(
                encode_start_frequency(f, &config),
                Err(Error::ParameterOutOfRange(Parameter::StartFrequency))
            );
            assert_eq!(
                encode_delta_frequency(f, SweepDirection::Incrementing, &config),
                Err(Error::ParameterOutOfRange(Parameter::DeltaFrequency))
            );
        }
        // Largest legal value with a clock fast enough to hold it
        assert!(encode_start_frequency(MAX_FREQUENCY_HZ, &config).is_ok());
    }

    #[test]
    fn test_zero_start_frequency_rejected() {
        assert_eq!(
            encode_start_frequency(0, &cfg(1_000_000)),
            Err(Error::ParameterOutOfRange(Parameter::StartFrequency))
        );
        // A zero step is legal
        let [low, high] =
            encode_delta_frequency(0, SweepDirection::Incrementing, &cfg(1_000_000)).unwrap();
        assert_eq!(low.raw(), 0x2000);
        assert_eq!(high.raw(), 0x3000);
    }

    #[test]
    fn test_direction_bit() {
        let config = cfg(16_000_000);
        let [_, up] = encode_delta_frequency(1000, SweepDirection::Incrementing, &config).unwrap();
        let [low, down] =
            encode_delta_frequency(1000, SweepDirection::Decrementing, &config).unwrap();
        assert_eq!(up.payload() & DELTA_DECREMENT_BIT, 0);
        assert_ne!(down.payload() & DELTA_DECREMENT_BIT, 0);
        assert_eq!(down.register(), Some(Register::DeltaFrequencyHigh));
        // The direction bit does not leak into the magnitude
        assert_eq!(accumulator_from_words(low, down), accumulator_from_words(low, up));
    }

    #[test]
    fn test_delta_limited_to_23_bits() {
        let config = cfg(16_000_000);
        assert!(encode_delta_frequency(7_999_999, SweepDirection::Decrementing, &config).is_ok());
        assert_eq!(
            encode_delta_frequency(8_000_000, SweepDirection::Incrementing, &config),
            Err(Error::ParameterOutOfRange(Parameter::DeltaFrequency))
        );
    }

    #[test]
    fn test_increment_count_range() {
        assert_eq!(encode_increment_count(2).unwrap().raw(), 0x1002);
        assert_eq!(encode_increment_count(4095).unwrap().raw(), 0x1FFF);
        for n in [0u16, 1, 4096, u16::MAX] {
            assert_eq!(
                encode_increment_count(n),
                Err(Error::ParameterOutOfRange(Parameter::IncrementCount))
            );
        }
        for n in INCREMENT_COUNT_RANGE.step_by(97) {
            assert_eq!(encode_increment_count(n).unwrap().payload(), n);
        }
    }

    #[test]
    fn test_increment_interval_range_and_basis() {
        let wave = encode_increment_interval(2047, IntervalBasis::WaveformCycles).unwrap();
        assert_eq!(wave.raw(), 0x47FF);
        let clock = encode_increment_interval(2, IntervalBasis::ClockCycles).unwrap();
        assert_eq!(clock.raw(), 0x6002);
        for t in [0u16, 1, 2048, 4095] {
            assert_eq!(
                encode_increment_interval(t, IntervalBasis::ClockCycles),
                Err(Error::ParameterOutOfRange(Parameter::IncrementInterval))
            );
        }
    }

    #[test]
    fn test_control_word_layout() {
        let settings = ControlSettings {
            dac_enable: true,
            waveform: Waveform::Sine,
            msb_out: true,
            trigger: TriggerMode::Automatic,
            sync_select: SyncSelect::EndOfSweep,
            sync_out: true,
        };
        let word = encode_control(&settings);
        assert_eq!(word.raw(), 0x0FDF);
        // Encoding is a pure function of the flags
        assert_eq!(encode_control(&settings), word);

        let minimal = ControlSettings {
            dac_enable: false,
            waveform: Waveform::Triangle,
            msb_out: false,
            trigger: TriggerMode::External,
            sync_select: SyncSelect::EachIncrement,
            sync_out: false,
        };
        assert_eq!(encode_control(&minimal).raw(), 0x08F3);
    }
}
