//! AD5932 register map and command word layout
//!
//! Every write to the part is a single 16-bit word: the upper four bits
//! select the target register, the lower twelve bits carry the payload.
//! Words are shifted out MSB first while FSYNC is held low.

use bitflags::bitflags;

/// Mask of the 12 payload bits of a command word
pub const PAYLOAD_MASK: u16 = 0x0FFF;

/// Number of payload bits per command word
pub const PAYLOAD_BITS: u32 = 12;

/// Phase accumulator resolution (2^24)
pub const ACCUMULATOR_RESOLUTION: u64 = 1 << 24;

/// Largest value a 24-bit frequency register can hold
pub const ACCUMULATOR_MAX: u32 = (1 << 24) - 1;

/// Delta frequency is 23 bits, bit 11 of the HIGH word is the direction
pub const DELTA_ACCUMULATOR_MAX: u32 = (1 << 23) - 1;

/// Bit 11 of the delta-frequency HIGH payload selects a decrementing sweep
pub const DELTA_DECREMENT_BIT: u16 = 1 << 11;

/// Registers addressable through the 4-bit selector in D15..D12
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Control register
    Control,
    /// Number of increments
    IncrementCount,
    /// Lower 12 bits of delta frequency
    DeltaFrequencyLow,
    /// Upper 11 bits of delta frequency plus the sweep direction
    DeltaFrequencyHigh,
    /// Increment interval, counted in output waveform cycles
    IntervalWaveformCycles,
    /// Increment interval, counted in MCLK periods
    IntervalClockCycles,
    /// Lower 12 bits of start frequency
    StartFrequencyLow,
    /// Upper 12 bits of start frequency
    StartFrequencyHigh,
}

impl Register {
    /// All registers, in selector order
    pub const ALL: [Register; 8] = [
        Register::Control,
        Register::IncrementCount,
        Register::DeltaFrequencyLow,
        Register::DeltaFrequencyHigh,
        Register::IntervalWaveformCycles,
        Register::IntervalClockCycles,
        Register::StartFrequencyLow,
        Register::StartFrequencyHigh,
    ];

    /// The 4-bit selector code for this register
    pub const fn selector(self) -> u8 {
        match self {
            Register::Control => 0b0000,
            Register::IncrementCount => 0b0001,
            Register::DeltaFrequencyLow => 0b0010,
            Register::DeltaFrequencyHigh => 0b0011,
            Register::IntervalWaveformCycles => 0b0100,
            Register::IntervalClockCycles => 0b0110,
            Register::StartFrequencyLow => 0b1100,
            Register::StartFrequencyHigh => 0b1101,
        }
    }

    /// Look up a register by its 4-bit selector
    ///
    /// Returns `None` for the selector codes the part does not define.
    pub fn from_selector(selector: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|reg| reg.selector() == selector)
    }
}

/// A single 16-bit command word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandWord(u16);

impl CommandWord {
    /// Build a command word, payload bits above bit 11 are discarded
    pub const fn new(register: Register, payload: u16) -> Self {
        Self(((register.selector() as u16) << PAYLOAD_BITS) | (payload & PAYLOAD_MASK))
    }

    /// Wrap a raw word as received on the wire
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// The raw 16-bit value as it is shifted out
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// The 4-bit selector in D15..D12
    pub const fn selector(self) -> u8 {
        (self.0 >> PAYLOAD_BITS) as u8
    }

    /// The register this word targets, if the selector is defined
    pub fn register(self) -> Option<Register> {
        Register::from_selector(self.selector())
    }

    /// The 12-bit payload in D11..D0
    pub const fn payload(self) -> u16 {
        self.0 & PAYLOAD_MASK
    }
}

impl From<CommandWord> for u16 {
    fn from(word: CommandWord) -> u16 {
        word.raw()
    }
}

impl core::fmt::Display for CommandWord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

bitflags! {
    /// Control register payload bits (D11..D0)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ControlBits: u16 {
        /// Reserved, must be 1
        const RESERVED_D0 = 1 << 0;
        /// Reserved, must be 1
        const RESERVED_D1 = 1 << 1;
        /// SYNCOUT pin enabled (otherwise three-state)
        const SYNCOUT_EN  = 1 << 2;
        /// SYNCOUT pulses at end of scan (otherwise at each increment)
        const SYNCSEL     = 1 << 3;
        /// Reserved, must be 1
        const RESERVED_D4 = 1 << 4;
        /// Frequency increments triggered externally via CTRL
        const EXT_INCR    = 1 << 5;
        /// Reserved, must be 1
        const RESERVED_D6 = 1 << 6;
        /// Reserved, must be 1
        const RESERVED_D7 = 1 << 7;
        /// MSBOUT pin enabled
        const MSBOUT_EN   = 1 << 8;
        /// Sine output (otherwise triangle)
        const SINE        = 1 << 9;
        /// DAC enabled
        const DAC_EN      = 1 << 10;
        /// 24-bit frequency writes as two consecutive 12-bit words
        const B24         = 1 << 11;

        /// Bits that are set in every control word
        const FIXED = Self::RESERVED_D0.bits()
            | Self::RESERVED_D1.bits()
            | Self::RESERVED_D4.bits()
            | Self::RESERVED_D6.bits()
            | Self::RESERVED_D7.bits()
            | Self::B24.bits();
    }
}

impl Default for ControlBits {
    fn default() -> Self {
        ControlBits::FIXED
    }
}
