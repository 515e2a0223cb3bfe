//! Baud-rate generator settings.
//!
//! eUSCI-style divider: an integer prescaler plus two modulation fields,
//! all derived from `N = clock / baud`.
//!
//! ```text
//! N >= 16 (oversampling):  BRW = N / 16   BRF = N mod 16   OS16 = 1
//! N <  16 (low frequency): BRW = N        BRF = 0          OS16 = 0
//! BRS = table[fractional part of N]
//! ```

use core::fmt;

/// Fractional part of `N` (in 1/10000) mapped to the second modulation
/// pattern. The entry used is the last one not above the fraction.
const BRS_TABLE: [(u16, u8); 36] = [
    (0, 0x00),
    (529, 0x01),
    (715, 0x02),
    (835, 0x04),
    (1001, 0x08),
    (1252, 0x10),
    (1430, 0x20),
    (1670, 0x11),
    (2147, 0x21),
    (2224, 0x22),
    (2503, 0x44),
    (3000, 0x25),
    (3335, 0x49),
    (3575, 0x4A),
    (3753, 0x52),
    (4003, 0x92),
    (4286, 0x53),
    (4378, 0x55),
    (5002, 0xAA),
    (5715, 0x6B),
    (6003, 0xAD),
    (6254, 0xB5),
    (6432, 0xB6),
    (6667, 0xD6),
    (7001, 0xB7),
    (7147, 0xBB),
    (7503, 0xDD),
    (7861, 0xED),
    (8004, 0xEE),
    (8333, 0xBF),
    (8464, 0xDF),
    (8572, 0xEF),
    (8751, 0xF7),
    (9004, 0xFB),
    (9170, 0xFD),
    (9288, 0xFE),
];

/// Invalid clock/baud combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Clock or baud rate is zero.
    ZeroRate,
    /// Baud rate above the clock frequency.
    BaudTooHigh,
    /// Prescaler does not fit the 16-bit register.
    BaudTooLow,
    /// The peripheral refused the settings.
    Hardware,
}

impl ConfigError {
    /// Human-readable reason.
    pub fn message(&self) -> &'static str {
        match self {
            Self::ZeroRate => "clock and baud rate must be non-zero",
            Self::BaudTooHigh => "baud rate exceeds clock",
            Self::BaudTooLow => "prescaler overflow",
            Self::Hardware => "uart driver rejected the configuration",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Computed baud-rate generator fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaudDivisor {
    /// Clock the divisor was computed for, in Hz.
    pub clock_hz: u32,
    /// Requested baud rate.
    pub baud_rate: u32,
    /// Integer prescaler (BRW).
    pub prescaler: u16,
    /// First modulation stage (BRF), only used with oversampling.
    pub first_mod: u8,
    /// Second modulation pattern (BRS).
    pub second_mod: u8,
    /// 16x oversampling (OS16).
    pub oversampling: bool,
}

impl BaudDivisor {
    /// Derive divisor and modulation for `clock_hz / baud_rate`.
    pub fn compute(clock_hz: u32, baud_rate: u32) -> Result<Self, ConfigError> {
        if clock_hz == 0 || baud_rate == 0 {
            return Err(ConfigError::ZeroRate);
        }
        if baud_rate > clock_hz {
            return Err(ConfigError::BaudTooHigh);
        }

        let n = clock_hz / baud_rate;
        let remainder = clock_hz % baud_rate;
        // < 10000 because remainder < baud_rate
        let fraction = ((remainder as u64 * 10_000) / baud_rate as u64) as u16;

        let (prescaler, first_mod, oversampling) = if n >= 16 {
            (n / 16, (n % 16) as u8, true)
        } else {
            (n, 0, false)
        };

        let prescaler = u16::try_from(prescaler).map_err(|_| ConfigError::BaudTooLow)?;

        Ok(Self {
            clock_hz,
            baud_rate,
            prescaler,
            first_mod,
            second_mod: second_modulation(fraction),
            oversampling,
        })
    }

    /// Raw value for the bit-rate control word register.
    #[inline]
    pub fn brw(&self) -> u16 {
        self.prescaler
    }

    /// Raw value for the modulation control word register.
    #[inline]
    pub fn mctlw(&self) -> u16 {
        let brs = (self.second_mod as u16) << 8;
        let brf = (self.first_mod as u16 & 0x0F) << 4;
        brs | brf | self.oversampling as u16
    }
}

/// Look up BRS for a fractional part given in 1/10000.
pub fn second_modulation(fraction: u16) -> u8 {
    BRS_TABLE
        .iter()
        .rev()
        .find(|(threshold, _)| *threshold <= fraction)
        .map(|(_, brs)| *brs)
        .unwrap_or(0)
}
