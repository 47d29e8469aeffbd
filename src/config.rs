use crate::registers::f;

/// Clock multiplier applied to the prescaled SCL divider (`F[MULT]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Mult {
    X1 = 0,
    X2 = 1,
    X4 = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `mult` raw value above 2.
    InvalidMult(u8),
    /// `icr` does not fit the 6-bit field.
    InvalidIcr(u8),
    /// No such channel.
    InvalidChannel(usize),
}

/// Raw SCL timing, exactly what ends up in the `F` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    pub mult: Mult,
    pub icr: u8,
}

impl Timing {
    pub const fn new(mult: Mult, icr: u8) -> Result<Self, ConfigError> {
        if icr > f::ICR_MASK {
            return Err(ConfigError::InvalidIcr(icr));
        }
        Ok(Self { mult, icr })
    }

    /// Builds timing from the raw `mult` and `icr` values of the reference manual tables.
    pub const fn from_raw(mult: u8, icr: u8) -> Result<Self, ConfigError> {
        let mult = match mult {
            0 => Mult::X1,
            1 => Mult::X2,
            2 => Mult::X4,
            _ => return Err(ConfigError::InvalidMult(mult)),
        };
        Self::new(mult, icr)
    }

    pub const fn f_bits(&self) -> u8 {
        ((self.mult as u8) << f::MULT_SHIFT) | self.icr
    }
}

/// Silicon specific handling around repeated starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RestartQuirks {
    /// Clear `F[MULT]` while `RSTA` is set (erratum 6070, 1N96F mask set). A non-zero multiplier
    /// corrupts the repeated start on these parts.
    pub zero_mult: bool,
    /// Busy-wait iterations between the repeated start and the next data write. Parts with a
    /// double-buffered data path drop a write issued too early.
    pub settle_spins: u32,
}

impl Default for RestartQuirks {
    fn default() -> Self {
        Self::new()
    }
}

impl RestartQuirks {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            zero_mult: false,
            settle_spins: 0,
        }
    }

    #[must_use]
    pub const fn zero_mult(mut self, enabled: bool) -> Self {
        self.zero_mult = enabled;
        self
    }

    #[must_use]
    pub const fn settle_spins(mut self, spins: u32) -> Self {
        self.settle_spins = spins;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f_register_layout() {
        let timing = Timing::from_raw(0x01, 0x20).unwrap();
        assert_eq!(timing.mult, Mult::X2);
        assert_eq!(timing.f_bits(), 0b0110_0000);
        assert_eq!(Timing::new(Mult::X4, 0x3F).unwrap().f_bits(), 0xBF);
    }

    #[test]
    fn out_of_range_timing_is_rejected() {
        assert_eq!(Timing::from_raw(3, 0), Err(ConfigError::InvalidMult(3)));
        assert_eq!(Timing::new(Mult::X1, 0x40), Err(ConfigError::InvalidIcr(0x40)));
    }

    #[test]
    fn quirks_builder() {
        const QUIRKS: RestartQuirks = RestartQuirks::new().zero_mult(true).settle_spins(8);
        assert!(QUIRKS.zero_mult);
        assert_eq!(QUIRKS.settle_spins, 8);
        assert_eq!(RestartQuirks::default(), RestartQuirks::new());
    }
}
