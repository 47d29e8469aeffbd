//! Register-level access to one I2C peripheral.
//!
//! The engine only ever touches four byte-wide registers. Keeping them behind a trait lets the
//! state machine run against [`crate::kinetis::RegisterBlock`] on the target and against a
//! simulated peripheral in tests.

/// Control register 1 bits.
pub mod c1 {
    pub const IICEN: u8 = 1 << 7;
    pub const IICIE: u8 = 1 << 6;
    /// Setting generates START, clearing generates STOP.
    pub const MST: u8 = 1 << 5;
    pub const TX: u8 = 1 << 4;
    /// NACK the next received byte.
    pub const TXAK: u8 = 1 << 3;
    /// Self-clearing.
    pub const RSTA: u8 = 1 << 2;
}

/// Status register bits. `ARBL` and `IICIF` are write-1-to-clear.
pub mod s {
    pub const ARBL: u8 = 1 << 4;
    pub const IICIF: u8 = 1 << 1;
    pub const RXAK: u8 = 1 << 0;
}

/// Frequency divider register fields.
pub mod f {
    pub const MULT_SHIFT: u8 = 6;
    pub const MULT_MASK: u8 = 0b11 << MULT_SHIFT;
    pub const ICR_MASK: u8 = 0x3F;
}

pub trait I2cRegisters {
    fn c1_rd(&self) -> u8;
    fn c1_wr(&self, val: u8);

    fn s_rd(&self) -> u8;
    fn s_wr(&self, val: u8);

    /// In receive mode this also starts clocking in the next byte.
    fn d_rd(&self) -> u8;
    fn d_wr(&self, val: u8);

    fn f_rd(&self) -> u8;
    fn f_wr(&self, val: u8);

    #[inline(always)]
    fn c1_set(&self, mask: u8) {
        self.c1_wr(self.c1_rd() | mask);
    }

    #[inline(always)]
    fn c1_clear(&self, mask: u8) {
        self.c1_wr(self.c1_rd() & !mask);
    }

    /// Acknowledges write-1-to-clear status flags without touching the others.
    #[inline(always)]
    fn s_clear(&self, mask: u8) {
        self.s_wr(mask);
    }
}
