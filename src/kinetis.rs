//! Memory-mapped I2C modules of Kinetis K/L parts.

use core::ptr::{read_volatile, write_volatile};

use crate::registers::I2cRegisters;

const F_OFFSET: usize = 0x01;
const C1_OFFSET: usize = 0x02;
const S_OFFSET: usize = 0x03;
const D_OFFSET: usize = 0x04;

pub const I2C0_BASE: usize = 0x4006_6000;
pub const I2C1_BASE: usize = 0x4006_7000;
pub const I2C2_BASE: usize = 0x400E_6000;

#[derive(Debug, Clone, Copy)]
pub struct RegisterBlock {
    base: usize,
}

impl RegisterBlock {
    /// # Safety
    ///
    /// `base` must be the address of an I2C module register block, and nothing else may drive
    /// that module while the returned value is in use.
    pub const unsafe fn at(base: usize) -> Self {
        Self { base }
    }

    /// # Safety
    ///
    /// See [`RegisterBlock::at`].
    pub const unsafe fn i2c0() -> Self {
        Self::at(I2C0_BASE)
    }

    /// # Safety
    ///
    /// See [`RegisterBlock::at`].
    pub const unsafe fn i2c1() -> Self {
        Self::at(I2C1_BASE)
    }

    /// # Safety
    ///
    /// See [`RegisterBlock::at`].
    pub const unsafe fn i2c2() -> Self {
        Self::at(I2C2_BASE)
    }

    pub const fn base(&self) -> usize {
        self.base
    }

    #[inline(always)]
    fn rd(&self, offset: usize) -> u8 {
        unsafe { read_volatile((self.base + offset) as *const u8) }
    }

    #[inline(always)]
    fn wr(&self, offset: usize, val: u8) {
        unsafe { write_volatile((self.base + offset) as *mut u8, val) }
    }
}

impl I2cRegisters for RegisterBlock {
    fn c1_rd(&self) -> u8 {
        self.rd(C1_OFFSET)
    }

    fn c1_wr(&self, val: u8) {
        self.wr(C1_OFFSET, val)
    }

    fn s_rd(&self) -> u8 {
        self.rd(S_OFFSET)
    }

    fn s_wr(&self, val: u8) {
        self.wr(S_OFFSET, val)
    }

    fn d_rd(&self) -> u8 {
        self.rd(D_OFFSET)
    }

    fn d_wr(&self, val: u8) {
        self.wr(D_OFFSET, val)
    }

    fn f_rd(&self) -> u8 {
        self.rd(F_OFFSET)
    }

    fn f_wr(&self, val: u8) {
        self.wr(F_OFFSET, val)
    }
}
