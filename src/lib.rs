//! Interrupt-driven I2C master for the Kinetis I2C module.
//!
//! A whole transaction ("write these bytes, maybe restart, maybe read these bytes, stop") is
//! handed over at once as a [`sequence`] of words. [`Channel::submit`] only issues the START and
//! the address byte; every following byte is moved by [`handle_interrupt`], one per interrupt,
//! until the sequence completes or fails.
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

mod channel;
mod config;
mod engine;
mod interrupts;
pub mod kinetis;
pub mod registers;
pub mod sequence;
mod status_holder;
mod transfer;

#[cfg(test)]
mod sim;

pub use channel::{Channel, Rejected, STATUS_HISTORY_SIZE};
pub use config::{ConfigError, Mult, RestartQuirks, Timing};
pub use engine::Engine;
pub use interrupts::handle_interrupt;
pub use sequence::{Instruction, Sequence, SequenceError, READ, RESTART};

#[cfg(feature = "dump")]
pub use channel::StatusDump;

#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::NoUninit)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Status {
    Available,
    Busy,
    Error,
}

/// Which half of the bus protocol the transaction is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Writing,
    Reading,
}

/// Opaque value handed back to the completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UserData(pub usize);

/// Runs in interrupt context. Keep it short: set a flag, queue an event, leave.
pub type Callback = fn(UserData);

/// Why a transaction ended in [`Status::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reason {
    ArbitrationLoss,
    /// A written byte was not acknowledged.
    Nack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubmitError {
    /// A transaction is already in flight on this channel.
    Busy,
    /// Lost the bus right after the START.
    ArbitrationLost,
    InvalidSequence(SequenceError),
    InvalidChannel(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Error {
    #[cfg(feature = "dump")]
    pub dump: StatusDump,
    pub reason: Reason,
}
