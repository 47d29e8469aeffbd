use crate::{
    channel::{Channel, Rejected},
    config::{ConfigError, Timing},
    interrupts::handle_interrupt,
    registers::I2cRegisters,
    Callback, SubmitError, UserData,
};

/// Every I2C module of the part, indexed by module number.
///
/// ```ignore
/// static I2C: Engine<RegisterBlock, 1> =
///     Engine::new([Channel::new(unsafe { RegisterBlock::i2c0() }, RestartQuirks::new())]);
///
/// #[interrupt]
/// fn I2C0() {
///     I2C.on_interrupt();
/// }
/// ```
pub struct Engine<R: I2cRegisters, const N: usize> {
    channels: [Channel<R>; N],
}

impl<R: I2cRegisters, const N: usize> Engine<R, N> {
    pub const fn new(channels: [Channel<R>; N]) -> Self {
        Self { channels }
    }

    pub fn channel(&self, index: usize) -> Option<&Channel<R>> {
        self.channels.get(index)
    }

    pub fn channels(&self) -> &[Channel<R>] {
        &self.channels
    }

    /// Initializes module `index`, returning the index back once it is known to be valid.
    pub fn init(&self, index: usize, timing: Timing) -> Result<usize, ConfigError> {
        let channel = self
            .channel(index)
            .ok_or(ConfigError::InvalidChannel(index))?;
        channel.init(timing);
        Ok(index)
    }

    /// [`Engine::init`] taking the raw `F[MULT]` and `F[ICR]` values.
    pub fn init_raw(&self, index: usize, mult: u8, icr: u8) -> Result<usize, ConfigError> {
        self.init(index, Timing::from_raw(mult, icr)?)
    }

    pub fn submit(
        &self,
        index: usize,
        sequence: &'static [u16],
        receive: &'static mut [u8],
        callback: Option<Callback>,
        user_data: UserData,
    ) -> Result<(), Rejected> {
        match self.channel(index) {
            Some(channel) => channel.submit(sequence, receive, callback, user_data),
            None => Err(Rejected {
                reason: SubmitError::InvalidChannel(index),
                receive,
            }),
        }
    }

    /// Shared vector: services every module with a pending request.
    pub fn on_interrupt(&self) {
        for channel in &self.channels {
            handle_interrupt(channel);
        }
    }

    /// Dedicated vector for module `index`.
    pub fn on_interrupt_for(&self, index: usize) {
        if let Some(channel) = self.channel(index) {
            handle_interrupt(channel);
        }
    }
}
