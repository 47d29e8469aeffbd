use core::cell::{Cell, RefCell};

use critical_section::{CriticalSection, Mutex};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};

use super::{
    config::{RestartQuirks, Timing},
    registers::{c1, s, I2cRegisters},
    sequence,
    status_holder::StatusHolder,
    transfer::Transfer,
    Callback, Error, Reason, Status, SubmitError, UserData,
};

pub const STATUS_HISTORY_SIZE: usize = 5;

#[cfg(feature = "dump")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusDump {
    pub status_history: [Status; STATUS_HISTORY_SIZE],
    pub current_status: Status,
}

/// A submission that never started. Hands the receive buffer back to the caller.
#[derive(Debug)]
pub struct Rejected {
    pub reason: SubmitError,
    pub receive: &'static mut [u8],
}

pub type OutcomeSignal = Signal<CriticalSectionRawMutex, Result<(), Error>>;

/// One I2C peripheral and the transaction currently owning it.
pub struct Channel<R: I2cRegisters> {
    regs: R,
    quirks: RestartQuirks,

    transfer: Mutex<RefCell<Option<Transfer>>>,
    status_holder: StatusHolder<STATUS_HISTORY_SIZE>,
    last_error: Mutex<Cell<Option<Reason>>>,

    outcome: OutcomeSignal,
}

impl<R: I2cRegisters> Channel<R> {
    pub const fn new(regs: R, quirks: RestartQuirks) -> Self {
        Self {
            regs,
            quirks,
            transfer: Mutex::new(RefCell::new(None)),
            status_holder: StatusHolder::new(),
            last_error: Mutex::new(Cell::new(None)),
            outcome: Signal::new(),
        }
    }

    /// One-time module setup: reset, enable, program the SCL divider.
    ///
    /// Clock gating and pin muxing have to be done before this.
    pub fn init(&self, timing: Timing) {
        self.regs.c1_wr(0);
        self.regs.c1_wr(c1::IICEN);
        self.regs.f_wr(timing.f_bits());
        debug!("i2c: init, F = {=u8:#x}", timing.f_bits());
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub(crate) fn quirks(&self) -> &RestartQuirks {
        &self.quirks
    }

    pub fn status(&self) -> Status {
        self.status_holder.get()
    }

    /// Why the last transaction failed, cleared by the next submission.
    pub fn last_error(&self) -> Option<Reason> {
        critical_section::with(|cs| self.last_error.borrow(cs).get())
    }

    /// Bytes received so far by the current, or last, transaction.
    pub fn received(&self) -> usize {
        critical_section::with(|cs| {
            self.transfer
                .borrow_ref(cs)
                .as_ref()
                .map_or(0, Transfer::written)
        })
    }

    /// Gives back the receive buffer of the last transaction once it is no longer in flight.
    pub fn take_receive_buffer(&self) -> Option<&'static mut [u8]> {
        critical_section::with(|cs| {
            if self.status_holder.is_busy() {
                return None;
            }
            self.transfer
                .borrow_ref_mut(cs)
                .take()
                .map(Transfer::into_received)
        })
    }

    /// Result of the last transaction that ended, if nobody took it yet.
    ///
    /// Taking it clears it. An outcome left untaken survives the next submission, including one
    /// made from the completion callback, and is only replaced when that transaction ends too.
    pub fn try_outcome(&self) -> Option<Result<(), Error>> {
        self.outcome.try_take()
    }

    /// Waits for the next outcome [`Channel::try_outcome`] would return.
    pub async fn wait(&self) -> Result<(), Error> {
        self.outcome.wait().await
    }

    /// Starts a transaction and returns right away.
    ///
    /// `sequence` is walked by the interrupt handler, received bytes land in `receive` in
    /// order. `callback` is called with `user_data` from interrupt context on success only;
    /// failures are observed through [`Channel::status`], [`Channel::last_error`] or
    /// [`Channel::wait`].
    pub fn submit(
        &self,
        sequence: &'static [u16],
        receive: &'static mut [u8],
        callback: Option<Callback>,
        user_data: UserData,
    ) -> Result<(), Rejected> {
        let address = critical_section::with(|cs| {
            if self.status_holder.is_busy() {
                return Err((SubmitError::Busy, receive));
            }
            if let Err(e) = sequence::validate(sequence, receive.len()) {
                return Err((SubmitError::InvalidSequence(e), receive));
            }

            let mut transfer = Transfer::new(sequence, receive, callback, user_data);
            let address = transfer.next_byte();
            *self.transfer.borrow_ref_mut(cs) = Some(transfer);

            self.last_error.borrow(cs).set(None);
            self.status_holder.claim(cs);
            Ok(address)
        })
        .map_err(|(reason, receive)| {
            warn!("i2c: submission rejected: {}", reason);
            Rejected { reason, receive }
        })?;

        let regs = &self.regs;

        // Stale request from whatever ran before.
        regs.s_clear(s::IICIF);
        regs.c1_wr(c1::IICEN | c1::IICIE);

        // START, master transmitter.
        regs.c1_set(c1::MST | c1::TX);

        if regs.s_rd() & s::ARBL != 0 {
            regs.c1_clear(c1::IICIE | c1::MST | c1::TX);
            regs.s_clear(s::ARBL);

            let error = critical_section::with(|cs| self.record_failure(cs, Reason::ArbitrationLoss));
            self.outcome.signal(Err(error));

            let receive = critical_section::with(|cs| {
                self.transfer
                    .borrow_ref_mut(cs)
                    .take()
                    .map(Transfer::into_received)
            })
            .unwrap_or(&mut []);

            warn!("i2c: arbitration lost on START");
            return Err(Rejected {
                reason: SubmitError::ArbitrationLost,
                receive,
            });
        }

        trace!("i2c: START, address {=u8:#x}", address);
        regs.d_wr(address);

        Ok(())
    }

    pub(crate) fn with_transfer<T>(
        &self,
        cs: CriticalSection,
        f: impl FnOnce(&mut Transfer) -> T,
    ) -> Option<T> {
        self.transfer.borrow_ref_mut(cs).as_mut().map(f)
    }

    /// Stop path. The only place a transaction succeeds.
    pub(crate) fn complete(&self) {
        self.regs.c1_clear(c1::MST | c1::IICIE | c1::TXAK);

        let notify = critical_section::with(|cs| {
            self.status_holder.settle(cs, Status::Available);
            self.transfer
                .borrow_ref(cs)
                .as_ref()
                .map(|t| (t.callback, t.user_data))
        });

        trace!("i2c: STOP, sequence done");
        self.outcome.signal(Ok(()));

        // The descriptor is released, so the callback may submit the next transaction.
        if let Some((Some(callback), user_data)) = notify {
            callback(user_data);
        }
    }

    /// Error path. Clearing MST puts a STOP on the bus.
    pub(crate) fn fail(&self, reason: Reason) {
        self.regs.c1_clear(c1::MST | c1::IICIE);

        let error = critical_section::with(|cs| self.record_failure(cs, reason));

        warn!("i2c: transaction failed: {}", reason);
        self.outcome.signal(Err(error));
    }

    fn record_failure(&self, cs: CriticalSection, reason: Reason) -> Error {
        self.status_holder.settle(cs, Status::Error);
        self.last_error.borrow(cs).set(Some(reason));

        Error {
            #[cfg(feature = "dump")]
            dump: self.dump_status(cs),
            reason,
        }
    }

    #[cfg(feature = "dump")]
    pub fn dump_status(&self, cs: CriticalSection) -> StatusDump {
        StatusDump {
            status_history: self.status_holder.history(cs),
            current_status: self.status(),
        }
    }
}
