use crate::{
    channel::Channel,
    config::RestartQuirks,
    registers::{c1, f, s, I2cRegisters},
    sequence::Instruction,
    transfer::Transfer,
    Direction, Reason, Status,
};

/// Outcome of one interrupt's worth of bus work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Continue,
    Complete,
    Failed(Reason),
}

/// Advances the channel's transaction by one byte. Call from the I2C interrupt vector.
pub fn handle_interrupt<R: I2cRegisters>(channel: &Channel<R>) {
    let regs = channel.registers();
    let status = regs.s_rd();

    if status & s::IICIF == 0 {
        return;
    }

    // Acknowledge before anything else touches the module, or the next request can be lost.
    regs.s_clear(s::IICIF);

    if channel.status() != Status::Busy {
        trace!("i2c: interrupt with no transaction in flight");
        return;
    }

    let step = if status & s::ARBL != 0 {
        regs.s_clear(s::ARBL);
        Step::Failed(Reason::ArbitrationLoss)
    } else {
        critical_section::with(|cs| {
            channel.with_transfer(cs, |transfer| match transfer.direction {
                Direction::Reading => read_step(regs, channel.quirks(), transfer),
                Direction::Writing => write_step(regs, channel.quirks(), transfer, status),
            })
        })
        .unwrap_or(Step::Continue)
    };

    match step {
        Step::Continue => {}
        Step::Complete => channel.complete(),
        Step::Failed(reason) => channel.fail(reason),
    }
}

/// Receive side. The data register always holds the byte that arrived on the previous
/// interrupt, and reading it clocks in the next one while in receive mode.
fn read_step<R: I2cRegisters>(regs: &R, quirks: &RestartQuirks, transfer: &mut Transfer) -> Step {
    match transfer.reads_ahead {
        0 => {
            // TX first, so the final data register read does not start another bus read.
            regs.c1_set(c1::TX);
            transfer.store(regs.d_rd());

            if transfer.peek() != Some(Instruction::Restart) {
                return Step::Complete;
            }

            transfer.advance();
            transfer.direction = Direction::Writing;
            repeated_start(regs, quirks, 0);
            regs.d_wr(transfer.next_byte());
            return Step::Continue;
        }
        1 => {
            // The byte this read triggers is the last one of the burst.
            regs.c1_set(c1::TXAK);
            transfer.store(regs.d_rd());
        }
        _ => transfer.store(regs.d_rd()),
    }

    transfer.reads_ahead -= 1;
    transfer.advance();
    Step::Continue
}

fn write_step<R: I2cRegisters>(
    regs: &R,
    quirks: &RestartQuirks,
    transfer: &mut Transfer,
    status: u8,
) -> Step {
    if transfer.at_end() {
        return Step::Complete;
    }

    if status & s::RXAK != 0 {
        return Step::Failed(Reason::Nack);
    }

    let Some(next) = transfer.peek() else {
        return Step::Complete;
    };

    match next {
        Instruction::Restart => {
            // Always followed by an address byte.
            transfer.advance();
            repeated_start(regs, quirks, c1::TX);
            regs.d_wr(transfer.next_byte());
            return Step::Continue;
        }
        Instruction::Read => {
            transfer.direction = Direction::Reading;
            let burst = transfer.burst_len();

            regs.c1_clear(c1::TX);
            if burst == 1 {
                regs.c1_set(c1::TXAK);
            } else {
                regs.c1_clear(c1::TXAK);
            }

            // Dummy read. Starts the first bus read, the payload shows up on the next interrupt.
            let _ = regs.d_rd();
            transfer.reads_ahead = burst - 1;
            trace!("i2c: reading {=usize} bytes", burst);
        }
        Instruction::Write(byte) => regs.d_wr(byte),
    }

    transfer.advance();
    Step::Continue
}

fn repeated_start<R: I2cRegisters>(regs: &R, quirks: &RestartQuirks, extra: u8) {
    // Erratum 6070: RSTA is ignored while F[MULT] is non-zero.
    let saved_f = quirks.zero_mult.then(|| {
        let saved = regs.f_rd();
        regs.f_wr(saved & !f::MULT_MASK);
        saved
    });

    regs.c1_set(c1::RSTA | extra);

    if let Some(saved) = saved_f {
        regs.f_wr(saved);
    }

    for _ in 0..quirks.settle_spins {
        core::hint::spin_loop();
    }

    trace!("i2c: repeated START");
}
