//! Simulated I2C module and slave for host tests.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    vec::Vec,
};

use crate::registers::{c1, s, I2cRegisters};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    Start,
    /// `f` is the divider register value at the moment RSTA was set.
    RepeatedStart { f: u8 },
    Stop,
    Tx(u8),
    /// A byte clocked in from the slave, and whether the master acknowledged it.
    Rx { byte: u8, ack: bool },
}

#[derive(Default)]
pub struct Sim {
    c1: Cell<u8>,
    s: Cell<u8>,
    f: Cell<u8>,
    data: Cell<u8>,

    slave_bytes: RefCell<VecDeque<u8>>,
    nack_tx_index: Cell<Option<usize>>,
    tx_count: Cell<usize>,
    last_tx_nacked: Cell<bool>,
    arbitration_on_start: Cell<bool>,
    txak_armed: Cell<usize>,

    events: RefCell<Vec<BusEvent>>,
}

impl Sim {
    /// Slave that answers reads with `bytes`, in order.
    pub fn with_rx(bytes: &[u8]) -> Self {
        let sim = Self::default();
        sim.slave_bytes.borrow_mut().extend(bytes.iter().copied());
        sim
    }

    /// The `index`-th byte transmitted (address bytes included, counting from 0) gets a NACK.
    pub fn nack_tx(&self, index: usize) {
        self.nack_tx_index.set(Some(index));
    }

    pub fn lose_arbitration_on_start(&self) {
        self.arbitration_on_start.set(true);
    }

    pub fn lose_arbitration(&self) {
        self.s.set(self.s.get() | s::ARBL);
    }

    /// Byte transfer finished: raise the request, RXAK reflecting the last transmitted byte.
    pub fn raise_interrupt(&self) {
        let mut status = self.s.get() | s::IICIF;
        if self.last_tx_nacked.get() {
            status |= s::RXAK;
        } else {
            status &= !s::RXAK;
        }
        self.s.set(status);
    }

    pub fn events(&self) -> Vec<BusEvent> {
        self.events.borrow().clone()
    }

    /// How many times TXAK went from clear to set.
    pub fn txak_armed(&self) -> usize {
        self.txak_armed.get()
    }

    pub fn c1(&self) -> u8 {
        self.c1.get()
    }

    pub fn s(&self) -> u8 {
        self.s.get()
    }

    pub fn f(&self) -> u8 {
        self.f.get()
    }

    fn push(&self, event: BusEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl I2cRegisters for Sim {
    fn c1_rd(&self) -> u8 {
        self.c1.get()
    }

    fn c1_wr(&self, val: u8) {
        let old = self.c1.get();

        if old & c1::MST == 0 && val & c1::MST != 0 {
            self.push(BusEvent::Start);
            if self.arbitration_on_start.get() {
                self.s.set(self.s.get() | s::ARBL);
            }
        }
        if old & c1::MST != 0 && val & c1::MST == 0 {
            self.push(BusEvent::Stop);
        }
        if val & c1::RSTA != 0 {
            self.push(BusEvent::RepeatedStart { f: self.f.get() });
        }
        if old & c1::TXAK == 0 && val & c1::TXAK != 0 {
            self.txak_armed.set(self.txak_armed.get() + 1);
        }

        self.c1.set(val & !c1::RSTA);
    }

    fn s_rd(&self) -> u8 {
        self.s.get()
    }

    fn s_wr(&self, val: u8) {
        self.s.set(self.s.get() & !(val & (s::ARBL | s::IICIF)));
    }

    fn d_rd(&self) -> u8 {
        let latched = self.data.get();
        let ctrl = self.c1.get();

        if ctrl & c1::MST != 0 && ctrl & c1::TX == 0 {
            let byte = self.slave_bytes.borrow_mut().pop_front().unwrap_or(0xFF);
            self.data.set(byte);
            self.push(BusEvent::Rx {
                byte,
                ack: ctrl & c1::TXAK == 0,
            });
        }

        latched
    }

    fn d_wr(&self, val: u8) {
        let index = self.tx_count.get();
        self.tx_count.set(index + 1);
        self.last_tx_nacked.set(self.nack_tx_index.get() == Some(index));
        self.push(BusEvent::Tx(val));
    }

    fn f_rd(&self) -> u8 {
        self.f.get()
    }

    fn f_wr(&self, val: u8) {
        self.f.set(val);
    }
}
