use core::cell::RefCell;

use atomic::{Atomic, Ordering};
use critical_section::{CriticalSection, Mutex};
use heapless::Deque;

use crate::Status;

/// Channel status plus the last `N` transitions it went through.
///
/// Only two moves exist: [`StatusHolder::claim`] into `Busy` from the foreground, and
/// [`StatusHolder::settle`] out of it from the interrupt handler.
pub struct StatusHolder<const N: usize> {
    transitions: Mutex<RefCell<Deque<Status, N>>>,
    status: Atomic<Status>,
}

impl<const N: usize> StatusHolder<N> {
    pub const fn new() -> Self {
        Self {
            transitions: Mutex::new(RefCell::new(Deque::new())),
            status: Atomic::new(Status::Available),
        }
    }

    pub fn get(&self) -> Status {
        self.status.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.get() == Status::Busy
    }

    /// Marks a new transaction as in flight. Callers check [`StatusHolder::is_busy`] first.
    pub fn claim(&self, cs: CriticalSection) {
        self.record(cs, Status::Busy);
    }

    /// Ends the transaction in flight with `Available` or `Error`.
    pub fn settle(&self, cs: CriticalSection, outcome: Status) {
        debug_assert!(outcome != Status::Busy);
        self.record(cs, outcome);
    }

    /// Transitions oldest first. Slots not yet used read as `Available`, the reset status.
    #[allow(dead_code)]
    pub fn history(&self, cs: CriticalSection) -> [Status; N] {
        let transitions = self.transitions.borrow_ref(cs);
        let mut history = [Status::Available; N];
        let unused = N - transitions.len();

        for (slot, &status) in history[unused..].iter_mut().zip(transitions.iter()) {
            *slot = status;
        }
        history
    }

    fn record(&self, cs: CriticalSection, status: Status) {
        let mut transitions = self.transitions.borrow_ref_mut(cs);
        if transitions.is_full() {
            transitions.pop_front();
        }
        // A slot was just freed.
        let _ = transitions.push_back(status);
        self.status.store(status, Ordering::SeqCst);
    }
}
