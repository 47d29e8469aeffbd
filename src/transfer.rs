use crate::{
    sequence::{self, Instruction},
    Callback, Direction, UserData,
};

/// In-flight transaction of one channel.
///
/// Installed by the submitter while the channel is not busy, then advanced only by the interrupt
/// handler until the transaction terminates.
pub(crate) struct Transfer {
    sequence: &'static [u16],
    cursor: usize,
    received: &'static mut [u8],
    written: usize,
    pub(crate) reads_ahead: usize,
    pub(crate) direction: Direction,
    pub(crate) callback: Option<Callback>,
    pub(crate) user_data: UserData,
}

impl Transfer {
    pub(crate) fn new(
        sequence: &'static [u16],
        received: &'static mut [u8],
        callback: Option<Callback>,
        user_data: UserData,
    ) -> Self {
        Self {
            sequence,
            cursor: 0,
            received,
            written: 0,
            reads_ahead: 0,
            direction: Direction::Writing,
            callback,
            user_data,
        }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.cursor >= self.sequence.len()
    }

    /// Next word without consuming it.
    pub(crate) fn peek(&self) -> Option<Instruction> {
        self.sequence
            .get(self.cursor)
            .and_then(|&word| Instruction::decode(word))
    }

    /// Next word as a data byte. Only address and data bytes are ever transmitted.
    pub(crate) fn peek_byte(&self) -> u8 {
        self.sequence.get(self.cursor).copied().unwrap_or(0) as u8
    }

    pub(crate) fn advance(&mut self) {
        self.cursor += 1;
    }

    pub(crate) fn next_byte(&mut self) -> u8 {
        let byte = self.peek_byte();
        self.advance();
        byte
    }

    /// Length of the read burst starting at the cursor.
    pub(crate) fn burst_len(&self) -> usize {
        sequence::reads_ahead(self.sequence, self.cursor)
    }

    pub(crate) fn store(&mut self, byte: u8) {
        if let Some(slot) = self.received.get_mut(self.written) {
            *slot = byte;
            self.written += 1;
        }
    }

    pub(crate) fn written(&self) -> usize {
        self.written
    }

    pub(crate) fn into_received(self) -> &'static mut [u8] {
        self.received
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{READ, RESTART};

    fn leak_sequence(words: &[u16]) -> &'static [u16] {
        std::boxed::Box::leak(words.to_vec().into_boxed_slice())
    }

    #[test]
    fn cursor_walks_the_stream() {
        let seq = leak_sequence(&[0x3a, 0x0d, RESTART, 0x3b, READ, READ]);
        let mut transfer = Transfer::new(seq, &mut [], None, UserData(0));

        assert_eq!(transfer.next_byte(), 0x3a);
        assert_eq!(transfer.peek(), Some(Instruction::Write(0x0d)));
        transfer.advance();
        assert_eq!(transfer.peek(), Some(Instruction::Restart));
        transfer.advance();
        transfer.advance();
        assert_eq!(transfer.burst_len(), 2);
        transfer.advance();
        transfer.advance();
        assert!(transfer.at_end());
        assert_eq!(transfer.peek(), None);
    }

    #[test]
    fn store_never_overruns() {
        let buf: &'static mut [u8] = std::boxed::Box::leak(std::boxed::Box::new([0u8; 1]));
        let mut transfer = Transfer::new(leak_sequence(&[0x3b, READ]), buf, None, UserData(0));

        transfer.store(0xAA);
        transfer.store(0xBB);
        assert_eq!(transfer.written(), 1);
        assert_eq!(transfer.into_received(), &[0xAA]);
    }
}
