//! Bus instruction streams.
//!
//! A transaction is described by a flat slice of `u16` words. Values `0..=0xFF` are data bytes to
//! transmit; [`RESTART`] and [`READ`] live above the byte range so they can never be confused with
//! data. Every transaction begins with a START and ends with a STOP, neither of which is spelled
//! out in the stream.

use heapless::Vec;

/// Generate a repeated start. Must be followed by an address byte.
pub const RESTART: u16 = 1 << 8;

/// Receive one byte.
pub const READ: u16 = 2 << 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Instruction {
    Write(u8),
    Restart,
    Read,
}

impl Instruction {
    /// Decodes a stream word, `None` for words in the reserved range that mean nothing.
    pub const fn decode(word: u16) -> Option<Self> {
        match word {
            0..=0xFF => Some(Instruction::Write(word as u8)),
            RESTART => Some(Instruction::Restart),
            READ => Some(Instruction::Read),
            _ => None,
        }
    }

    pub const fn encode(self) -> u16 {
        match self {
            Instruction::Write(byte) => byte as u16,
            Instruction::Restart => RESTART,
            Instruction::Read => READ,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequenceError {
    /// Fewer than two words.
    TooShort,
    /// The first word, or the word after a restart, is not an address byte.
    MissingAddress { index: usize },
    /// Word at `index` is neither a byte nor a known control marker.
    UnknownWord { index: usize, word: u16 },
    /// The receive buffer cannot hold every `READ` of the stream.
    BufferTooSmall { needed: usize, available: usize },
    /// The [`Sequence`] builder ran out of room.
    Capacity,
}

/// Number of consecutive `READ` words starting at `cursor`, the one at `cursor` included.
///
/// This is the length of the read burst the engine is about to start. Knowing it before the first
/// byte arrives is what lets the last byte of the burst be NACKed on time.
pub fn reads_ahead(stream: &[u16], cursor: usize) -> usize {
    stream
        .get(cursor..)
        .map(|rest| rest.iter().take_while(|&&w| w == READ).count())
        .unwrap_or(0)
}

/// Total number of bytes a stream receives.
pub fn read_count(stream: &[u16]) -> usize {
    stream.iter().filter(|&&w| w == READ).count()
}

/// Checks the structural rules the interrupt handler relies on.
pub fn validate(stream: &[u16], receive_len: usize) -> Result<(), SequenceError> {
    if stream.len() < 2 {
        return Err(SequenceError::TooShort);
    }

    let mut expect_address = true;
    for (index, &word) in stream.iter().enumerate() {
        let instruction =
            Instruction::decode(word).ok_or(SequenceError::UnknownWord { index, word })?;

        match instruction {
            Instruction::Write(_) => expect_address = false,
            _ if expect_address => return Err(SequenceError::MissingAddress { index }),
            Instruction::Restart => expect_address = true,
            Instruction::Read => {}
        }
    }

    // A trailing restart leaves an address pending.
    if expect_address {
        return Err(SequenceError::MissingAddress {
            index: stream.len(),
        });
    }

    let needed = read_count(stream);
    if needed > receive_len {
        return Err(SequenceError::BufferTooSmall {
            needed,
            available: receive_len,
        });
    }

    Ok(())
}

/// Fixed-capacity builder for instruction streams.
///
/// [`crate::Channel::submit`] walks the stream from interrupt context, so it takes a
/// `&'static [u16]`. Build the sequence inside a `static_cell::StaticCell` to get one without
/// `static mut`:
///
/// ```
/// use kinetis_async_i2c_master::Sequence;
/// use static_cell::StaticCell;
///
/// static READ_WHO_AM_I: StaticCell<Sequence<5>> = StaticCell::new();
///
/// // Read register 0x0D of the device at 0x1D.
/// let seq = READ_WHO_AM_I.init(Sequence::new());
/// seq.write(0x1D << 1).unwrap()
///     .write(0x0D).unwrap()
///     .restart().unwrap()
///     .write((0x1D << 1) | 1).unwrap()
///     .read(1).unwrap();
///
/// let seq: &'static Sequence<5> = seq;
/// let words: &'static [u16] = seq.as_slice();
/// assert_eq!(words.len(), 5);
/// ```
///
/// A stream known at compile time needs no builder: a `static` array of words works as is.
#[derive(Debug, Clone, Default)]
pub struct Sequence<const N: usize> {
    words: Vec<u16, N>,
}

impl<const N: usize> Sequence<N> {
    pub const fn new() -> Self {
        Self { words: Vec::new() }
    }

    fn push(&mut self, word: u16) -> Result<&mut Self, SequenceError> {
        self.words.push(word).map_err(|_| SequenceError::Capacity)?;
        Ok(self)
    }

    pub fn write(&mut self, byte: u8) -> Result<&mut Self, SequenceError> {
        self.push(byte as u16)
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> Result<&mut Self, SequenceError> {
        for &byte in bytes {
            self.push(byte as u16)?;
        }
        Ok(self)
    }

    pub fn restart(&mut self) -> Result<&mut Self, SequenceError> {
        self.push(RESTART)
    }

    pub fn read(&mut self, count: usize) -> Result<&mut Self, SequenceError> {
        for _ in 0..count {
            self.push(READ)?;
        }
        Ok(self)
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.words
    }

    pub fn read_count(&self) -> usize {
        read_count(&self.words)
    }
}
