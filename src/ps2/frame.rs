//! PS/2 wire framing.
//!
//! Every byte travels as an 11-bit frame clocked by the device:
//!
//! ```text
//! start(0)  d0 d1 d2 d3 d4 d5 d6 d7  parity(odd)  stop(1)
//! ```
//!
//! Device → host frames are sampled on the falling clock edge and fed
//! into [`FrameReceiver`] bit by bit.  Host → device frames drop the
//! start bit (it is signalled by pulling DATA low before releasing CLOCK)
//! and are produced by [`host_frame_bits`].

/// Bits in a device → host frame.
pub const FRAME_BITS: u8 = 11;

/// Error flags reported by the wire driver (and returned by
/// `Ps2Port::clear_errors`).
pub mod flags {
    /// Start bit was 1.
    pub const START: u8 = 0x01;
    /// Odd parity check failed.
    pub const PARITY: u8 = 0x02;
    /// Stop bit was 0.
    pub const STOP: u8 = 0x04;
    /// Receive queue was full; a byte was dropped.
    pub const OVERRUN: u8 = 0x08;
    /// Device did not clock in a host command or acknowledge it.
    pub const NO_RESPONSE: u8 = 0x10;
}

/// Why a received frame was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    Start,
    Parity,
    Stop,
}

impl FrameError {
    /// Matching bit in [`flags`].
    pub const fn flag(self) -> u8 {
        match self {
            FrameError::Start => flags::START,
            FrameError::Parity => flags::PARITY,
            FrameError::Stop => flags::STOP,
        }
    }
}

/// Parity bit that makes the total number of ones in `byte` + parity odd.
pub const fn odd_parity(byte: u8) -> bool {
    byte.count_ones() % 2 == 0
}

/// Shift register for device → host frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameReceiver {
    data: u8,
    parity: bool,
    count: u8,
}

impl FrameReceiver {
    pub const fn new() -> Self {
        Self {
            data: 0,
            parity: false,
            count: 0,
        }
    }

    /// `true` while a frame is partially received.
    pub fn in_progress(&self) -> bool {
        self.count != 0
    }

    /// Drop a partial frame (e.g. after a clock timeout).
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feed one sampled DATA level.  Returns a result once the stop bit
    /// arrives, or immediately when the start bit is wrong so the next
    /// low bit is treated as a fresh start.
    pub fn push_bit(&mut self, bit: bool) -> Option<Result<u8, FrameError>> {
        let index = self.count;
        self.count += 1;
        match index {
            0 => {
                if bit {
                    self.reset();
                    return Some(Err(FrameError::Start));
                }
                None
            }
            1..=8 => {
                if bit {
                    self.data |= 1 << (index - 1);
                }
                None
            }
            9 => {
                self.parity = bit;
                None
            }
            _ => {
                let data = self.data;
                let parity = self.parity;
                self.reset();
                if !bit {
                    Some(Err(FrameError::Stop))
                } else if parity != odd_parity(data) {
                    Some(Err(FrameError::Parity))
                } else {
                    Some(Ok(data))
                }
            }
        }
    }
}

/// Host → device bits after the request-to-send: eight data bits LSB
/// first, odd parity, stop.
pub fn host_frame_bits(byte: u8) -> [bool; 10] {
    let mut bits = [false; 10];
    for (i, bit) in bits.iter_mut().take(8).enumerate() {
        *bit = byte & (1 << i) != 0;
    }
    bits[8] = odd_parity(byte);
    bits[9] = true;
    bits
}
