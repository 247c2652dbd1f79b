//! PS/2 keyboard transport.
//!
//! [`Ps2Keyboard`] sits on top of a byte-level port provided by the wire
//! driver ([`Ps2Port`]) and a monotonic clock ([`Clock`]).  All waits are
//! bounded busy-polls: nothing here blocks longer than the timeout it was
//! given.
//!
//! Bytes on the wire (scancode set 2):
//! ```text
//! 0x00..=0x8F  payload (key code)
//! 0xE0         extended prefix
//! 0xF0         release prefix (also the get/set scancode set command)
//! 0xFA         command acknowledgement
//! ```

pub mod decoder;
pub mod frame;

#[cfg(test)]
mod tests;

use core::time::Duration;

use crate::error::Error;
use crate::led::LedState;
use crate::scancode::ScancodeTable;

pub use decoder::{RawScan, ScanDecoder, ScanEvent, Step};

/// Highest payload byte; also the length of the dense scancode table - 1.
pub const PAYLOAD_MAX: u8 = 0x8F;
/// Extended-key prefix.
pub const PREFIX_EXTENDED: u8 = 0xE0;
/// Key-release prefix.
pub const PREFIX_RELEASE: u8 = 0xF0;
/// Device acknowledgement of a host command.
pub const ACK: u8 = 0xFA;

/// Host → keyboard commands.
pub mod command {
    /// Set LEDs; followed by the 3-bit indicator mask.
    pub const SET_LEDS: u8 = 0xED;
    /// Get/set scancode set; followed by a subcommand.
    pub const SCANCODE_SET: u8 = 0xF0;
    /// Subcommand of [`SCANCODE_SET`]: report the current set.
    pub const GET_SCANCODE_SET: u8 = 0x00;
}

/// Byte-level access to the PS/2 wire driver.
///
/// The receive side is a queue filled asynchronously by the driver.  The
/// only guarantee is "read the current length, then pop": the queue may
/// grow between the two.
pub trait Ps2Port {
    /// Bytes currently waiting in the receive queue.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the oldest received byte.
    fn pop_front(&mut self) -> Option<u8>;

    /// Clock a command byte out to the device and return its response
    /// byte.  Fails with [`Error::LinkFault`] when the driver flags a
    /// framing/parity problem or the device never answers.
    fn send_command(&mut self, byte: u8) -> Result<u8, Error>;

    /// Return and reset the driver's pending error flags
    /// (see [`frame::flags`]).
    fn clear_errors(&mut self) -> u8;
}

/// Monotonic microsecond clock.
pub trait Clock {
    fn now_micros(&self) -> u64;

    /// Busy-wait for `duration`.
    fn spin_for(&self, duration: Duration) {
        let start = self.now_micros();
        let limit = duration_micros(duration);
        while self.now_micros().saturating_sub(start) < limit {}
    }
}

fn duration_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// PS/2 keyboard on a port, decoding through one scancode table.
pub struct Ps2Keyboard<P, C, K: 'static> {
    port: P,
    clock: C,
    table: &'static ScancodeTable<K>,
    /// Last LED mask written; `None` until the first write.
    leds: Option<u8>,
}

impl<P: Ps2Port, C: Clock, K: Copy> Ps2Keyboard<P, C, K> {
    /// Take over the port, dropping anything received before now.
    pub fn new(port: P, clock: C, table: &'static ScancodeTable<K>) -> Self {
        let mut keyboard = Self {
            port,
            clock,
            table,
            leds: None,
        };
        keyboard.flush();
        keyboard
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Last LED mask sent, if any.
    pub fn cached_leds(&self) -> Option<u8> {
        self.leds
    }

    /// Drain the receive queue.
    ///
    /// The driver may append while we drain, so emptiness is re-checked
    /// on every pass instead of trusting a length captured up front.
    pub fn flush(&mut self) {
        let mut dropped = 0usize;
        while !self.port.is_empty() {
            if self.port.pop_front().is_none() {
                break;
            }
            dropped += 1;
        }
        if dropped > 0 {
            debug!("flushed {} stale bytes", dropped);
        }
    }

    /// Send a command byte; returns the device's response.
    ///
    /// Link faults are cleared and logged here, never propagated: the
    /// command is best-effort and not retried.
    pub fn send_command(&mut self, value: u8) -> Option<u8> {
        match self.port.send_command(value) {
            Ok(rc) => {
                debug!("cmd:{:x} rc:{:x}", value, rc);
                if rc != ACK {
                    warn!("cmd:{:x} not acknowledged: {}", value, Error::NoAck(rc));
                }
                Some(rc)
            }
            Err(e) => {
                let flags = self.port.clear_errors();
                warn!("Failed to send cmd, cmd:{:x} err:{:x} ({})", value, flags, e);
                None
            }
        }
    }

    /// Wait up to `timeout` for one byte.
    pub fn read_byte(&mut self, timeout: Duration) -> Option<u8> {
        let start = self.clock.now_micros();
        let limit = duration_micros(timeout);
        loop {
            if !self.port.is_empty() {
                if let Some(value) = self.port.pop_front() {
                    trace!("code:{:x}", value);
                    return Some(value);
                }
            }
            if self.clock.now_micros().saturating_sub(start) > limit {
                return None;
            }
        }
    }

    /// Read bytes until one complete scancode sequence is decoded.
    ///
    /// Each byte read gets the full `timeout`.  Prefix state lives only
    /// for this call: a timeout drops a half-received sequence.  Bytes
    /// that are neither prefixes nor payload are logged and skipped
    /// without touching prefixes already seen.
    pub fn decode_scancode(&mut self, timeout: Duration) -> Option<ScanEvent<K>> {
        let mut decoder = ScanDecoder::new();
        loop {
            let code = self.read_byte(timeout)?;
            match decoder.feed(code) {
                Step::Pending => {}
                Step::Complete(scan) => {
                    return Some(ScanEvent {
                        key: self.table.lookup(scan.code, scan.extended),
                        code: scan.code,
                        extended: scan.extended,
                        release: scan.release,
                    });
                }
                Step::Discarded => warn!("UNKNOWN code {:x}", code),
            }
        }
    }

    /// Drive the keyboard indicators.  Only sends when the mask differs
    /// from the last one written; the cache is updated even if the device
    /// did not acknowledge.
    pub fn set_leds(&mut self, leds: LedState) {
        let mask = leds.ps2_mask();
        if self.leds == Some(mask) {
            return;
        }
        if self.send_command(command::SET_LEDS) == Some(ACK) {
            self.send_command(mask);
        }
        self.leds = Some(mask);
    }

    pub fn clear_leds(&mut self) {
        self.set_leds(LedState::OFF);
    }

    pub fn fill_leds(&mut self) {
        self.set_leds(LedState::ALL);
    }

    /// Ask the keyboard which scancode set it is using.  Diagnostic only.
    pub fn get_scancode_set_id(&mut self, timeout: Duration) -> Option<u8> {
        self.send_command(command::SCANCODE_SET);
        self.send_command(command::GET_SCANCODE_SET);
        self.read_byte(timeout)
    }
}
