//! Scancode set 2 sequence decoder.
//!
//! The two prefixes are independent flags rather than a four-state
//! machine: `E0 F0 75` (extended release) and `F0 75` (plain release)
//! both just accumulate flags until a payload byte arrives.

use super::{PAYLOAD_MAX, PREFIX_EXTENDED, PREFIX_RELEASE};

/// One decoded key transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanEvent<K> {
    /// Table lookup result; `None` for codes the table does not map.
    pub key: Option<K>,
    /// Payload byte that completed the sequence.
    pub code: u8,
    /// 0xE0 preceded the payload.
    pub extended: bool,
    /// 0xF0 preceded the payload (key up).
    pub release: bool,
}

/// A completed sequence before table lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawScan {
    pub code: u8,
    pub extended: bool,
    pub release: bool,
}

/// Outcome of feeding one byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// A prefix was recorded; more bytes needed.
    Pending,
    /// A payload byte completed the sequence.
    Complete(RawScan),
    /// Neither prefix nor payload.  Pending prefixes are kept.
    Discarded,
}

/// Prefix flags accumulated since the last payload byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanDecoder {
    extended: bool,
    release: bool,
}

impl ScanDecoder {
    pub const fn new() -> Self {
        Self {
            extended: false,
            release: false,
        }
    }

    /// `true` if a prefix has been seen without its payload yet.
    pub fn is_pending(&self) -> bool {
        self.extended || self.release
    }

    pub fn feed(&mut self, byte: u8) -> Step {
        match byte {
            PREFIX_EXTENDED => {
                self.extended = true;
                Step::Pending
            }
            PREFIX_RELEASE => {
                self.release = true;
                Step::Pending
            }
            0..=PAYLOAD_MAX => {
                let scan = RawScan {
                    code: byte,
                    extended: self.extended,
                    release: self.release,
                };
                *self = Self::new();
                Step::Complete(scan)
            }
            _ => Step::Discarded,
        }
    }
}
