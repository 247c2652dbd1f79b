//! HID keyboard output: keycodes, report state, layouts and backends.

pub mod keyboard;
pub mod keycode;
pub mod layout;
pub mod output;


use heapless::Vec;

pub use keyboard::KeyboardReport;
pub use keycode::Keycode;
pub use output::{HidLink, KeyboardOutput, Transport};

/// Most keys a single logical key can expand to (key + Shift).
pub const MAX_CHORD_KEYS: usize = 2;

/// Keys that are pressed and released together for one logical key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyChord(Vec<Keycode, MAX_CHORD_KEYS>);

impl KeyChord {
    pub fn single(key: Keycode) -> Self {
        let mut keys = Vec::new();
        let _ = keys.push(key);
        Self(keys)
    }

    /// `key` with Left Shift held.
    pub fn shifted(key: Keycode) -> Self {
        let mut keys = Vec::new();
        let _ = keys.push(keycode::LEFT_SHIFT);
        let _ = keys.push(key);
        Self(keys)
    }

    pub fn keys(&self) -> &[Keycode] {
        &self.0
    }

    pub fn contains(&self, key: Keycode) -> bool {
        self.0.contains(&key)
    }
}

/// A key identifier produced by a scancode table.
///
/// Resolution to host keycodes is a property of the table flavour, picked
/// once at startup: direct keycodes map to themselves, key names go
/// through a layout.
pub trait KeyId: Copy {
    fn chord(self) -> Option<KeyChord>;
}

impl KeyId for Keycode {
    fn chord(self) -> Option<KeyChord> {
        Some(KeyChord::single(self))
    }
}
