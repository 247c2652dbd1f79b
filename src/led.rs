//! Keyboard indicator LED state.
//!
//! The same three indicators travel in two encodings:
//!
//! ```text
//! HID output report (host → us):  bit0 = Num, bit1 = Caps, bit2 = Scroll
//! PS/2 0xED argument (us → kbd):  bit0 = Scroll, bit1 = Num, bit2 = Caps
//! ```

/// HID LED output bits (usage page 0x08, usages 1..3).
const HID_NUM_LOCK: u8 = 0x01;
const HID_CAPS_LOCK: u8 = 0x02;
const HID_SCROLL_LOCK: u8 = 0x04;

/// Scroll / Num / Caps lock indicator triple.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedState {
    pub scroll_lock: bool,
    pub num_lock: bool,
    pub caps_lock: bool,
}

impl LedState {
    /// All indicators dark.
    pub const OFF: Self = Self::new(false, false, false);

    /// All indicators lit (boot self-test).
    pub const ALL: Self = Self::new(true, true, true);

    pub const fn new(scroll_lock: bool, num_lock: bool, caps_lock: bool) -> Self {
        Self {
            scroll_lock,
            num_lock,
            caps_lock,
        }
    }

    /// Decode the LED byte of a HID keyboard output report.
    ///
    /// Compose / Kana bits are ignored.
    pub const fn from_hid_output(bits: u8) -> Self {
        Self {
            scroll_lock: bits & HID_SCROLL_LOCK != 0,
            num_lock: bits & HID_NUM_LOCK != 0,
            caps_lock: bits & HID_CAPS_LOCK != 0,
        }
    }

    /// Pack into the 3-bit argument of the PS/2 set-LEDs command.
    pub const fn ps2_mask(self) -> u8 {
        ((self.caps_lock as u8) << 2) | ((self.num_lock as u8) << 1) | (self.scroll_lock as u8)
    }
}
