//! Host-facing keyboard output over a wired or wireless HID link.
//!
//! [`KeyboardOutput`] owns the report state and gates every host-visible
//! action on the link being usable.  The link itself ([`HidLink`]) is the
//! thin seam to the USB or BLE stack: it only moves finished reports and
//! exposes the host's view of the connection and LEDs.

use heapless::Vec;

use super::keyboard::KeyboardReport;
use super::KeyChord;
use crate::error::Error;
use crate::led::LedState;

/// Which kind of host link a backend drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transport {
    /// USB device (usable once the host configured it).
    Wired,
    /// BLE HID-over-GATT peripheral (usable while a central is connected).
    Wireless,
}

/// Report-sending capability of an external HID stack.
pub trait HidLink {
    /// Transport this link belongs to.
    fn transport(&self) -> Transport;

    /// Projection of the stack's connection state onto "can send reports".
    fn is_usable(&self) -> bool;

    /// Queue a complete input report towards the host.
    fn send_report(&mut self, report: &KeyboardReport) -> Result<(), Error>;

    /// Raw LED byte of the last output report written by the host.
    ///
    /// Links without a working host → device report channel return 0.
    fn led_output(&self) -> u8;

    /// Ask the stack to become discoverable.  Links that need no
    /// negotiation ignore this.
    fn start_advertising(&mut self) {}
}

/// Most chords tracked as held at once: six keys plus eight modifiers.
const MAX_HELD_CHORDS: usize = 14;

/// Keyboard state bound to one HID link.
pub struct KeyboardOutput<L> {
    link: L,
    report: KeyboardReport,
    /// Chords currently down, one entry per physical key.  A key shared by
    /// two chords (Shift held under a shifted symbol) stays in the report
    /// until the last of them is released.
    held: Vec<KeyChord, MAX_HELD_CHORDS>,
    was_usable: bool,
}

impl<L: HidLink> KeyboardOutput<L> {
    /// Wrap a link and bring the host to a clean all-released state.
    ///
    /// A wireless link that is not connected yet starts advertising; an
    /// existing connection is kept as it is.
    pub fn new(mut link: L) -> Self {
        if link.transport() == Transport::Wireless {
            if link.is_usable() {
                info!("BLE already connected");
            } else {
                info!("BLE advertising");
                link.start_advertising();
            }
        }

        let was_usable = link.is_usable();
        let mut output = Self {
            link,
            report: KeyboardReport::empty(),
            held: Vec::new(),
            was_usable,
        };
        output.flush();
        output
    }

    pub fn transport(&self) -> Transport {
        self.link.transport()
    }

    pub fn is_usable(&self) -> bool {
        self.link.is_usable()
    }

    /// Current report contents.
    pub fn report(&self) -> &KeyboardReport {
        &self.report
    }

    /// Press every key of `chord` and send one report.
    pub fn press(&mut self, chord: &KeyChord) {
        if !self.link.is_usable() {
            return;
        }
        if !self.held.contains(chord) && self.held.push(chord.clone()).is_err() {
            warn!("too many keys held, release of {} may be early", chord);
        }
        for &key in chord.keys() {
            if let Err(e) = self.report.press(key) {
                warn!("HID press {:x} dropped: {}", key.usage(), e);
            }
        }
        self.send();
    }

    /// Release every key of `chord` and send one report.
    pub fn release(&mut self, chord: &KeyChord) {
        if !self.link.is_usable() {
            return;
        }
        self.held.retain(|held| held != chord);
        for &key in chord.keys() {
            if !self.held.iter().any(|held| held.contains(key)) {
                self.report.release(key);
            }
        }
        self.send();
    }

    /// Press or release depending on `release`.
    pub fn apply(&mut self, chord: &KeyChord, release: bool) {
        if release {
            self.release(chord);
        } else {
            self.press(chord);
        }
    }

    /// Release all keys.
    pub fn flush(&mut self) {
        if !self.link.is_usable() {
            return;
        }
        self.report.clear();
        self.held.clear();
        self.send();
    }

    /// LED indicators as reported by the host; all dark while unusable.
    pub fn led_state(&self) -> LedState {
        if !self.link.is_usable() {
            return LedState::OFF;
        }
        LedState::from_hid_output(self.link.led_output())
    }

    /// Track link transitions.  A link that just became usable gets a
    /// release-all report before any new input.
    pub fn poll(&mut self) {
        let usable = self.link.is_usable();
        if usable && !self.was_usable {
            info!("{} link up, releasing all keys", self.link.transport());
            self.flush();
        } else if !usable && self.was_usable {
            info!("{} link down", self.link.transport());
        }
        self.was_usable = usable;
    }

    fn send(&mut self) {
        if let Err(e) = self.link.send_report(&self.report) {
            warn!("HID report not sent: {}", e);
        }
    }
}
