//! USB Device subsystem - presents a boot keyboard to the host.
//!
//! The nRF52840's built-in USB 2.0 Full-Speed controller is driven by
//! `embassy-usb`.  One HID interface carries the 8-byte keyboard input
//! report; the host's LED output report arrives over the control pipe.
//!
//! The dispatch loop talks to the stack only through [`UsbLink`]: reports
//! go into a channel drained by the writer task, connection and LED state
//! come back through atomics updated by the stack's handlers.

pub mod hid_device;

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use ps2hid::config::HID_REPORT_QUEUE_DEPTH;
use ps2hid::hid::{HidLink, KeyboardReport, Transport};
use ps2hid::Error;

/// Reports waiting for the USB writer task.
pub static USB_REPORTS: Channel<CriticalSectionRawMutex, KeyboardReport, HID_REPORT_QUEUE_DEPTH> =
    Channel::new();

/// Host selected our configuration.
static CONFIGURED: AtomicBool = AtomicBool::new(false);
/// Host suspended the bus.
static SUSPENDED: AtomicBool = AtomicBool::new(false);
/// Last LED output report written by the host.
static LEDS: AtomicU8 = AtomicU8::new(0);

/// Wired [`HidLink`].
pub struct UsbLink;

impl HidLink for UsbLink {
    fn transport(&self) -> Transport {
        Transport::Wired
    }

    fn is_usable(&self) -> bool {
        CONFIGURED.load(Ordering::Acquire) && !SUSPENDED.load(Ordering::Acquire)
    }

    fn send_report(&mut self, report: &KeyboardReport) -> Result<(), Error> {
        if !self.is_usable() {
            return Err(Error::NotConnected);
        }
        USB_REPORTS.try_send(*report).map_err(|_| Error::QueueFull)
    }

    fn led_output(&self) -> u8 {
        LEDS.load(Ordering::Acquire)
    }
}
