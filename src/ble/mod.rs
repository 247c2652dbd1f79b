//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **HID service** - HID-over-GATT keyboard (report map, input report,
//!    control point, protocol mode) plus Device Information.
//! 2. **Bonder** - Just Works pairing with in-RAM bond storage.
//! 3. **Peripheral task** - advertises when asked, serves one central at
//!    a time and pushes input reports as notifications.
//!
//! The dispatch loop only sees [`BleLink`]; everything else happens in
//! the peripheral task.

pub mod bonder;
pub mod hid_service;
pub mod peripheral;

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use ps2hid::config::HID_REPORT_QUEUE_DEPTH;
use ps2hid::hid::{HidLink, KeyboardReport, Transport};
use ps2hid::Error;

/// Reports waiting to be notified to the connected central.
pub static BLE_REPORTS: Channel<CriticalSectionRawMutex, KeyboardReport, HID_REPORT_QUEUE_DEPTH> =
    Channel::new();

/// A central is connected.
static CONNECTED: AtomicBool = AtomicBool::new(false);

/// Raised by [`BleLink::start_advertising`], consumed by the peripheral task.
static ADVERTISE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Wireless [`HidLink`].
pub struct BleLink;

impl HidLink for BleLink {
    fn transport(&self) -> Transport {
        Transport::Wireless
    }

    fn is_usable(&self) -> bool {
        CONNECTED.load(Ordering::Acquire)
    }

    fn send_report(&mut self, report: &KeyboardReport) -> Result<(), Error> {
        if !self.is_usable() {
            return Err(Error::NotConnected);
        }
        BLE_REPORTS.try_send(*report).map_err(|_| Error::QueueFull)
    }

    /// The HID service exposes no output report, so the host never
    /// writes LEDs over BLE.
    fn led_output(&self) -> u8 {
        0
    }

    fn start_advertising(&mut self) {
        ADVERTISE.signal(());
    }
}
