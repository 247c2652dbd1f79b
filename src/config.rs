//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

use core::time::Duration;

// PS/2

/// Polling window for a single byte / scancode read.
pub const PS2_READ_TIMEOUT: Duration = Duration::from_millis(10);

/// How long `send_command` waits for the device to clock back a response.
pub const PS2_COMMAND_TIMEOUT: Duration = Duration::from_millis(25);

/// Depth of the receive queue filled by the wire driver.
pub const PS2_RX_QUEUE_DEPTH: usize = 16;

/// A gap longer than this between two clock edges abandons a partial frame.
pub const PS2_BIT_TIMEOUT: Duration = Duration::from_millis(2);

/// How long the device may take to start clocking in a host command.
pub const PS2_RTS_TIMEOUT: Duration = Duration::from_millis(15);

/// How long all three keyboard LEDs stay lit during the boot self-test.
pub const LED_SELF_TEST_HOLD: Duration = Duration::from_millis(500);

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Both lines are open-drain with pull-ups; a
// 5 V keyboard needs level shifting.
//
//   PS/2 DATA   → P0.03
//   PS/2 CLOCK  → P0.04

// Key table

/// Which scancode table the decoder consults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeySource {
    /// Direct scancode → HID keycode table (layout-free).
    Keycodes,
    /// Scancode → key name table, resolved through the US layout.
    Names,
}

/// Table selection made once at startup.
pub const KEY_SOURCE: KeySource = KeySource::Keycodes;

// HID

/// Depth of the report queue between the dispatch loop and each backend task.
pub const HID_REPORT_QUEUE_DEPTH: usize = 16;

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0002;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "ps2hid";
pub const USB_PRODUCT: &str = "PS/2 to USB Keyboard";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// USB HID polling interval (ms). 1 ms = 1000 Hz for lowest latency.
pub const USB_HID_POLL_MS: u8 = 1;

// BLE

/// Advertised complete local name.
pub const BLE_DEVICE_NAME: &str = "PS2 Keyboard Adapter";

/// GAP appearance: Keyboard (Bluetooth assigned numbers, 0x03C1).
pub const BLE_APPEARANCE: u16 = 0x03C1;

/// Device Information manufacturer string.
pub const BLE_MANUFACTURER: &str = "ps2hid";

/// Advertising interval (in 0.625 ms units). 160 = 100 ms.
pub const BLE_ADV_INTERVAL: u32 = 160;

/// Preferred connection interval range (in 1.25 ms units).
/// 6 = 7.5 ms (lowest latency for HID).
pub const BLE_CONN_INTERVAL_MIN: u16 = 6;
pub const BLE_CONN_INTERVAL_MAX: u16 = 12;

/// Slave latency (number of connection events we may skip).
pub const BLE_SLAVE_LATENCY: u16 = 0;

/// Supervision timeout (in 10 ms units). 400 = 4 s.
pub const BLE_SUP_TIMEOUT: u16 = 400;

/// Start advertising again once the host drops the link.
pub const BLE_READVERTISE_ON_DISCONNECT: bool = true;

/// Maximum number of bonded hosts remembered (RAM only, lost on reset).
pub const BLE_MAX_BONDS: usize = 4;
