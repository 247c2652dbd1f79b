//! Unified error type for ps2hid.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // PS/2
    /// The wire driver reported a framing/parity fault. Carries the
    /// error flags that were pending on the port.
    LinkFault(u8),

    /// A command was answered with something other than ACK (0xFA).
    NoAck(u8),

    /// No byte arrived within the polling window.
    Timeout,

    // HID
    /// All six non-modifier slots of the report are already in use.
    RolloverFull,

    /// The backend's host link is not usable right now.
    NotConnected,

    /// The report queue towards the backend task is full.
    QueueFull,

    /// No HID backend of this kind exists on this build/board.
    BackendUnavailable,

    // USB
    /// USB stack returned an error.
    Usb,

    // BLE
    /// The SoftDevice returned a BLE-level error.
    Ble(BleError),
}

/// Subset of BLE errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleError {
    /// GAP / GATT raw error code from the SoftDevice.
    Raw(u32),
    /// Advertising could not start.
    AdvertiseFailed,
    /// HID service registration failed.
    RegisterFailed,
    /// Input report notification failed.
    NotifyFailed,
}

// Convenience conversions

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Error::Ble(e)
    }
}
