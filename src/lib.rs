//! PS/2 keyboard → USB / BLE HID bridge, protocol core.
//!
//! Everything that does not touch hardware lives here so it can be
//! tested on the host:
//!
//! - [`ps2`]: byte transport, scancode decoder, LED/diagnostic commands
//! - [`scancode`]: scancode set 2 tables (HID keycodes and key names)
//! - [`hid`]: keyboard report state, US layout, wired/wireless output
//! - [`dispatch`]: the main loop tying them together
//!
//! Usage: `cargo test`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and supplies the hardware sides of [`ps2::Ps2Port`], [`ps2::Clock`]
//! and [`hid::HidLink`].

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod dispatch;
pub mod error;
pub mod hid;
pub mod led;
pub mod ps2;
pub mod scancode;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::Dispatcher;
pub use error::Error;
pub use led::LedState;
