//! HID-over-GATT keyboard service and Device Information service.
//!
//! Built with the SoftDevice's runtime service builder so the report map
//! can be the exact descriptor the USB interface uses.

use defmt::{debug, info};
use nrf_softdevice::ble::gatt_server::builder::ServiceBuilder;
use nrf_softdevice::ble::gatt_server::characteristic::{Attribute, Metadata, Properties};
use nrf_softdevice::ble::gatt_server::{self, RegisterError, WriteOp};
use nrf_softdevice::ble::{Connection, SecurityMode, Uuid};
use nrf_softdevice::Softdevice;
use ps2hid::config;
use ps2hid::error::BleError;
use ps2hid::hid::keyboard::{KEYBOARD_REPORT_DESCRIPTOR, KEYBOARD_REPORT_SIZE};
use ps2hid::hid::KeyboardReport;

const DEVICE_INFORMATION: Uuid = Uuid::new_16(0x180A);
const MANUFACTURER_NAME: Uuid = Uuid::new_16(0x2A29);
const PNP_ID: Uuid = Uuid::new_16(0x2A50);

const HID_SERVICE: Uuid = Uuid::new_16(0x1812);
const HID_INFORMATION: Uuid = Uuid::new_16(0x2A4A);
const HID_REPORT_MAP: Uuid = Uuid::new_16(0x2A4B);
const HID_CONTROL_POINT: Uuid = Uuid::new_16(0x2A4C);
const HID_REPORT: Uuid = Uuid::new_16(0x2A4D);
const HID_PROTOCOL_MODE: Uuid = Uuid::new_16(0x2A4E);
const REPORT_REFERENCE: Uuid = Uuid::new_16(0x2908);

/// bcdHID 1.11, country 0, flags: remote wake + normally connectable.
const HID_INFO: [u8; 4] = [0x11, 0x01, 0x00, 0x03];
/// Report ID 0 (descriptor has none), type Input.
const INPUT_REPORT_REF: [u8; 2] = [0x00, 0x01];
/// Report protocol.
const PROTOCOL_MODE_REPORT: u8 = 0x01;
/// Vendor ID source USB-IF, then VID, PID, version (all little endian).
const PNP: [u8; 7] = {
    let vid = config::USB_VID.to_le_bytes();
    let pid = config::USB_PID.to_le_bytes();
    [0x02, vid[0], vid[1], pid[0], pid[1], 0x01, 0x00]
};

/// Attribute handles the peripheral task needs after registration.
pub struct HidServer {
    input_report: u16,
    input_cccd: u16,
    control_point: u16,
    protocol_mode: u16,
}

impl HidServer {
    /// Register both services with the SoftDevice.  Must run before
    /// advertising starts.
    pub fn new(sd: &mut Softdevice) -> Result<Self, RegisterError> {
        let mut dis = ServiceBuilder::new(sd, DEVICE_INFORMATION)?;
        dis.add_characteristic(
            MANUFACTURER_NAME,
            Attribute::new(config::BLE_MANUFACTURER.as_bytes()),
            Metadata::new(Properties::new().read()),
        )?
        .build();
        dis.add_characteristic(PNP_ID, Attribute::new(PNP), Metadata::new(Properties::new().read()))?
            .build();
        dis.build();

        let mut hid = ServiceBuilder::new(sd, HID_SERVICE)?;

        hid.add_characteristic(
            HID_INFORMATION,
            Attribute::new(HID_INFO).security(SecurityMode::JustWorks),
            Metadata::new(Properties::new().read()),
        )?
        .build();

        hid.add_characteristic(
            HID_REPORT_MAP,
            Attribute::new(KEYBOARD_REPORT_DESCRIPTOR).security(SecurityMode::JustWorks),
            Metadata::new(Properties::new().read()),
        )?
        .build();

        let mut input = hid.add_characteristic(
            HID_REPORT,
            Attribute::new([0u8; KEYBOARD_REPORT_SIZE]).security(SecurityMode::JustWorks),
            Metadata::new(Properties::new().read().notify()),
        )?;
        input.add_descriptor(
            REPORT_REFERENCE,
            Attribute::new(INPUT_REPORT_REF).security(SecurityMode::JustWorks),
        )?;
        let input = input.build();

        let control_point = hid
            .add_characteristic(
                HID_CONTROL_POINT,
                Attribute::new([0u8]).security(SecurityMode::JustWorks),
                Metadata::new(Properties::new().write_without_response()),
            )?
            .build();

        let protocol_mode = hid
            .add_characteristic(
                HID_PROTOCOL_MODE,
                Attribute::new([PROTOCOL_MODE_REPORT]).security(SecurityMode::JustWorks),
                Metadata::new(Properties::new().read().write_without_response()),
            )?
            .build();

        hid.build();

        info!("BLE HID service registered");

        Ok(Self {
            input_report: input.value_handle,
            input_cccd: input.cccd_handle,
            control_point: control_point.value_handle,
            protocol_mode: protocol_mode.value_handle,
        })
    }

    /// Push one input report to the connected central.
    pub fn notify(&self, conn: &Connection, report: &KeyboardReport) -> Result<(), BleError> {
        let mut buf = [0u8; KEYBOARD_REPORT_SIZE];
        let n = report.serialize(&mut buf);
        gatt_server::notify_value(conn, self.input_report, &buf[..n]).map_err(|_| BleError::NotifyFailed)
    }
}

impl gatt_server::Server for HidServer {
    type Event = ();

    fn on_write(
        &self,
        _conn: &Connection,
        handle: u16,
        _op: WriteOp,
        _offset: usize,
        data: &[u8],
    ) -> Option<Self::Event> {
        if handle == self.input_cccd {
            info!("HID input notifications: {}", data.first().is_some_and(|b| b & 0x01 != 0));
        } else if handle == self.control_point {
            debug!("HID control point: {:x}", data);
        } else if handle == self.protocol_mode {
            debug!("HID protocol mode: {:x}", data);
        }
        None
    }
}
