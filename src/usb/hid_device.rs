//! USB HID keyboard device.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral and exposes one keyboard endpoint.  VBUS is reported by the
//! SoftDevice (it owns the POWER peripheral), see [`vbus`].

use core::sync::atomic::Ordering;

use defmt::{info, warn};
use embassy_nrf::usb::vbus_detect::SoftwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{self, bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Receiver;
use embassy_sync::once_lock::OnceLock;
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, ReportId, RequestHandler, State};
use embassy_usb::control::OutResponse;
use embassy_usb::{Builder, Config, UsbDevice};
use ps2hid::config;
use ps2hid::config::HID_REPORT_QUEUE_DEPTH;
use ps2hid::hid::keyboard::{KEYBOARD_REPORT_DESCRIPTOR, KEYBOARD_REPORT_SIZE};
use ps2hid::hid::KeyboardReport;
use ps2hid::Error;
use static_cell::StaticCell;

use super::{CONFIGURED, LEDS, SUSPENDED};

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
});

pub type UsbDriver = Driver<'static, peripherals::USBD, &'static SoftwareVbusDetect>;

static VBUS: OnceLock<SoftwareVbusDetect> = OnceLock::new();
static KB_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static USB_STATE_HANDLER: StaticCell<UsbStateHandler> = StaticCell::new();
static KB_REQUEST_HANDLER: StaticCell<KeyboardRequestHandler> = StaticCell::new();

/// VBUS state fed from SoftDevice power events.
pub fn vbus() -> &'static SoftwareVbusDetect {
    VBUS.get_or_init(|| SoftwareVbusDetect::new(false, false))
}

/// Tracks the states that decide whether reports can reach the host.
struct UsbStateHandler;

impl embassy_usb::Handler for UsbStateHandler {
    fn enabled(&mut self, enabled: bool) {
        if !enabled {
            CONFIGURED.store(false, Ordering::Release);
            LEDS.store(0, Ordering::Release);
        }
    }

    fn reset(&mut self) {
        CONFIGURED.store(false, Ordering::Release);
    }

    fn configured(&mut self, configured: bool) {
        info!("USB configured: {}", configured);
        CONFIGURED.store(configured, Ordering::Release);
    }

    fn suspended(&mut self, suspended: bool) {
        info!("USB suspended: {}", suspended);
        SUSPENDED.store(suspended, Ordering::Release);
    }
}

/// Captures the LED output report (SET_REPORT on the control pipe).
struct KeyboardRequestHandler;

impl RequestHandler for KeyboardRequestHandler {
    fn set_report(&mut self, _id: ReportId, data: &[u8]) -> OutResponse {
        match data.first() {
            Some(&bits) => {
                LEDS.store(bits, Ordering::Release);
                OutResponse::Accepted
            }
            None => OutResponse::Rejected,
        }
    }
}

/// Build result containing the USB device runner and the keyboard writer.
pub struct UsbHidDevice {
    pub device: UsbDevice<'static, UsbDriver>,
    pub keyboard_writer: HidWriter<'static, UsbDriver, KEYBOARD_REPORT_SIZE>,
}

/// Initialise the USB stack and create the HID keyboard.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(usbd: peripherals::USBD) -> UsbHidDevice {
    let driver = Driver::new(usbd, Irqs, vbus());

    // USB device-level configuration.
    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = 64;

    let config_desc = USB_CONFIG_DESC.init([0u8; 256]);
    let bos_desc = USB_BOS_DESC.init([0u8; 256]);
    let msos_desc = USB_MSOS_DESC.init([0u8; 256]);
    let ctrl_buf = USB_CTRL_BUF.init([0u8; 128]);

    let mut builder = Builder::new(
        driver,
        usb_config,
        config_desc,
        bos_desc,
        msos_desc,
        ctrl_buf,
    );

    builder.handler(USB_STATE_HANDLER.init(UsbStateHandler));

    let kb_state = KB_STATE.init(State::new());
    let kb_config = HidConfig {
        report_descriptor: KEYBOARD_REPORT_DESCRIPTOR,
        request_handler: Some(KB_REQUEST_HANDLER.init(KeyboardRequestHandler)),
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: 8,
    };
    let keyboard_writer = HidWriter::new(&mut builder, kb_state, kb_config);

    let device = builder.build();

    info!("USB HID keyboard initialised");

    UsbHidDevice {
        device,
        keyboard_writer,
    }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
///
/// This handles USB enumeration, suspend/resume, and endpoint servicing.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}

/// Report forwarding task - drains the dispatch loop's report channel
/// into the keyboard endpoint.
pub async fn hid_writer_task(
    mut keyboard: HidWriter<'static, UsbDriver, KEYBOARD_REPORT_SIZE>,
    report_rx: Receiver<'static, CriticalSectionRawMutex, KeyboardReport, HID_REPORT_QUEUE_DEPTH>,
) -> ! {
    info!("HID writer task started - waiting for reports");

    let mut buf = [0u8; KEYBOARD_REPORT_SIZE];

    loop {
        let report = report_rx.receive().await;
        let n = report.serialize(&mut buf);
        if let Err(e) = keyboard.write(&buf[..n]).await {
            warn!("USB keyboard write failed: {} ({})", Error::Usb, e);
        }
    }
}
