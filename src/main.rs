//! ps2hid firmware - PS/2 keyboard to USB / BLE HID bridge on nRF52840.
//!
//! Task layout:
//!
//! ```text
//! EGU0_SWI0 executor (P2)   wire::run            PS/2 CLOCK/DATA bit banging
//! thread executor           softdevice_task      SoftDevice events, VBUS
//!                           usb_task             USB enumeration/control
//!                           usb_writer_task      USB_REPORTS → HID endpoint
//!                           ble_task             advertising, GATT, BLE_REPORTS
//!                           main → bridge        Dispatcher loop
//! ```
//!
//! The dispatch loop busy-polls the PS/2 queue and yields between
//! iterations so the thread-mode tasks keep running.  Interrupt
//! priorities P0, P1 and P4 belong to the SoftDevice.

#![no_std]
#![no_main]

mod ble;
mod usb;
mod wire;

use defmt::{error, info, unwrap};
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_futures::yield_now;
use embassy_nrf::gpio::Flex;
use embassy_nrf::interrupt;
use embassy_nrf::interrupt::{InterruptExt, Priority};
use embassy_usb::class::hid::HidWriter;
use embassy_usb::UsbDevice;
use nrf_softdevice::{raw, SocEvent, Softdevice};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use ps2hid::config::{self, KeySource};
use ps2hid::error::BleError;
use ps2hid::hid::keyboard::KEYBOARD_REPORT_SIZE;
use ps2hid::hid::KeyId;
use ps2hid::ps2::Ps2Keyboard;
use ps2hid::scancode::{self, ScancodeTable, SET2_KEYCODES, SET2_NAMES};
use ps2hid::Dispatcher;

use ble::hid_service::HidServer;
use ble::BleLink;
use usb::hid_device::{self, UsbDriver};
use usb::{UsbLink, USB_REPORTS};
use wire::{EmbassyClock, WirePort};

static EXECUTOR_WIRE: InterruptExecutor = InterruptExecutor::new();
static HID_SERVER: StaticCell<HidServer> = StaticCell::new();

#[interrupt]
unsafe fn EGU0_SWI0() {
    EXECUTOR_WIRE.on_interrupt()
}

#[embassy_executor::task]
async fn wire_task(clock: Flex<'static>, data: Flex<'static>) -> ! {
    wire::run(clock, data).await
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    let vbus = hid_device::vbus();
    sd.run_with_callback(|event| match event {
        SocEvent::PowerUsbDetected => vbus.detected(true),
        SocEvent::PowerUsbRemoved => vbus.detected(false),
        SocEvent::PowerUsbPowerReady => vbus.ready(),
        _ => {}
    })
    .await
}

#[embassy_executor::task]
async fn usb_task(device: UsbDevice<'static, UsbDriver>) -> ! {
    hid_device::run_usb_device(device).await
}

#[embassy_executor::task]
async fn usb_writer_task(writer: HidWriter<'static, UsbDriver, KEYBOARD_REPORT_SIZE>) -> ! {
    hid_device::hid_writer_task(writer, USB_REPORTS.receiver()).await
}

#[embassy_executor::task]
async fn ble_task(sd: &'static Softdevice, server: &'static HidServer) -> ! {
    ble::peripheral::run(sd, server).await
}

/// Hand USB power events to the SoftDevice and seed the VBUS state.
fn enable_usb_power_events() {
    let vbus = hid_device::vbus();
    let mut status = 0u32;
    // SAFETY: plain SVC calls, the SoftDevice is enabled.
    unsafe {
        raw::sd_power_usbdetected_enable(1);
        raw::sd_power_usbremoved_enable(1);
        raw::sd_power_usbpwrrdy_enable(1);
        raw::sd_power_usbregstatus_get(&mut status);
    }
    // USBREGSTATUS: bit 0 VBUSDETECT, bit 1 OUTPUTRDY.
    if status & 0x01 != 0 {
        vbus.detected(true);
    }
    if status & 0x02 != 0 {
        vbus.ready();
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("ps2hid starting");

    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.gpiote_interrupt_priority = Priority::P2;
    nrf_config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(nrf_config);
    interrupt::USBD.set_priority(Priority::P3);

    if let Err(fault) = scancode::validate() {
        error!("scancode tables disagree: {}", fault);
    }

    // PS/2 wire driver
    let mut clock = Flex::new(p.P0_04);
    wire::open_drain(&mut clock);
    let mut data = Flex::new(p.P0_03);
    wire::open_drain(&mut data);
    interrupt::EGU0_SWI0.set_priority(Priority::P2);
    let wire_spawner = EXECUTOR_WIRE.start(interrupt::EGU0_SWI0);
    unwrap!(wire_spawner.spawn(wire_task(clock, data)));

    // SoftDevice (BLE and USB power events)
    let sd = ble::peripheral::enable_softdevice();
    let server = if cfg!(feature = "wireless") {
        match HidServer::new(sd) {
            Ok(server) => Some(&*HID_SERVER.init(server)),
            Err(e) => {
                error!("{}: {}", BleError::RegisterFailed, e);
                None
            }
        }
    } else {
        None
    };
    let sd: &'static Softdevice = sd;
    enable_usb_power_events();
    unwrap!(spawner.spawn(softdevice_task(sd)));

    // HID backends
    let wired = cfg!(feature = "wired").then(|| {
        let usb = hid_device::init(p.USBD);
        unwrap!(spawner.spawn(usb_task(usb.device)));
        unwrap!(spawner.spawn(usb_writer_task(usb.keyboard_writer)));
        UsbLink
    });
    let wireless = server.map(|server| {
        unwrap!(spawner.spawn(ble_task(sd, server)));
        BleLink
    });

    info!("key source: {}", config::KEY_SOURCE);
    match config::KEY_SOURCE {
        KeySource::Keycodes => bridge(&SET2_KEYCODES, wired, wireless).await,
        KeySource::Names => bridge(&SET2_NAMES, wired, wireless).await,
    }
}

async fn bridge<K: KeyId>(
    table: &'static ScancodeTable<K>,
    wired: Option<UsbLink>,
    wireless: Option<BleLink>,
) -> ! {
    // Let the backend tasks start before the blocking self-test.
    yield_now().await;

    let keyboard = Ps2Keyboard::new(WirePort, EmbassyClock, table);
    let mut dispatcher = Dispatcher::boot(
        keyboard,
        move || wired,
        move || wireless,
        config::LED_SELF_TEST_HOLD,
    );
    info!("bridge running, active backend: {}", dispatcher.active());

    loop {
        dispatcher.step();
        yield_now().await;
    }
}
