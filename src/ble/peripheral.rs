//! SoftDevice bring-up and the peripheral connection task.

use core::mem;
use core::sync::atomic::Ordering;

use defmt::{info, warn};
use embassy_futures::select::select;
use embassy_time::{Duration, Timer};
use nrf_softdevice::ble::advertisement_builder::{
    AdvertisementDataType, Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload, ServiceList,
    ServiceUuid16,
};
use nrf_softdevice::ble::{gatt_server, peripheral, Connection};
use nrf_softdevice::{raw, Softdevice};
use ps2hid::config;
use ps2hid::error::{BleError, Error};

use super::bonder::bonder;
use super::hid_service::HidServer;
use super::{ADVERTISE, BLE_REPORTS, CONNECTED};

const APPEARANCE: [u8; 2] = config::BLE_APPEARANCE.to_le_bytes();

static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .services_16(ServiceList::Complete, &[ServiceUuid16::HUMAN_INTERFACE_DEVICE])
    .full_name(config::BLE_DEVICE_NAME)
    .raw(AdvertisementDataType::APPEARANCE, &APPEARANCE)
    .build();

static SCAN_DATA: [u8; 0] = [];

/// Connection parameters published in the GAP PPCP characteristic.
const PREFERRED_CONN_PARAMS: raw::ble_gap_conn_params_t = raw::ble_gap_conn_params_t {
    min_conn_interval: config::BLE_CONN_INTERVAL_MIN,
    max_conn_interval: config::BLE_CONN_INTERVAL_MAX,
    slave_latency: config::BLE_SLAVE_LATENCY,
    conn_sup_timeout: config::BLE_SUP_TIMEOUT,
};

/// Enable the SoftDevice configured for a single peripheral link.
pub fn enable_softdevice() -> &'static mut Softdevice {
    let sd_config = nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 128 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: config::BLE_DEVICE_NAME.as_ptr() as _,
            current_len: config::BLE_DEVICE_NAME.len() as u16,
            max_len: config::BLE_DEVICE_NAME.len() as u16,
            // SAFETY: all-zero is "no write access" for the name attribute.
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    };

    let sd = Softdevice::enable(&sd_config);
    // SAFETY: plain SVC call, the SoftDevice is enabled.
    let rc = unsafe { raw::sd_ble_gap_appearance_set(config::BLE_APPEARANCE) };
    if rc != raw::NRF_SUCCESS {
        warn!("GAP appearance not set: {}", Error::from(BleError::Raw(rc)));
    }
    // SAFETY: the SoftDevice copies the parameters before returning.
    let rc = unsafe { raw::sd_ble_gap_ppcp_set(&PREFERRED_CONN_PARAMS) };
    if rc != raw::NRF_SUCCESS {
        warn!("preferred connection parameters not set: {}", Error::from(BleError::Raw(rc)));
    }
    sd
}

/// Peripheral task: advertise on request, serve the connection, repeat.
pub async fn run(sd: &'static Softdevice, server: &'static HidServer) -> ! {
    let bonder = bonder();
    let adv_config = peripheral::Config {
        interval: config::BLE_ADV_INTERVAL,
        ..Default::default()
    };

    loop {
        ADVERTISE.wait().await;

        loop {
            info!("BLE advertising as \"{}\"", config::BLE_DEVICE_NAME);
            let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
                adv_data: &ADV_DATA,
                scan_data: &SCAN_DATA,
            };
            let conn = match peripheral::advertise_pairable(sd, adv, &adv_config, bonder).await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("{}: {}", BleError::AdvertiseFailed, e);
                    Timer::after(Duration::from_secs(1)).await;
                    continue;
                }
            };

            info!("BLE connected");
            // Reports queued while nobody listened are stale.
            while BLE_REPORTS.try_receive().is_ok() {}
            CONNECTED.store(true, Ordering::Release);

            let _ = select(gatt_server::run(&conn, server, |_| {}), notify_reports(&conn, server)).await;

            CONNECTED.store(false, Ordering::Release);
            info!("BLE disconnected");

            if !config::BLE_READVERTISE_ON_DISCONNECT {
                break;
            }
        }
    }
}

async fn notify_reports(conn: &Connection, server: &HidServer) -> ! {
    loop {
        let report = BLE_REPORTS.receive().await;
        if let Err(e) = server.notify(conn, &report) {
            warn!("BLE report not sent: {}", e);
        }
    }
}
