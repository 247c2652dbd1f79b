//! Pairing and bonding for the peripheral role.
//!
//! Bonds live in RAM only: after a reset the host has to pair again.
//! Along with the keys each bond keeps the peer's GATT system attributes
//! (CCCD values), so a reconnecting host gets notifications without
//! re-subscribing.

use core::cell::RefCell;

use defmt::{debug, info, warn};
use heapless::Vec;
use nrf_softdevice::ble::gatt_server;
use nrf_softdevice::ble::security::{IoCapabilities, SecurityHandler};
use nrf_softdevice::ble::{Connection, EncryptionInfo, IdentityKey, MasterId, SecurityMode};
use ps2hid::config::BLE_MAX_BONDS;
use static_cell::StaticCell;

/// Room for the CCCDs of the HID service and the service-changed CCCD.
const SYS_ATTRS_LEN: usize = 64;

struct HostBond {
    master_id: MasterId,
    key: EncryptionInfo,
    peer_id: IdentityKey,
    sys_attrs: Vec<u8, SYS_ATTRS_LEN>,
}

pub struct Bonder {
    hosts: RefCell<Vec<HostBond, BLE_MAX_BONDS>>,
}

impl Bonder {
    fn new() -> Self {
        Self {
            hosts: RefCell::new(Vec::new()),
        }
    }

    fn position(&self, conn: &Connection) -> Option<usize> {
        self.hosts
            .borrow()
            .iter()
            .position(|h| h.peer_id.is_match(conn.peer_address()))
    }
}

impl SecurityHandler for Bonder {
    fn io_capabilities(&self) -> IoCapabilities {
        IoCapabilities::None
    }

    fn can_bond(&self, _conn: &Connection) -> bool {
        true
    }

    fn on_bonded(
        &self,
        _conn: &Connection,
        master_id: MasterId,
        key: EncryptionInfo,
        peer_id: IdentityKey,
    ) {
        info!("BLE bonded with host");
        let mut hosts = self.hosts.borrow_mut();
        if let Some(existing) = hosts.iter_mut().find(|h| h.master_id == master_id) {
            existing.key = key;
            existing.peer_id = peer_id;
            return;
        }

        // Oldest bond makes room.
        if hosts.is_full() {
            hosts.remove(0);
        }

        let _ = hosts.push(HostBond {
            master_id,
            key,
            peer_id,
            sys_attrs: Vec::new(),
        });
    }

    fn get_key(&self, _conn: &Connection, master_id: MasterId) -> Option<EncryptionInfo> {
        self.hosts
            .borrow()
            .iter()
            .find_map(|h| (h.master_id == master_id).then_some(h.key))
    }

    fn get_peripheral_key(&self, conn: &Connection) -> Option<(MasterId, EncryptionInfo)> {
        self.hosts.borrow().iter().find_map(|h| {
            h.peer_id
                .is_match(conn.peer_address())
                .then_some((h.master_id, h.key))
        })
    }

    fn on_security_update(&self, _conn: &Connection, mode: SecurityMode) {
        info!("BLE security mode updated: {}", mode);
    }

    fn save_sys_attrs(&self, conn: &Connection) {
        let Some(index) = self.position(conn) else {
            return;
        };
        let mut hosts = self.hosts.borrow_mut();
        let attrs = &mut hosts[index].sys_attrs;
        // Cannot fail: the length never exceeds the capacity.
        let _ = attrs.resize(SYS_ATTRS_LEN, 0);
        match gatt_server::get_sys_attrs(conn, attrs) {
            Ok(len) => {
                attrs.truncate(len);
                debug!("saved {} bytes of sys attrs", len);
            }
            Err(e) => {
                attrs.clear();
                warn!("get_sys_attrs failed: {}", e);
            }
        }
    }

    fn load_sys_attrs(&self, conn: &Connection) {
        let hosts = self.hosts.borrow();
        let attrs = self
            .position(conn)
            .map(|i| hosts[i].sys_attrs.as_slice())
            .filter(|a| !a.is_empty());
        if let Err(e) = gatt_server::set_sys_attrs(conn, attrs) {
            warn!("set_sys_attrs failed: {}", e);
        }
    }
}

/// The one bond store.  Must be called exactly once.
pub fn bonder() -> &'static Bonder {
    static BONDER: StaticCell<Bonder> = StaticCell::new();
    BONDER.init(Bonder::new())
}
