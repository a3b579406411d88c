//! BLE radio adapter.
//!
//! Implements [`RadioPort`] (advertising control and control-characteristic
//! notifications) on top of the Bluedroid GATT server.  Inbound traffic
//! (connect, disconnect, writes, asynchronous advertising failures) is pushed
//! into [`RADIO_EVENTS`] from the Bluetooth task and drained by the main loop.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid GATT server via raw `esp_idf_svc::sys` calls.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## GATT Service Layout
//!
//! | Attribute            | UUID (default)                           | Perms             |
//! |----------------------|------------------------------------------|-------------------|
//! | Service              | `4fafc201-1fb5-459e-8fcc-c5c9c331914b`   | Primary           |
//! | Control              | `beb5483e-36e1-4688-b7f5-ea07361b26a8`   | Read+Write+Notify |
//! | └ CCCD               | `0x2902`                                 | Read+Write        |

use log::{info, warn};

use crate::app::ports::RadioPort;
use uuid::Uuid;

use crate::config::{MAX_DEVICE_NAME_LEN, RelayConfig};
use crate::error::RadioError;
#[cfg(target_os = "espidf")]
use crate::events::{RADIO_EVENTS, RadioEvent};
use crate::events::MAX_WRITE_LEN;

// ───────────────────────────────────────────────────────────────
// BLE state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BleState {
    /// Constructed, stack not brought up.
    Idle,
    /// Stack up, not advertising.
    Ready,
    Advertising,
    /// Stack bring-up failed; the adapter is inert.
    Failed,
}

// ── ESP-IDF BLE static state ──────────────────────────────────
//
// Bluedroid callbacks are C function pointers that cannot capture Rust
// closures.  These statics bridge the callback context to the adapter.

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering as AtomicOrdering};

#[cfg(target_os = "espidf")]
static BLE_GATTS_IF: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CONN_ID: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CONNECTED: AtomicBool = AtomicBool::new(false);
#[cfg(target_os = "espidf")]
static BLE_SVC_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CONTROL_HANDLE: AtomicU32 = AtomicU32::new(0);

/// Service and control characteristic UUIDs, set once before the GATTS
/// app is registered.
#[cfg(target_os = "espidf")]
static BLE_LAYOUT: std::sync::OnceLock<(u128, u128)> = std::sync::OnceLock::new();

#[cfg(target_os = "espidf")]
fn uuid128_to_esp(uuid: u128) -> esp_idf_svc::sys::esp_bt_uuid_t {
    let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
    t.len = 16;
    t.uuid.uuid128 = uuid.to_le_bytes();
    t
}

#[cfg(target_os = "espidf")]
fn uuid16_to_esp(uuid: u16) -> esp_idf_svc::sys::esp_bt_uuid_t {
    let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
    t.len = 2;
    t.uuid.uuid16 = uuid;
    t
}

#[cfg(target_os = "espidf")]
fn adv_params() -> esp_idf_svc::sys::esp_ble_adv_params_t {
    use esp_idf_svc::sys::*;
    esp_ble_adv_params_t {
        adv_int_min: 0x20,
        adv_int_max: 0x40,
        adv_type: esp_ble_adv_type_t_ADV_TYPE_IND,
        own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
        channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
        adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
        ..unsafe { core::mem::zeroed() }
    }
}

/// Push from the Bluetooth task.  A full queue drops the event; link
/// changes stay latched in the queue and are reconciled by the main loop.
#[cfg(target_os = "espidf")]
fn post(event: RadioEvent) {
    let link = event.link_level().is_some();
    if !RADIO_EVENTS.push(event) {
        if link {
            log::warn!("BLE: radio event queue full, link change latched");
        } else {
            log::error!("BLE: radio event queue full, event dropped");
        }
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gap_event_handler(
    event: esp_idf_svc::sys::esp_gap_ble_cb_event_t,
    param: *mut esp_idf_svc::sys::esp_ble_gap_cb_param_t,
) {
    use esp_idf_svc::sys::*;
    match event {
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_START_COMPLETE_EVT => {
            let status = unsafe { (*param).adv_start_cmpl.status };
            if status == esp_bt_status_t_ESP_BT_STATUS_SUCCESS {
                log::info!("BLE GAP: advertising started");
            } else {
                log::warn!("BLE GAP: advertising start failed (status={})", status);
                post(RadioEvent::AdvertisingFailed(status as i32));
            }
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_STOP_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising stopped");
        }
        _ => {}
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gatts_event_handler(
    event: esp_idf_svc::sys::esp_gatts_cb_event_t,
    gatts_if: esp_idf_svc::sys::esp_gatt_if_t,
    param: *mut esp_idf_svc::sys::esp_ble_gatts_cb_param_t,
) {
    use esp_idf_svc::sys::*;

    match event {
        esp_gatts_cb_event_t_ESP_GATTS_REG_EVT => {
            BLE_GATTS_IF.store(gatts_if as u32, AtomicOrdering::Relaxed);
            log::info!("BLE GATTS: app registered (if={})", gatts_if);
            let Some(&(service_uuid, _)) = BLE_LAYOUT.get() else {
                log::error!("BLE GATTS: layout not set before registration");
                return;
            };
            let mut svc_id = esp_gatt_srvc_id_t {
                id: esp_gatt_id_t {
                    uuid: uuid128_to_esp(service_uuid),
                    inst_id: 0,
                },
                is_primary: true,
            };
            // service + char decl + char value + CCCD
            unsafe { esp_ble_gatts_create_service(gatts_if, &mut svc_id, 4) };
        }
        esp_gatts_cb_event_t_ESP_GATTS_CREATE_EVT => {
            let svc_handle = unsafe { (*param).create.service_handle };
            BLE_SVC_HANDLE.store(svc_handle as u32, AtomicOrdering::Relaxed);
            log::info!("BLE GATTS: service created (handle={})", svc_handle);
            let Some(&(_, control_uuid)) = BLE_LAYOUT.get() else {
                return;
            };
            let mut char_uuid = uuid128_to_esp(control_uuid);
            let mut initial = [0u8; 1];
            let mut value = esp_attr_value_t {
                attr_max_len: MAX_WRITE_LEN as u16,
                attr_len: 0,
                attr_value: initial.as_mut_ptr(),
            };
            let mut control = esp_attr_control_t {
                auto_rsp: ESP_GATT_AUTO_RSP as u8,
            };
            unsafe {
                esp_ble_gatts_start_service(svc_handle);
                esp_ble_gatts_add_char(
                    svc_handle,
                    &mut char_uuid,
                    (ESP_GATT_PERM_READ | ESP_GATT_PERM_WRITE) as esp_gatt_perm_t,
                    (ESP_GATT_CHAR_PROP_BIT_READ
                        | ESP_GATT_CHAR_PROP_BIT_WRITE
                        | ESP_GATT_CHAR_PROP_BIT_NOTIFY) as esp_gatt_char_prop_t,
                    &mut value,
                    &mut control,
                );
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_EVT => {
            let handle = unsafe { (*param).add_char.attr_handle };
            BLE_CONTROL_HANDLE.store(handle as u32, AtomicOrdering::Relaxed);
            log::info!("BLE GATTS: control char (handle={})", handle);
            let svc_handle = BLE_SVC_HANDLE.load(AtomicOrdering::Relaxed) as u16;
            let mut cccd_uuid = uuid16_to_esp(ESP_GATT_UUID_CHAR_CLIENT_CONFIG as u16);
            let mut control = esp_attr_control_t {
                auto_rsp: ESP_GATT_AUTO_RSP as u8,
            };
            unsafe {
                esp_ble_gatts_add_char_descr(
                    svc_handle,
                    &mut cccd_uuid,
                    (ESP_GATT_PERM_READ | ESP_GATT_PERM_WRITE) as esp_gatt_perm_t,
                    core::ptr::null_mut(),
                    &mut control,
                );
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_DESCR_EVT => {
            let handle = unsafe { (*param).add_char_descr.attr_handle };
            log::info!("BLE GATTS: CCCD (handle={}), layout complete", handle);
        }
        esp_gatts_cb_event_t_ESP_GATTS_CONNECT_EVT => {
            let conn_id = unsafe { (*param).connect.conn_id };
            BLE_CONN_ID.store(conn_id as u32, AtomicOrdering::Relaxed);
            BLE_CONNECTED.store(true, AtomicOrdering::Release);
            log::info!("BLE GATTS: client connected (conn_id={})", conn_id);
            post(RadioEvent::Connected);
        }
        esp_gatts_cb_event_t_ESP_GATTS_DISCONNECT_EVT => {
            BLE_CONNECTED.store(false, AtomicOrdering::Release);
            let reason = unsafe { (*param).disconnect.reason };
            log::info!("BLE GATTS: client disconnected (reason=0x{:x})", reason);
            post(RadioEvent::Disconnected);
        }
        esp_gatts_cb_event_t_ESP_GATTS_WRITE_EVT => {
            let p = unsafe { &(*param).write };
            if p.need_rsp {
                unsafe {
                    esp_ble_gatts_send_response(
                        gatts_if,
                        p.conn_id,
                        p.trans_id,
                        esp_gatt_status_t_ESP_GATT_OK,
                        core::ptr::null_mut(),
                    );
                }
            }
            if p.is_prep {
                log::warn!("BLE GATTS: prepared (long) write ignored");
                return;
            }
            if p.handle as u32 != BLE_CONTROL_HANDLE.load(AtomicOrdering::Relaxed) {
                return;
            }
            let data: &[u8] = if p.len == 0 || p.value.is_null() {
                &[]
            } else {
                unsafe { core::slice::from_raw_parts(p.value, p.len as usize) }
            };
            post(RadioEvent::control_write(data));
        }
        _ => {}
    }
}

// ───────────────────────────────────────────────────────────────
// BLE adapter
// ───────────────────────────────────────────────────────────────

pub struct BleAdapter {
    state: BleState,
    device_name: heapless::String<MAX_DEVICE_NAME_LEN>,
    service_uuid: Uuid,
    control_uuid: Uuid,
    /// Simulation: last payload passed to `notify`.
    #[cfg(not(target_os = "espidf"))]
    sim_last_notify: heapless::Vec<u8, MAX_WRITE_LEN>,
}

impl BleAdapter {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            state: BleState::Idle,
            device_name: config.device_name.clone(),
            service_uuid: config.service_uuid,
            control_uuid: config.control_uuid,
            #[cfg(not(target_os = "espidf"))]
            sim_last_notify: heapless::Vec::new(),
        }
    }

    pub fn state(&self) -> BleState {
        self.state
    }

    /// Bring up the controller and host stack and register the GATT layout.
    /// Does not start advertising.
    pub fn init(&mut self) -> crate::error::Result<()> {
        info!(
            "BLE: initialising '{}' (service {}, control {})",
            self.device_name,
            self.service_uuid.hyphenated(),
            self.control_uuid.hyphenated()
        );
        match self.platform_init() {
            Ok(()) => {
                self.state = BleState::Ready;
                Ok(())
            }
            Err(e) => {
                self.state = BleState::Failed;
                Err(e.into())
            }
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_init(&mut self) -> Result<(), RadioError> {
        use esp_idf_svc::sys::*;

        let check = |ret: esp_err_t, what: &str| {
            if ret == ESP_OK as i32 {
                Ok(())
            } else {
                log::error!("BLE: {} failed ({})", what, ret);
                Err(RadioError::StackInitFailed(ret))
            }
        };

        let _ = BLE_LAYOUT.set((self.service_uuid.as_u128(), self.control_uuid.as_u128()));

        unsafe {
            // Release classic BT memory (BLE-only mode).
            esp_bt_controller_mem_release(esp_bt_mode_t_ESP_BT_MODE_CLASSIC_BT);

            let mut bt_cfg = esp_bt_controller_config_t::default();
            check(esp_bt_controller_init(&mut bt_cfg), "bt_controller_init")?;
            check(
                esp_bt_controller_enable(esp_bt_mode_t_ESP_BT_MODE_BLE),
                "bt_controller_enable",
            )?;
            check(esp_bluedroid_init(), "bluedroid_init")?;
            check(esp_bluedroid_enable(), "bluedroid_enable")?;

            check(
                esp_ble_gap_register_callback(Some(ble_gap_event_handler)),
                "gap_register_callback",
            )?;
            check(
                esp_ble_gatts_register_callback(Some(ble_gatts_event_handler)),
                "gatts_register_callback",
            )?;
            check(esp_ble_gatts_app_register(0), "gatts_app_register")?;

            // Device name must be NUL-terminated.
            let mut name = [0u8; MAX_DEVICE_NAME_LEN + 1];
            name[..self.device_name.len()].copy_from_slice(self.device_name.as_bytes());
            check(
                esp_ble_gap_set_device_name(name.as_ptr().cast()),
                "gap_set_device_name",
            )?;

            // Name in the advertising packet, service UUID in the scan
            // response (both do not fit in 31 bytes).
            let mut adv_data = esp_ble_adv_data_t {
                set_scan_rsp: false,
                include_name: true,
                flag: (ESP_BLE_ADV_FLAG_GEN_DISC | ESP_BLE_ADV_FLAG_BREDR_NOT_SPT) as u8,
                ..core::mem::zeroed()
            };
            check(esp_ble_gap_config_adv_data(&mut adv_data), "config_adv_data")?;

            let mut uuid_le = self.service_uuid.as_u128().to_le_bytes();
            let mut scan_rsp = esp_ble_adv_data_t {
                set_scan_rsp: true,
                service_uuid_len: uuid_le.len() as u16,
                p_service_uuid: uuid_le.as_mut_ptr(),
                ..core::mem::zeroed()
            };
            check(esp_ble_gap_config_adv_data(&mut scan_rsp), "config_scan_rsp")?;
        }

        info!("BLE(espidf): Bluedroid stack initialised");
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_init(&mut self) -> Result<(), RadioError> {
        info!("BLE(sim): stack ready");
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_start_advertising(&mut self) -> Result<(), RadioError> {
        let mut params = adv_params();
        let ret = unsafe { esp_idf_svc::sys::esp_ble_gap_start_advertising(&mut params) };
        if ret == esp_idf_svc::sys::ESP_OK as i32 {
            Ok(())
        } else {
            Err(RadioError::AdvertisingFailed(ret))
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start_advertising(&mut self) -> Result<(), RadioError> {
        info!("BLE(sim): advertising '{}'", self.device_name);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_stop_advertising(&mut self) {
        let ret = unsafe { esp_idf_svc::sys::esp_ble_gap_stop_advertising() };
        if ret != esp_idf_svc::sys::ESP_OK as i32 {
            warn!("BLE: stop advertising failed ({})", ret);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_stop_advertising(&mut self) {
        info!("BLE(sim): advertising stopped");
    }

    #[cfg(target_os = "espidf")]
    fn platform_notify(&mut self, payload: &[u8]) -> Result<(), RadioError> {
        use esp_idf_svc::sys::*;

        if !BLE_CONNECTED.load(AtomicOrdering::Acquire) {
            return Err(RadioError::NotConnected);
        }
        let handle = BLE_CONTROL_HANDLE.load(AtomicOrdering::Relaxed) as u16;
        let conn = BLE_CONN_ID.load(AtomicOrdering::Relaxed) as u16;
        let gatts_if = BLE_GATTS_IF.load(AtomicOrdering::Relaxed) as esp_gatt_if_t;
        let len = payload.len() as u16;

        unsafe {
            // Keep the readable value in step with what was notified.
            let ret = esp_ble_gatts_set_attr_value(handle, len, payload.as_ptr());
            if ret != ESP_OK as i32 {
                return Err(RadioError::NotifyFailed(ret));
            }
            let ret = esp_ble_gatts_send_indicate(
                gatts_if,
                conn,
                handle,
                len,
                payload.as_ptr().cast_mut(),
                false,
            );
            if ret != ESP_OK as i32 {
                return Err(RadioError::NotifyFailed(ret));
            }
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_notify(&mut self, payload: &[u8]) -> Result<(), RadioError> {
        self.sim_last_notify.clear();
        let _ = self.sim_last_notify.extend_from_slice(payload);
        info!("BLE(sim): notify {} bytes", payload.len());
        Ok(())
    }

    /// Simulation: last payload passed to `notify`.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_last_notify(&self) -> &[u8] {
        &self.sim_last_notify
    }
}

// ───────────────────────────────────────────────────────────────
// RadioPort implementation
// ───────────────────────────────────────────────────────────────

impl RadioPort for BleAdapter {
    fn start_advertising(&mut self) -> Result<(), RadioError> {
        if matches!(self.state, BleState::Idle | BleState::Failed) {
            return Err(RadioError::StackInitFailed(-1));
        }
        // Re-issued even when Advertising: the stack stops on its own at connect.
        self.platform_start_advertising()?;
        self.state = BleState::Advertising;
        Ok(())
    }

    fn stop_advertising(&mut self) {
        if self.state == BleState::Advertising {
            self.platform_stop_advertising();
            self.state = BleState::Ready;
        }
    }

    fn notify(&mut self, payload: &[u8]) -> Result<(), RadioError> {
        if payload.len() > MAX_WRITE_LEN {
            warn!("BLE: notify payload too long ({} bytes)", payload.len());
            return Err(RadioError::PayloadTooLong);
        }
        self.platform_notify(payload)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
