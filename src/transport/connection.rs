//! # Connection Manager
//!
//! Owns the single active Bluetooth session and hands out writable
//! channels to the print queue.
//!
//! ## Session States
//!
//! ```text
//! Unbound ──acquire──▶ Known ──resolve──▶ Connecting ──▶ Connected
//!                        ▲                                  │
//!                        └──── disconnect / failed write ───┘
//! ```
//!
//! There is one slot, not a pool: resolving a different printer replaces
//! the cached session (last writer wins). The slot sits behind a
//! `std::sync::Mutex` that is never held across an `.await`.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::{debug, info, instrument, warn};

use super::gatt::{
    BluetoothBackend, GattCharacteristic, GattDevice, SPP_SERVICE_UUID, Subscription,
    select_writable,
};
use crate::error::{Result, TicketeraError};
use crate::printer::{ConnectionStatus, PrinterDevice};

/// Where a printer sits in the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Never acquired by this manager.
    Unbound,
    /// Acquired before, no live session.
    Known,
    Connecting,
    Connected,
}

impl SessionState {
    /// The status shown next to the printer in settings.
    pub fn connection_status(&self) -> ConnectionStatus {
        match self {
            Self::Unbound | Self::Known => ConnectionStatus::Disconnected,
            Self::Connecting => ConnectionStatus::Connecting,
            Self::Connected => ConnectionStatus::Connected,
        }
    }
}

/// A characteristic ready to receive print data.
#[derive(Clone)]
pub struct WritableChannel {
    printer_id: String,
    characteristic: Arc<dyn GattCharacteristic>,
    with_response: bool,
}

impl WritableChannel {
    pub fn printer_id(&self) -> &str {
        &self.printer_id
    }

    /// Whether writes wait for an acknowledgement.
    pub fn with_response(&self) -> bool {
        self.with_response
    }

    pub async fn write(&self, chunk: &[u8]) -> Result<()> {
        self.characteristic.write(chunk, self.with_response).await
    }
}

impl fmt::Debug for WritableChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WritableChannel")
            .field("printer_id", &self.printer_id)
            .field("characteristic", &self.characteristic.uuid())
            .field("with_response", &self.with_response)
            .finish()
    }
}

/// The cached session.
struct ActiveConnection {
    generation: u64,
    device: Arc<dyn GattDevice>,
    channel: WritableChannel,
    _subscription: Subscription,
}

#[derive(Default)]
struct Slot {
    active: Option<ActiveConnection>,
    connecting: Option<String>,
    known: HashSet<String>,
}

/// Resolves printers to live, writable sessions.
///
/// Construct one per application and share it; tests build a fresh one
/// around a mock backend.
pub struct ConnectionManager {
    backend: Arc<dyn BluetoothBackend>,
    slot: Arc<Mutex<Slot>>,
    generation: AtomicU64,
    connect_attempts: AtomicUsize,
}

impl ConnectionManager {
    pub fn new(backend: Arc<dyn BluetoothBackend>) -> Self {
        Self {
            backend,
            slot: Arc::new(Mutex::new(Slot::default())),
            generation: AtomicU64::new(0),
            connect_attempts: AtomicUsize::new(0),
        }
    }

    /// Whether the backend reports usable Bluetooth.
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Number of connect sequences started since construction.
    pub fn connect_attempts(&self) -> usize {
        self.connect_attempts.load(Ordering::SeqCst)
    }

    /// Get a writable channel for `printer`, reusing the cached session
    /// when it belongs to this printer and is still connected.
    #[instrument(skip(self, printer), fields(printer = %printer.id))]
    pub async fn resolve_writable(&self, printer: &PrinterDevice) -> Result<WritableChannel> {
        if !self.backend.is_available() {
            return Err(TicketeraError::Capability(
                "Bluetooth is not available on this host".to_string(),
            ));
        }
        if let Some(channel) = self.cached(&printer.id) {
            debug!("Reusing cached session");
            return Ok(channel);
        }

        self.lock().connecting = Some(printer.id.clone());
        let result = self.establish(printer).await;
        self.lock().connecting = None;

        match &result {
            Ok(_) => info!("Printer connected"),
            Err(e) if e.is_user_cancelled() => debug!("Device selection cancelled"),
            Err(e) => warn!(error = %e, "Connection failed"),
        }
        result
    }

    /// Drop the cached session if it belongs to `printer_id` and
    /// disconnect its device, so the next resolve starts from scratch.
    pub async fn invalidate(&self, printer_id: &str) {
        let taken = {
            let mut slot = self.lock();
            if slot.active.as_ref().is_some_and(|a| a.channel.printer_id == printer_id) {
                slot.active.take()
            } else {
                None
            }
        };
        if let Some(active) = taken {
            debug!(printer = %printer_id, "Session invalidated");
            active.device.disconnect().await;
        }
    }

    /// Forget everything (printer unpaired).
    pub async fn reset(&self) {
        let taken = {
            let mut slot = self.lock();
            slot.known.clear();
            slot.connecting = None;
            slot.active.take()
        };
        if let Some(active) = taken {
            active.device.disconnect().await;
        }
        info!("Connection manager reset");
    }

    /// Forget a single printer.
    pub async fn forget(&self, printer_id: &str) {
        self.invalidate(printer_id).await;
        self.lock().known.remove(printer_id);
    }

    pub fn status(&self, printer_id: &str) -> SessionState {
        let slot = self.lock();
        if slot.connecting.as_deref() == Some(printer_id) {
            return SessionState::Connecting;
        }
        match &slot.active {
            Some(active)
                if active.channel.printer_id == printer_id && active.device.is_connected() =>
            {
                SessionState::Connected
            }
            _ if slot.known.contains(printer_id) => SessionState::Known,
            _ => SessionState::Unbound,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn cached(&self, printer_id: &str) -> Option<WritableChannel> {
        let slot = self.lock();
        slot.active
            .as_ref()
            .filter(|a| a.channel.printer_id == printer_id && a.device.is_connected())
            .map(|a| a.channel.clone())
    }

    async fn establish(&self, printer: &PrinterDevice) -> Result<WritableChannel> {
        let device = self.acquire(printer).await?;
        self.lock().known.insert(printer.id.clone());

        self.connect_attempts.fetch_add(1, Ordering::SeqCst);
        if !device.is_connected() {
            device.connect().await?;
        }

        let characteristics = device.characteristics(SPP_SERVICE_UUID).await?;
        let characteristic = select_writable(&characteristics).ok_or_else(|| {
            TicketeraError::Protocol("No writable characteristic on the printer service".to_string())
        })?;
        let channel = WritableChannel {
            printer_id: printer.id.clone(),
            with_response: !characteristic.properties().write_without_response,
            characteristic,
        };

        self.install(device, channel.clone());
        Ok(channel)
    }

    /// Silent re-acquisition first, then the interactive chooser.
    async fn acquire(&self, printer: &PrinterDevice) -> Result<Arc<dyn GattDevice>> {
        if self.backend.supports_silent_reacquire() {
            if let Some(device) = self.backend.known_device(printer).await? {
                debug!("Re-acquired known device");
                return Ok(device);
            }
        }
        self.backend.request_device(printer, SPP_SERVICE_UUID).await
    }

    fn install(&self, device: Arc<dyn GattDevice>, channel: WritableChannel) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let subscription = device.on_disconnected(disconnect_handler(
            Arc::downgrade(&self.slot),
            generation,
        ));
        let replaced = self.lock().active.replace(ActiveConnection {
            generation,
            device,
            channel,
            _subscription: subscription,
        });
        // Dropped outside the lock; this detaches the old subscription
        drop(replaced);
    }
}

/// Clears the slot when the session of `generation` is still the
/// active one.
fn disconnect_handler(slot: Weak<Mutex<Slot>>, generation: u64) -> super::gatt::DisconnectHandler {
    Arc::new(move || {
        let Some(slot) = slot.upgrade() else {
            return;
        };
        let taken = {
            let mut slot = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if slot.active.as_ref().is_some_and(|a| a.generation == generation) {
                slot.active.take()
            } else {
                None
            }
        };
        if let Some(active) = taken {
            info!(printer = %active.channel.printer_id, "Printer disconnected");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::gatt::{CharacteristicProperties, DisconnectHandler};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicBool;
    use uuid::Uuid;

    #[derive(Default)]
    struct Device {
        connected: AtomicBool,
        handlers: Mutex<Vec<DisconnectHandler>>,
        writable: bool,
    }

    impl Device {
        fn drop_link(&self) {
            self.connected.store(false, Ordering::SeqCst);
            let handlers: Vec<_> = self.handlers.lock().unwrap().clone();
            for h in handlers {
                h();
            }
        }
    }

    struct Stream;

    #[async_trait]
    impl GattCharacteristic for Stream {
        fn uuid(&self) -> Uuid {
            Uuid::from_u128(7)
        }

        fn properties(&self) -> CharacteristicProperties {
            CharacteristicProperties {
                write: true,
                write_without_response: false,
            }
        }

        async fn write(&self, _chunk: &[u8], _with_response: bool) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl GattDevice for Device {
        fn id(&self) -> String {
            "dev".into()
        }

        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        async fn connect(&self) -> Result<()> {
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn characteristics(&self, _service: Uuid) -> Result<Vec<Arc<dyn GattCharacteristic>>> {
            if self.writable {
                Ok(vec![Arc::new(Stream) as Arc<dyn GattCharacteristic>])
            } else {
                Ok(Vec::new())
            }
        }

        fn on_disconnected(&self, handler: DisconnectHandler) -> Subscription {
            self.handlers.lock().unwrap().push(handler);
            Subscription::noop()
        }

        async fn disconnect(&self) {
            self.connected.store(false, Ordering::SeqCst);
        }
    }

    struct Backend {
        available: bool,
        device: Arc<Device>,
        requests: AtomicUsize,
    }

    impl Backend {
        fn new(writable: bool) -> Arc<Self> {
            Arc::new(Self {
                available: true,
                device: Arc::new(Device {
                    writable,
                    ..Default::default()
                }),
                requests: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl BluetoothBackend for Backend {
        fn is_available(&self) -> bool {
            self.available
        }

        fn supports_silent_reacquire(&self) -> bool {
            false
        }

        async fn known_device(&self, _printer: &PrinterDevice) -> Result<Option<Arc<dyn GattDevice>>> {
            Ok(None)
        }

        async fn request_device(&self, _printer: &PrinterDevice, _service: Uuid) -> Result<Arc<dyn GattDevice>> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok(self.device.clone())
        }
    }

    fn printer(id: &str) -> PrinterDevice {
        PrinterDevice::new(id, "00:11:22:33:44:55", id)
    }

    #[tokio::test]
    async fn test_reuses_cached_session() {
        let backend = Backend::new(true);
        let manager = ConnectionManager::new(backend.clone());
        let first = manager.resolve_writable(&printer("caja")).await.unwrap();
        let _second = manager.resolve_writable(&printer("caja")).await.unwrap();
        assert_eq!(backend.requests.load(Ordering::SeqCst), 1);
        assert_eq!(manager.connect_attempts(), 1);
        assert!(first.with_response());
        assert_eq!(manager.status("caja"), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_disconnect_event_clears_slot() {
        let backend = Backend::new(true);
        let manager = ConnectionManager::new(backend.clone());
        manager.resolve_writable(&printer("caja")).await.unwrap();

        backend.device.drop_link();
        assert_eq!(manager.status("caja"), SessionState::Known);

        manager.resolve_writable(&printer("caja")).await.unwrap();
        assert_eq!(backend.requests.load(Ordering::SeqCst), 2);
        assert_eq!(manager.connect_attempts(), 2);
    }

    #[tokio::test]
    async fn test_stale_handler_does_not_clear_new_session() {
        let backend = Backend::new(true);
        let manager = ConnectionManager::new(backend.clone());
        manager.resolve_writable(&printer("caja")).await.unwrap();
        manager.resolve_writable(&printer("cocina")).await.unwrap();

        // The first handler belongs to a replaced session
        let stale = backend.device.handlers.lock().unwrap()[0].clone();
        stale();
        assert_eq!(manager.status("cocina"), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_no_writable_characteristic_is_protocol_error() {
        let manager = ConnectionManager::new(Backend::new(false));
        let err = manager.resolve_writable(&printer("caja")).await.unwrap_err();
        assert!(matches!(err, TicketeraError::Protocol(_)));
        assert_eq!(manager.status("caja"), SessionState::Known);
    }

    #[tokio::test]
    async fn test_unavailable_backend_is_capability_error() {
        let backend = Arc::new(Backend {
            available: false,
            device: Arc::new(Device::default()),
            requests: AtomicUsize::new(0),
        });
        let manager = ConnectionManager::new(backend.clone());
        let err = manager.resolve_writable(&printer("caja")).await.unwrap_err();
        assert!(matches!(err, TicketeraError::Capability(_)));
        assert_eq!(backend.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalidate_and_reset() {
        let backend = Backend::new(true);
        let manager = ConnectionManager::new(backend.clone());
        manager.resolve_writable(&printer("caja")).await.unwrap();

        manager.invalidate("otra").await;
        assert_eq!(manager.status("caja"), SessionState::Connected);

        manager.invalidate("caja").await;
        assert_eq!(manager.status("caja"), SessionState::Known);
        assert!(!backend.device.is_connected());

        manager.reset().await;
        assert_eq!(manager.status("caja"), SessionState::Unbound);
        assert_eq!(
            SessionState::Known.connection_status(),
            ConnectionStatus::Disconnected
        );
    }
}
