//! # GATT Abstraction
//!
//! The smallest surface the connection manager needs from a Bluetooth
//! stack: find or pick a device, connect, look up characteristics of a
//! service, write, and hear about disconnects.
//!
//! The RFCOMM backend in [`super::bluetooth`] implements these traits for
//! Linux; tests plug in an in-memory backend.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::printer::PrinterDevice;

/// Serial Port Profile service UUID.
pub const SPP_SERVICE_UUID: Uuid = Uuid::from_u128(0x00001101_0000_1000_8000_00805f9b34fb);

/// Write capabilities advertised by a characteristic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharacteristicProperties {
    pub write: bool,
    pub write_without_response: bool,
}

impl CharacteristicProperties {
    pub fn is_writable(&self) -> bool {
        self.write || self.write_without_response
    }
}

/// Called when the transport reports the link went down.
pub type DisconnectHandler = Arc<dyn Fn() + Send + Sync>;

/// A platform Bluetooth stack.
#[async_trait]
pub trait BluetoothBackend: Send + Sync {
    /// Whether the host has usable Bluetooth at all.
    fn is_available(&self) -> bool;

    /// Whether [`known_device`](Self::known_device) can re-acquire a
    /// previously authorized device without prompting.
    fn supports_silent_reacquire(&self) -> bool;

    /// Look up an already authorized device. `Ok(None)` when unknown.
    async fn known_device(&self, printer: &PrinterDevice) -> Result<Option<Arc<dyn GattDevice>>>;

    /// Ask the user to choose a device offering `service`.
    ///
    /// Returns [`TicketeraError::UserCancelled`](crate::error::TicketeraError::UserCancelled)
    /// when the chooser is dismissed.
    async fn request_device(&self, printer: &PrinterDevice, service: Uuid) -> Result<Arc<dyn GattDevice>>;
}

/// A remote device.
#[async_trait]
pub trait GattDevice: Send + Sync {
    fn id(&self) -> String;

    fn is_connected(&self) -> bool;

    async fn connect(&self) -> Result<()>;

    /// Characteristics of `service`.
    ///
    /// Fails with a protocol error when the service is not offered.
    async fn characteristics(&self, service: Uuid) -> Result<Vec<Arc<dyn GattCharacteristic>>>;

    /// Register a disconnect handler. Dropping the returned
    /// [`Subscription`] detaches it.
    fn on_disconnected(&self, handler: DisconnectHandler) -> Subscription;

    async fn disconnect(&self);
}

/// A characteristic that bytes can be written to.
#[async_trait]
pub trait GattCharacteristic: Send + Sync {
    fn uuid(&self) -> Uuid;

    fn properties(&self) -> CharacteristicProperties;

    /// Write one chunk. `with_response` selects acknowledged writes.
    async fn write(&self, chunk: &[u8], with_response: bool) -> Result<()>;
}

/// Keeps a disconnect handler registered until dropped.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// A subscription with nothing to detach.
    pub fn noop() -> Self {
        Self { unsubscribe: None }
    }

    /// Detach now instead of on drop.
    pub fn unsubscribe(mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

/// Pick the characteristic to print through: write-without-response
/// first, then plain write.
pub fn select_writable(
    characteristics: &[Arc<dyn GattCharacteristic>],
) -> Option<Arc<dyn GattCharacteristic>> {
    characteristics
        .iter()
        .find(|c| c.properties().write_without_response)
        .or_else(|| characteristics.iter().find(|c| c.properties().write))
        .cloned()
}
