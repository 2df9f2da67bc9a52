//! In-memory Bluetooth backend shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ticketera::printer::PrinterDevice;
use ticketera::transport::gatt::{
    BluetoothBackend, CharacteristicProperties, DisconnectHandler, GattCharacteristic, GattDevice,
    SPP_SERVICE_UUID, Subscription,
};
use ticketera::transport::{ChunkSettings, ConnectionManager, PrintQueue};
use ticketera::{Result, TicketeraError};
use uuid::Uuid;

/// A printer that records every chunk written to it.
#[derive(Default)]
pub struct MockDevice {
    pub id: String,
    connected: AtomicBool,
    pub connects: AtomicUsize,
    /// Number of upcoming writes to reject.
    pub fail_writes: AtomicUsize,
    pub chunks: Mutex<Vec<Vec<u8>>>,
    handlers: Mutex<Vec<DisconnectHandler>>,
}

impl MockDevice {
    /// Everything written so far, concatenated.
    pub fn received(&self) -> Vec<u8> {
        self.chunks.lock().unwrap().concat()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.lock().unwrap().len()
    }

    /// Simulate the printer going out of range.
    pub fn drop_link(&self) {
        self.connected.store(false, Ordering::SeqCst);
        let handlers: Vec<_> = self.handlers.lock().unwrap().clone();
        for handler in handlers {
            handler();
        }
    }
}

struct MockStream {
    device: Arc<MockDevice>,
}

#[async_trait]
impl GattCharacteristic for MockStream {
    fn uuid(&self) -> Uuid {
        Uuid::from_u128(0x2af1)
    }

    fn properties(&self) -> CharacteristicProperties {
        CharacteristicProperties {
            write: true,
            write_without_response: true,
        }
    }

    async fn write(&self, chunk: &[u8], _with_response: bool) -> Result<()> {
        let remaining = self.device.fail_writes.load(Ordering::SeqCst);
        if remaining > 0 {
            self.device.fail_writes.store(remaining - 1, Ordering::SeqCst);
            return Err(TicketeraError::Transmission("GATT operation failed".into()));
        }
        self.device.chunks.lock().unwrap().push(chunk.to_vec());
        Ok(())
    }
}

/// Device handle given to the connection manager.
struct Handle(Arc<MockDevice>);

#[async_trait]
impl GattDevice for Handle {
    fn id(&self) -> String {
        self.0.id.clone()
    }

    fn is_connected(&self) -> bool {
        self.0.connected.load(Ordering::SeqCst)
    }

    async fn connect(&self) -> Result<()> {
        self.0.connects.fetch_add(1, Ordering::SeqCst);
        self.0.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn characteristics(&self, service: Uuid) -> Result<Vec<Arc<dyn GattCharacteristic>>> {
        if service != SPP_SERVICE_UUID {
            return Err(TicketeraError::Protocol("Service not found".into()));
        }
        let stream: Arc<dyn GattCharacteristic> = Arc::new(MockStream {
            device: self.0.clone(),
        });
        Ok(vec![stream])
    }

    fn on_disconnected(&self, handler: DisconnectHandler) -> Subscription {
        self.0.handlers.lock().unwrap().push(handler);
        Subscription::noop()
    }

    async fn disconnect(&self) {
        self.0.connected.store(false, Ordering::SeqCst);
    }
}

/// Backend whose chooser always picks the requested printer.
#[derive(Default)]
pub struct MockBackend {
    pub requests: AtomicUsize,
    /// The chooser is dismissed instead of picking a device.
    pub cancel: AtomicBool,
    devices: Mutex<HashMap<String, Arc<MockDevice>>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The simulated printer for `printer_id`, created on first use.
    pub fn device(&self, printer_id: &str) -> Arc<MockDevice> {
        self.devices
            .lock()
            .unwrap()
            .entry(printer_id.to_string())
            .or_insert_with(|| {
                Arc::new(MockDevice {
                    id: printer_id.to_string(),
                    ..Default::default()
                })
            })
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BluetoothBackend for MockBackend {
    fn is_available(&self) -> bool {
        true
    }

    fn supports_silent_reacquire(&self) -> bool {
        false
    }

    async fn known_device(&self, _printer: &PrinterDevice) -> Result<Option<Arc<dyn GattDevice>>> {
        Ok(None)
    }

    async fn request_device(&self, printer: &PrinterDevice, _service: Uuid) -> Result<Arc<dyn GattDevice>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.cancel.load(Ordering::SeqCst) {
            return Err(TicketeraError::UserCancelled);
        }
        Ok(Arc::new(Handle(self.device(&printer.id))))
    }
}

/// Chunking without pacing so tests run fast.
pub fn fast_chunks() -> ChunkSettings {
    ChunkSettings {
        chunk_size: 512,
        chunk_delay_ms: 0,
    }
}

/// A queue running against `backend`.
pub fn queue(backend: Arc<MockBackend>) -> PrintQueue {
    PrintQueue::spawn(Arc::new(ConnectionManager::new(backend)), fast_chunks())
}
