//! # Bluetooth RFCOMM Backend
//!
//! Implements the [GATT abstraction](super::gatt) on Linux by way of
//! Serial Port Profile (SPP) devices bound to `/dev/rfcommN`.
//!
//! ## Bluetooth Setup (Linux)
//!
//! The printer must be paired first. Binding can be left to the backend
//! (`rfcomm bind`, needs root) or done by hand:
//!
//! ```bash
//! $ bluetoothctl
//! [bluetooth]# scan on
//! [bluetooth]# pair 00:11:62:XX:XX:XX
//! $ sudo rfcomm bind 0 00:11:62:XX:XX:XX
//! # This creates /dev/rfcomm0
//! ```
//!
//! A bound device is a previously authorized device: [`RfcommBackend`]
//! re-acquires it silently. With no binding the backend plays the role
//! of the interactive chooser and binds the printer's address itself.
//!
//! ## TTY Configuration
//!
//! The RFCOMM device is opened in raw mode so ESC/POS bytes pass through
//! unmodified:
//!
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, etc. cleared
//! - **No output processing**: OPOST cleared (no CR/LF translation)
//! - **8-bit characters**: CS8, no parity
//! - **No echo, non-canonical**: ECHO, ECHONL, ICANON cleared

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::gatt::{
    BluetoothBackend, CharacteristicProperties, DisconnectHandler, GattCharacteristic, GattDevice,
    SPP_SERVICE_UUID, Subscription,
};
use crate::error::{Result, TicketeraError};
use crate::printer::PrinterDevice;

/// Default RFCOMM channel used when binding a printer.
pub const DEFAULT_CHANNEL: u8 = 0;

/// Linux RFCOMM backend.
///
/// ```no_run
/// use std::sync::Arc;
/// use ticketera::transport::bluetooth::RfcommBackend;
/// use ticketera::transport::ConnectionManager;
///
/// let manager = ConnectionManager::new(Arc::new(RfcommBackend::new()));
/// ```
#[derive(Debug, Clone)]
pub struct RfcommBackend {
    channel: u8,
    auto_bind: bool,
}

impl Default for RfcommBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RfcommBackend {
    pub fn new() -> Self {
        Self {
            channel: DEFAULT_CHANNEL,
            auto_bind: true,
        }
    }

    /// RFCOMM channel to bind unbound printers to (`/dev/rfcomm{channel}`).
    pub fn channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    /// Never run `rfcomm bind`; only already bound printers are usable.
    pub fn without_auto_bind(mut self) -> Self {
        self.auto_bind = false;
        self
    }
}

#[async_trait]
impl BluetoothBackend for RfcommBackend {
    fn is_available(&self) -> bool {
        cfg!(unix) && Path::new("/sys/class/bluetooth").exists()
    }

    fn supports_silent_reacquire(&self) -> bool {
        true
    }

    #[instrument(skip(self, printer), fields(address = %printer.address))]
    async fn known_device(&self, printer: &PrinterDevice) -> Result<Option<Arc<dyn GattDevice>>> {
        check_mac(&printer.address)?;
        let mac = printer.address.clone();
        let found = blocking(move || find_rfcomm_for_mac(&mac)).await?;
        Ok(found.map(|path| {
            debug!(path = %path, "Found bound RFCOMM device");
            Arc::new(RfcommDevice::new(printer, path)) as Arc<dyn GattDevice>
        }))
    }

    #[instrument(skip(self, printer), fields(address = %printer.address))]
    async fn request_device(&self, printer: &PrinterDevice, service: Uuid) -> Result<Arc<dyn GattDevice>> {
        if service != SPP_SERVICE_UUID {
            return Err(TicketeraError::Protocol(format!(
                "RFCOMM only offers the serial port service, not {}",
                service
            )));
        }
        check_mac(&printer.address)?;
        if let Some(device) = self.known_device(printer).await? {
            return Ok(device);
        }
        if !self.auto_bind {
            return Err(TicketeraError::Connection(format!(
                "{} is not bound to an RFCOMM device",
                printer.address
            )));
        }

        let mac = printer.address.clone();
        let channel = self.channel;
        let path = blocking(move || setup_rfcomm(&mac, channel)).await?;
        info!(path = %path, "Bound printer");
        Ok(Arc::new(RfcommDevice::new(printer, path)))
    }
}

type Handlers = Arc<Mutex<Vec<(u64, DisconnectHandler)>>>;

/// A printer bound to `/dev/rfcommN`.
pub struct RfcommDevice {
    id: String,
    path: PathBuf,
    file: Arc<Mutex<Option<File>>>,
    handlers: Handlers,
    next_handler: AtomicU64,
}

impl RfcommDevice {
    fn new(printer: &PrinterDevice, path: impl Into<PathBuf>) -> Self {
        Self {
            id: printer.id.clone(),
            path: path.into(),
            file: Arc::new(Mutex::new(None)),
            handlers: Arc::new(Mutex::new(Vec::new())),
            next_handler: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Drop the open file and tell every subscriber.
fn mark_disconnected(file: &Mutex<Option<File>>, handlers: &Handlers) {
    let was_open = file.lock().map(|mut f| f.take().is_some()).unwrap_or(false);
    if !was_open {
        return;
    }
    // Handlers may drop their own subscription, so call them unlocked
    let handlers: Vec<DisconnectHandler> = handlers
        .lock()
        .map(|h| h.iter().map(|(_, handler)| handler.clone()).collect())
        .unwrap_or_default();
    for handler in handlers {
        handler();
    }
}

#[async_trait]
impl GattDevice for RfcommDevice {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn is_connected(&self) -> bool {
        self.file.lock().map(|f| f.is_some()).unwrap_or(false)
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn connect(&self) -> Result<()> {
        let path = self.path.clone();
        let file = blocking(move || open_raw(&path)).await?;
        if let Ok(mut slot) = self.file.lock() {
            *slot = Some(file);
        }
        info!("RFCOMM device opened");
        Ok(())
    }

    async fn characteristics(&self, service: Uuid) -> Result<Vec<Arc<dyn GattCharacteristic>>> {
        if service != SPP_SERVICE_UUID {
            return Err(TicketeraError::Protocol(format!(
                "{} does not offer service {}",
                self.path.display(),
                service
            )));
        }
        let stream: Arc<dyn GattCharacteristic> = Arc::new(RfcommStream {
            file: self.file.clone(),
            handlers: self.handlers.clone(),
        });
        Ok(vec![stream])
    }

    fn on_disconnected(&self, handler: DisconnectHandler) -> Subscription {
        let key = self.next_handler.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut handlers) = self.handlers.lock() {
            handlers.push((key, handler));
        }
        let handlers = self.handlers.clone();
        Subscription::new(move || {
            if let Ok(mut handlers) = handlers.lock() {
                handlers.retain(|(k, _)| *k != key);
            }
        })
    }

    async fn disconnect(&self) {
        mark_disconnected(&self.file, &self.handlers);
    }
}

/// The serial stream, exposed as a single write-without-response
/// characteristic.
struct RfcommStream {
    file: Arc<Mutex<Option<File>>>,
    handlers: Handlers,
}

#[async_trait]
impl GattCharacteristic for RfcommStream {
    fn uuid(&self) -> Uuid {
        SPP_SERVICE_UUID
    }

    fn properties(&self) -> CharacteristicProperties {
        CharacteristicProperties {
            write: true,
            write_without_response: true,
        }
    }

    async fn write(&self, chunk: &[u8], _with_response: bool) -> Result<()> {
        let file = self
            .file
            .lock()
            .ok()
            .and_then(|f| f.as_ref().map(File::try_clone))
            .transpose()
            .map_err(|e| TicketeraError::Transmission(format!("Device handle lost: {}", e)))?
            .ok_or_else(|| TicketeraError::Transmission("Device not connected".to_string()))?;

        let data = chunk.to_vec();
        let written = blocking(move || {
            let mut file = file;
            file.write_all(&data)?;
            file.flush()
        })
        .await;

        if let Err(e) = written {
            warn!(error = %e, "RFCOMM write failed");
            mark_disconnected(&self.file, &self.handlers);
            return Err(TicketeraError::Transmission(format!("Write failed: {}", e)));
        }
        Ok(())
    }
}

/// Run blocking device I/O off the async runtime.
async fn blocking<T, E, F>(f: F) -> Result<T>
where
    F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<TicketeraError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| TicketeraError::Connection(format!("Device task failed: {}", e)))?
        .map_err(Into::into)
}

fn check_mac(mac: &str) -> Result<()> {
    if is_valid_mac(mac) {
        Ok(())
    } else {
        Err(TicketeraError::InvalidConfig(format!(
            "Invalid Bluetooth address: {}",
            mac
        )))
    }
}

fn open_raw(path: &Path) -> Result<File> {
    let file = OpenOptions::new().write(true).open(path).map_err(|e| {
        TicketeraError::Connection(format!("Failed to open {}: {}", path.display(), e))
    })?;
    configure_tty_raw(&file)?;
    Ok(file)
}

/// Configure the device for raw TTY mode.
///
/// XON/XOFF flow control is disabled too: 0x11 and 0x13 may appear in
/// ESC/POS parameters.
#[cfg(unix)]
fn configure_tty_raw(file: &File) -> Result<()> {
    use std::mem::MaybeUninit;
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();
    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(TicketeraError::Connection(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(TicketeraError::Connection(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_file: &File) -> Result<()> {
    Ok(())
}

// ============================================================================
// RFCOMM SETUP HELPERS
// ============================================================================

/// Validate a Bluetooth MAC address format (XX:XX:XX:XX:XX:XX).
pub fn is_valid_mac(mac: &str) -> bool {
    let parts: Vec<&str> = mac.split(':').collect();
    parts.len() == 6
        && parts
            .iter()
            .all(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Device path for the first line of an `rfcomm` listing mentioning `mac`.
///
/// Lines look like `rfcomm0: 00:11:62:AA:BB:CC channel 1 clean`.
fn device_in_listing(listing: &str, mac: &str) -> Option<String> {
    let mac_upper = mac.to_uppercase();
    listing
        .lines()
        .filter(|line| line.to_uppercase().contains(&mac_upper))
        .filter_map(|line| line.split(':').next())
        .map(|name| format!("/dev/{}", name.trim()))
        .next()
}

/// Find an existing RFCOMM device bound to `mac`.
///
/// Checks `/proc/net/rfcomm`, then `rfcomm -a`.
#[cfg(unix)]
pub fn find_rfcomm_for_mac(mac: &str) -> Result<Option<String>> {
    if let Ok(contents) = fs::read_to_string("/proc/net/rfcomm") {
        if let Some(path) = device_in_listing(&contents, mac).filter(|p| Path::new(p).exists()) {
            return Ok(Some(path));
        }
    }

    let output = Command::new("rfcomm")
        .arg("-a")
        .output()
        .map_err(|e| TicketeraError::Connection(format!("Failed to run 'rfcomm -a': {}", e)))?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(device_in_listing(&stdout, mac).filter(|p| Path::new(p).exists()))
}

#[cfg(not(unix))]
pub fn find_rfcomm_for_mac(_mac: &str) -> Result<Option<String>> {
    Ok(None)
}

/// Connect, verify and bind `mac` to `/dev/rfcomm{channel}`.
///
/// Runs `bluetoothctl connect`, `l2ping -c 1` and `rfcomm bind`.
/// **Requires root privileges** for the bind.
#[cfg(unix)]
pub fn setup_rfcomm(mac: &str, channel: u8) -> Result<String> {
    let mac_upper = mac.to_uppercase();
    let device_path = format!("/dev/rfcomm{}", channel);

    // May fail when already connected; l2ping verifies below
    let output = Command::new("bluetoothctl")
        .arg("connect")
        .arg(&mac_upper)
        .output()
        .map_err(|e| TicketeraError::Connection(format!("Failed to run bluetoothctl: {}", e)))?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    if stdout.contains("Connection successful") || stdout.contains("already connected") {
        debug!(mac = %mac_upper, "bluetoothctl connected");
    } else {
        debug!(mac = %mac_upper, output = %stdout.trim(), "bluetoothctl did not confirm");
    }

    thread::sleep(Duration::from_millis(500));

    let output = Command::new("l2ping")
        .arg("-c")
        .arg("1")
        .arg(&mac_upper)
        .output()
        .map_err(|e| TicketeraError::Connection(format!("Failed to run l2ping: {}", e)))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TicketeraError::Connection(format!(
            "Device {} not reachable: {}",
            mac_upper,
            stderr.trim()
        )));
    }

    let output = Command::new("rfcomm")
        .arg("bind")
        .arg(channel.to_string())
        .arg(&mac_upper)
        .arg("1") // SPP channel
        .output()
        .map_err(|e| TicketeraError::Connection(format!("Failed to run rfcomm bind: {}", e)))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TicketeraError::Connection(format!(
            "rfcomm bind failed: {}",
            stderr.trim()
        )));
    }

    thread::sleep(Duration::from_millis(500));

    if !Path::new(&device_path).exists() {
        return Err(TicketeraError::Connection(format!(
            "Device {} was not created",
            device_path
        )));
    }
    Ok(device_path)
}

#[cfg(not(unix))]
pub fn setup_rfcomm(_mac: &str, _channel: u8) -> Result<String> {
    Err(TicketeraError::Capability(
        "RFCOMM setup not supported on this platform".to_string(),
    ))
}

// ============================================================================
// TESTS
// ============================================================================
