//! # Transport Selection
//!
//! A pure decision over three inputs: the user's [`TransportPolicy`], the
//! runtime [`Environment`], and the printer configured for the document's
//! size class.
//!
//! | Order | Transport | When |
//! |-------|-----------|------|
//! | 1 | Bluetooth | printer configured, Bluetooth enabled and supported, no host ESC/POS app |
//! | 2 | Gateway | a gateway base URL is configured |
//! | 3 | Host app | mobile-like environment or host app present |
//!
//! Anything else is a capability error.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TicketeraError};
use crate::printer::PrinterDevice;

/// Default gateway request timeout (milliseconds)
pub const DEFAULT_GATEWAY_TIMEOUT_MS: u64 = 5000;

/// Default URI scheme of the host print app.
pub const DEFAULT_HOST_APP_SCHEME: &str = "my.bluetoothprint.scheme://";

/// Printing preferences, persisted in the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransportPolicy {
    pub bluetooth_enabled: bool,
    pub gateway_url: Option<String>,
    pub gateway_token: Option<String>,
    pub gateway_timeout_ms: u64,
    pub host_app_scheme: String,
    /// Print the client ticket automatically when an order completes.
    pub auto_print: bool,
}

impl Default for TransportPolicy {
    fn default() -> Self {
        Self {
            bluetooth_enabled: true,
            gateway_url: None,
            gateway_token: None,
            gateway_timeout_ms: DEFAULT_GATEWAY_TIMEOUT_MS,
            host_app_scheme: DEFAULT_HOST_APP_SCHEME.to_string(),
            auto_print: false,
        }
    }
}

impl TransportPolicy {
    /// Direct Bluetooth only; what the gateway server itself runs with.
    pub fn bluetooth_only() -> Self {
        Self {
            bluetooth_enabled: true,
            gateway_url: None,
            gateway_token: None,
            ..Self::default()
        }
    }

    /// The gateway base URL, without trailing slashes, if set.
    pub fn gateway_base(&self) -> Option<&str> {
        self.gateway_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }
}

/// Facts about the runtime the core is embedded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Environment {
    /// A companion app intercepts printing through its URI scheme.
    pub host_escpos_app: bool,
    pub mobile: bool,
    pub bluetooth_supported: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            host_escpos_app: false,
            mobile: false,
            bluetooth_supported: true,
        }
    }
}

impl Environment {
    /// Read `TICKETERA_HOST_ESCPOS_APP` and `TICKETERA_MOBILE`.
    ///
    /// `bluetooth_supported` starts as true; callers overwrite it with
    /// what the backend reports.
    pub fn from_env() -> Self {
        Self {
            host_escpos_app: env_flag("TICKETERA_HOST_ESCPOS_APP"),
            mobile: env_flag("TICKETERA_MOBILE"),
            bluetooth_supported: true,
        }
    }

    pub fn with_bluetooth(mut self, supported: bool) -> Self {
        self.bluetooth_supported = supported;
        self
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// How a document leaves the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportKind {
    Bluetooth,
    Gateway,
    HostApp,
}

/// Choose the transport for one document.
///
/// `printer` is the printer found for the document's size class, if any.
pub fn select_transport(
    policy: &TransportPolicy,
    env: &Environment,
    printer: Option<&PrinterDevice>,
) -> Result<TransportKind> {
    if printer.is_some() && policy.bluetooth_enabled && env.bluetooth_supported && !env.host_escpos_app {
        return Ok(TransportKind::Bluetooth);
    }
    if policy.gateway_base().is_some() {
        return Ok(TransportKind::Gateway);
    }
    if env.mobile || env.host_escpos_app {
        return Ok(TransportKind::HostApp);
    }
    Err(TicketeraError::Capability(
        "No print transport available: configure a printer or a gateway URL".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printer() -> PrinterDevice {
        PrinterDevice::new("caja", "00:11:22:33:44:55", "Caja")
    }

    fn with_gateway() -> TransportPolicy {
        TransportPolicy {
            gateway_url: Some("http://192.168.1.20:3001/".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_bluetooth_first() {
        let kind = select_transport(&with_gateway(), &Environment::default(), Some(&printer()));
        assert_eq!(kind.unwrap(), TransportKind::Bluetooth);
    }

    #[test]
    fn test_gateway_without_printer() {
        let kind = select_transport(&with_gateway(), &Environment::default(), None);
        assert_eq!(kind.unwrap(), TransportKind::Gateway);
    }

    #[test]
    fn test_bluetooth_disabled_falls_to_gateway() {
        let policy = TransportPolicy {
            bluetooth_enabled: false,
            ..with_gateway()
        };
        let kind = select_transport(&policy, &Environment::default(), Some(&printer()));
        assert_eq!(kind.unwrap(), TransportKind::Gateway);
    }

    #[test]
    fn test_host_app_environment_skips_bluetooth() {
        let env = Environment {
            host_escpos_app: true,
            ..Default::default()
        };
        let kind = select_transport(&TransportPolicy::default(), &env, Some(&printer()));
        assert_eq!(kind.unwrap(), TransportKind::HostApp);
    }

    #[test]
    fn test_unsupported_bluetooth_on_mobile() {
        let env = Environment {
            mobile: true,
            bluetooth_supported: false,
            ..Default::default()
        };
        let kind = select_transport(&TransportPolicy::default(), &env, Some(&printer()));
        assert_eq!(kind.unwrap(), TransportKind::HostApp);
    }

    #[test]
    fn test_nothing_available() {
        let err = select_transport(&TransportPolicy::default(), &Environment::default(), None);
        assert!(matches!(err, Err(TicketeraError::Capability(_))));
    }

    #[test]
    fn test_gateway_base_trims() {
        assert_eq!(with_gateway().gateway_base(), Some("http://192.168.1.20:3001"));
        let blank = TransportPolicy {
            gateway_url: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(blank.gateway_base(), None);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}
