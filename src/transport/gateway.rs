//! # Print Gateway Client
//!
//! Delegates printing to a gateway process that owns the printers (the
//! `serve` command of this crate, or any server speaking the same API):
//!
//! ```text
//! POST {base}/api/print/ticket     body: TicketContext fields + "options"
//! POST {base}/api/print/kitchen    body: TicketContext fields + "options"
//! POST {base}/api/print/cash-cut   body: CashCutContext fields + "options"
//! x-print-token: <token>           (when configured)
//! ```
//!
//! Any 2xx status means the gateway accepted the job.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::selector::TransportPolicy;
use crate::error::{Result, TicketeraError};
use crate::receipt::{DocumentKind, PrintOptions};

/// Header carrying the shared gateway secret.
pub const TOKEN_HEADER: &str = "x-print-token";

/// Request body: the document context with its print options alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintRequest<C> {
    #[serde(flatten)]
    pub context: C,
    #[serde(default)]
    pub options: PrintOptions,
}

/// Gateway response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// HTTP client for the print gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
    timeout: Duration,
}

impl GatewayClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let base = base_url.trim().trim_end_matches('/').to_string();
        if base.is_empty() {
            return Err(TicketeraError::Capability(
                "No print gateway URL configured".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("ticketera/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base,
            token: token.filter(|t| !t.trim().is_empty()),
            timeout,
        })
    }

    pub fn from_policy(policy: &TransportPolicy) -> Result<Self> {
        let base = policy.gateway_base().ok_or_else(|| {
            TicketeraError::Capability("No print gateway URL configured".to_string())
        })?;
        Self::new(
            base,
            policy.gateway_token.clone(),
            Duration::from_millis(policy.gateway_timeout_ms),
        )
    }

    /// Full URL of the print route for `kind`.
    pub fn url_for(&self, kind: DocumentKind) -> String {
        format!("{}/api/print/{}", self.base, kind.as_str())
    }

    /// Send one document to the gateway.
    #[instrument(skip(self, context, options), fields(kind = kind.as_str()))]
    pub async fn print<C: Serialize>(
        &self,
        kind: DocumentKind,
        context: &C,
        options: &PrintOptions,
    ) -> Result<()> {
        let url = self.url_for(kind);
        let body = PrintRequest {
            context,
            options: *options,
        };

        let mut request = self.http.post(&url).json(&body);
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }

        // The deadline covers the error body too, not just the headers
        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok((status, None));
            }
            let text = response.text().await.unwrap_or_default();
            Ok::<_, reqwest::Error>((status, Some(text)))
        };
        let timed_out = || TicketeraError::Timeout(format!("Gateway did not answer: {}", url));
        let (status, body) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| timed_out())?
            .map_err(|e| if e.is_timeout() { timed_out() } else { TicketeraError::from(e) })?;

        let Some(text) = body else {
            debug!(status = status.as_u16(), "Gateway accepted the job");
            return Ok(());
        };
        let message = serde_json::from_str::<PrintResponse>(&text)
            .ok()
            .and_then(|r| r.error)
            .unwrap_or(text);
        warn!(status = status.as_u16(), error = %message, "Gateway rejected the job");
        Err(TicketeraError::Gateway {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TicketContext;

    #[test]
    fn test_url_for() {
        let client = GatewayClient::new("http://10.0.0.5:3001/", None, Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.url_for(DocumentKind::CashCut),
            "http://10.0.0.5:3001/api/print/cash-cut"
        );
    }

    #[test]
    fn test_blank_url_is_capability_error() {
        let err = GatewayClient::new(" ", None, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, TicketeraError::Capability(_)));
        let err = GatewayClient::from_policy(&TransportPolicy::default()).unwrap_err();
        assert!(matches!(err, TicketeraError::Capability(_)));
    }

    #[test]
    fn test_request_body_is_flat() {
        let ctx = TicketContext {
            order_number: Some("42".into()),
            customer_name: None,
            date_str: "2026-10-19".into(),
            payment_method_label: "Efectivo".into(),
            total: 85.0,
            lines: Vec::new(),
        };
        let body = serde_json::to_value(PrintRequest {
            context: &ctx,
            options: PrintOptions::default(),
        })
        .unwrap();
        assert_eq!(body["orderNumber"], "42");
        assert_eq!(body["options"]["fullCut"], true);

        let back: PrintRequest<TicketContext> = serde_json::from_value(body).unwrap();
        assert_eq!(back.context, ctx);
    }
}
