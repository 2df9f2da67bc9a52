//! # Print Service
//!
//! The entry point order-completion and register code calls. It renders
//! the document, picks a transport and reports what happened:
//!
//! ```text
//! print_ticket ─┐
//! print_kitchen ├─► formatter ─► select_transport ─┬─► PrintQueue ─► printer
//! print_cash_cut┘                                  ├─► GatewayClient
//!                                                  └─► host app URI
//! ```

use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, TicketeraError};
use crate::ir::Program;
use crate::model::{CashCutContext, TicketContext};
use crate::printer::{ConnectionStatus, PrinterDevice, SizeClass, printer_for};
use crate::receipt::{self, DocumentKind, PrintOptions, StoreInfo};
use crate::transport::{
    ConnectionManager, Environment, GatewayClient, JobReport, PrintJob, PrintQueue, TransportKind,
    TransportPolicy, host_app, select_transport,
};

/// What a print call did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum PrintOutcome {
    /// Written to a Bluetooth printer.
    Printed(JobReport),
    /// Accepted by the print gateway.
    SentToGateway,
    /// The caller must open `uri` to hand the document to the host app.
    Delegated { uri: String },
    /// The user dismissed the device chooser; nothing printed.
    Declined,
}

/// Result of printing the kitchen order and client ticket together.
#[derive(Debug)]
pub struct CombinedOutcome {
    pub kitchen: Result<PrintOutcome>,
    pub client: Result<PrintOutcome>,
    /// Both documents went out as one job.
    pub merged: bool,
}

impl CombinedOutcome {
    /// Whether both documents got through.
    pub fn is_complete(&self) -> bool {
        self.kitchen.is_ok() && self.client.is_ok()
    }

    /// Whether neither document got through.
    pub fn is_failed(&self) -> bool {
        self.kitchen.is_err() && self.client.is_err()
    }
}

/// Renders and routes documents.
pub struct PrintService {
    store: StoreInfo,
    policy: TransportPolicy,
    env: Environment,
    printers: RwLock<Vec<PrinterDevice>>,
    queue: PrintQueue,
    gateway: Option<GatewayClient>,
}

impl PrintService {
    /// Environment flags are read from the process environment; Bluetooth
    /// support is what the queue's backend reports.
    pub fn new(
        store: StoreInfo,
        policy: TransportPolicy,
        printers: Vec<PrinterDevice>,
        queue: PrintQueue,
    ) -> Result<Self> {
        let env = Environment::from_env().with_bluetooth(queue.connections().is_available());
        let gateway = match policy.gateway_base() {
            Some(_) => Some(GatewayClient::from_policy(&policy)?),
            None => None,
        };
        Ok(Self {
            store,
            policy,
            env,
            printers: RwLock::new(printers),
            queue,
            gateway,
        })
    }

    /// Override the detected environment.
    pub fn with_environment(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    pub fn policy(&self) -> &TransportPolicy {
        &self.policy
    }

    pub fn store(&self) -> &StoreInfo {
        &self.store
    }

    pub fn connections(&self) -> &Arc<ConnectionManager> {
        self.queue.connections()
    }

    /// Configured printers, with their live connection status.
    pub fn printers(&self) -> Vec<PrinterDevice> {
        let connections = self.queue.connections();
        self.read_printers()
            .into_iter()
            .map(|mut p| {
                p.connection_status = connections.status(&p.id).connection_status();
                p
            })
            .collect()
    }

    pub fn connection_status(&self, printer_id: &str) -> ConnectionStatus {
        self.queue.connections().status(printer_id).connection_status()
    }

    /// Print the client ticket.
    #[instrument(skip_all, fields(order = ?ctx.order_number))]
    pub async fn print_ticket(&self, ctx: &TicketContext, options: &PrintOptions) -> Result<PrintOutcome> {
        let program = receipt::client_ticket(&self.store, ctx, options);
        self.dispatch(DocumentKind::Ticket, ctx, program, options).await
    }

    /// Print the kitchen order.
    #[instrument(skip_all, fields(order = ?ctx.order_number))]
    pub async fn print_kitchen(&self, ctx: &TicketContext, options: &PrintOptions) -> Result<PrintOutcome> {
        let program = receipt::kitchen_order(ctx, options);
        self.dispatch(DocumentKind::Kitchen, ctx, program, options).await
    }

    /// Print the cash-cut report.
    #[instrument(skip_all)]
    pub async fn print_cash_cut(&self, ctx: &CashCutContext, options: &PrintOptions) -> Result<PrintOutcome> {
        let program = receipt::cash_cut_report(&self.store, ctx, options);
        self.dispatch(DocumentKind::CashCut, ctx, program, options).await
    }

    /// Print the client ticket if auto-print is enabled.
    pub async fn auto_print_ticket(
        &self,
        ctx: &TicketContext,
        options: &PrintOptions,
    ) -> Result<Option<PrintOutcome>> {
        if !self.policy.auto_print {
            return Ok(None);
        }
        self.print_ticket(ctx, options).await.map(Some)
    }

    /// Print the kitchen order, then the client ticket.
    ///
    /// When both go to the same Bluetooth printer they are sent as one job
    /// so no other job can land between them, and a failure of that job is
    /// returned as the error. Otherwise each is attempted on its own and
    /// both results are reported, even when both fail.
    #[instrument(skip_all, fields(order = ?ctx.order_number))]
    pub async fn print_both(
        &self,
        ctx: &TicketContext,
        client: &PrintOptions,
        kitchen: &PrintOptions,
    ) -> Result<CombinedOutcome> {
        let kitchen_printer = self.printer_for(DocumentKind::Kitchen.size_class());
        let client_printer = self.printer_for(DocumentKind::Ticket.size_class());

        if let (Some(k), Some(c)) = (&kitchen_printer, &client_printer) {
            if k.id == c.id && self.route(Some(k))? == TransportKind::Bluetooth {
                debug!(printer = %c.id, "Merging kitchen and client into one job");
                let program = receipt::generate_both(&self.store, ctx, client, kitchen);
                let job = PrintJob::new(c.clone(), program.to_bytes(), SizeClass::Mm80, *client);
                let outcome = job_outcome(self.queue.enqueue(job).wait().await)?;
                return Ok(CombinedOutcome {
                    kitchen: Ok(outcome.clone()),
                    client: Ok(outcome),
                    merged: true,
                });
            }
        }

        let kitchen_result = self.print_kitchen(ctx, kitchen).await;
        let client_result = self.print_ticket(ctx, client).await;

        match (&kitchen_result, &client_result) {
            (Err(k), Err(c)) => warn!(kitchen = %k, client = %c, "Both documents failed"),
            (Err(e), Ok(_)) => warn!(error = %e, "Kitchen order failed, client ticket printed"),
            (Ok(_), Err(e)) => warn!(error = %e, "Client ticket failed, kitchen order printed"),
            (Ok(_), Ok(_)) => {}
        }
        Ok(CombinedOutcome {
            kitchen: kitchen_result,
            client: client_result,
            merged: false,
        })
    }

    /// Remove a printer (unpair) and drop its session.
    pub async fn forget_printer(&self, printer_id: &str) -> Option<PrinterDevice> {
        let removed = {
            let mut printers = self.printers.write().unwrap_or_else(|p| p.into_inner());
            let pos = printers.iter().position(|p| p.id == printer_id);
            pos.map(|i| printers.remove(i))
        };
        self.queue.connections().forget(printer_id).await;
        if removed.is_some() {
            info!(printer = %printer_id, "Printer forgotten");
        }
        removed
    }

    /// Add a printer or replace the one with the same id.
    pub fn upsert_printer(&self, printer: PrinterDevice) {
        let mut printers = self.printers.write().unwrap_or_else(|p| p.into_inner());
        match printers.iter_mut().find(|p| p.id == printer.id) {
            Some(existing) => *existing = printer,
            None => printers.push(printer),
        }
    }

    fn read_printers(&self) -> Vec<PrinterDevice> {
        self.printers.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn printer_for(&self, size_class: SizeClass) -> Option<PrinterDevice> {
        printer_for(&self.read_printers(), size_class).cloned()
    }

    fn route(&self, printer: Option<&PrinterDevice>) -> Result<TransportKind> {
        select_transport(&self.policy, &self.env, printer)
    }

    async fn dispatch<C: Serialize + Sync>(
        &self,
        kind: DocumentKind,
        context: &C,
        program: Program,
        options: &PrintOptions,
    ) -> Result<PrintOutcome> {
        let printer = self.printer_for(kind.size_class());
        let transport = self.route(printer.as_ref())?;
        debug!(kind = kind.as_str(), transport = ?transport, "Transport selected");

        match (transport, printer) {
            (TransportKind::Bluetooth, Some(printer)) => {
                let job = PrintJob::new(printer, program.to_bytes(), kind.size_class(), *options);
                job_outcome(self.queue.enqueue(job).wait().await)
            }
            (TransportKind::Gateway, _) => {
                let gateway = self.gateway.as_ref().ok_or_else(|| {
                    TicketeraError::Capability("No print gateway URL configured".to_string())
                })?;
                gateway.print(kind, context, options).await?;
                Ok(PrintOutcome::SentToGateway)
            }
            (TransportKind::HostApp, _) => Ok(PrintOutcome::Delegated {
                uri: host_app::build_uri(&self.policy.host_app_scheme, &program)?,
            }),
            (TransportKind::Bluetooth, None) => Err(TicketeraError::Capability(format!(
                "No printer configured for {}",
                kind.size_class()
            ))),
        }
    }
}

/// A dismissed chooser is not an error for the caller.
fn job_outcome(result: Result<JobReport>) -> Result<PrintOutcome> {
    match result {
        Ok(report) => Ok(PrintOutcome::Printed(report)),
        Err(TicketeraError::UserCancelled) => {
            debug!("Print declined by the user");
            Ok(PrintOutcome::Declined)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_job_outcome_maps_cancel_to_declined() {
        assert_eq!(
            job_outcome(Err(TicketeraError::UserCancelled)).unwrap(),
            PrintOutcome::Declined
        );
        assert!(job_outcome(Err(TicketeraError::Transmission("x".into()))).is_err());
    }

    #[test]
    fn test_outcome_json() {
        let report = JobReport {
            job_id: Uuid::nil(),
            bytes_sent: 10,
            chunks: 1,
            attempts: 1,
        };
        let json = serde_json::to_value(PrintOutcome::Printed(report)).unwrap();
        assert_eq!(json["outcome"], "printed");
        assert_eq!(json["bytesSent"], 10);

        let json = serde_json::to_value(PrintOutcome::Delegated { uri: "x://y".into() }).unwrap();
        assert_eq!(json["outcome"], "delegated");
        assert_eq!(json["uri"], "x://y");
    }
}
