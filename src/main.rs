//! # Ticketera CLI
//!
//! Command-line interface for receipt printing.
//!
//! ## Usage
//!
//! ```bash
//! # Run the print gateway
//! ticketera serve
//!
//! # Print a client ticket from a JSON context
//! ticketera print ticket order.json
//!
//! # Kitchen order and client ticket in one go
//! ticketera print both order.json --open-drawer
//!
//! # Render a cash cut to HTML without printing
//! ticketera preview cash-cut cut.json --format html -o cut.html
//! ```
//!
//! Logging is controlled with `RUST_LOG` (default `ticketera=info,tower_http=info`).

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use ticketera::{
    PrintOutcome, PrintService, TicketeraError,
    config::{DEFAULT_PATH, Settings},
    ir::Program,
    model::{CashCutContext, TicketContext},
    receipt::{self, DocumentKind, PrintOptions, current_datetime},
    server,
    transport::{ConnectionManager, PrintQueue, bluetooth::RfcommBackend},
};

/// Ticketera - restaurant receipt printing
#[derive(Parser, Debug)]
#[command(name = "ticketera")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file
    #[arg(long, global = true, default_value = DEFAULT_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the print gateway server
    Serve {
        /// Address to listen on (overrides the settings file)
        #[arg(long)]
        listen: Option<String>,
    },

    /// Print a document from a JSON context
    Print {
        kind: Kind,

        /// JSON file with the ticket or cash-cut context
        file: PathBuf,

        /// Pulse the cash drawer after printing
        #[arg(long)]
        open_drawer: bool,

        /// Partial cut instead of full cut
        #[arg(long)]
        partial_cut: bool,
    },

    /// Render a document without printing
    Preview {
        kind: Kind,

        /// JSON file with the ticket or cash-cut context
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Html)]
        format: Format,

        /// Output file (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    Ticket,
    Kitchen,
    CashCut,
    /// Kitchen order followed by the client ticket
    Both,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Raw ESC/POS bytes
    Escpos,
    Html,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ticketera=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), TicketeraError> {
    let cli = Cli::parse();
    let mut settings = Settings::load(&cli.config)?;

    match cli.command {
        Commands::Serve { listen } => {
            if let Some(listen) = listen {
                settings.server.listen_addr = listen;
            }
            server::serve(&settings, Arc::new(RfcommBackend::new())).await
        }
        Commands::Print {
            kind,
            file,
            open_drawer,
            partial_cut,
        } => {
            let options = PrintOptions {
                open_drawer,
                full_cut: !partial_cut,
            };
            print(&settings, kind, &file, &options).await
        }
        Commands::Preview {
            kind,
            file,
            format,
            output,
        } => {
            let program = render(&settings, kind, &file)?;
            let data = match format {
                Format::Escpos => program.to_bytes(),
                Format::Html => {
                    let columns = match kind {
                        Kind::Kitchen => DocumentKind::Kitchen.columns(),
                        _ => DocumentKind::Ticket.columns(),
                    };
                    program.to_html(&settings.store.name, columns).into_bytes()
                }
            };
            match output {
                Some(path) => {
                    fs::write(&path, &data)?;
                    eprintln!("Saved to {}", path.display());
                }
                None => std::io::stdout().write_all(&data)?,
            }
            Ok(())
        }
    }
}

async fn print(
    settings: &Settings,
    kind: Kind,
    file: &Path,
    options: &PrintOptions,
) -> Result<(), TicketeraError> {
    let connections = Arc::new(ConnectionManager::new(Arc::new(RfcommBackend::new())));
    let queue = PrintQueue::spawn(connections, settings.chunking);
    let service = PrintService::new(
        settings.store.clone(),
        settings.policy.clone(),
        settings.printers.clone(),
        queue,
    )?;

    match kind {
        Kind::Ticket => report("Ticket", service.print_ticket(&ticket(file)?, options).await?),
        Kind::Kitchen => report("Kitchen order", service.print_kitchen(&ticket(file)?, options).await?),
        Kind::CashCut => report("Cash cut", service.print_cash_cut(&cash_cut(file)?, options).await?),
        Kind::Both => {
            let combined = service.print_both(&ticket(file)?, options, options).await?;
            let failed = combined.is_failed();
            match combined.kitchen {
                Ok(outcome) => report("Kitchen order", outcome),
                Err(e) => eprintln!("Kitchen order failed: {}", e),
            }
            match combined.client {
                Ok(outcome) => report("Ticket", outcome),
                Err(e) => eprintln!("Ticket failed: {}", e),
            }
            if failed {
                return Err(TicketeraError::Transmission(
                    "Neither document was printed".to_string(),
                ));
            }
        }
    }
    Ok(())
}

fn report(label: &str, outcome: PrintOutcome) {
    match outcome {
        PrintOutcome::Printed(job) => println!(
            "{} printed ({} bytes in {} chunks)",
            label, job.bytes_sent, job.chunks
        ),
        PrintOutcome::SentToGateway => println!("{} sent to the print gateway", label),
        PrintOutcome::Delegated { uri } => println!("{} ready for the host app:\n{}", label, uri),
        PrintOutcome::Declined => println!("{} not printed: no printer selected", label),
    }
}

fn render(settings: &Settings, kind: Kind, file: &Path) -> Result<Program, TicketeraError> {
    let options = PrintOptions::default();
    let store = &settings.store;
    Ok(match kind {
        Kind::Ticket => receipt::client_ticket(store, &ticket(file)?, &options),
        Kind::Kitchen => receipt::kitchen_order(&ticket(file)?, &options),
        Kind::CashCut => receipt::cash_cut_report(store, &cash_cut(file)?, &options),
        Kind::Both => receipt::generate_both(store, &ticket(file)?, &options, &options),
    })
}

fn ticket(file: &Path) -> Result<TicketContext, TicketeraError> {
    let mut ctx: TicketContext = serde_json::from_str(&fs::read_to_string(file)?)?;
    if ctx.date_str.trim().is_empty() {
        ctx.date_str = current_datetime();
    }
    Ok(ctx)
}

fn cash_cut(file: &Path) -> Result<CashCutContext, TicketeraError> {
    let mut ctx: CashCutContext = serde_json::from_str(&fs::read_to_string(file)?)?;
    if ctx.generated_at.trim().is_empty() {
        ctx.generated_at = current_datetime();
    }
    Ok(ctx)
}
