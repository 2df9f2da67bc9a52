//! Print queue and connection behavior against the in-memory backend.

mod common;

use std::sync::atomic::Ordering;

use common::{MockBackend, queue};
use pretty_assertions::assert_eq;
use ticketera::model::{CartLine, TicketContext};
use ticketera::printer::{PrinterDevice, SizeClass};
use ticketera::receipt::{PrintOptions, StoreInfo};
use ticketera::service::{PrintOutcome, PrintService};
use ticketera::transport::{Environment, PrintJob, TransportPolicy};
use ticketera::TicketeraError;

fn caja() -> PrinterDevice {
    PrinterDevice::new("caja", "00:11:62:AA:BB:CC", "Caja").with_size_class(SizeClass::Mm80)
}

fn cocina() -> PrinterDevice {
    PrinterDevice::new("cocina", "00:11:62:AA:BB:DD", "Cocina").with_size_class(SizeClass::Mm58)
}

fn job(printer: PrinterDevice, bytes: &[u8]) -> PrintJob {
    PrintJob::new(printer, bytes.to_vec(), SizeClass::Mm80, PrintOptions::default())
}

fn order() -> TicketContext {
    TicketContext {
        order_number: Some("42".into()),
        customer_name: Some("Ana".into()),
        date_str: "19/10/2026 13:05".into(),
        payment_method_label: "Efectivo".into(),
        total: 85.0,
        lines: vec![CartLine::new("Baguette Pavo", 1, 85.0)],
    }
}

fn service(backend: std::sync::Arc<MockBackend>, printers: Vec<PrinterDevice>) -> PrintService {
    PrintService::new(StoreInfo::default(), TransportPolicy::bluetooth_only(), printers, queue(backend))
        .unwrap()
        .with_environment(Environment::default())
}

#[tokio::test]
async fn test_two_prints_share_one_session() {
    let backend = MockBackend::new();
    let queue = queue(backend.clone());

    queue.enqueue(job(caja(), b"first")).wait().await.unwrap();
    queue.enqueue(job(caja(), b"second")).wait().await.unwrap();

    assert_eq!(backend.request_count(), 1);
    assert_eq!(backend.device("caja").connects.load(Ordering::SeqCst), 1);
    assert_eq!(queue.connections().connect_attempts(), 1);
    assert_eq!(backend.device("caja").received(), b"firstsecond".to_vec());
}

#[tokio::test]
async fn test_write_failure_retries_once_with_fresh_session() {
    let backend = MockBackend::new();
    backend.device("caja").fail_writes.store(1, Ordering::SeqCst);
    let queue = queue(backend.clone());

    let report = queue.enqueue(job(caja(), b"ticket")).wait().await.unwrap();

    assert_eq!(report.attempts, 2);
    assert_eq!(queue.connections().connect_attempts(), 2);
    assert_eq!(backend.device("caja").received(), b"ticket".to_vec());
}

#[tokio::test]
async fn test_second_failure_rejects_job() {
    let backend = MockBackend::new();
    backend.device("caja").fail_writes.store(2, Ordering::SeqCst);
    let queue = queue(backend.clone());

    let err = queue.enqueue(job(caja(), b"ticket")).wait().await.unwrap_err();

    assert!(matches!(err, TicketeraError::Transmission(_)));
    assert_eq!(queue.connections().connect_attempts(), 2);
    assert!(backend.device("caja").received().is_empty());
}

#[tokio::test]
async fn test_failed_job_does_not_block_the_next() {
    let backend = MockBackend::new();
    backend.device("caja").fail_writes.store(2, Ordering::SeqCst);
    let queue = queue(backend.clone());

    let failing = queue.enqueue(job(caja(), b"lost"));
    let next = queue.enqueue(job(caja(), b"kept"));

    assert!(failing.wait().await.is_err());
    next.wait().await.unwrap();
    assert_eq!(backend.device("caja").received(), b"kept".to_vec());
}

#[tokio::test]
async fn test_jobs_print_in_enqueue_order() {
    let backend = MockBackend::new();
    let queue = queue(backend.clone());

    let handles: Vec<_> = (0..5u8)
        .map(|i| queue.enqueue(job(caja(), &[b'a' + i])))
        .collect();
    for handle in handles {
        handle.wait().await.unwrap();
    }

    assert_eq!(backend.device("caja").received(), b"abcde".to_vec());
}

#[tokio::test]
async fn test_large_job_is_chunked() {
    let backend = MockBackend::new();
    let queue = queue(backend.clone());

    let report = queue.enqueue(job(caja(), &[0x41; 1100])).wait().await.unwrap();

    assert_eq!(report.chunks, 3);
    assert_eq!(report.bytes_sent, 1100);
    let chunks = backend.device("caja").chunks.lock().unwrap().clone();
    assert_eq!(
        chunks.iter().map(Vec::len).collect::<Vec<_>>(),
        vec![512, 512, 76]
    );
}

#[tokio::test]
async fn test_switching_printers_replaces_the_session() {
    let backend = MockBackend::new();
    let queue = queue(backend.clone());

    queue.enqueue(job(caja(), b"1")).wait().await.unwrap();
    queue.enqueue(job(cocina(), b"2")).wait().await.unwrap();
    queue.enqueue(job(caja(), b"3")).wait().await.unwrap();

    // Single slot: every switch goes through the chooser again
    assert_eq!(backend.request_count(), 3);
    assert_eq!(backend.device("caja").received(), b"13".to_vec());
}

#[tokio::test]
async fn test_reconnects_after_link_drop() {
    let backend = MockBackend::new();
    let queue = queue(backend.clone());

    queue.enqueue(job(caja(), b"1")).wait().await.unwrap();
    backend.device("caja").drop_link();
    queue.enqueue(job(caja(), b"2")).wait().await.unwrap();

    assert_eq!(queue.connections().connect_attempts(), 2);
    assert_eq!(backend.device("caja").received(), b"12".to_vec());
}

#[tokio::test]
async fn test_dismissed_chooser_is_declined() {
    let backend = MockBackend::new();
    backend.cancel.store(true, Ordering::SeqCst);
    let service = service(backend.clone(), vec![caja()]);

    let outcome = service.print_ticket(&order(), &PrintOptions::default()).await.unwrap();

    assert_eq!(outcome, PrintOutcome::Declined);
    // Not retried
    assert_eq!(backend.request_count(), 1);
}

#[tokio::test]
async fn test_print_both_on_one_printer_is_one_job() {
    let backend = MockBackend::new();
    let printer = PrinterDevice::new("caja", "00:11:62:AA:BB:CC", "Caja");
    let service = service(backend.clone(), vec![printer]);

    let combined = service
        .print_both(&order(), &PrintOptions::default(), &PrintOptions::default())
        .await
        .unwrap();

    assert!(combined.merged);
    assert!(combined.is_complete());
    let received = backend.device("caja").received();
    let full_cuts = received.windows(3).filter(|w| *w == [0x1D, 0x56, 0x00]).count();
    assert_eq!(full_cuts, 2);
}

#[tokio::test]
async fn test_print_both_on_two_printers() {
    let backend = MockBackend::new();
    let service = service(backend.clone(), vec![caja(), cocina()]);

    let combined = service
        .print_both(&order(), &PrintOptions::default(), &PrintOptions::default())
        .await
        .unwrap();

    assert!(!combined.merged);
    assert!(combined.is_complete());
    let kitchen = String::from_utf8_lossy(&backend.device("cocina").received()).into_owned();
    let client = String::from_utf8_lossy(&backend.device("caja").received()).into_owned();
    assert!(kitchen.contains("COCINA"));
    assert!(client.contains("Pedido: #42"));
}

#[tokio::test]
async fn test_print_both_survives_one_failure() {
    let backend = MockBackend::new();
    backend.device("cocina").fail_writes.store(2, Ordering::SeqCst);
    let service = service(backend.clone(), vec![caja(), cocina()]);

    let combined = service
        .print_both(&order(), &PrintOptions::default(), &PrintOptions::default())
        .await
        .unwrap();

    assert!(combined.kitchen.is_err());
    assert!(combined.client.is_ok());
    assert!(!combined.is_complete());
}

#[tokio::test]
async fn test_print_both_reports_both_failures() {
    let backend = MockBackend::new();
    backend.device("caja").fail_writes.store(2, Ordering::SeqCst);
    backend.device("cocina").fail_writes.store(2, Ordering::SeqCst);
    let service = service(backend.clone(), vec![caja(), cocina()]);

    let combined = service
        .print_both(&order(), &PrintOptions::default(), &PrintOptions::default())
        .await
        .unwrap();

    assert!(combined.is_failed());
    assert!(matches!(combined.kitchen, Err(TicketeraError::Transmission(_))));
    assert!(matches!(combined.client, Err(TicketeraError::Transmission(_))));
}

#[tokio::test]
async fn test_forget_printer_drops_session() {
    let backend = MockBackend::new();
    let service = service(backend.clone(), vec![caja()]);
    service.print_ticket(&order(), &PrintOptions::default()).await.unwrap();

    let removed = service.forget_printer("caja").await;

    assert_eq!(removed.map(|p| p.id), Some("caja".to_string()));
    assert!(service.printers().is_empty());
    let err = service.print_ticket(&order(), &PrintOptions::default()).await.unwrap_err();
    assert!(matches!(err, TicketeraError::Capability(_)));
}
