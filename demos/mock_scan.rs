//! Mock scan example demonstrating the scan lifecycle without real tools.
//!
//! This example shows how to:
//! - Plug mock adapters into a ScanOrchestrator
//! - Start a scan and watch its status
//! - Read the published record and the probe transcript
//!
//! Run with: cargo run --example mock_scan

use reconbridge::backends::{MockHttpProber, MockPortScanner, MockSubdomainSource};
use reconbridge::prelude::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== Reconbridge Mock Scan Example ===\n");

    let artifacts = tempfile::tempdir()?;

    // Enumeration takes a moment so the in-flight status is observable
    let subdomains = MockSubdomainSource::new(["www.example.com", "api.example.com"])
        .with_latency(Duration::from_millis(200));
    let ports = MockPortScanner::new([80, 443]);
    let prober = MockHttpProber::new()
        .with_response("api.example.com", 80, "301")
        .with_failure("api.example.com", 443);

    let orchestrator = Arc::new(
        ScanOrchestrator::builder()
            .with_subdomain_source(subdomains)
            .with_port_scanner(ports)
            .with_http_prober(prober)
            .with_transcripts(TranscriptStore::new(artifacts.path()))
            .with_config(OrchestratorConfig::new().with_probe_concurrency(2))
            .build()?,
    );

    let domain = Domain::parse("example.com")?;
    let handle = orchestrator.start_scan(domain.clone());
    println!("Started scan {} for {}", handle.id, handle.domain);
    println!("Status right away: {:?}", orchestrator.status(domain.as_str()));

    let record = handle.wait().await.ok_or("scan task went away")?;

    println!("\n=== Scan Results ===");
    println!("State: {}", record.state);
    println!("Duration: {:?}", record.duration);
    println!("Subdomains: {:?}", record.subdomains);
    for open in &record.open_ports {
        println!("Port {} is {}", open.port, open.status);
    }
    for probe in &record.probe_results {
        println!("{}", probe.transcript_line());
    }

    let path = orchestrator.transcripts().path_for(domain.as_str())?;
    println!("\n=== Transcript ({}) ===", path.display());
    print!("{}", tokio::fs::read_to_string(&path).await?);

    Ok(())
}
