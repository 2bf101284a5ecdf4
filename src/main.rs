//! Honeypot console
//!
//! Terminal client for a scam-detection honeypot service. Each line typed
//! at the prompt is sent as the next message in the conversation, and the
//! agent's reply and threat analysis are printed as they arrive.

mod config;
mod console;
mod error;
mod runtime;
mod session;
mod state_machine;
mod transport;

use config::ClientConfig;
use console::Command;
use runtime::SessionEvent;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use transport::{DetectionTransport, HttpTransport, LoggingTransport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "honeypot_console=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env();
    if config.api_key.is_none() {
        tracing::warn!("No API key configured. Set HONEYPOT_API_KEY.");
    }

    let transport = HttpTransport::new(&config)?;
    match transport.status().await {
        Ok(status) if status.is_online() => {
            tracing::info!(service = %status.service, version = %status.version, "Detection service online");
        }
        Ok(status) => {
            tracing::warn!(status = %status.status, "Detection service reports degraded status");
        }
        Err(e) => tracing::warn!(error = %e, "Detection service unreachable"),
    }

    let transport = LoggingTransport::new(transport);
    let endpoint = transport.endpoint().to_string();
    let handle = runtime::spawn(transport);

    print_lines(&console::banner(handle.snapshot().session.id(), &endpoint));
    let renderer = tokio::spawn(render_events(handle.subscribe()));

    let mut watch = handle.watch();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Submit(text) => {
                // Input stays locked while a request is in flight
                watch.wait_for(|snapshot| !snapshot.input_locked).await?;
                handle.submit(text).await?;
            }
            Command::Clear => {
                println!("{}", console::CLEAR_PROMPT);
                let answer = lines.next_line().await?.unwrap_or_default();
                if console::confirmed(&answer) {
                    watch.wait_for(|snapshot| !snapshot.input_locked).await?;
                    handle.reset().await?;
                }
            }
            Command::Status => print_lines(&console::render_status(&handle.snapshot())),
            Command::Help => print_lines(&console::help()),
            Command::Quit => break,
        }
    }

    // Submits return once applied, so a request sent just before this point
    // already shows as locked here
    watch.wait_for(|snapshot| !snapshot.input_locked).await?;
    drop(watch);
    drop(handle);
    renderer.await?;

    Ok(())
}

/// Print every event until the controller shuts down
async fn render_events(mut events: broadcast::Receiver<SessionEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => print_lines(&console::render(&event)),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Renderer fell behind, events dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
