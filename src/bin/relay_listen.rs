//! Connect to a relay's `/sse` stream and print every message as it arrives.

use anyhow::{bail, Context, Result};
use clap::Parser;
use futures::StreamExt;

use webpush_relay::client::{stream_url, EventStreamParser, Transcript};
use webpush_relay::config::LogConfig;
use webpush_relay::telemetry::init_tracing;

#[derive(Debug, Parser)]
#[command(name = "relay-listen", version, about = "Print messages sent to a user's event stream")]
struct Args {
    /// Base URL of the relay
    #[arg(long, default_value = "http://localhost:13700")]
    server: String,

    /// User whose stream to open
    #[arg(long)]
    user_id: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(&LogConfig::default());
    let args = Args::parse();

    let url = stream_url(&args.server, &args.user_id)?;
    let response = reqwest::Client::new()
        .get(url.clone())
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .send()
        .await
        .with_context(|| format!("failed to connect to {url}"))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        bail!("{url} answered {status}: {body}");
    }

    tracing::info!(url = %url, "Listening");

    let mut parser = EventStreamParser::new();
    let mut transcript = Transcript::new();
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        let chunk = chunk.context("event stream interrupted")?;
        for event in parser.feed(&chunk) {
            if !event.is_message() {
                tracing::debug!(event = ?event.event, data = %event.data, "Control event");
                continue;
            }
            println!("{}", event.data);
            transcript.append(&event.data);
        }
    }

    tracing::info!(messages = transcript.len(), "Stream closed by server");
    Ok(())
}
