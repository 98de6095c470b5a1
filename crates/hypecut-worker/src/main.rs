//! Highlight pipeline worker binary.
//!
//! Expects a local seekable copy of the stream (`HYPECUT_SOURCE`) and a
//! chat log as a JSON array of `{timestamp, weight}` events
//! (`HYPECUT_CHAT_LOG`); acquisition collaborators that feed these are out
//! of scope here.

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hypecut_media::{probe_keyframes, probe_video, FileSource, SourceVideo};
use hypecut_models::ChatEvent;
use hypecut_worker::{Pipeline, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hypecut=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting hypecut-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let source_path = std::env::var("HYPECUT_SOURCE")
        .context("HYPECUT_SOURCE must point at the local stream asset")?;
    let chat_path = std::env::var("HYPECUT_CHAT_LOG")
        .context("HYPECUT_CHAT_LOG must point at the chat-log JSON")?;

    let chat_json = tokio::fs::read_to_string(&chat_path)
        .await
        .with_context(|| format!("reading chat log {chat_path}"))?;
    let events: Vec<ChatEvent> =
        serde_json::from_str(&chat_json).context("parsing chat log JSON")?;
    if events.is_empty() {
        bail!("chat log {chat_path} contains no events");
    }

    let info = probe_video(&source_path)
        .await
        .with_context(|| format!("probing {source_path}"))?;
    if info.duration <= 0.0 {
        bail!("source {source_path} has no measurable duration");
    }

    let keyframe_index = match probe_keyframes(&source_path).await {
        Ok(index) if !index.is_empty() => Some(index),
        Ok(_) => {
            warn!("no keyframes found, falling back to interval rounding");
            None
        }
        Err(e) => {
            warn!(error = %e, "keyframe probe failed, falling back to interval rounding");
            None
        }
    };

    let source = SourceVideo {
        path: source_path.clone().into(),
        total_bytes: info.size,
        keyframe_index,
    };
    let byte_source = Arc::new(FileSource::new(&source_path));

    let output = Pipeline::new(config)
        .run(&events, info.duration, &source, byte_source)
        .await?;

    info!(
        detected = output.summary.detected,
        fetched = output.summary.fetched,
        skipped = output.summary.skipped,
        exported = output.summary.exported,
        "hypecut-worker finished"
    );

    if output.summary.skipped > 0 {
        warn!(
            skipped = output.summary.skipped,
            "some intervals were skipped; EDL covers the rest"
        );
    }

    Ok(())
}
