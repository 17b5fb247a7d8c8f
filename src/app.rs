//! Wiring from a validated configuration to a running status stream

use crate::config::{AppConfig, ConfiguredSource};
use anyhow::{Context, Result};
use log::{info, warn};
use m2bar_core::{
    create_source, BoxedSource, Conduit, EmitError, Multiplexer, ProtocolEmitter, Runner, ThemeSpec,
};
use std::future::Future;
use tokio::io::AsyncWrite;

/// Instantiate every configured source through the global registry.
/// Must run after the source kinds are registered.
pub fn build_sources(configured: Vec<ConfiguredSource>) -> Result<Vec<(BoxedSource, ThemeSpec)>> {
    configured
        .into_iter()
        .map(|entry| {
            let source = create_source(&entry.config)
                .with_context(|| format!("Failed to create {} source", entry.config.kind()))?;
            Ok((source, entry.theme))
        })
        .collect()
}

/// Spawn one runner per source. Runner tasks are detached and end when
/// their conduit closes.
pub fn spawn_runners(sources: Vec<(BoxedSource, ThemeSpec)>) -> Vec<(Conduit, ThemeSpec)> {
    sources
        .into_iter()
        .map(|(source, theme)| {
            let (conduit, _handle) = Runner::spawn(source);
            (conduit, theme)
        })
        .collect()
}

/// Validate `config` and stream the bar to `writer` until `shutdown`
/// resolves or the consumer goes away.
pub async fn run<W, F>(config: &AppConfig, writer: W, shutdown: F) -> Result<()>
where
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    let configured = config.validate().context("Invalid configuration")?;
    run_configured(configured, writer, shutdown).await
}

/// Like [`run`], for sources that are already validated
pub async fn run_configured<W, F>(configured: Vec<ConfiguredSource>, writer: W, shutdown: F) -> Result<()>
where
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    let sources = build_sources(configured)?;
    if sources.is_empty() {
        warn!("No widgets configured, the bar will stay empty");
    }

    let mut emitter = ProtocolEmitter::new(writer);
    match emitter.begin().await {
        Err(EmitError::Closed) => {
            info!("Consumer closed the stream before the first snapshot");
            return Ok(());
        }
        other => other.context("Failed to write protocol header")?,
    }

    tokio::pin!(shutdown);

    let conduits = spawn_runners(sources);
    info!("Started {} source runner(s)", conduits.len());

    let multiplexer = tokio::select! {
        _ = &mut shutdown => {
            info!("Shutdown requested during startup");
            return Ok(());
        }
        multiplexer = Multiplexer::start(conduits) => multiplexer,
    };

    multiplexer
        .run(&mut emitter, shutdown)
        .await
        .context("Failed to write status stream")?;

    info!("Emitted {} snapshot(s)", emitter.emitted());
    Ok(())
}
