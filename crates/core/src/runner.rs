//! Source runner: drives one source on its own task
//!
//! A runner owns its source exclusively and publishes every produced item
//! on a dedicated conduit. Fetch failures never escape the runner: they are
//! turned into error items so the slot keeps its place on the bar.

use crate::constants::CONDUIT_CAPACITY;
use crate::error::FetchError;
use crate::source::{BoxedSource, RefreshPolicy};
use log::{debug, error, info, trace, warn};
use m2bar_types::StatusItem;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Receiving end of a runner, consumed by the multiplexer
#[derive(Debug)]
pub struct Conduit {
    pub(crate) receiver: mpsc::Receiver<StatusItem>,
    /// Shown in the slot if the runner goes away
    pub(crate) fallback: StatusItem,
    pub(crate) label: String,
}

impl Conduit {
    pub fn new(receiver: mpsc::Receiver<StatusItem>, fallback: StatusItem, label: impl Into<String>) -> Self {
        Self {
            receiver,
            fallback,
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Time left until the next multiple of `period` since the Unix epoch.
///
/// A `now` exactly on a boundary yields a full period.
pub fn delay_until_boundary(now: SystemTime, period: Duration) -> Duration {
    let period_nanos = period.as_nanos();
    if period_nanos == 0 {
        return Duration::ZERO;
    }
    let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
    let remaining = period_nanos - since_epoch % period_nanos;
    Duration::from_nanos(u64::try_from(remaining).unwrap_or(u64::MAX))
}

/// The multiplexer dropped its end of the conduit
struct Stopped;

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Finished,
}

/// Drives a single source according to its refresh policy
pub struct Runner {
    source: BoxedSource,
    tx: mpsc::Sender<StatusItem>,
    label: String,
    last: Option<StatusItem>,
}

impl Runner {
    pub fn new(source: BoxedSource, tx: mpsc::Sender<StatusItem>) -> Self {
        let label = source.metadata().label();
        Self {
            source,
            tx,
            label,
            last: None,
        }
    }

    /// Spawn a runner for `source` and return the conduit it publishes on
    pub fn spawn(source: BoxedSource) -> (Conduit, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(CONDUIT_CAPACITY);
        let conduit = Conduit::new(rx, source.error_item(), source.metadata().label());
        let task = tokio::spawn(Runner::new(source, tx).run());
        (conduit, task)
    }

    /// Run until the source fails fatally or the conduit is closed
    pub async fn run(mut self) {
        debug!("Runner for {} started ({:?})", self.label, self.source.policy());
        match self.drive().await {
            Ok(()) => info!("Runner for {} finished", self.label),
            Err(Stopped) => debug!("Runner for {} stopped: conduit closed", self.label),
        }
    }

    async fn drive(&mut self) -> Result<(), Stopped> {
        if let Some(placeholder) = self.source.placeholder() {
            self.deliver(placeholder).await?;
        }

        match self.source.policy() {
            RefreshPolicy::Interval { period, dedup } => self.run_interval(period, dedup).await,
            RefreshPolicy::Aligned { period } => self.run_aligned(period).await,
            RefreshPolicy::Event { retry } => self.run_event(retry).await,
        }
    }

    async fn run_interval(&mut self, period: Duration, dedup: bool) -> Result<(), Stopped> {
        if self.refresh(false).await? == Flow::Finished {
            return Ok(());
        }

        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if self.refresh(dedup).await? == Flow::Finished {
                return Ok(());
            }
        }
    }

    async fn run_aligned(&mut self, period: Duration) -> Result<(), Stopped> {
        if self.refresh(false).await? == Flow::Finished {
            return Ok(());
        }

        loop {
            // Re-aligned on every pass so the schedule never drifts
            time::sleep(delay_until_boundary(SystemTime::now(), period)).await;
            if self.refresh(false).await? == Flow::Finished {
                return Ok(());
            }
        }
    }

    async fn run_event(&mut self, retry: Duration) -> Result<(), Stopped> {
        if self.refresh(false).await? == Flow::Finished {
            return Ok(());
        }

        loop {
            let flow = match self.source.wait_event().await {
                Ok(()) => self.refresh(false).await?,
                Err(FetchError::Fatal(message)) => {
                    error!("{}: change watcher failed permanently: {}", self.label, message);
                    let item = self.source.error_item();
                    self.deliver(item).await?;
                    Flow::Finished
                }
                Err(FetchError::Transient(message)) => {
                    warn!("{}: change watcher failed, retrying in {:?}: {}", self.label, retry, message);
                    let item = self.source.error_item();
                    if self.last.as_ref() != Some(&item) {
                        self.deliver(item).await?;
                    }
                    time::sleep(retry).await;
                    // Not a change notification, so an unchanged value stays quiet
                    self.refresh(true).await?
                }
            };
            if flow == Flow::Finished {
                return Ok(());
            }
        }
    }

    /// Fetch once (bounded by the source's timeout) and publish the result
    async fn refresh(&mut self, dedup: bool) -> Result<Flow, Stopped> {
        let limit = self.source.timeout();
        let (item, flow) = match time::timeout(limit, self.source.fetch()).await {
            Ok(Ok(item)) => (item, Flow::Continue),
            Ok(Err(FetchError::Transient(message))) => {
                warn!("{}: fetch failed: {}", self.label, message);
                (self.source.error_item(), Flow::Continue)
            }
            Ok(Err(FetchError::Fatal(message))) => {
                error!("{}: source disabled: {}", self.label, message);
                (self.source.error_item(), Flow::Finished)
            }
            Err(_) => {
                warn!("{}: fetch timed out after {:?}", self.label, limit);
                (self.source.error_item(), Flow::Continue)
            }
        };

        if dedup && flow == Flow::Continue && self.last.as_ref() == Some(&item) {
            trace!("{}: value unchanged, not delivering", self.label);
            return Ok(flow);
        }
        self.deliver(item).await?;
        Ok(flow)
    }

    async fn deliver(&mut self, item: StatusItem) -> Result<(), Stopped> {
        trace!("{}: delivering {:?}", self.label, item.full_text);
        self.last = Some(item.clone());
        self.tx.send(item).await.map_err(|_| Stopped)
    }
}
