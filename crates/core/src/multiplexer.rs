//! Multiplexer: owns the bar's slots and merges all runner conduits
//!
//! Every conduit feeds a shared merge point that tags each delivered item
//! with its slot index. The multiplexer waits on that single stream, so the
//! number of sources is whatever the configuration says at startup. It is
//! the only writer of slot state, so no locking is involved.

use crate::emitter::ProtocolEmitter;
use crate::error::EmitError;
use crate::runner::Conduit;
use crate::theme::apply_theme;
use futures::stream::{self, BoxStream, SelectAll, StreamExt};
use log::{debug, info, trace, warn};
use m2bar_types::{StatusItem, ThemeSpec};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::future::Future;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;

/// Per-source state held by the multiplexer
#[derive(Debug, Clone)]
pub struct SourceSlot {
    index: usize,
    label: String,
    theme: ThemeSpec,
    fallback: StatusItem,
    /// Most recent themed item
    item: StatusItem,
}

impl SourceSlot {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn item(&self) -> &StatusItem {
        &self.item
    }

    /// Theme a freshly delivered item and store it
    fn store(&mut self, raw: StatusItem) {
        self.item = apply_theme(raw, &self.theme);
    }
}

/// Ordered view of every slot's current item; serializes as a JSON array
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    slots: &'a [SourceSlot],
}

impl<'a> Snapshot<'a> {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &'a StatusItem> + 'a {
        let slots = self.slots;
        slots.iter().map(|slot| &slot.item)
    }
}

impl Serialize for Snapshot<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.slots.len()))?;
        for item in self.items() {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

/// What the merge point yields
enum Delivery {
    Item(usize, StatusItem),
    Closed(usize),
}

fn tagged(index: usize, receiver: mpsc::Receiver<StatusItem>) -> BoxStream<'static, Delivery> {
    stream::unfold(receiver, |mut receiver| async move {
        receiver.recv().await.map(|item| (item, receiver))
    })
    .map(move |item| Delivery::Item(index, item))
    .chain(stream::once(async move { Delivery::Closed(index) }))
    .boxed()
}

/// Merges N conduits into one ordered snapshot
pub struct Multiplexer {
    slots: Vec<SourceSlot>,
    merged: SelectAll<BoxStream<'static, Delivery>>,
}

impl Multiplexer {
    /// Gather one item from every conduit, in configuration order.
    ///
    /// Waits on each conduit in turn so the first snapshot is deterministic.
    /// A conduit that closes before producing anything gets its error item.
    pub async fn start(conduits: Vec<(Conduit, ThemeSpec)>) -> Self {
        let mut slots = Vec::with_capacity(conduits.len());
        let mut merged = SelectAll::new();

        for (index, (mut conduit, theme)) in conduits.into_iter().enumerate() {
            let mut slot = SourceSlot {
                index,
                label: conduit.label.clone(),
                theme,
                fallback: conduit.fallback.clone(),
                item: StatusItem::default(),
            };
            match conduit.receiver.recv().await {
                Some(raw) => {
                    slot.store(raw);
                    merged.push(tagged(index, conduit.receiver));
                }
                None => {
                    warn!("{} closed before its first update", slot.label);
                    slot.store(conduit.fallback);
                }
            }
            debug!("Slot {} ({}) initialised", index, slot.label);
            slots.push(slot);
        }

        info!("Multiplexer started with {} slot(s)", slots.len());
        Self { slots, merged }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot { slots: &self.slots }
    }

    pub fn slots(&self) -> &[SourceSlot] {
        &self.slots
    }

    /// Number of conduits still delivering
    pub fn live_sources(&self) -> usize {
        self.merged.len()
    }

    /// Wait for the next delivery and apply it to its slot.
    ///
    /// Returns the index of the slot that changed, or `None` once every
    /// conduit has closed.
    pub async fn next_update(&mut self) -> Option<usize> {
        loop {
            match self.merged.next().await? {
                Delivery::Item(index, raw) => {
                    let slot = &mut self.slots[index];
                    slot.store(raw);
                    trace!("Slot {} ({}) updated", index, slot.label);
                    return Some(index);
                }
                Delivery::Closed(index) => {
                    let slot = &mut self.slots[index];
                    warn!("{} stopped delivering; showing permanent error", slot.label);
                    let themed = apply_theme(slot.fallback.clone(), &slot.theme);
                    if themed != slot.item {
                        slot.item = themed;
                        return Some(index);
                    }
                }
            }
        }
    }

    /// Emit the current snapshot, then one snapshot per update until
    /// `shutdown` resolves or the consumer closes the stream.
    pub async fn run<W, F>(mut self, emitter: &mut ProtocolEmitter<W>, shutdown: F) -> Result<(), EmitError>
    where
        W: AsyncWrite + Unpin,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        match emitter.emit(&self.snapshot()).await {
            Err(EmitError::Closed) => {
                info!("Consumer closed the stream");
                return Ok(());
            }
            other => other?,
        }

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping multiplexer");
                    return Ok(());
                }
                changed = self.next_update() => {
                    if changed.is_none() {
                        info!("All sources finished, holding the stream open");
                        shutdown.as_mut().await;
                        return Ok(());
                    }
                    match emitter.emit(&self.snapshot()).await {
                        Err(EmitError::Closed) => {
                            info!("Consumer closed the stream");
                            return Ok(());
                        }
                        other => other?,
                    }
                }
            }
        }
    }
}
