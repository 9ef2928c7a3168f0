//! Display sink boundary.
//!
//! The scheduler worker pushes every `CaptionEvent` into a `CaptionSink`.
//! Implementations must be callable from the scheduler's thread — the
//! display's own event loop typically lives elsewhere, so both provided
//! sinks hand the event off over a channel rather than touching any UI
//! state directly. `update` is infallible from the caller's viewpoint; a
//! sink with no remaining receivers simply drops the event.

use crossbeam_channel::Sender;
use tokio::sync::broadcast;
use tracing::trace;

use crate::events::CaptionEvent;

/// Contract for caption displays.
pub trait CaptionSink: Send + Sync + 'static {
    /// Deliver the latest caption update. Called from the scheduler thread;
    /// each call overwrites the previously displayed value.
    fn update(&self, event: CaptionEvent);
}

/// Sink that fans events out on a tokio broadcast channel.
///
/// This is the engine's built-in sink: async hosts subscribe via
/// `CaptionEngine::subscribe_captions`.
pub struct BroadcastSink {
    tx: broadcast::Sender<CaptionEvent>,
}

impl BroadcastSink {
    pub fn new(tx: broadcast::Sender<CaptionEvent>) -> Self {
        Self { tx }
    }
}

impl CaptionSink for BroadcastSink {
    fn update(&self, event: CaptionEvent) {
        // send() only errors when there are no subscribers; the caption is
        // simply not displayed anywhere in that case.
        let delivered = self.tx.send(event).is_ok();
        trace!(delivered, "caption broadcast");
    }
}

/// Sink that forwards events to a synchronous channel.
///
/// For hosts whose display loop is a plain OS thread (a UI event loop, a
/// terminal printer): the display side blocks on `Receiver::recv` and never
/// shares state with the scheduler.
pub struct ChannelSink {
    tx: Sender<CaptionEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<CaptionEvent>) -> Self {
        Self { tx }
    }
}

impl CaptionSink for ChannelSink {
    fn update(&self, event: CaptionEvent) {
        let delivered = self.tx.send(event).is_ok();
        trace!(delivered, "caption forwarded to channel");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CaptionUpdate;

    fn caption(seq: u64) -> CaptionEvent {
        CaptionEvent {
            seq,
            update: CaptionUpdate::Caption {
                original: "a".into(),
                translated: "b".into(),
            },
        }
    }

    #[test]
    fn channel_sink_delivers_in_order() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let sink = ChannelSink::new(tx);
        sink.update(caption(0));
        sink.update(caption(1));
        assert_eq!(rx.recv().unwrap().seq, 0);
        assert_eq!(rx.recv().unwrap().seq, 1);
    }

    #[test]
    fn broadcast_sink_tolerates_no_subscribers() {
        let (tx, _) = broadcast::channel(4);
        let sink = BroadcastSink::new(tx);
        // Must not panic with zero receivers.
        sink.update(caption(0));
    }
}
