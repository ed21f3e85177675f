//! Response body queue.
//!
//! Adapters push chunks into a [`BodySink`]; the consumer pulls them from the
//! paired [`BodyStream`]. The queue is unbounded: pushing never waits for the
//! consumer. Lifecycle notifications (`End`, `Error`, `Close`) travel on a
//! broadcast channel next to the data.

use crate::base::neterror::NetError;
use crate::http::config::StreamConfig;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use tokio::sync::{broadcast, mpsc, Notify};

/// Item carried by the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Frame {
    Data(Bytes),
    End,
}

/// Lifecycle notification of a response stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// The consumer read the end-of-stream marker.
    End,
    /// The transport failed; the stream is destroyed.
    Error(NetError),
    /// Fired once, on a later scheduling turn than `End` (or `destroy`).
    Close,
}

/// State shared by the producer and consumer halves.
#[derive(Debug)]
pub(crate) struct Shared {
    destroyed: AtomicBool,
    ended: AtomicBool,
    close_scheduled: AtomicBool,
    close_pending: AtomicBool,
    events: broadcast::Sender<StreamEvent>,
    cancel: Notify,
}

impl Shared {
    pub(crate) fn emit(&self, event: StreamEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.events.subscribe()
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Mark the stream destroyed. Returns false if it already was.
    pub(crate) fn destroy(self: &Arc<Self>) -> bool {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.cancel.notify_one();
        self.schedule_close();
        true
    }

    /// Emit `Close` once, from a freshly spawned task so it never lands in the
    /// same pass as the event that triggered it. Without a runtime the close
    /// stays pending until [`flush_close`](Self::flush_close) runs on a later
    /// poll, subscription or drop.
    pub(crate) fn schedule_close(self: &Arc<Self>) {
        if self.close_scheduled.swap(true, Ordering::SeqCst) {
            return;
        }
        let shared = Arc::clone(self);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    shared.emit(StreamEvent::Close);
                });
            }
            Err(_) => {
                tracing::debug!("no tokio runtime, close deferred to the next poll");
                self.close_pending.store(true, Ordering::SeqCst);
            }
        }
    }

    /// Emit a close left pending by [`schedule_close`](Self::schedule_close).
    pub(crate) fn flush_close(&self) {
        if self.close_pending.swap(false, Ordering::SeqCst) {
            self.emit(StreamEvent::Close);
        }
    }
}

/// Create a connected sink/stream pair.
///
/// The returned receiver is subscribed before any producer exists, so it
/// observes every event.
pub(crate) fn channel(
    config: &StreamConfig,
) -> (BodySink, BodyStream, broadcast::Receiver<StreamEvent>) {
    let (events, first) = broadcast::channel(config.event_capacity.max(1));
    let shared = Arc::new(Shared {
        destroyed: AtomicBool::new(false),
        ended: AtomicBool::new(false),
        close_scheduled: AtomicBool::new(false),
        close_pending: AtomicBool::new(false),
        events,
        cancel: Notify::new(),
    });
    let (tx, rx) = mpsc::unbounded_channel();

    let sink = BodySink {
        tx,
        shared: Arc::clone(&shared),
    };
    let stream = BodyStream {
        rx,
        shared,
        finished: false,
    };
    (sink, stream, first)
}

/// Producer half of the body queue.
#[derive(Debug, Clone)]
pub struct BodySink {
    tx: mpsc::UnboundedSender<Frame>,
    shared: Arc<Shared>,
}

impl BodySink {
    /// Queue a chunk. Returns false once the stream is destroyed or ended.
    /// Empty chunks are dropped.
    pub fn push(&self, chunk: Bytes) -> bool {
        if self.is_destroyed() || self.is_ended() {
            return false;
        }
        if chunk.is_empty() {
            return true;
        }
        self.tx.send(Frame::Data(chunk)).is_ok()
    }

    /// Queue the end-of-stream marker. Only the first call has any effect.
    pub fn push_end(&self) -> bool {
        if self.is_destroyed() || self.shared.ended.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.tx.send(Frame::End).is_ok()
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.is_destroyed()
    }

    /// Whether the end-of-stream marker has been queued.
    pub fn is_ended(&self) -> bool {
        self.shared.ended.load(Ordering::SeqCst)
    }

    /// Report a transport failure and destroy the stream.
    pub fn fail(&self, err: NetError) {
        if self.is_destroyed() {
            return;
        }
        tracing::debug!(error = %err, code = err.as_i32(), "response stream failed");
        self.shared.emit(StreamEvent::Error(err));
        self.shared.destroy();
    }

    /// Resolves once the stream is destroyed.
    pub async fn cancelled(&self) {
        if self.is_destroyed() {
            return;
        }
        self.shared.cancel.notified().await;
    }
}

/// Consumer half of the body queue.
#[derive(Debug)]
pub struct BodyStream {
    rx: mpsc::UnboundedReceiver<Frame>,
    shared: Arc<Shared>,
    finished: bool,
}

impl BodyStream {
    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }

    /// Whether the stream has yielded its last item.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Stream for BodyStream {
    type Item = Bytes;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Bytes>> {
        let this = self.get_mut();
        this.shared.flush_close();
        if this.finished {
            return Poll::Ready(None);
        }
        if this.shared.is_destroyed() {
            this.finished = true;
            return Poll::Ready(None);
        }

        match ready!(this.rx.poll_recv(cx)) {
            Some(Frame::Data(chunk)) => Poll::Ready(Some(chunk)),
            Some(Frame::End) => {
                this.finished = true;
                this.shared.emit(StreamEvent::End);
                this.shared.schedule_close();
                Poll::Ready(None)
            }
            None => {
                this.finished = true;
                if !this.shared.is_destroyed() {
                    tracing::debug!("response producer went away before end of stream");
                    this.shared.emit(StreamEvent::Error(NetError::ConnectionClosed));
                    this.shared.destroy();
                }
                Poll::Ready(None)
            }
        }
    }
}

impl Drop for BodyStream {
    fn drop(&mut self) {
        self.shared.flush_close();
        if !self.finished && self.shared.destroy() {
            tracing::debug!("response stream dropped before end, stopping producer");
        }
    }
}
