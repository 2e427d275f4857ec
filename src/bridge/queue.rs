//! Thread-safe relay from the hook thread to the consumer
//!
//! The producer side (`Submitter`) never blocks: events go into an unbounded
//! channel that a dedicated dispatch thread drains in FIFO order.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use super::handler::{invoke, panic_message, DeliveryError, ErrorSink, KeyEventHandler};
use crate::error::HookError;
use crate::events::KeyEvent;

/// Messages carried by the dispatch channel
enum Dispatch {
    Event(KeyEvent),
    /// Sent once by `release`; the dispatcher stops after everything queued before it
    Close,
}

/// State shared between the queue, its submitters and the dispatch thread
#[derive(Default)]
struct Shared {
    released: AtomicBool,
    /// Submitted but not yet handed to the handler
    pending: AtomicUsize,
    delivered: AtomicUsize,
    failed: AtomicUsize,
}

/// Producer handle used by the capture callback
#[derive(Clone)]
pub struct Submitter {
    tx: mpsc::UnboundedSender<Dispatch>,
    shared: Arc<Shared>,
}

impl Submitter {
    /// Queue an event for delivery without blocking
    ///
    /// Silently drops the event once the queue has been released.
    pub fn submit(&self, event: KeyEvent) {
        if self.shared.released.load(Ordering::Acquire) {
            return;
        }

        self.shared.pending.fetch_add(1, Ordering::AcqRel);
        if self.tx.send(Dispatch::Event(event)).is_err() {
            self.shared.pending.fetch_sub(1, Ordering::AcqRel);
        }
    }

    pub fn is_released(&self) -> bool {
        self.shared.released.load(Ordering::Acquire)
    }
}

/// Dispatch thread configuration
#[derive(Clone)]
pub struct DispatchOptions {
    pub thread_name: String,
    pub error_sink: Option<ErrorSink>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            thread_name: "keyboard-dispatch".to_string(),
            error_sink: None,
        }
    }
}

/// Single-consumer queue delivering key events to a handler on its own thread
pub struct BridgeQueue {
    tx: mpsc::UnboundedSender<Dispatch>,
    shared: Arc<Shared>,
    dispatcher: Option<JoinHandle<()>>,
}

impl BridgeQueue {
    /// Create the queue and start its dispatch thread
    pub fn new<H>(handler: H, options: DispatchOptions) -> Result<Self, HookError>
    where
        H: KeyEventHandler,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared::default());

        let dispatcher = {
            let shared = Arc::clone(&shared);
            let error_sink = options.error_sink;
            thread::Builder::new()
                .name(options.thread_name)
                .spawn(move || run_dispatcher(rx, handler, shared, error_sink))
                .map_err(|e| HookError::ThreadSpawn(e.to_string()))?
        };

        debug!("bridge queue created");

        Ok(Self {
            tx,
            shared,
            dispatcher: Some(dispatcher),
        })
    }

    /// Producer handle for the hook thread
    pub fn submitter(&self) -> Submitter {
        Submitter {
            tx: self.tx.clone(),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Close the queue and wait for the dispatch thread to finish
    ///
    /// Events submitted before the call are still delivered; later ones are
    /// dropped. Calling it again is a no-op.
    pub fn release(&mut self) {
        if self.shared.released.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.tx.send(Dispatch::Close);

        if let Some(handle) = self.dispatcher.take() {
            if handle.thread().id() == thread::current().id() {
                // Released from inside the handler: the loop exits after this event
                debug!("bridge queue released from dispatch thread");
                return;
            }
            if handle.join().is_err() {
                warn!("dispatch thread panicked");
            }
        }

        info!(
            delivered = self.delivered(),
            failed = self.failed(),
            "bridge queue released"
        );
    }

    pub fn is_released(&self) -> bool {
        self.shared.released.load(Ordering::Acquire)
    }

    /// Events submitted but not yet handed to the handler
    pub fn pending(&self) -> usize {
        self.shared.pending.load(Ordering::Acquire)
    }

    pub fn delivered(&self) -> usize {
        self.shared.delivered.load(Ordering::Acquire)
    }

    /// Handler invocations that errored or panicked
    pub fn failed(&self) -> usize {
        self.shared.failed.load(Ordering::Acquire)
    }
}

impl Drop for BridgeQueue {
    fn drop(&mut self) {
        self.release();
    }
}

/// Dispatch loop: deliver events in arrival order until `Close`
fn run_dispatcher<H: KeyEventHandler>(
    mut rx: mpsc::UnboundedReceiver<Dispatch>,
    mut handler: H,
    shared: Arc<Shared>,
    error_sink: Option<ErrorSink>,
) {
    debug!("dispatch thread started");

    while let Some(message) = rx.blocking_recv() {
        let event = match message {
            Dispatch::Event(event) => event,
            Dispatch::Close => break,
        };
        shared.pending.fetch_sub(1, Ordering::AcqRel);

        trace!(%event, "delivering key event");
        match invoke(&mut handler, event) {
            Ok(()) => {
                shared.delivered.fetch_add(1, Ordering::AcqRel);
            }
            Err(e) => {
                shared.failed.fetch_add(1, Ordering::AcqRel);
                report(&e, error_sink.as_ref());
            }
        }
    }

    // A submit racing `release` may have queued behind `Close`
    rx.close();
    let mut dropped = 0;
    while let Ok(message) = rx.try_recv() {
        if let Dispatch::Event(_) = message {
            shared.pending.fetch_sub(1, Ordering::AcqRel);
            dropped += 1;
        }
    }

    debug!(dropped, "dispatch thread stopped");
}

fn report(error: &DeliveryError, error_sink: Option<&ErrorSink>) {
    warn!(event = %error.event, message = %error.message, "key event delivery failed");
    if let Some(sink) = error_sink {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| sink(error))) {
            warn!(
                panic = panic_message(payload.as_ref()),
                "delivery error sink panicked"
            );
        }
    }
}
