//! Consumer side of the bridge: the handler contract and delivery failures

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::events::KeyEvent;

/// Receives key events on the dispatch thread, in the order the OS produced them
pub trait KeyEventHandler: Send + 'static {
    fn handle(&mut self, event: KeyEvent) -> anyhow::Result<()>;
}

impl<F> KeyEventHandler for F
where
    F: FnMut(KeyEvent) -> anyhow::Result<()> + Send + 'static,
{
    fn handle(&mut self, event: KeyEvent) -> anyhow::Result<()> {
        self(event)
    }
}

/// A handler invocation that returned an error or panicked
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to deliver {event:?}: {message}")]
pub struct DeliveryError {
    /// The event that was being delivered
    pub event: KeyEvent,
    pub message: String,
}

/// Side channel for delivery failures
pub type ErrorSink = Arc<dyn Fn(&DeliveryError) + Send + Sync>;

/// Invoke the handler once, isolating errors and panics
pub(crate) fn invoke(
    handler: &mut dyn KeyEventHandler,
    event: KeyEvent,
) -> Result<(), DeliveryError> {
    match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(event))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(DeliveryError {
            event,
            message: format!("{:#}", e),
        }),
        Err(payload) => Err(DeliveryError {
            event,
            message: format!("handler panicked: {}", panic_message(payload.as_ref())),
        }),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
