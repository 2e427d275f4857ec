//! Bridge between the hook thread and the consumer
//!
//! Key events captured on the hook thread are relayed through a
//! non-blocking queue and delivered to the consumer's handler on a
//! dedicated dispatch thread.

mod handler;
mod queue;

pub use handler::{DeliveryError, ErrorSink, KeyEventHandler};
pub use queue::{BridgeQueue, DispatchOptions, Submitter};
