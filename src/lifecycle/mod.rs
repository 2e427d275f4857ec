//! Process lifecycle for the console host

mod shutdown;

pub use shutdown::ShutdownSignal;
