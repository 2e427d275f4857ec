//! Dedicated hook thread
//!
//! Installs the hook, reports its identity back to the starter through a
//! one-shot handoff, pumps messages until told to quit, and unregisters
//! the hook on the way out, all on the same OS thread.

use std::marker::PhantomData;
use std::sync::mpsc::{self, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, warn};

use super::backend::{HookBackend, PumpExit, ThreadIdentity};
use super::capture;
use crate::bridge::Submitter;
use crate::error::HookError;

/// Outcome reported by the hook thread once the install attempt is over
type Handshake = Result<ThreadIdentity, HookError>;

/// A running hook thread
pub(crate) struct HookThread {
    identity: ThreadIdentity,
    handle: JoinHandle<()>,
}

impl HookThread {
    /// Spawn the hook thread and block until it has installed the hook
    pub(crate) fn spawn<B: HookBackend>(
        backend: Arc<B>,
        submitter: Submitter,
        name: &str,
    ) -> Result<Self, HookError> {
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Handshake>(1);

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run_hook_thread(backend, submitter, ready_tx))
            .map_err(|e| HookError::ThreadSpawn(e.to_string()))?;

        let handshake = ready_rx.recv();
        match handshake {
            Ok(Ok(identity)) => {
                debug!(thread = %identity, "hook thread reported identity");
                Ok(Self { identity, handle })
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(HookError::HookInstallFailed(
                    "hook thread exited before reporting its identity".to_string(),
                ))
            }
        }
    }

    pub(crate) fn identity(&self) -> ThreadIdentity {
        self.identity
    }

    /// Wait for the thread to unregister the hook and exit
    pub(crate) fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

/// Scoped hook registration; unregisters on drop
///
/// Not `Send`: the OS requires the hook to be removed by the thread that
/// installed it.
struct HookRegistration<'a, B: HookBackend> {
    backend: &'a B,
    registration: Option<B::Registration>,
    _thread_bound: PhantomData<*const ()>,
}

impl<'a, B: HookBackend> HookRegistration<'a, B> {
    fn install(backend: &'a B) -> Result<Self, HookError> {
        let registration = backend.install()?;
        Ok(Self {
            backend,
            registration: Some(registration),
            _thread_bound: PhantomData,
        })
    }
}

impl<B: HookBackend> Drop for HookRegistration<'_, B> {
    fn drop(&mut self) {
        if let Some(registration) = self.registration.take() {
            self.backend.uninstall(registration);
            debug!("keyboard hook removed");
        }
    }
}

/// Hook thread entry point
fn run_hook_thread<B: HookBackend>(
    backend: Arc<B>,
    submitter: Submitter,
    ready: SyncSender<Handshake>,
) {
    // Dropped last, after the hook is gone
    let _activation = capture::activate(submitter);

    let _registration = match HookRegistration::install(backend.as_ref()) {
        Ok(registration) => registration,
        Err(e) => {
            error!(?e, "failed to install keyboard hook");
            let _ = ready.send(Err(e));
            return;
        }
    };

    let identity = backend.current_thread();
    info!(thread = %identity, "keyboard hook installed");

    if ready.send(Ok(identity)).is_err() {
        warn!("hook starter went away before handshake");
        return;
    }
    drop(ready);

    match backend.pump() {
        PumpExit::Quit => debug!("hook message loop received quit"),
        PumpExit::Failed(reason) => warn!(%reason, "hook message loop failed"),
    }
}
