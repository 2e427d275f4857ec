//! Start/stop control of the keyboard hook
//!
//! A `HookController` owns at most one session: the bridge queue and the
//! hook thread feeding it. `start` builds both, `stop` tears them down in
//! order (quit the pump, join the thread, release the queue).

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::bridge::{BridgeQueue, DispatchOptions, ErrorSink, KeyEventHandler};
use crate::error::HookError;
use crate::hotkey::{HookBackend, HookThread, ThreadIdentity};

/// Options applied when a session starts
#[derive(Clone)]
pub struct HookOptions {
    /// Name of the thread that owns the hook
    pub hook_thread_name: String,
    /// Name of the thread that runs the consumer's handler
    pub dispatch_thread_name: String,
    /// Receives every failed handler invocation
    pub error_sink: Option<ErrorSink>,
}

impl Default for HookOptions {
    fn default() -> Self {
        Self {
            hook_thread_name: "keyboard-hook".to_string(),
            dispatch_thread_name: "keyboard-dispatch".to_string(),
            error_sink: None,
        }
    }
}

impl std::fmt::Debug for HookOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookOptions")
            .field("hook_thread_name", &self.hook_thread_name)
            .field("dispatch_thread_name", &self.dispatch_thread_name)
            .field("error_sink", &self.error_sink.is_some())
            .finish()
    }
}

impl HookOptions {
    fn validate(&self) -> Result<(), HookError> {
        for (field, name) in [
            ("hook_thread_name", &self.hook_thread_name),
            ("dispatch_thread_name", &self.dispatch_thread_name),
        ] {
            if name.is_empty() {
                return Err(HookError::InvalidArgument(format!("{} is empty", field)));
            }
            if name.contains('\0') {
                return Err(HookError::InvalidArgument(format!(
                    "{} contains a NUL byte",
                    field
                )));
            }
        }
        Ok(())
    }
}

/// The running hook and its queue
struct Session {
    thread: HookThread,
    queue: BridgeQueue,
}

/// Public start/stop surface of the keyboard hook
pub struct HookController<B: HookBackend> {
    backend: Arc<B>,
    options: HookOptions,
    session: Option<Session>,
}

#[cfg(windows)]
impl HookController<crate::hotkey::Win32Backend> {
    /// Controller for the Windows low-level keyboard hook
    pub fn new() -> Self {
        Self::with_options(HookOptions::default())
    }

    pub fn with_options(options: HookOptions) -> Self {
        Self::with_backend(crate::hotkey::Win32Backend, options)
    }
}

#[cfg(windows)]
impl Default for HookController<crate::hotkey::Win32Backend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: HookBackend> HookController<B> {
    pub fn with_backend(backend: B, options: HookOptions) -> Self {
        Self {
            backend: Arc::new(backend),
            options,
            session: None,
        }
    }

    /// Install the hook and start relaying key events to `handler`
    ///
    /// Blocks until the hook thread has installed the hook and reported
    /// its identity.
    pub fn start<H>(&mut self, handler: H) -> Result<(), HookError>
    where
        H: KeyEventHandler,
    {
        self.options.validate()?;

        if self.session.is_some() {
            return Err(HookError::AlreadyRunning);
        }

        let mut queue = BridgeQueue::new(
            handler,
            DispatchOptions {
                thread_name: self.options.dispatch_thread_name.clone(),
                error_sink: self.options.error_sink.clone(),
            },
        )?;

        let thread = match HookThread::spawn(
            Arc::clone(&self.backend),
            queue.submitter(),
            &self.options.hook_thread_name,
        ) {
            Ok(thread) => thread,
            Err(e) => {
                queue.release();
                return Err(e);
            }
        };

        info!(thread = %thread.identity(), "keyboard hook started");
        self.session = Some(Session { thread, queue });
        Ok(())
    }

    /// Remove the hook and release the queue
    ///
    /// Blocks until the hook thread has exited. A no-op when not running.
    pub fn stop(&mut self) {
        let Some(Session { thread, mut queue }) = self.session.take() else {
            return;
        };

        let identity = thread.identity();
        if let Err(e) = self.backend.post_quit(identity) {
            error!(?e, thread = %identity, "failed to signal hook thread");
        }
        if thread.join().is_err() {
            warn!(thread = %identity, "hook thread panicked");
        }

        queue.release();
        info!(thread = %identity, "keyboard hook stopped");
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Identity of the active hook thread
    pub fn thread_identity(&self) -> Option<ThreadIdentity> {
        self.session.as_ref().map(|s| s.thread.identity())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: HookBackend> Drop for HookController<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::DeliveryError;
    use crate::events::{KeyEvent, KeyState};
    use crate::hotkey::keys::{flags, messages, VK_LSHIFT, VK_SHIFT};
    use crate::hotkey::testing::FakeBackend;
    use crate::hotkey::RawKeyEvent;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};
    use tokio_test::{assert_err, assert_ok};

    type Seen = Arc<Mutex<Vec<KeyEvent>>>;

    fn controller() -> HookController<FakeBackend> {
        HookController::with_backend(FakeBackend::default(), HookOptions::default())
    }

    fn recorder() -> (Seen, impl KeyEventHandler) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler = move |event: KeyEvent| -> anyhow::Result<()> {
            sink.lock().unwrap().push(event);
            Ok(())
        };
        (seen, handler)
    }

    fn raw(action: u32, vk_code: u32, scan_code: u32, flags: u32) -> RawKeyEvent {
        RawKeyEvent {
            action,
            vk_code,
            scan_code,
            flags,
        }
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let mut ctl = controller();
        ctl.stop();
        ctl.stop();
        assert!(!ctl.is_running());
        assert_eq!(ctl.backend().installs(), 0);
    }

    #[test]
    fn test_start_installs_hook() {
        let mut ctl = controller();
        let (_seen, handler) = recorder();

        assert_ok!(ctl.start(handler));
        assert!(ctl.is_running());
        assert!(ctl.thread_identity().is_some());
        assert_eq!(ctl.backend().installed(), 1);

        ctl.stop();
        assert!(!ctl.is_running());
        assert_eq!(ctl.thread_identity(), None);
        assert_eq!(ctl.backend().installed(), 0);
    }

    #[test]
    fn test_second_start_rejected() {
        let mut ctl = controller();
        let (_seen, first) = recorder();
        let (_other, second) = recorder();

        assert_ok!(ctl.start(first));
        let err = assert_err!(ctl.start(second));
        assert!(matches!(err, HookError::AlreadyRunning));
        assert_eq!(ctl.backend().installs(), 1);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = HookOptions {
            hook_thread_name: "bad\0name".to_string(),
            ..HookOptions::default()
        };
        let mut ctl = HookController::with_backend(FakeBackend::default(), options);
        let (_seen, handler) = recorder();

        let err = assert_err!(ctl.start(handler));
        assert!(matches!(err, HookError::InvalidArgument(_)));
        assert!(!ctl.is_running());
        assert_eq!(ctl.backend().installs(), 0);
    }

    #[test]
    fn test_install_failure_surfaces() {
        let mut ctl = controller();
        ctl.backend().fail_next_install();
        let (_seen, handler) = recorder();

        let err = assert_err!(ctl.start(handler));
        assert!(matches!(err, HookError::HookInstallFailed(_)));
        assert!(!ctl.is_running());

        // A later attempt is independent of the failed one
        let (_seen, handler) = recorder();
        assert_ok!(ctl.start(handler));
        assert_eq!(ctl.backend().installed(), 1);
    }

    #[test]
    fn test_events_delivered_in_order() {
        let mut ctl = controller();
        let (seen, handler) = recorder();
        assert_ok!(ctl.start(handler));
        let thread = ctl.thread_identity().unwrap();

        let backend = ctl.backend();
        backend.send_key(thread, raw(messages::WM_KEYDOWN, 0x41, 30, 0));
        backend.send_key(thread, raw(messages::WM_KEYDOWN, VK_SHIFT, 554, 0));
        backend.send_key(thread, raw(messages::WM_KEYDOWN, VK_LSHIFT, 42, flags::LLKHF_INJECTED));
        backend.send_key(thread, raw(messages::WM_KEYUP, 0x41, 30, 0));
        backend.send_key(thread, raw(messages::WM_SYSKEYDOWN, 0x2D, 82, flags::LLKHF_EXTENDED));
        backend.send_key(thread, raw(0x0102, 0x41, 30, 0));

        ctl.stop();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                KeyEvent::new(KeyState::Down, 65, 30, false),
                KeyEvent::new(KeyState::Up, 65, 30, false),
                KeyEvent::new(KeyState::Down, 0x2D, 82, true),
            ]
        );
    }

    #[test]
    fn test_restart_is_independent() {
        let mut ctl = controller();

        let (first_seen, handler) = recorder();
        assert_ok!(ctl.start(handler));
        let first = ctl.thread_identity().unwrap();
        ctl.backend().send_key(first, raw(messages::WM_KEYDOWN, 0x41, 30, 0));
        ctl.stop();

        let (second_seen, handler) = recorder();
        assert_ok!(ctl.start(handler));
        let second = ctl.thread_identity().unwrap();
        assert_ne!(first, second);
        assert_eq!(ctl.backend().installed(), 1);

        // The first session's thread is gone; nothing reaches either handler
        ctl.backend().send_key(first, raw(messages::WM_KEYDOWN, 0x42, 48, 0));
        ctl.backend().send_key(second, raw(messages::WM_KEYDOWN, 0x43, 46, 0));
        ctl.stop();

        assert_eq!(first_seen.lock().unwrap().len(), 1);
        assert_eq!(
            *second_seen.lock().unwrap(),
            vec![KeyEvent::new(KeyState::Down, 0x43, 46, false)]
        );
        assert_eq!(ctl.backend().installs(), 2);
        assert_eq!(ctl.backend().installed(), 0);
    }

    #[test]
    fn test_handler_failure_reported_and_skipped() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink_errors = Arc::clone(&errors);
        let options = HookOptions {
            error_sink: Some(Arc::new(move |e: &DeliveryError| {
                sink_errors.lock().unwrap().push(e.event.vk_code());
            })),
            ..HookOptions::default()
        };
        let mut ctl = HookController::with_backend(FakeBackend::default(), options);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let handler_seen = Arc::clone(&seen);
        assert_ok!(ctl.start(move |event: KeyEvent| -> anyhow::Result<()> {
            if event.vk_code() == 0x42 {
                anyhow::bail!("consumer rejected key");
            }
            handler_seen.lock().unwrap().push(event.vk_code());
            Ok(())
        }));

        let thread = ctl.thread_identity().unwrap();
        for vk in [0x41, 0x42, 0x43] {
            ctl.backend().send_key(thread, raw(messages::WM_KEYDOWN, vk, 30, 0));
        }
        ctl.stop();

        assert_eq!(*seen.lock().unwrap(), vec![0x41, 0x43]);
        assert_eq!(*errors.lock().unwrap(), vec![0x42]);
    }

    #[test]
    fn test_failed_message_loop_still_unhooks() {
        let mut ctl = controller();
        let (seen, handler) = recorder();
        assert_ok!(ctl.start(handler));
        let thread = ctl.thread_identity().unwrap();

        ctl.backend().send_key(thread, raw(messages::WM_KEYDOWN, 0x41, 30, 0));
        ctl.backend().break_pump(thread);

        let deadline = Instant::now() + Duration::from_secs(5);
        while ctl.backend().installed() != 0 {
            assert!(Instant::now() < deadline, "hook was not removed");
            std::thread::sleep(Duration::from_millis(5));
        }

        // The quit signal has no live queue to land on; stop still returns
        ctl.stop();
        assert!(!ctl.is_running());
        assert_eq!(ctl.backend().installed(), 0);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![KeyEvent::new(KeyState::Down, 0x41, 30, false)]
        );
    }

    #[test]
    fn test_drop_stops_session() {
        let backend_installed;
        {
            let mut ctl = controller();
            let (_seen, handler) = recorder();
            assert_ok!(ctl.start(handler));
            backend_installed = Arc::clone(&ctl.backend);
        }
        assert_eq!(backend_installed.installed(), 0);
    }
}
