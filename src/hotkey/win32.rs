//! Windows backend: WH_KEYBOARD_LL hook and the thread message loop

use tracing::warn;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{HINSTANCE, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW,
    TranslateMessage, UnhookWindowsHookEx, HC_ACTION, HHOOK, KBDLLHOOKSTRUCT, MSG,
    WH_KEYBOARD_LL, WM_QUIT,
};

use super::backend::{HookBackend, PumpExit, ThreadIdentity};
use super::capture;
use super::filter::RawKeyEvent;
use crate::error::HookError;

/// Low-level keyboard hook backed by the Win32 API
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Backend;

impl HookBackend for Win32Backend {
    type Registration = HHOOK;

    fn current_thread(&self) -> ThreadIdentity {
        // SAFETY: GetCurrentThreadId has no preconditions.
        ThreadIdentity::new(unsafe { GetCurrentThreadId() })
    }

    fn install(&self) -> Result<HHOOK, HookError> {
        // SAFETY: A null module name requests the handle of the current process image.
        let instance = unsafe { GetModuleHandleW(PCWSTR::null()) }
            .ok()
            .map(|module| HINSTANCE(module.0));

        // SAFETY: The hook procedure is a valid `extern "system"` fn for the lifetime
        // of the process. Installing also creates this thread's message queue, so
        // a quit posted after the handshake cannot be lost.
        unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(low_level_keyboard_proc), instance, 0) }
            .map_err(|e| HookError::HookInstallFailed(e.to_string()))
    }

    fn pump(&self) -> PumpExit {
        let mut msg = MSG::default();
        loop {
            // SAFETY: `msg` is a valid MSG and this is the hook's own thread.
            let result = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            match result.0 {
                0 => return PumpExit::Quit,
                -1 => return PumpExit::Failed("GetMessageW returned -1".to_string()),
                _ => {}
            }
            // SAFETY: Standard translate/dispatch for a message retrieved on this thread.
            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }

    fn uninstall(&self, hook: HHOOK) {
        // SAFETY: `hook` was returned by SetWindowsHookExW on this thread.
        if let Err(e) = unsafe { UnhookWindowsHookEx(hook) } {
            warn!(?e, "failed to remove keyboard hook");
        }
    }

    fn post_quit(&self, thread: ThreadIdentity) -> anyhow::Result<()> {
        // SAFETY: Posting WM_QUIT carries no pointers.
        unsafe { PostThreadMessageW(thread.raw(), WM_QUIT, WPARAM(0), LPARAM(0)) }?;
        Ok(())
    }
}

/// Hook procedure invoked by Windows on the hook thread for every key event
///
/// Copies the event out of the OS buffer, runs the capture step and always
/// forwards to the next hook exactly once.
unsafe extern "system" fn low_level_keyboard_proc(
    code: i32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if code == HC_ACTION as i32 && lparam.0 != 0 {
        // SAFETY: For HC_ACTION, lParam points to a KBDLLHOOKSTRUCT valid for this call.
        let info = unsafe { &*(lparam.0 as *const KBDLLHOOKSTRUCT) };
        let raw = RawKeyEvent {
            action: wparam.0 as u32,
            vk_code: info.vkCode,
            scan_code: info.scanCode,
            flags: info.flags.0,
        };
        capture::process(&raw);
    }

    // SAFETY: Forwarding the unmodified arguments to the next hook in the chain.
    unsafe { CallNextHookEx(None, code, wparam, lparam) }
}
