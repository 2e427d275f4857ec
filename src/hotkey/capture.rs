//! Capture step run by the OS hook procedure
//!
//! The low-level hook procedure has no user-data pointer, so the active
//! submitter lives in a thread-local on the hook thread. The hook is only
//! ever invoked on the thread that installed it.

use std::cell::RefCell;
use std::marker::PhantomData;

use super::filter::{self, RawKeyEvent};
use crate::bridge::Submitter;

thread_local! {
    static ACTIVE: RefCell<Option<Submitter>> = const { RefCell::new(None) };
}

/// Keeps a submitter active on the current thread until dropped
pub(crate) struct Activation {
    _thread_bound: PhantomData<*const ()>,
}

/// Make `submitter` the target of every capture on the current thread
pub(crate) fn activate(submitter: Submitter) -> Activation {
    ACTIVE.with(|active| *active.borrow_mut() = Some(submitter));
    Activation {
        _thread_bound: PhantomData,
    }
}

impl Drop for Activation {
    fn drop(&mut self) {
        let _ = ACTIVE.try_with(|active| active.borrow_mut().take());
    }
}

/// Filter a raw event and hand it to the active submitter
///
/// Must be called on the hook thread from within the hook procedure.
/// Never blocks and never panics; returns `true` if an event was submitted.
/// The caller is still responsible for forwarding the event to the next hook.
pub fn process(raw: &RawKeyEvent) -> bool {
    ACTIVE
        .try_with(|active| {
            let Ok(active) = active.try_borrow() else {
                return false;
            };
            let Some(submitter) = active.as_ref() else {
                return false;
            };

            match filter::classify(raw) {
                Some(event) => {
                    submitter.submit(event);
                    true
                }
                None => false,
            }
        })
        .unwrap_or(false)
}
