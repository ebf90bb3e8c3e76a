//! Per-window event slots
//!
//! Each event category holds at most one handler: registering a new handler
//! replaces the previous one, firing an empty slot is a no-op, and there is
//! no unregister primitive. Handlers run synchronously on the thread that
//! owns event polling (the frame handler runs on whichever thread currently
//! draws). A handler that blocks therefore blocks the whole loop it runs on;
//! that is a documented caller obligation.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::input::{ButtonState, KeyState, Modifiers};
use crate::unpoisoned;
use crate::window::{Window, WindowState};

/// A single-subscriber callback slot.
///
/// The handler is taken out of the slot for the duration of a call, which
/// makes firing re-entrant-safe: a handler may register a replacement for
/// its own slot, and the replacement wins over the put-back.
pub(crate) struct Slot<F: ?Sized> {
    cb: Mutex<Option<Box<F>>>,
}

impl<F: ?Sized> Default for Slot<F> {
    fn default() -> Self {
        Self {
            cb: Mutex::new(None),
        }
    }
}

impl<F: ?Sized> Slot<F> {
    /// Install a handler, replacing any previous one.
    pub(crate) fn set(&self, cb: Box<F>) {
        *unpoisoned(self.cb.lock()) = Some(cb);
    }

    /// Fire the slot if a handler is registered.
    pub(crate) fn fire(&self, call: impl FnOnce(&mut F)) {
        let taken = unpoisoned(self.cb.lock()).take();
        if let Some(mut cb) = taken {
            call(&mut cb);
            let mut current = unpoisoned(self.cb.lock());
            if current.is_none() {
                *current = Some(cb);
            }
        }
    }
}

pub(crate) type FrameFn = dyn FnMut(&Window) + Send;
pub(crate) type KeyFn = dyn FnMut(&Window, &str, KeyState, Modifiers) + Send;
pub(crate) type MouseButtonFn = dyn FnMut(&Window, &str, ButtonState, Modifiers) + Send;
pub(crate) type CursorPosFn = dyn FnMut(&Window, f64, f64) + Send;
pub(crate) type CursorEnterFn = dyn FnMut(&Window, bool) + Send;
pub(crate) type ScrollFn = dyn FnMut(&Window, f64, f64) + Send;
pub(crate) type WindowPosFn = dyn FnMut(&Window, i32, i32) + Send;
pub(crate) type WindowSizeFn = dyn FnMut(&Window, i32, i32) + Send;
pub(crate) type WindowCloseFn = dyn FnMut(&Window) + Send;
pub(crate) type WindowRefreshFn = dyn FnMut(&Window) + Send;
pub(crate) type WindowFocusFn = dyn FnMut(&Window, bool) + Send;
pub(crate) type WindowStateFn = dyn FnMut(&Window, WindowState) + Send;
pub(crate) type ContentScaleFn = dyn FnMut(&Window, f32, f32) + Send;
pub(crate) type FramebufferSizeFn = dyn FnMut(&Window, i32, i32) + Send;
pub(crate) type FileDropFn = dyn FnMut(&Window, &[PathBuf]) + Send;

/// One slot per event category.
#[derive(Default)]
pub(crate) struct EventSlots {
    pub frame: Slot<FrameFn>,
    pub key: Slot<KeyFn>,
    pub mouse_button: Slot<MouseButtonFn>,
    pub cursor_pos: Slot<CursorPosFn>,
    pub cursor_enter: Slot<CursorEnterFn>,
    pub scroll: Slot<ScrollFn>,
    pub window_pos: Slot<WindowPosFn>,
    pub window_size: Slot<WindowSizeFn>,
    pub window_close: Slot<WindowCloseFn>,
    pub window_refresh: Slot<WindowRefreshFn>,
    pub window_focus: Slot<WindowFocusFn>,
    pub window_state: Slot<WindowStateFn>,
    pub content_scale: Slot<ContentScaleFn>,
    pub framebuffer_size: Slot<FramebufferSizeFn>,
    pub file_drop: Slot<FileDropFn>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    type CountFn = dyn FnMut(i32) + Send;

    #[test]
    fn firing_empty_slot_is_noop() {
        let slot: Slot<CountFn> = Slot::default();
        slot.fire(|cb| cb(1));
    }

    #[test]
    fn registration_replaces_previous_handler() {
        let slot: Slot<CountFn> = Slot::default();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let f = Arc::clone(&first);
        slot.set(Box::new(move |_| {
            f.fetch_add(1, Ordering::SeqCst);
        }));
        slot.fire(|cb| cb(0));

        let s = Arc::clone(&second);
        slot.set(Box::new(move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        }));
        slot.fire(|cb| cb(0));
        slot.fire(|cb| cb(0));

        // the old handler never fires again once replaced
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn handler_registered_during_fire_wins() {
        let slot: Arc<Slot<CountFn>> = Arc::new(Slot::default());
        let hits = Arc::new(AtomicUsize::new(0));

        let slot2 = Arc::clone(&slot);
        let hits2 = Arc::clone(&hits);
        slot.set(Box::new(move |_| {
            let h = Arc::clone(&hits2);
            slot2.set(Box::new(move |v| {
                assert_eq!(v, 7);
                h.fetch_add(1, Ordering::SeqCst);
            }));
        }));

        slot.fire(|cb| cb(0));
        slot.fire(|cb| cb(7));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
