//! Window handle and display-state machine
//!
//! The display state (normal/minimized/maximized/fullscreen) is never
//! stored; it is derived fresh from platform facts at every decision point,
//! which keeps the wrapper from desynchronizing with the native window. What
//! the window does persist are the two geometry caches the platform cannot
//! provide: `normal_rect` (where to land on restore, refreshed whenever a
//! move/resize notification arrives while the derived state is normal) and
//! `fullscreen_backup` (where to land when leaving fullscreen for maximized,
//! captured at the moment fullscreen is entered).
//!
//! A `Window` is a cheap clone of a shared inner record. The registry holds
//! only weak references, so the user's handles are the sole owners; once the
//! last one drops, the native window is destroyed on the next loop
//! iteration. Every operation on a window whose native counterpart is gone
//! (or invoked off the platform thread) is a safe no-op returning a default
//! value.

use std::any::Any;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::app::{App, Registry};
use crate::events::EventSlots;
use crate::geometry::{Point, Rect, Size};
use crate::input::{ButtonState, CursorMode, KeyState, Modifiers};
use crate::monitor::Monitor;
use crate::platform::{MonitorId, Platform, PlatformEvent, RenderSurface, WindowId};
use crate::unpoisoned;

/// Display state of a window, derived on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Neither minimized, maximized, nor fullscreen.
    Normal,
    /// Iconified. Takes precedence over the other states.
    Minimized,
    /// Maximized within its monitor's work area.
    Maximized,
    /// Attached to a monitor, covering it entirely.
    Fullscreen,
}

#[derive(Default)]
struct Caches {
    normal_rect: Rect<i32>,
    fullscreen_backup: Rect<i32>,
    size_limit_min: Option<(i32, i32)>,
    size_limit_max: Option<(i32, i32)>,
    aspect_ratio: Option<(i32, i32)>,
    swap_interval: i32,
    last_applied_swap_interval: Option<i32>,
}

pub(crate) struct WindowInner {
    pub(crate) id: WindowId,
    registry: Arc<Registry>,
    title: Mutex<String>,
    tag: Mutex<String>,
    user_data: Mutex<Option<Box<dyn Any + Send>>>,
    frame_count: AtomicU64,
    close_requested: AtomicBool,
    caches: Mutex<Caches>,
    pub(crate) slots: EventSlots,
    pub(crate) surface: Mutex<Option<Box<dyn RenderSurface>>>,
}

impl WindowInner {
    pub(crate) fn close_requested(&self) -> bool {
        self.close_requested.load(Ordering::SeqCst)
    }

    /// Detach the render surface so it can be dropped before the native
    /// window it belongs to.
    pub(crate) fn take_surface(&self) -> Option<Box<dyn RenderSurface>> {
        unpoisoned(self.surface.lock()).take()
    }
}

impl Drop for WindowInner {
    fn drop(&mut self) {
        // The native window is destroyed by the loop thread; all we can do
        // from an arbitrary thread is leave a note.
        self.registry.retire(self.id);
    }
}

/// Handle to one top-level window.
#[derive(Clone)]
pub struct Window {
    pub(crate) inner: Arc<WindowInner>,
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.inner.id)
            .finish_non_exhaustive()
    }
}

pub(crate) fn derive_state(p: &mut dyn Platform, id: WindowId) -> WindowState {
    if p.is_iconified(id) {
        WindowState::Minimized
    } else if p.attached_monitor(id).is_some() {
        WindowState::Fullscreen
    } else if p.is_maximized(id) {
        WindowState::Maximized
    } else {
        WindowState::Normal
    }
}

fn current_rect(p: &mut dyn Platform, id: WindowId) -> Rect<i32> {
    match (p.window_pos(id), p.window_size(id)) {
        (Some((x, y)), Some((w, h))) => Rect::new(x, y, w, h),
        _ => Rect::default(),
    }
}

/// Monitor with the greatest overlap against `rect`; ties go to the first
/// enumerated monitor, no overlap yields `None`.
fn best_monitor(p: &mut dyn Platform, rect: Rect<i32>) -> Option<MonitorId> {
    let mut best: Option<(MonitorId, i64)> = None;
    for id in p.monitors() {
        let Some(info) = p.monitor_info(id) else {
            continue;
        };
        let area = info.rect().intersection_area(&rect);
        if area > 0 && best.is_none_or(|(_, b)| area > b) {
            best = Some((id, area));
        }
    }
    best.map(|(id, _)| id)
}

/// Seed `normal_rect` for a freshly created window. A window created
/// directly into a non-normal state has never had a normal rectangle, so a
/// centered quarter-area rect on its monitor is synthesized.
pub(crate) fn initial_normal_rect(p: &mut dyn Platform, id: WindowId) -> Rect<i32> {
    if derive_state(p, id) == WindowState::Normal {
        return current_rect(p, id);
    }
    let wrect = current_rect(p, id);
    let mrect = best_monitor(p, wrect)
        .or_else(|| p.primary_monitor())
        .and_then(|m| p.monitor_info(m))
        .map(|info| info.rect())
        .unwrap_or(wrect);
    Rect::new(
        mrect.left() + mrect.width() / 4,
        mrect.top() + mrect.height() / 4,
        mrect.width() / 2,
        mrect.height() / 2,
    )
}

pub(crate) fn new_window(
    id: WindowId,
    registry: Arc<Registry>,
    title: &str,
    surface: Box<dyn RenderSurface>,
    normal_rect: Rect<i32>,
) -> Window {
    Window {
        inner: Arc::new(WindowInner {
            id,
            registry,
            title: Mutex::new(title.to_string()),
            tag: Mutex::new(String::new()),
            user_data: Mutex::new(None),
            frame_count: AtomicU64::new(0),
            close_requested: AtomicBool::new(false),
            caches: Mutex::new(Caches {
                normal_rect,
                ..Caches::default()
            }),
            slots: EventSlots::default(),
            surface: Mutex::new(Some(surface)),
        }),
    }
}

impl Window {
    fn with_platform<T>(&self, f: impl FnOnce(&mut dyn Platform) -> T) -> Option<T> {
        let id = self.inner.id;
        App::with_platform(|p| {
            if p.window_exists(id) {
                Some(f(p))
            } else {
                None
            }
        })
        .flatten()
    }

    // -- state machine ----------------------------------------------------

    /// Current display state, derived from platform facts.
    pub fn state(&self) -> WindowState {
        let id = self.inner.id;
        self.with_platform(|p| derive_state(p, id))
            .unwrap_or(WindowState::Normal)
    }

    /// Iconify the window. Does nothing if already minimized.
    pub fn minimize(&self) {
        let id = self.inner.id;
        self.with_platform(|p| {
            if !p.is_iconified(id) {
                p.iconify(id);
            }
        });
    }

    /// Maximize the window. Leaving fullscreen detours through the
    /// captured backup rectangle first so that a later restore lands on the
    /// true normal rectangle.
    pub fn maximize(&self) {
        let id = self.inner.id;
        self.with_platform(|p| {
            if p.attached_monitor(id).is_some() {
                if p.is_iconified(id) {
                    // Never maximize while still iconified.
                    p.restore(id);
                }
                let caches = unpoisoned(self.inner.caches.lock());
                let rect = if caches.fullscreen_backup.is_valid() {
                    caches.fullscreen_backup
                } else {
                    caches.normal_rect
                };
                drop(caches);
                p.detach_to_rect(id, rect);
            }
            p.maximize(id);
        });
    }

    /// Fullscreen on the monitor the window currently occupies most
    /// (primary monitor when it overlaps none).
    pub fn fullscreen(&self) {
        self.fullscreen_to(None);
    }

    /// Fullscreen on a specific monitor.
    pub fn fullscreen_on(&self, monitor: &Monitor) {
        self.fullscreen_to(Some(monitor.id));
    }

    fn fullscreen_to(&self, target: Option<MonitorId>) {
        let id = self.inner.id;
        let mut entered = false;
        self.with_platform(|p| {
            let iconified = p.is_iconified(id);
            let attached = p.attached_monitor(id).is_some();
            if attached {
                if iconified {
                    // Minimized fullscreen window: just un-minimize.
                    p.restore(id);
                }
                return;
            }
            let (backup, wrect) = {
                let caches = unpoisoned(self.inner.caches.lock());
                let backup = if !iconified && p.is_maximized(id) {
                    current_rect(p, id)
                } else {
                    caches.normal_rect
                };
                let wrect = if iconified {
                    caches.normal_rect
                } else {
                    current_rect(p, id)
                };
                (backup, wrect)
            };
            let Some(monitor) =
                target.or_else(|| best_monitor(p, wrect).or_else(|| p.primary_monitor()))
            else {
                return;
            };
            let Some(info) = p.monitor_info(monitor) else {
                return;
            };
            unpoisoned(self.inner.caches.lock()).fullscreen_backup = backup;
            log::debug!("window {:?} entering fullscreen on {}", id, info.name);
            p.attach_to_monitor(
                id,
                monitor,
                (info.mode.width, info.mode.height),
                info.mode.refresh_rate,
            );
            entered = true;
        });
        // The platform emits no notification for a monitor attachment, so
        // report the state change ourselves, after the platform borrow is
        // released so the handler can call back into this window.
        if entered {
            self.inner
                .slots
                .window_state
                .fire(|cb| cb(self, WindowState::Fullscreen));
        }
    }

    /// Return the window to its normal state and last normal rectangle.
    pub fn restore(&self) {
        let id = self.inner.id;
        self.with_platform(|p| {
            if p.attached_monitor(id).is_some() {
                if p.is_iconified(id) {
                    // Drop iconified first; detaching a minimized window
                    // would otherwise snap it to the maximized size.
                    p.restore(id);
                }
                let rect = unpoisoned(self.inner.caches.lock()).normal_rect;
                p.detach_to_rect(id, rect);
            }
            p.restore(id);
        });
    }

    /// The monitor the window currently overlaps most, if any.
    pub fn placed_monitor(&self) -> Option<Monitor> {
        let id = self.inner.id;
        self.with_platform(|p| {
            let wrect = if p.is_iconified(id) {
                unpoisoned(self.inner.caches.lock()).normal_rect
            } else {
                current_rect(p, id)
            };
            best_monitor(p, wrect)
        })
        .flatten()
        .map(|id| Monitor { id })
    }

    // -- geometry ---------------------------------------------------------

    /// Position of the window's top-left corner.
    pub fn pos(&self) -> Point<i32> {
        let id = self.inner.id;
        self.with_platform(|p| p.window_pos(id))
            .flatten()
            .map(|(x, y)| Point::new(x, y))
            .unwrap_or_default()
    }

    /// Move the window.
    pub fn set_pos(&self, x: i32, y: i32) {
        let id = self.inner.id;
        self.with_platform(|p| p.set_window_pos(id, x, y));
    }

    /// Client-area size in screen coordinates.
    pub fn size(&self) -> Size<i32> {
        let id = self.inner.id;
        self.with_platform(|p| p.window_size(id))
            .flatten()
            .map(|(w, h)| Size::new(w, h))
            .unwrap_or_default()
    }

    /// Position and size combined.
    pub fn rect(&self) -> Rect<i32> {
        let id = self.inner.id;
        self.with_platform(|p| current_rect(p, id)).unwrap_or_default()
    }

    /// Resize the client area. With an active aspect-ratio constraint, one
    /// dimension is adjusted to satisfy the ratio before the request is
    /// forwarded; the platform then clamps against the size limits.
    pub fn set_size(&self, width: i32, height: i32) {
        let (mut w, mut h) = (width, height);
        if let Some((num, den)) = unpoisoned(self.inner.caches.lock()).aspect_ratio {
            let r1 = f64::from(width) / f64::from(height);
            let r2 = f64::from(num) / f64::from(den);
            if r1 < r2 {
                h = (f64::from(width) / r2).round() as i32;
            } else if r2 < r1 {
                w = (f64::from(height) * r2).round() as i32;
            }
            // Equal ratios pass through untouched.
        }
        let id = self.inner.id;
        self.with_platform(|p| p.set_window_size(id, w, h));
    }

    /// Framebuffer size in pixels (may differ from `size` under scaling).
    pub fn framebuffer_size(&self) -> Size<i32> {
        let id = self.inner.id;
        self.with_platform(|p| p.framebuffer_size(id))
            .flatten()
            .map(|(w, h)| Size::new(w, h))
            .unwrap_or_default()
    }

    /// Content scale factors of the window.
    pub fn content_scale(&self) -> (f32, f32) {
        let id = self.inner.id;
        self.with_platform(|p| p.content_scale(id))
            .flatten()
            .unwrap_or((0.0, 0.0))
    }

    // -- size constraints -------------------------------------------------

    fn resend_size_limits(&self, p: &mut dyn Platform) {
        let (min, max) = {
            let caches = unpoisoned(self.inner.caches.lock());
            (caches.size_limit_min, caches.size_limit_max)
        };
        // The platform takes one combined call, so both halves are resent
        // whenever either changes.
        p.set_size_limits(self.inner.id, min, max);
    }

    /// Set the minimum client-area size.
    pub fn set_size_limit_min(&self, width: i32, height: i32) {
        self.with_platform(|p| {
            unpoisoned(self.inner.caches.lock()).size_limit_min = Some((width, height));
            self.resend_size_limits(p);
        });
    }

    /// Remove the minimum size constraint.
    pub fn clear_size_limit_min(&self) {
        self.with_platform(|p| {
            unpoisoned(self.inner.caches.lock()).size_limit_min = None;
            self.resend_size_limits(p);
        });
    }

    /// Set the maximum client-area size.
    pub fn set_size_limit_max(&self, width: i32, height: i32) {
        self.with_platform(|p| {
            unpoisoned(self.inner.caches.lock()).size_limit_max = Some((width, height));
            self.resend_size_limits(p);
        });
    }

    /// Remove the maximum size constraint.
    pub fn clear_size_limit_max(&self) {
        self.with_platform(|p| {
            unpoisoned(self.inner.caches.lock()).size_limit_max = None;
            self.resend_size_limits(p);
        });
    }

    /// Constrain the client area to a fixed width:height ratio.
    pub fn set_aspect_ratio(&self, numerator: i32, denominator: i32) {
        self.with_platform(|p| {
            unpoisoned(self.inner.caches.lock()).aspect_ratio = Some((numerator, denominator));
            p.set_aspect_ratio(self.inner.id, Some((numerator, denominator)));
        });
    }

    /// Remove the aspect-ratio constraint.
    pub fn clear_aspect_ratio(&self) {
        self.with_platform(|p| {
            unpoisoned(self.inner.caches.lock()).aspect_ratio = None;
            p.set_aspect_ratio(self.inner.id, None);
        });
    }

    // -- attributes -------------------------------------------------------

    /// Current title text.
    pub fn title(&self) -> String {
        unpoisoned(self.inner.title.lock()).clone()
    }

    /// Change the title bar text.
    pub fn set_title(&self, title: &str) {
        let id = self.inner.id;
        self.with_platform(|p| {
            *unpoisoned(self.inner.title.lock()) = title.to_string();
            p.set_title(id, title);
        });
    }

    /// Free-form tag string carried by the window.
    pub fn tag(&self) -> String {
        unpoisoned(self.inner.tag.lock()).clone()
    }

    /// Attach a free-form tag string.
    pub fn set_tag(&self, tag: &str) {
        *unpoisoned(self.inner.tag.lock()) = tag.to_string();
    }

    /// Attach arbitrary user data to the window, replacing any previous
    /// value.
    pub fn set_user_data<T: Any + Send>(&self, value: T) {
        *unpoisoned(self.inner.user_data.lock()) = Some(Box::new(value));
    }

    /// Access the attached user data, if it exists and has type `T`.
    pub fn with_user_data<T: Any + Send, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        unpoisoned(self.inner.user_data.lock())
            .as_mut()
            .and_then(|data| data.downcast_mut::<T>())
            .map(f)
    }

    /// Show or hide the window.
    pub fn set_visible(&self, visible: bool) {
        let id = self.inner.id;
        self.with_platform(|p| p.set_visible(id, visible));
    }

    /// Whether the window is currently visible.
    pub fn is_visible(&self) -> bool {
        let id = self.inner.id;
        self.with_platform(|p| p.is_visible(id)).unwrap_or(false)
    }

    /// Bring the window to front and give it input focus.
    pub fn focus(&self) {
        let id = self.inner.id;
        self.with_platform(|p| p.focus(id));
    }

    /// Whether the window has input focus.
    pub fn is_focused(&self) -> bool {
        let id = self.inner.id;
        self.with_platform(|p| p.is_focused(id)).unwrap_or(false)
    }

    /// Request the user's attention without stealing focus.
    pub fn flash(&self) {
        let id = self.inner.id;
        self.with_platform(|p| p.request_attention(id));
    }

    /// Keep the window above all non-topmost windows.
    pub fn set_topmost(&self, topmost: bool) {
        let id = self.inner.id;
        self.with_platform(|p| p.set_topmost(id, topmost));
    }

    /// Whether the window is marked always-on-top.
    pub fn is_topmost(&self) -> bool {
        let id = self.inner.id;
        self.with_platform(|p| p.is_topmost(id)).unwrap_or(false)
    }

    /// Allow or forbid user resizing.
    pub fn set_resizable(&self, resizable: bool) {
        let id = self.inner.id;
        self.with_platform(|p| p.set_resizable(id, resizable));
    }

    /// Whether the user can resize the window.
    pub fn is_resizable(&self) -> bool {
        let id = self.inner.id;
        self.with_platform(|p| p.is_resizable(id)).unwrap_or(false)
    }

    /// Whole-window opacity in `[0, 1]`.
    pub fn opacity(&self) -> f32 {
        let id = self.inner.id;
        self.with_platform(|p| p.opacity(id)).flatten().unwrap_or(0.0)
    }

    /// Set whole-window opacity.
    pub fn set_opacity(&self, opacity: f32) {
        let id = self.inner.id;
        self.with_platform(|p| p.set_opacity(id, opacity));
    }

    // -- cursor and clipboard --------------------------------------------

    /// Cursor position relative to the window's client area.
    pub fn cursor_pos(&self) -> (f64, f64) {
        let id = self.inner.id;
        self.with_platform(|p| p.cursor_pos(id))
            .flatten()
            .unwrap_or((0.0, 0.0))
    }

    /// Cursor x coordinate relative to the client area.
    pub fn cursor_pos_x(&self) -> f64 {
        self.cursor_pos().0
    }

    /// Cursor y coordinate relative to the client area.
    pub fn cursor_pos_y(&self) -> f64 {
        self.cursor_pos().1
    }

    /// Warp the cursor to a client-area position.
    pub fn set_cursor_pos(&self, x: f64, y: f64) {
        let id = self.inner.id;
        self.with_platform(|p| p.set_cursor_pos(id, x, y));
    }

    /// Current cursor behavior mode.
    pub fn cursor_mode(&self) -> CursorMode {
        let id = self.inner.id;
        self.with_platform(|p| p.cursor_mode(id))
            .flatten()
            .unwrap_or_default()
    }

    /// Change the cursor behavior mode.
    pub fn set_cursor_mode(&self, mode: CursorMode) {
        let id = self.inner.id;
        self.with_platform(|p| p.set_cursor_mode(id, mode));
    }

    /// System clipboard contents, if any.
    pub fn clipboard(&self) -> String {
        let id = self.inner.id;
        self.with_platform(|p| p.clipboard(id))
            .flatten()
            .unwrap_or_default()
    }

    /// Replace the system clipboard contents.
    pub fn set_clipboard(&self, text: &str) {
        let id = self.inner.id;
        self.with_platform(|p| p.set_clipboard(id, text));
    }

    // -- lifecycle --------------------------------------------------------

    /// Request the window to close. Safe from any thread; the loop thread
    /// observes the request on its next iteration and destroys the window.
    pub fn close(&self) {
        self.inner.close_requested.store(true, Ordering::SeqCst);
        let id = self.inner.id;
        self.with_platform(|p| p.set_should_close(id, true));
    }

    /// Whether a close has been requested (by the user or via [`close`]).
    /// A window whose native counterpart is gone reports `true`.
    ///
    /// [`close`]: Window::close
    pub fn should_close(&self) -> bool {
        if self.inner.close_requested.load(Ordering::SeqCst) {
            return true;
        }
        let id = self.inner.id;
        self.with_platform(|p| p.should_close(id)).unwrap_or(true)
    }

    /// Whether the native window still exists.
    pub fn is_alive(&self) -> bool {
        let id = self.inner.id;
        App::with_platform(|p| p.window_exists(id)).unwrap_or(false)
    }

    /// Number of completed draws for this window.
    pub fn frame_count(&self) -> u64 {
        self.inner.frame_count.load(Ordering::SeqCst)
    }

    /// Desired buffer-swap interval. Applied on the next draw, exactly once
    /// per change.
    pub fn set_swap_interval(&self, interval: i32) {
        unpoisoned(self.inner.caches.lock()).swap_interval = interval;
    }

    /// The desired buffer-swap interval.
    pub fn swap_interval(&self) -> i32 {
        unpoisoned(self.inner.caches.lock()).swap_interval
    }

    // -- event registration ----------------------------------------------

    /// Called once per draw, with the window's context current.
    pub fn on_frame(&self, cb: impl FnMut(&Window) + Send + 'static) {
        self.inner.slots.frame.set(Box::new(cb));
    }

    /// Key press/release/repeat, with the decoded key name.
    pub fn on_key(&self, cb: impl FnMut(&Window, &str, KeyState, Modifiers) + Send + 'static) {
        self.inner.slots.key.set(Box::new(cb));
    }

    /// Mouse button press/release, with the decoded button name.
    pub fn on_mouse_button(
        &self,
        cb: impl FnMut(&Window, &str, ButtonState, Modifiers) + Send + 'static,
    ) {
        self.inner.slots.mouse_button.set(Box::new(cb));
    }

    /// Cursor movement within the client area.
    pub fn on_mouse_pos(&self, cb: impl FnMut(&Window, f64, f64) + Send + 'static) {
        self.inner.slots.cursor_pos.set(Box::new(cb));
    }

    /// Cursor entering or leaving the client area.
    pub fn on_mouse_enter(&self, cb: impl FnMut(&Window, bool) + Send + 'static) {
        self.inner.slots.cursor_enter.set(Box::new(cb));
    }

    /// Scroll wheel or touchpad scroll offsets.
    pub fn on_mouse_wheel(&self, cb: impl FnMut(&Window, f64, f64) + Send + 'static) {
        self.inner.slots.scroll.set(Box::new(cb));
    }

    /// Window moved.
    pub fn on_window_pos(&self, cb: impl FnMut(&Window, i32, i32) + Send + 'static) {
        self.inner.slots.window_pos.set(Box::new(cb));
    }

    /// Window resized.
    pub fn on_window_size(&self, cb: impl FnMut(&Window, i32, i32) + Send + 'static) {
        self.inner.slots.window_size.set(Box::new(cb));
    }

    /// Close requested by the user or the application.
    pub fn on_window_close(&self, cb: impl FnMut(&Window) + Send + 'static) {
        self.inner.slots.window_close.set(Box::new(cb));
    }

    /// Window contents need redrawing.
    pub fn on_window_redraw(&self, cb: impl FnMut(&Window) + Send + 'static) {
        self.inner.slots.window_refresh.set(Box::new(cb));
    }

    /// Input focus gained or lost.
    pub fn on_window_focus(&self, cb: impl FnMut(&Window, bool) + Send + 'static) {
        self.inner.slots.window_focus.set(Box::new(cb));
    }

    /// Display state changed (minimized/maximized/fullscreen transitions).
    pub fn on_window_state(&self, cb: impl FnMut(&Window, WindowState) + Send + 'static) {
        self.inner.slots.window_state.set(Box::new(cb));
    }

    /// Content scale changed (e.g. moved to a monitor with different DPI).
    pub fn on_window_contentscale(&self, cb: impl FnMut(&Window, f32, f32) + Send + 'static) {
        self.inner.slots.content_scale.set(Box::new(cb));
    }

    /// Framebuffer resized.
    pub fn on_framebuffer_size(&self, cb: impl FnMut(&Window, i32, i32) + Send + 'static) {
        self.inner.slots.framebuffer_size.set(Box::new(cb));
    }

    /// Files dropped onto the window.
    pub fn on_drop(&self, cb: impl FnMut(&Window, &[PathBuf]) + Send + 'static) {
        self.inner.slots.file_drop.set(Box::new(cb));
    }
}

/// Refresh `normal_rect` from the live geometry if the window is currently
/// in the normal state. This is the only path that updates the cache
/// outside explicit transitions, and it is what makes restore accurate
/// after the user drags or resizes the window by hand.
fn refresh_normal_rect(window: &Window) {
    let id = window.inner.id;
    let refreshed = window
        .with_platform(|p| {
            if derive_state(p, id) == WindowState::Normal {
                Some(current_rect(p, id))
            } else {
                None
            }
        })
        .flatten();
    if let Some(rect) = refreshed {
        unpoisoned(window.inner.caches.lock()).normal_rect = rect;
    }
}

/// Forward one platform notification to the window's handler slots.
pub(crate) fn dispatch(window: &Window, event: PlatformEvent) {
    let slots = &window.inner.slots;
    match event {
        PlatformEvent::Key { name, state, mods } => {
            slots.key.fire(|cb| cb(window, name, state, mods));
        }
        PlatformEvent::MouseButton { name, state, mods } => {
            slots.mouse_button.fire(|cb| cb(window, name, state, mods));
        }
        PlatformEvent::CursorPos(x, y) => slots.cursor_pos.fire(|cb| cb(window, x, y)),
        PlatformEvent::CursorEnter(entered) => slots.cursor_enter.fire(|cb| cb(window, entered)),
        PlatformEvent::Scroll(x, y) => slots.scroll.fire(|cb| cb(window, x, y)),
        PlatformEvent::Moved(x, y) => {
            refresh_normal_rect(window);
            slots.window_pos.fire(|cb| cb(window, x, y));
        }
        PlatformEvent::Resized(w, h) => {
            refresh_normal_rect(window);
            slots.window_size.fire(|cb| cb(window, w, h));
        }
        PlatformEvent::CloseRequested => slots.window_close.fire(|cb| cb(window)),
        PlatformEvent::Refresh => slots.window_refresh.fire(|cb| cb(window)),
        PlatformEvent::Focus(focused) => slots.window_focus.fire(|cb| cb(window, focused)),
        PlatformEvent::IconifyChanged(_) | PlatformEvent::MaximizeChanged(_) => {
            let state = window.state();
            slots.window_state.fire(|cb| cb(window, state));
        }
        PlatformEvent::FramebufferResized(w, h) => {
            slots.framebuffer_size.fire(|cb| cb(window, w, h));
        }
        PlatformEvent::ContentScaleChanged(x, y) => {
            slots.content_scale.fire(|cb| cb(window, x, y));
        }
        PlatformEvent::FileDrop(paths) => slots.file_drop.fire(|cb| cb(window, &paths)),
    }
}

/// One draw pass for one window: bind context, run the frame handler,
/// apply a pending swap-interval change, swap, unbind, count. Binding and
/// unbinding around every draw keeps two windows' contexts from being
/// simultaneously current when multiple windows share a draw thread.
pub(crate) fn draw(window: &Window) {
    let inner = &window.inner;
    let mut surface_slot = unpoisoned(inner.surface.lock());
    let Some(surface) = surface_slot.as_mut() else {
        return;
    };
    surface.make_current();
    inner.slots.frame.fire(|cb| cb(window));
    let pending_interval = {
        let mut caches = unpoisoned(inner.caches.lock());
        if caches.last_applied_swap_interval != Some(caches.swap_interval) {
            caches.last_applied_swap_interval = Some(caches.swap_interval);
            Some(caches.swap_interval)
        } else {
            None
        }
    };
    if let Some(interval) = pending_interval {
        surface.set_swap_interval(interval);
    }
    surface.swap_buffers();
    surface.clear_current();
    inner.frame_count.fetch_add(1, Ordering::SeqCst);
}
