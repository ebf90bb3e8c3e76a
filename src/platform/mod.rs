//! Platform capability interface
//!
//! The core never calls the native windowing library directly; everything it
//! needs is expressed by the [`Platform`] trait below. Windows and monitors
//! are referenced by generational keys, never by native handles, so a stale
//! reference degrades to a lookup miss instead of a dangling pointer. Every
//! operation on an id that no longer resolves is a safe no-op returning a
//! default value.
//!
//! Two backends implement the trait: [`glfw::GlfwPlatform`] in production
//! and, for tests, an in-memory fake that models the same contract.

pub(crate) mod glfw;

#[cfg(test)]
pub(crate) mod fake;

use std::any::Any;
use std::path::PathBuf;

use slotmap::new_key_type;

use crate::error::Error;
use crate::geometry::{Point, Rect, Size};
use crate::input::{ButtonState, CursorMode, KeyState, Modifiers};
use crate::monitor::VideoMode;
use crate::options::WindowOptions;

new_key_type! {
    /// Stable identity of a native window inside the platform store.
    pub struct WindowId;

    /// Stable identity of a connected monitor inside the platform store.
    pub struct MonitorId;
}

/// A per-window notification decoded from the platform event stream.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlatformEvent {
    Key {
        name: &'static str,
        state: KeyState,
        mods: Modifiers,
    },
    MouseButton {
        name: &'static str,
        state: ButtonState,
        mods: Modifiers,
    },
    CursorPos(f64, f64),
    CursorEnter(bool),
    Scroll(f64, f64),
    Moved(i32, i32),
    Resized(i32, i32),
    CloseRequested,
    Refresh,
    Focus(bool),
    IconifyChanged(bool),
    MaximizeChanged(bool),
    FramebufferResized(i32, i32),
    ContentScaleChanged(f32, f32),
    FileDrop(Vec<PathBuf>),
}

/// Monitor topology change observed during event processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MonitorChange {
    Connected(MonitorId),
    Disconnected(MonitorId),
}

/// Snapshot of a monitor's current attributes.
#[derive(Debug, Clone)]
pub(crate) struct MonitorInfo {
    pub name: String,
    pub position: Point<i32>,
    pub mode: VideoMode,
    pub workarea: Rect<i32>,
    pub physical_size: Size<i32>,
    pub content_scale: (f32, f32),
}

impl MonitorInfo {
    /// Position plus current-mode extent in virtual-screen coordinates.
    pub fn rect(&self) -> Rect<i32> {
        Rect::new(
            self.position.x(),
            self.position.y(),
            self.mode.width,
            self.mode.height,
        )
    }
}

/// Result of creating a native window: its id plus the draw-side handle.
pub(crate) struct WindowCreation {
    pub id: WindowId,
    pub surface: Box<dyn RenderSurface>,
}

/// Draw-side access to a window's rendering context.
///
/// This is the only platform object allowed to cross onto a dedicated draw
/// thread; it deliberately exposes nothing but context binding and buffer
/// swapping.
pub(crate) trait RenderSurface: Send {
    /// Make the window's context current on the calling thread.
    fn make_current(&mut self);
    /// Release the current context so no window's context stays bound.
    fn clear_current(&mut self);
    /// Swap front and back buffers.
    fn swap_buffers(&mut self);
    /// Apply a buffer-swap interval to the currently bound context.
    fn set_swap_interval(&mut self, interval: i32);
}

/// The narrow interface the core consumes from the native windowing library.
///
/// Implementations are thread-confined: all methods are invoked only on the
/// thread that created the platform (the same thread that polls events).
pub(crate) trait Platform {
    // -- event pump -------------------------------------------------------

    /// Process pending events without blocking.
    fn poll_events(&mut self) -> Vec<(WindowId, PlatformEvent)>;
    /// Block until events arrive (bounded wait), then process them.
    fn wait_events(&mut self) -> Vec<(WindowId, PlatformEvent)>;
    /// Drain monitor connect/disconnect notifications observed so far.
    fn take_monitor_changes(&mut self) -> Vec<MonitorChange>;

    // -- window lifecycle -------------------------------------------------

    /// Create a native window, windowed or fullscreen on `monitor`.
    fn create_window(
        &mut self,
        width: i32,
        height: i32,
        title: &str,
        monitor: Option<MonitorId>,
        options: &WindowOptions,
    ) -> Result<WindowCreation, Error>;
    /// Destroy the native window. Idempotent.
    fn destroy_window(&mut self, id: WindowId);
    /// Whether the id still resolves to a live native window.
    fn window_exists(&self, id: WindowId) -> bool;

    // -- geometry ---------------------------------------------------------

    fn window_pos(&self, id: WindowId) -> Option<(i32, i32)>;
    fn set_window_pos(&mut self, id: WindowId, x: i32, y: i32);
    fn window_size(&self, id: WindowId) -> Option<(i32, i32)>;
    fn set_window_size(&mut self, id: WindowId, width: i32, height: i32);
    fn framebuffer_size(&self, id: WindowId) -> Option<(i32, i32)>;
    fn content_scale(&self, id: WindowId) -> Option<(f32, f32)>;
    /// Resend the combined min/max size limits.
    fn set_size_limits(
        &mut self,
        id: WindowId,
        min: Option<(i32, i32)>,
        max: Option<(i32, i32)>,
    );
    /// Set or clear (`None`) the forced aspect ratio.
    fn set_aspect_ratio(&mut self, id: WindowId, ratio: Option<(i32, i32)>);

    // -- display state ----------------------------------------------------

    fn is_iconified(&self, id: WindowId) -> bool;
    fn is_maximized(&self, id: WindowId) -> bool;
    /// Monitor the window is attached to when fullscreen.
    fn attached_monitor(&self, id: WindowId) -> Option<MonitorId>;
    fn iconify(&mut self, id: WindowId);
    fn restore(&mut self, id: WindowId);
    fn maximize(&mut self, id: WindowId);
    /// Attach the window fullscreen to a monitor at the given mode size.
    fn attach_to_monitor(
        &mut self,
        id: WindowId,
        monitor: MonitorId,
        size: (i32, i32),
        refresh_rate: i32,
    );
    /// Detach from any monitor and place the window at `rect`.
    fn detach_to_rect(&mut self, id: WindowId, rect: Rect<i32>);

    // -- attributes -------------------------------------------------------

    fn is_visible(&self, id: WindowId) -> bool;
    fn set_visible(&mut self, id: WindowId, visible: bool);
    fn is_focused(&self, id: WindowId) -> bool;
    fn focus(&mut self, id: WindowId);
    fn request_attention(&mut self, id: WindowId);
    fn is_resizable(&self, id: WindowId) -> bool;
    fn set_resizable(&mut self, id: WindowId, resizable: bool);
    fn is_topmost(&self, id: WindowId) -> bool;
    fn set_topmost(&mut self, id: WindowId, topmost: bool);
    fn opacity(&self, id: WindowId) -> Option<f32>;
    fn set_opacity(&mut self, id: WindowId, opacity: f32);
    fn set_title(&mut self, id: WindowId, title: &str);
    fn should_close(&self, id: WindowId) -> bool;
    fn set_should_close(&mut self, id: WindowId, value: bool);

    // -- cursor and clipboard --------------------------------------------

    fn cursor_pos(&self, id: WindowId) -> Option<(f64, f64)>;
    fn set_cursor_pos(&mut self, id: WindowId, x: f64, y: f64);
    fn cursor_mode(&self, id: WindowId) -> Option<CursorMode>;
    fn set_cursor_mode(&mut self, id: WindowId, mode: CursorMode);
    fn clipboard(&mut self, id: WindowId) -> Option<String>;
    fn set_clipboard(&mut self, id: WindowId, text: &str);

    // -- monitors ---------------------------------------------------------

    /// Connected monitors in stable enumeration order.
    fn monitors(&mut self) -> Vec<MonitorId>;
    fn primary_monitor(&mut self) -> Option<MonitorId>;
    fn monitor_info(&mut self, id: MonitorId) -> Option<MonitorInfo>;
    fn video_modes(&mut self, id: MonitorId) -> Vec<VideoMode>;

    // -- pass-throughs ----------------------------------------------------

    fn extension_supported(&mut self, name: &str) -> bool;
    /// Address of a client API function, null when unavailable.
    fn get_proc_address(&mut self, name: &str) -> *const std::ffi::c_void;
    fn time(&self) -> f64;
    fn set_time(&mut self, time: f64);

    /// Concrete-type access, used by tests to reach the fake backend.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
