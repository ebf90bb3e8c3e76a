//! In-memory platform backend for tests
//!
//! Models the observable contract of the native backend closely enough to
//! exercise the window state machine without a display server: iconify and
//! maximize only notify on change, maximize is ignored while fullscreen,
//! resizes clamp to the registered size limits, and attaching to a monitor
//! adopts that monitor's rectangle. Tests drive external effects (user
//! moves, monitor hotplug, close requests) through the control methods and
//! observe draw-side calls through the per-window surface op log.

use std::any::Any;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use slotmap::SlotMap;

use crate::error::{self, Error, ErrorKind};
use crate::geometry::{Rect, Size};
use crate::input::CursorMode;
use crate::monitor::VideoMode;
use crate::options::WindowOptions;
use crate::platform::{
    MonitorChange, MonitorId, MonitorInfo, Platform, PlatformEvent, RenderSurface, WindowCreation,
    WindowId,
};
use crate::unpoisoned;

/// A draw-side call recorded by the fake surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SurfaceOp {
    MakeCurrent,
    ClearCurrent,
    Swap,
    SwapInterval(i32),
}

struct FakeRenderSurface {
    ops: Arc<Mutex<Vec<SurfaceOp>>>,
}

impl RenderSurface for FakeRenderSurface {
    fn make_current(&mut self) {
        unpoisoned(self.ops.lock()).push(SurfaceOp::MakeCurrent);
    }

    fn clear_current(&mut self) {
        unpoisoned(self.ops.lock()).push(SurfaceOp::ClearCurrent);
    }

    fn swap_buffers(&mut self) {
        unpoisoned(self.ops.lock()).push(SurfaceOp::Swap);
    }

    fn set_swap_interval(&mut self, interval: i32) {
        unpoisoned(self.ops.lock()).push(SurfaceOp::SwapInterval(interval));
    }
}

struct FakeMonitor {
    name: String,
    rect: Rect<i32>,
    refresh_rate: i32,
}

struct FakeWindow {
    rect: Rect<i32>,
    pre_maximize_rect: Option<Rect<i32>>,
    iconified: bool,
    maximized: bool,
    monitor: Option<MonitorId>,
    min_size: Option<(i32, i32)>,
    max_size: Option<(i32, i32)>,
    aspect: Option<(i32, i32)>,
    should_close: bool,
    title: String,
    visible: bool,
    focused: bool,
    resizable: bool,
    topmost: bool,
    opacity: f32,
    cursor_mode: CursorMode,
    cursor_pos: (f64, f64),
    clipboard: String,
    ops: Arc<Mutex<Vec<SurfaceOp>>>,
}

pub(crate) struct FakePlatform {
    windows: SlotMap<WindowId, FakeWindow>,
    monitors: SlotMap<MonitorId, FakeMonitor>,
    monitor_order: Vec<MonitorId>,
    events: VecDeque<(WindowId, PlatformEvent)>,
    monitor_changes: VecDeque<MonitorChange>,
    epoch: Instant,
    time_origin: f64,
}

impl FakePlatform {
    /// A platform with one primary 1920x1080 monitor at the origin.
    pub(crate) fn new() -> Self {
        let mut platform = Self {
            windows: SlotMap::with_key(),
            monitors: SlotMap::with_key(),
            monitor_order: Vec::new(),
            events: VecDeque::new(),
            monitor_changes: VecDeque::new(),
            epoch: Instant::now(),
            time_origin: 0.0,
        };
        platform.add_monitor("FakeDisplay 0", Rect::new(0, 0, 1920, 1080), 60);
        platform.monitor_changes.clear();
        platform
    }

    // -- test controls ----------------------------------------------------

    pub(crate) fn add_monitor(&mut self, name: &str, rect: Rect<i32>, refresh_rate: i32) -> MonitorId {
        let id = self.monitors.insert(FakeMonitor {
            name: name.to_string(),
            rect,
            refresh_rate,
        });
        self.monitor_order.push(id);
        self.monitor_changes.push_back(MonitorChange::Connected(id));
        id
    }

    pub(crate) fn disconnect_monitor(&mut self, id: MonitorId) {
        if self.monitors.remove(id).is_some() {
            self.monitor_order.retain(|m| *m != id);
            self.monitor_changes
                .push_back(MonitorChange::Disconnected(id));
        }
    }

    /// The user drags the window somewhere.
    pub(crate) fn move_window_externally(&mut self, id: WindowId, x: i32, y: i32) {
        if let Some(w) = self.windows.get_mut(id) {
            w.rect = Rect::new(x, y, w.rect.width(), w.rect.height());
            self.events.push_back((id, PlatformEvent::Moved(x, y)));
        }
    }

    /// The user resizes the window by its border.
    pub(crate) fn resize_window_externally(&mut self, id: WindowId, width: i32, height: i32) {
        if let Some(w) = self.windows.get_mut(id) {
            w.rect = Rect::new(w.rect.x(), w.rect.y(), width, height);
            self.events
                .push_back((id, PlatformEvent::Resized(width, height)));
        }
    }

    /// The user clicks the window's close button.
    pub(crate) fn request_close(&mut self, id: WindowId) {
        if let Some(w) = self.windows.get_mut(id) {
            w.should_close = true;
            self.events.push_back((id, PlatformEvent::CloseRequested));
        }
    }

    pub(crate) fn push_event(&mut self, id: WindowId, event: PlatformEvent) {
        self.events.push_back((id, event));
    }

    pub(crate) fn window_rect(&self, id: WindowId) -> Rect<i32> {
        self.windows.get(id).map(|w| w.rect).unwrap_or_default()
    }

    pub(crate) fn window_monitor(&self, id: WindowId) -> Option<MonitorId> {
        self.windows.get(id).and_then(|w| w.monitor)
    }

    pub(crate) fn surface_ops(&self, id: WindowId) -> Vec<SurfaceOp> {
        self.windows
            .get(id)
            .map(|w| unpoisoned(w.ops.lock()).clone())
            .unwrap_or_default()
    }

    // -- internals --------------------------------------------------------

    fn clamp_size(w: &FakeWindow, width: i32, height: i32) -> (i32, i32) {
        let mut width = width;
        let mut height = height;
        if let Some((min_w, min_h)) = w.min_size {
            width = width.max(min_w);
            height = height.max(min_h);
        }
        if let Some((max_w, max_h)) = w.max_size {
            width = width.min(max_w);
            height = height.min(max_h);
        }
        (width, height)
    }

    fn monitor_under(&self, rect: Rect<i32>) -> Option<MonitorId> {
        self.monitor_order
            .iter()
            .copied()
            .max_by_key(|id| {
                self.monitors
                    .get(*id)
                    .map(|m| m.rect.intersection_area(&rect))
                    .unwrap_or(0)
            })
            .or_else(|| self.monitor_order.first().copied())
    }
}

impl Platform for FakePlatform {
    fn poll_events(&mut self) -> Vec<(WindowId, PlatformEvent)> {
        self.events.drain(..).collect()
    }

    fn wait_events(&mut self) -> Vec<(WindowId, PlatformEvent)> {
        self.events.drain(..).collect()
    }

    fn take_monitor_changes(&mut self) -> Vec<MonitorChange> {
        self.monitor_changes.drain(..).collect()
    }

    fn create_window(
        &mut self,
        width: i32,
        height: i32,
        title: &str,
        monitor: Option<MonitorId>,
        options: &WindowOptions,
    ) -> Result<WindowCreation, Error> {
        if width <= 0 || height <= 0 {
            let err = Error::new(ErrorKind::InvalidValue, "invalid window size");
            error::record(err.clone());
            return Err(err);
        }
        let rect = match monitor.and_then(|m| self.monitors.get(m)) {
            Some(m) => m.rect,
            None => Rect::new(100, 100, width, height),
        };
        let ops = Arc::new(Mutex::new(Vec::new()));
        let id = self.windows.insert(FakeWindow {
            rect,
            pre_maximize_rect: None,
            iconified: false,
            maximized: options.maximized && monitor.is_none(),
            monitor,
            min_size: None,
            max_size: None,
            aspect: None,
            should_close: false,
            title: title.to_string(),
            visible: options.visible,
            focused: options.visible,
            resizable: options.resizable,
            topmost: options.topmost,
            opacity: 1.0,
            cursor_mode: CursorMode::Normal,
            cursor_pos: (0.0, 0.0),
            clipboard: String::new(),
            ops: Arc::clone(&ops),
        });
        Ok(WindowCreation {
            id,
            surface: Box::new(FakeRenderSurface { ops }),
        })
    }

    fn destroy_window(&mut self, id: WindowId) {
        self.windows.remove(id);
    }

    fn window_exists(&self, id: WindowId) -> bool {
        self.windows.contains_key(id)
    }

    fn window_pos(&self, id: WindowId) -> Option<(i32, i32)> {
        self.windows.get(id).map(|w| (w.rect.x(), w.rect.y()))
    }

    fn set_window_pos(&mut self, id: WindowId, x: i32, y: i32) {
        if let Some(w) = self.windows.get_mut(id) {
            if (w.rect.x(), w.rect.y()) != (x, y) {
                w.rect = Rect::new(x, y, w.rect.width(), w.rect.height());
                self.events.push_back((id, PlatformEvent::Moved(x, y)));
            }
        }
    }

    fn window_size(&self, id: WindowId) -> Option<(i32, i32)> {
        self.windows.get(id).map(|w| (w.rect.width(), w.rect.height()))
    }

    fn set_window_size(&mut self, id: WindowId, width: i32, height: i32) {
        if let Some(w) = self.windows.get_mut(id) {
            let (width, height) = Self::clamp_size(w, width, height);
            if (w.rect.width(), w.rect.height()) != (width, height) {
                w.rect = Rect::new(w.rect.x(), w.rect.y(), width, height);
                self.events.push_back((id, PlatformEvent::Resized(width, height)));
            }
        }
    }

    fn framebuffer_size(&self, id: WindowId) -> Option<(i32, i32)> {
        self.window_size(id)
    }

    fn content_scale(&self, id: WindowId) -> Option<(f32, f32)> {
        self.windows.get(id).map(|_| (1.0, 1.0))
    }

    fn set_size_limits(
        &mut self,
        id: WindowId,
        min: Option<(i32, i32)>,
        max: Option<(i32, i32)>,
    ) {
        let Some(w) = self.windows.get_mut(id) else {
            return;
        };
        w.min_size = min;
        w.max_size = max;
        // The native library re-clamps the current size when limits tighten.
        let (width, height) = Self::clamp_size(w, w.rect.width(), w.rect.height());
        if (w.rect.width(), w.rect.height()) != (width, height) {
            w.rect = Rect::new(w.rect.x(), w.rect.y(), width, height);
            self.events.push_back((id, PlatformEvent::Resized(width, height)));
        }
    }

    fn set_aspect_ratio(&mut self, id: WindowId, ratio: Option<(i32, i32)>) {
        if let Some(w) = self.windows.get_mut(id) {
            w.aspect = ratio;
        }
    }

    fn is_iconified(&self, id: WindowId) -> bool {
        self.windows.get(id).is_some_and(|w| w.iconified)
    }

    fn is_maximized(&self, id: WindowId) -> bool {
        self.windows.get(id).is_some_and(|w| w.maximized)
    }

    fn attached_monitor(&self, id: WindowId) -> Option<MonitorId> {
        self.windows.get(id).and_then(|w| w.monitor)
    }

    fn iconify(&mut self, id: WindowId) {
        if let Some(w) = self.windows.get_mut(id) {
            if !w.iconified {
                w.iconified = true;
                self.events.push_back((id, PlatformEvent::IconifyChanged(true)));
            }
        }
    }

    fn restore(&mut self, id: WindowId) {
        let Some(w) = self.windows.get_mut(id) else {
            return;
        };
        if w.iconified {
            w.iconified = false;
            self.events.push_back((id, PlatformEvent::IconifyChanged(false)));
        } else if w.maximized {
            w.maximized = false;
            if let Some(rect) = w.pre_maximize_rect.take() {
                w.rect = rect;
            }
            self.events.push_back((id, PlatformEvent::MaximizeChanged(false)));
        }
    }

    fn maximize(&mut self, id: WindowId) {
        let Some(w) = self.windows.get(id) else {
            return;
        };
        // Fullscreen windows ignore maximize, as the native library does.
        if w.monitor.is_some() || w.maximized {
            return;
        }
        let target = self
            .monitor_under(w.rect)
            .and_then(|m| self.monitors.get(m))
            .map(|m| m.rect);
        let Some(w) = self.windows.get_mut(id) else {
            return;
        };
        w.pre_maximize_rect = Some(w.rect);
        if let Some(rect) = target {
            w.rect = rect;
        }
        w.maximized = true;
        self.events.push_back((id, PlatformEvent::MaximizeChanged(true)));
    }

    fn attach_to_monitor(
        &mut self,
        id: WindowId,
        monitor: MonitorId,
        size: (i32, i32),
        _refresh_rate: i32,
    ) {
        let Some(pos) = self.monitors.get(monitor).map(|m| m.rect.pos()) else {
            return;
        };
        if let Some(w) = self.windows.get_mut(id) {
            w.monitor = Some(monitor);
            w.iconified = false;
            w.rect = Rect::new(pos.x(), pos.y(), size.0, size.1);
            self.events.push_back((id, PlatformEvent::Resized(size.0, size.1)));
        }
    }

    fn detach_to_rect(&mut self, id: WindowId, rect: Rect<i32>) {
        if let Some(w) = self.windows.get_mut(id) {
            w.monitor = None;
            w.rect = rect;
            self.events.push_back((id, PlatformEvent::Moved(rect.x(), rect.y())));
            self.events
                .push_back((id, PlatformEvent::Resized(rect.width(), rect.height())));
        }
    }

    fn is_visible(&self, id: WindowId) -> bool {
        self.windows.get(id).is_some_and(|w| w.visible)
    }

    fn set_visible(&mut self, id: WindowId, visible: bool) {
        if let Some(w) = self.windows.get_mut(id) {
            w.visible = visible;
        }
    }

    fn is_focused(&self, id: WindowId) -> bool {
        self.windows.get(id).is_some_and(|w| w.focused)
    }

    fn focus(&mut self, id: WindowId) {
        if let Some(w) = self.windows.get_mut(id) {
            if !w.focused {
                w.focused = true;
                self.events.push_back((id, PlatformEvent::Focus(true)));
            }
        }
    }

    fn request_attention(&mut self, _id: WindowId) {}

    fn is_resizable(&self, id: WindowId) -> bool {
        self.windows.get(id).is_some_and(|w| w.resizable)
    }

    fn set_resizable(&mut self, id: WindowId, resizable: bool) {
        if let Some(w) = self.windows.get_mut(id) {
            w.resizable = resizable;
        }
    }

    fn is_topmost(&self, id: WindowId) -> bool {
        self.windows.get(id).is_some_and(|w| w.topmost)
    }

    fn set_topmost(&mut self, id: WindowId, topmost: bool) {
        if let Some(w) = self.windows.get_mut(id) {
            w.topmost = topmost;
        }
    }

    fn opacity(&self, id: WindowId) -> Option<f32> {
        self.windows.get(id).map(|w| w.opacity)
    }

    fn set_opacity(&mut self, id: WindowId, opacity: f32) {
        if let Some(w) = self.windows.get_mut(id) {
            w.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    fn set_title(&mut self, id: WindowId, title: &str) {
        if let Some(w) = self.windows.get_mut(id) {
            w.title = title.to_string();
        }
    }

    fn should_close(&self, id: WindowId) -> bool {
        self.windows.get(id).is_some_and(|w| w.should_close)
    }

    fn set_should_close(&mut self, id: WindowId, value: bool) {
        if let Some(w) = self.windows.get_mut(id) {
            w.should_close = value;
        }
    }

    fn cursor_pos(&self, id: WindowId) -> Option<(f64, f64)> {
        self.windows.get(id).map(|w| w.cursor_pos)
    }

    fn set_cursor_pos(&mut self, id: WindowId, x: f64, y: f64) {
        if let Some(w) = self.windows.get_mut(id) {
            w.cursor_pos = (x, y);
        }
    }

    fn cursor_mode(&self, id: WindowId) -> Option<CursorMode> {
        self.windows.get(id).map(|w| w.cursor_mode)
    }

    fn set_cursor_mode(&mut self, id: WindowId, mode: CursorMode) {
        if let Some(w) = self.windows.get_mut(id) {
            w.cursor_mode = mode;
        }
    }

    fn clipboard(&mut self, id: WindowId) -> Option<String> {
        self.windows
            .get(id)
            .filter(|w| !w.clipboard.is_empty())
            .map(|w| w.clipboard.clone())
    }

    fn set_clipboard(&mut self, id: WindowId, text: &str) {
        if let Some(w) = self.windows.get_mut(id) {
            w.clipboard = text.to_string();
        }
    }

    fn monitors(&mut self) -> Vec<MonitorId> {
        self.monitor_order.clone()
    }

    fn primary_monitor(&mut self) -> Option<MonitorId> {
        self.monitor_order.first().copied()
    }

    fn monitor_info(&mut self, id: MonitorId) -> Option<MonitorInfo> {
        self.monitors.get(id).map(|m| MonitorInfo {
            name: m.name.clone(),
            position: m.rect.pos(),
            mode: VideoMode {
                width: m.rect.width(),
                height: m.rect.height(),
                red_bits: 8,
                green_bits: 8,
                blue_bits: 8,
                refresh_rate: m.refresh_rate,
            },
            workarea: m.rect,
            physical_size: Size::new(m.rect.width() / 4, m.rect.height() / 4),
            content_scale: (1.0, 1.0),
        })
    }

    fn video_modes(&mut self, id: MonitorId) -> Vec<VideoMode> {
        self.monitor_info(id).map(|info| vec![info.mode]).unwrap_or_default()
    }

    fn extension_supported(&mut self, _name: &str) -> bool {
        false
    }

    fn get_proc_address(&mut self, _name: &str) -> *const std::ffi::c_void {
        std::ptr::null()
    }

    fn time(&self) -> f64 {
        self.time_origin + self.epoch.elapsed().as_secs_f64()
    }

    fn set_time(&mut self, time: f64) {
        self.time_origin = time;
        self.epoch = Instant::now();
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
