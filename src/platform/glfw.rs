//! GLFW-backed implementation of the platform interface
//!
//! Owns the GLFW context, every native window, and the monitor id mapping.
//! GLFW monitors have no stable identity across callbacks, so connected
//! monitors are tracked by `(name, position)` and reconciled against the
//! live list during each event pump; differences surface as
//! [`MonitorChange`] notifications.

use std::any::Any;
use std::collections::VecDeque;

use glfw::Context;
use slotmap::SlotMap;

use crate::error::{self, Error, ErrorKind};
use crate::geometry::{Point, Rect, Size};
use crate::input::{self, ButtonState, CursorMode, KeyState, Modifiers};
use crate::monitor::VideoMode;
use crate::options::{GlApi, GlProfile, WindowOptions};
use crate::platform::{
    MonitorChange, MonitorId, MonitorInfo, Platform, PlatformEvent, RenderSurface, WindowCreation,
    WindowId,
};

/// Bounded wait used instead of an unbounded event wait so that close and
/// exit requests made from other threads are noticed promptly.
const WAIT_TIMEOUT_SECS: f64 = 0.1;

struct WindowEntry {
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
}

/// Identity of a monitor that survives re-enumeration.
#[derive(Clone, PartialEq, Eq)]
struct MonitorKey {
    name: String,
    pos: (i32, i32),
}

impl MonitorKey {
    fn of(monitor: &glfw::Monitor) -> Self {
        Self {
            name: monitor.get_name().unwrap_or_default(),
            pos: monitor.get_pos(),
        }
    }

    fn matches(&self, monitor: &glfw::Monitor) -> bool {
        *self == Self::of(monitor)
    }
}

pub(crate) struct GlfwPlatform {
    glfw: glfw::Glfw,
    windows: SlotMap<WindowId, WindowEntry>,
    monitors: SlotMap<MonitorId, MonitorKey>,
    /// Connected monitors in enumeration order; the first entry is primary.
    monitor_order: Vec<MonitorId>,
    monitor_changes: VecDeque<MonitorChange>,
}

fn forward_error(err: glfw::Error, description: String) {
    let kind = match err {
        glfw::Error::NotInitialized => ErrorKind::NotInitialized,
        glfw::Error::NoCurrentContext => ErrorKind::NoCurrentContext,
        glfw::Error::InvalidEnum => ErrorKind::InvalidEnum,
        glfw::Error::InvalidValue => ErrorKind::InvalidValue,
        glfw::Error::OutOfMemory => ErrorKind::OutOfMemory,
        glfw::Error::ApiUnavailable => ErrorKind::ApiUnavailable,
        glfw::Error::VersionUnavailable => ErrorKind::VersionUnavailable,
        glfw::Error::FormatUnavailable => ErrorKind::FormatUnavailable,
        glfw::Error::NoWindowContext => ErrorKind::NoWindowContext,
        _ => ErrorKind::PlatformError,
    };
    error::record(Error::new(kind, description));
}

impl GlfwPlatform {
    pub(crate) fn new() -> Result<Self, Error> {
        let glfw = glfw::init(forward_error)
            .map_err(|_| error::last_or(ErrorKind::PlatformError, "initialization failed"))?;
        let mut platform = Self {
            glfw,
            windows: SlotMap::with_key(),
            monitors: SlotMap::with_key(),
            monitor_order: Vec::new(),
            monitor_changes: VecDeque::new(),
        };
        platform.reconcile_monitors();
        // Initial population is topology discovery, not change.
        platform.monitor_changes.clear();
        Ok(platform)
    }

    /// Diff the live monitor list against the tracked one, assigning ids to
    /// newcomers and retiring ids whose monitor is gone.
    fn reconcile_monitors(&mut self) {
        let current: Vec<MonitorKey> = self
            .glfw
            .with_connected_monitors(|_, monitors| monitors.iter().map(|m| MonitorKey::of(m)).collect());

        let mut order = Vec::with_capacity(current.len());
        for key in &current {
            let id = self
                .monitors
                .iter()
                .find(|(_, k)| *k == key)
                .map(|(id, _)| id)
                .unwrap_or_else(|| {
                    let id = self.monitors.insert(key.clone());
                    self.monitor_changes.push_back(MonitorChange::Connected(id));
                    id
                });
            order.push(id);
        }

        let gone: Vec<MonitorId> = self
            .monitors
            .iter()
            .filter(|(_, k)| !current.contains(*k))
            .map(|(id, _)| id)
            .collect();
        for id in gone {
            self.monitors.remove(id);
            self.monitor_changes
                .push_back(MonitorChange::Disconnected(id));
        }

        self.monitor_order = order;
    }

    fn with_native_monitor<T>(
        &mut self,
        id: MonitorId,
        f: impl FnOnce(&glfw::Monitor) -> T,
    ) -> Option<T> {
        let key = self.monitors.get(id)?.clone();
        self.glfw
            .with_connected_monitors(|_, monitors| monitors.iter().find(|m| key.matches(m)).map(|m| f(m)))
    }

    fn apply_hints(&mut self, options: &WindowOptions) {
        use glfw::WindowHint;
        let (major, minor) = options.gl_version;
        self.glfw.window_hint(WindowHint::ContextVersion(major, minor));
        self.glfw.window_hint(WindowHint::ClientApi(match options.gl_api {
            GlApi::OpenGl => glfw::ClientApiHint::OpenGl,
            GlApi::OpenGlEs => glfw::ClientApiHint::OpenGlEs,
            GlApi::NoApi => glfw::ClientApiHint::NoApi,
        }));
        self.glfw
            .window_hint(WindowHint::OpenGlProfile(match options.gl_profile {
                GlProfile::Any => glfw::OpenGlProfileHint::Any,
                GlProfile::Core => glfw::OpenGlProfileHint::Core,
                GlProfile::Compat => glfw::OpenGlProfileHint::Compat,
            }));
        self.glfw.window_hint(WindowHint::RedBits(Some(options.red_bits)));
        self.glfw.window_hint(WindowHint::GreenBits(Some(options.green_bits)));
        self.glfw.window_hint(WindowHint::BlueBits(Some(options.blue_bits)));
        self.glfw.window_hint(WindowHint::AlphaBits(Some(options.alpha_bits)));
        self.glfw.window_hint(WindowHint::DepthBits(Some(options.depth_bits)));
        self.glfw
            .window_hint(WindowHint::StencilBits(Some(options.stencil_bits)));
        self.glfw.window_hint(WindowHint::Samples(Some(options.msaa_samples)));
        self.glfw
            .window_hint(WindowHint::RefreshRate(Some(options.refresh_rate)));
        self.glfw.window_hint(WindowHint::DoubleBuffer(options.double_buffer));
        self.glfw.window_hint(WindowHint::Resizable(options.resizable));
        self.glfw.window_hint(WindowHint::Visible(options.visible));
        self.glfw.window_hint(WindowHint::Maximized(options.maximized));
        self.glfw.window_hint(WindowHint::Floating(options.topmost));
        self.glfw.window_hint(WindowHint::AutoIconify(options.auto_minimize));
        self.glfw
            .window_hint(WindowHint::ScaleToMonitor(options.scale_to_monitor));
    }

    /// Drain each window's receiver and translate into platform events.
    fn drain_events(&mut self) -> Vec<(WindowId, PlatformEvent)> {
        let mut out = Vec::new();
        for (id, entry) in &self.windows {
            for (_, event) in glfw::flush_messages(&entry.events) {
                if let Some(translated) = translate_event(event) {
                    out.push((id, translated));
                }
            }
        }
        self.reconcile_monitors();
        out
    }
}

fn translate_modifiers(mods: glfw::Modifiers) -> Modifiers {
    let mut out = Modifiers::empty();
    if mods.contains(glfw::Modifiers::Shift) {
        out |= Modifiers::SHIFT;
    }
    if mods.contains(glfw::Modifiers::Control) {
        out |= Modifiers::CONTROL;
    }
    if mods.contains(glfw::Modifiers::Alt) {
        out |= Modifiers::ALT;
    }
    if mods.contains(glfw::Modifiers::Super) {
        out |= Modifiers::SUPER;
    }
    if mods.contains(glfw::Modifiers::CapsLock) {
        out |= Modifiers::CAPS_LOCK;
    }
    if mods.contains(glfw::Modifiers::NumLock) {
        out |= Modifiers::NUM_LOCK;
    }
    out
}

fn translate_event(event: glfw::WindowEvent) -> Option<PlatformEvent> {
    use glfw::WindowEvent as We;
    Some(match event {
        We::Key(key, _, action, mods) => PlatformEvent::Key {
            name: input::key_name(key),
            state: KeyState::new(
                action != glfw::Action::Release,
                action == glfw::Action::Repeat,
            ),
            mods: translate_modifiers(mods),
        },
        We::MouseButton(button, action, mods) => PlatformEvent::MouseButton {
            name: input::mouse_button_name(button),
            state: ButtonState::new(action != glfw::Action::Release),
            mods: translate_modifiers(mods),
        },
        We::CursorPos(x, y) => PlatformEvent::CursorPos(x, y),
        We::CursorEnter(entered) => PlatformEvent::CursorEnter(entered),
        We::Scroll(x, y) => PlatformEvent::Scroll(x, y),
        We::Pos(x, y) => PlatformEvent::Moved(x, y),
        We::Size(w, h) => PlatformEvent::Resized(w, h),
        We::Close => PlatformEvent::CloseRequested,
        We::Refresh => PlatformEvent::Refresh,
        We::Focus(focused) => PlatformEvent::Focus(focused),
        We::Iconify(iconified) => PlatformEvent::IconifyChanged(iconified),
        We::Maximize(maximized) => PlatformEvent::MaximizeChanged(maximized),
        We::FramebufferSize(w, h) => PlatformEvent::FramebufferResized(w, h),
        We::ContentScale(x, y) => PlatformEvent::ContentScaleChanged(x, y),
        We::FileDrop(paths) => PlatformEvent::FileDrop(paths),
        _ => return None,
    })
}

/// Draw-thread handle around GLFW's render context.
struct GlfwRenderSurface {
    ctx: glfw::PRenderContext,
}

impl RenderSurface for GlfwRenderSurface {
    fn make_current(&mut self) {
        self.ctx.make_current();
    }

    fn clear_current(&mut self) {
        unsafe { glfw::ffi::glfwMakeContextCurrent(std::ptr::null_mut()) };
    }

    fn swap_buffers(&mut self) {
        self.ctx.swap_buffers();
    }

    fn set_swap_interval(&mut self, interval: i32) {
        unsafe { glfw::ffi::glfwSwapInterval(interval) };
    }
}

impl Platform for GlfwPlatform {
    fn poll_events(&mut self) -> Vec<(WindowId, PlatformEvent)> {
        self.glfw.poll_events();
        self.drain_events()
    }

    fn wait_events(&mut self) -> Vec<(WindowId, PlatformEvent)> {
        self.glfw.wait_events_timeout(WAIT_TIMEOUT_SECS);
        self.drain_events()
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
        self.apply_hints(options);

        let key = monitor.and_then(|id| self.monitors.get(id).cloned());
        let created = match key {
            Some(key) => self.glfw.with_connected_monitors(|glfw, monitors| {
                match monitors.iter().find(|m| key.matches(m)) {
                    Some(m) => glfw.create_window(
                        width as u32,
                        height as u32,
                        title,
                        glfw::WindowMode::FullScreen(m),
                    ),
                    None => glfw.create_window(
                        width as u32,
                        height as u32,
                        title,
                        glfw::WindowMode::Windowed,
                    ),
                }
            }),
            None => self.glfw.create_window(
                width as u32,
                height as u32,
                title,
                glfw::WindowMode::Windowed,
            ),
        };

        let (mut window, events) = created
            .ok_or_else(|| error::last_or(ErrorKind::CreationFailed, "window creation failed"))?;
        window.set_all_polling(true);
        let surface = Box::new(GlfwRenderSurface {
            ctx: window.render_context(),
        });
        let id = self.windows.insert(WindowEntry { window, events });
        Ok(WindowCreation { id, surface })
    }

    fn destroy_window(&mut self, id: WindowId) {
        self.windows.remove(id);
    }

    fn window_exists(&self, id: WindowId) -> bool {
        self.windows.contains_key(id)
    }

    fn window_pos(&self, id: WindowId) -> Option<(i32, i32)> {
        self.windows.get(id).map(|e| e.window.get_pos())
    }

    fn set_window_pos(&mut self, id: WindowId, x: i32, y: i32) {
        if let Some(e) = self.windows.get_mut(id) {
            e.window.set_pos(x, y);
        }
    }

    fn window_size(&self, id: WindowId) -> Option<(i32, i32)> {
        self.windows.get(id).map(|e| e.window.get_size())
    }

    fn set_window_size(&mut self, id: WindowId, width: i32, height: i32) {
        if let Some(e) = self.windows.get_mut(id) {
            e.window.set_size(width, height);
        }
    }

    fn framebuffer_size(&self, id: WindowId) -> Option<(i32, i32)> {
        self.windows.get(id).map(|e| e.window.get_framebuffer_size())
    }

    fn content_scale(&self, id: WindowId) -> Option<(f32, f32)> {
        self.windows.get(id).map(|e| e.window.get_content_scale())
    }

    fn set_size_limits(
        &mut self,
        id: WindowId,
        min: Option<(i32, i32)>,
        max: Option<(i32, i32)>,
    ) {
        if let Some(e) = self.windows.get_mut(id) {
            e.window.set_size_limits(
                min.map(|(w, _)| w as u32),
                min.map(|(_, h)| h as u32),
                max.map(|(w, _)| w as u32),
                max.map(|(_, h)| h as u32),
            );
        }
    }

    fn set_aspect_ratio(&mut self, id: WindowId, ratio: Option<(i32, i32)>) {
        if let Some(e) = self.windows.get_mut(id) {
            let (numer, denom) = ratio.unwrap_or((glfw::ffi::DONT_CARE, glfw::ffi::DONT_CARE));
            unsafe { glfw::ffi::glfwSetWindowAspectRatio(e.window.window_ptr(), numer, denom) };
        }
    }

    fn is_iconified(&self, id: WindowId) -> bool {
        self.windows.get(id).is_some_and(|e| e.window.is_iconified())
    }

    fn is_maximized(&self, id: WindowId) -> bool {
        self.windows.get(id).is_some_and(|e| e.window.is_maximized())
    }

    fn attached_monitor(&self, id: WindowId) -> Option<MonitorId> {
        let entry = self.windows.get(id)?;
        let key = entry.window.with_window_mode(|mode| match mode {
            glfw::WindowMode::FullScreen(m) => Some(MonitorKey::of(m)),
            glfw::WindowMode::Windowed => None,
        })?;
        self.monitors.iter().find(|(_, k)| **k == key).map(|(id, _)| id)
    }

    fn iconify(&mut self, id: WindowId) {
        if let Some(e) = self.windows.get_mut(id) {
            e.window.iconify();
        }
    }

    fn restore(&mut self, id: WindowId) {
        if let Some(e) = self.windows.get_mut(id) {
            e.window.restore();
        }
    }

    fn maximize(&mut self, id: WindowId) {
        if let Some(e) = self.windows.get_mut(id) {
            e.window.maximize();
        }
    }

    fn attach_to_monitor(
        &mut self,
        id: WindowId,
        monitor: MonitorId,
        size: (i32, i32),
        refresh_rate: i32,
    ) {
        let Some(entry) = self.windows.get_mut(id) else {
            return;
        };
        let Some(key) = self.monitors.get(monitor).cloned() else {
            return;
        };
        let window = &mut entry.window;
        self.glfw.with_connected_monitors(|_, monitors| {
            if let Some(m) = monitors.iter().find(|m| key.matches(m)) {
                window.set_monitor(
                    glfw::WindowMode::FullScreen(m),
                    0,
                    0,
                    size.0 as u32,
                    size.1 as u32,
                    Some(refresh_rate as u32),
                );
            }
        });
    }

    fn detach_to_rect(&mut self, id: WindowId, rect: Rect<i32>) {
        if let Some(e) = self.windows.get_mut(id) {
            e.window.set_monitor(
                glfw::WindowMode::Windowed,
                rect.x(),
                rect.y(),
                rect.width() as u32,
                rect.height() as u32,
                None,
            );
        }
    }

    fn is_visible(&self, id: WindowId) -> bool {
        self.windows.get(id).is_some_and(|e| e.window.is_visible())
    }

    fn set_visible(&mut self, id: WindowId, visible: bool) {
        if let Some(e) = self.windows.get_mut(id) {
            if visible {
                e.window.show();
            } else {
                e.window.hide();
            }
        }
    }

    fn is_focused(&self, id: WindowId) -> bool {
        self.windows.get(id).is_some_and(|e| e.window.is_focused())
    }

    fn focus(&mut self, id: WindowId) {
        if let Some(e) = self.windows.get_mut(id) {
            e.window.focus();
        }
    }

    fn request_attention(&mut self, id: WindowId) {
        if let Some(e) = self.windows.get_mut(id) {
            e.window.request_attention();
        }
    }

    fn is_resizable(&self, id: WindowId) -> bool {
        self.windows.get(id).is_some_and(|e| e.window.is_resizable())
    }

    fn set_resizable(&mut self, id: WindowId, resizable: bool) {
        if let Some(e) = self.windows.get_mut(id) {
            e.window.set_resizable(resizable);
        }
    }

    fn is_topmost(&self, id: WindowId) -> bool {
        self.windows.get(id).is_some_and(|e| e.window.is_floating())
    }

    fn set_topmost(&mut self, id: WindowId, topmost: bool) {
        if let Some(e) = self.windows.get_mut(id) {
            e.window.set_floating(topmost);
        }
    }

    fn opacity(&self, id: WindowId) -> Option<f32> {
        self.windows.get(id).map(|e| e.window.get_opacity())
    }

    fn set_opacity(&mut self, id: WindowId, opacity: f32) {
        if let Some(e) = self.windows.get_mut(id) {
            e.window.set_opacity(opacity.clamp(0.0, 1.0));
        }
    }

    fn set_title(&mut self, id: WindowId, title: &str) {
        if let Some(e) = self.windows.get_mut(id) {
            e.window.set_title(title);
        }
    }

    fn should_close(&self, id: WindowId) -> bool {
        self.windows.get(id).is_some_and(|e| e.window.should_close())
    }

    fn set_should_close(&mut self, id: WindowId, value: bool) {
        if let Some(e) = self.windows.get_mut(id) {
            e.window.set_should_close(value);
        }
    }

    fn cursor_pos(&self, id: WindowId) -> Option<(f64, f64)> {
        self.windows.get(id).map(|e| e.window.get_cursor_pos())
    }

    fn set_cursor_pos(&mut self, id: WindowId, x: f64, y: f64) {
        if let Some(e) = self.windows.get_mut(id) {
            e.window.set_cursor_pos(x, y);
        }
    }

    fn cursor_mode(&self, id: WindowId) -> Option<CursorMode> {
        self.windows.get(id).map(|e| match e.window.get_cursor_mode() {
            glfw::CursorMode::Normal => CursorMode::Normal,
            glfw::CursorMode::Hidden => CursorMode::Hidden,
            glfw::CursorMode::Disabled => CursorMode::Disabled,
        })
    }

    fn set_cursor_mode(&mut self, id: WindowId, mode: CursorMode) {
        if let Some(e) = self.windows.get_mut(id) {
            e.window.set_cursor_mode(match mode {
                CursorMode::Normal => glfw::CursorMode::Normal,
                CursorMode::Hidden => glfw::CursorMode::Hidden,
                CursorMode::Disabled => glfw::CursorMode::Disabled,
            });
        }
    }

    fn clipboard(&mut self, id: WindowId) -> Option<String> {
        self.windows
            .get_mut(id)
            .and_then(|e| e.window.get_clipboard_string())
    }

    fn set_clipboard(&mut self, id: WindowId, text: &str) {
        if let Some(e) = self.windows.get_mut(id) {
            e.window.set_clipboard_string(text);
        }
    }

    fn monitors(&mut self) -> Vec<MonitorId> {
        self.reconcile_monitors();
        self.monitor_order.clone()
    }

    fn primary_monitor(&mut self) -> Option<MonitorId> {
        self.reconcile_monitors();
        self.monitor_order.first().copied()
    }

    fn monitor_info(&mut self, id: MonitorId) -> Option<MonitorInfo> {
        self.with_native_monitor(id, |m| {
            let (x, y) = m.get_pos();
            let mode = m.get_video_mode().map(VideoMode::from_native).unwrap_or_default();
            let (wx, wy, ww, wh) = m.get_workarea();
            let (pw, ph) = m.get_physical_size();
            MonitorInfo {
                name: m.get_name().unwrap_or_default(),
                position: Point::new(x, y),
                mode,
                workarea: Rect::new(wx, wy, ww, wh),
                physical_size: Size::new(pw, ph),
                content_scale: m.get_content_scale(),
            }
        })
    }

    fn video_modes(&mut self, id: MonitorId) -> Vec<VideoMode> {
        self.with_native_monitor(id, |m| {
            m.get_video_modes()
                .iter()
                .map(|vm| VideoMode::from_native(vm.clone()))
                .collect()
        })
        .unwrap_or_default()
    }

    fn extension_supported(&mut self, name: &str) -> bool {
        self.glfw.extension_supported(name)
    }

    fn get_proc_address(&mut self, name: &str) -> *const std::ffi::c_void {
        self.glfw.get_proc_address_raw(name)
    }

    fn time(&self) -> f64 {
        self.glfw.get_time()
    }

    fn set_time(&mut self, time: f64) {
        self.glfw.set_time(time);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
