//! Process-wide application context and window registry
//!
//! The underlying platform library is process-global (one event queue, one
//! monitor list) and confined to the thread that initialized it, so the
//! context lives in a thread-local slot holding a weak reference: the first
//! [`App::instance`] call creates it, later calls on the same thread return
//! the same context, and it dies with the last user-held `Rc`.
//!
//! The registry keeps only weak entries for windows. The user's handles are
//! the sole strong owners; once the last one drops, the id lands in a
//! graveyard and the native window is destroyed on the next loop iteration.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak as ArcWeak};
use std::thread;

use crate::error::{self, Error};
use crate::monitor::Monitor;
use crate::options::WindowOptions;
use crate::platform::glfw::GlfwPlatform;
use crate::platform::{MonitorChange, MonitorId, Platform, PlatformEvent, WindowId};
use crate::window::{self, Window, WindowInner};
use crate::unpoisoned;

thread_local! {
    static CURRENT: RefCell<Weak<App>> = const { RefCell::new(Weak::new()) };
}

/// Shared bookkeeping for live windows. This is the only state the optional
/// draw thread touches besides the windows' own inner records.
pub(crate) struct Registry {
    windows: Mutex<Vec<ArcWeak<WindowInner>>>,
    graveyard: Mutex<Vec<WindowId>>,
    drawing: AtomicBool,
}

impl Registry {
    fn new() -> Self {
        Self {
            windows: Mutex::new(Vec::new()),
            graveyard: Mutex::new(Vec::new()),
            drawing: AtomicBool::new(false),
        }
    }

    fn register(&self, window: ArcWeak<WindowInner>) {
        unpoisoned(self.windows.lock()).push(window);
    }

    /// Called from `WindowInner::drop`, possibly on a non-loop thread.
    pub(crate) fn retire(&self, id: WindowId) {
        unpoisoned(self.graveyard.lock()).push(id);
    }

    fn drain_graveyard(&self) -> Vec<WindowId> {
        std::mem::take(&mut *unpoisoned(self.graveyard.lock()))
    }

    fn is_empty(&self) -> bool {
        unpoisoned(self.windows.lock()).is_empty()
    }

    /// Copy of the live windows, taken under the lock and iterated without
    /// it so slow per-window work never blocks the other thread.
    fn snapshot(&self) -> Vec<Window> {
        unpoisoned(self.windows.lock())
            .iter()
            .filter_map(|weak| weak.upgrade())
            .map(|inner| Window { inner })
            .collect()
    }

    /// One draw over every live window.
    pub(crate) fn draw_pass(&self) {
        for window in self.snapshot() {
            window::draw(&window);
        }
    }
}

/// The process-wide application context.
pub struct App {
    platform: RefCell<Box<dyn Platform>>,
    registry: Arc<Registry>,
}

impl App {
    fn from_platform(platform: Box<dyn Platform>) -> Self {
        Self {
            platform: RefCell::new(platform),
            registry: Arc::new(Registry::new()),
        }
    }

    /// The context for this thread, creating and initializing the platform
    /// on first use.
    pub fn instance() -> Result<Rc<App>, Error> {
        CURRENT.with(|slot| {
            if let Some(app) = slot.borrow().upgrade() {
                return Ok(app);
            }
            let platform = GlfwPlatform::new()?;
            let app = Rc::new(App::from_platform(Box::new(platform)));
            *slot.borrow_mut() = Rc::downgrade(&app);
            Ok(app)
        })
    }

    /// Run `f` against this thread's context, if one exists.
    pub(crate) fn with_current<T>(f: impl FnOnce(&Rc<App>) -> T) -> Option<T> {
        CURRENT.with(|slot| slot.borrow().upgrade()).map(|app| f(&app))
    }

    /// Run `f` against the platform, if this thread owns one and it is not
    /// already borrowed (a handler re-entering mid-operation sees "absent"
    /// and no-ops, as does any call from the draw thread).
    pub(crate) fn with_platform<T>(f: impl FnOnce(&mut dyn Platform) -> T) -> Option<T> {
        Self::with_current(|app| {
            let mut platform = app.platform.try_borrow_mut().ok()?;
            Some(f(platform.as_mut()))
        })
        .flatten()
    }

    // -- windows ----------------------------------------------------------

    /// Create a windowed-mode window and register it.
    pub fn add_window(
        &self,
        width: i32,
        height: i32,
        title: &str,
        options: &WindowOptions,
    ) -> Result<Window, Error> {
        self.add_window_impl(width, height, title, None, options)
    }

    /// Create a window fullscreen on `monitor`. The window takes the
    /// monitor's current mode size; `width`/`height` apply if the monitor
    /// has meanwhile disconnected.
    pub fn add_window_on(
        &self,
        monitor: &Monitor,
        width: i32,
        height: i32,
        title: &str,
        options: &WindowOptions,
    ) -> Result<Window, Error> {
        self.add_window_impl(width, height, title, Some(monitor.id), options)
    }

    fn add_window_impl(
        &self,
        width: i32,
        height: i32,
        title: &str,
        monitor: Option<MonitorId>,
        options: &WindowOptions,
    ) -> Result<Window, Error> {
        let mut platform = self.platform.borrow_mut();
        let p = platform.as_mut();

        // Fullscreen creation adopts the monitor's current video mode, so
        // the framebuffer matches what the monitor is already scanning out.
        let (width, height, options) = match monitor.and_then(|m| p.monitor_info(m)) {
            Some(info) => {
                let mode = info.mode;
                let opts = options
                    .clone()
                    .color_bits(
                        mode.red_bits as u32,
                        mode.green_bits as u32,
                        mode.blue_bits as u32,
                        options.alpha_bits,
                    )
                    .refresh_rate(mode.refresh_rate as u32);
                (mode.width, mode.height, opts)
            }
            None => (width, height, options.clone()),
        };

        let creation = p.create_window(width, height, title, monitor, &options)?;
        let normal_rect = window::initial_normal_rect(p, creation.id);
        drop(platform);

        log::debug!("created window {:?} ({title})", creation.id);
        let window = window::new_window(
            creation.id,
            Arc::clone(&self.registry),
            title,
            creation.surface,
            normal_rect,
        );
        self.registry.register(Arc::downgrade(&window.inner));
        Ok(window)
    }

    // -- main loop --------------------------------------------------------

    /// Run the event and draw loop until no live windows remain.
    ///
    /// Single-threaded mode draws every window, then polls for events.
    /// With a dedicated draw thread, drawing runs unthrottled on a
    /// background thread over registry snapshots while this thread blocks
    /// waiting for events, keeping input latency low.
    pub fn run(&self, use_dedicated_draw_thread: bool) {
        self.registry.drawing.store(true, Ordering::SeqCst);
        let draw_thread = use_dedicated_draw_thread.then(|| {
            let registry = Arc::clone(&self.registry);
            thread::spawn(move || {
                while registry.drawing.load(Ordering::SeqCst) {
                    registry.draw_pass();
                    thread::yield_now();
                }
            })
        });

        while !self.registry.is_empty() {
            let events = if use_dedicated_draw_thread {
                self.platform.borrow_mut().wait_events()
            } else {
                self.registry.draw_pass();
                self.platform.borrow_mut().poll_events()
            };
            self.dispatch_events(events);
            self.process_monitor_changes();
            self.prune();
        }

        self.registry.drawing.store(false, Ordering::SeqCst);
        if let Some(handle) = draw_thread {
            let _ = handle.join();
        }
    }

    /// Request close on every registered window. The loop observes the
    /// requests on its next iteration and ends once all windows are gone.
    /// Callable from any thread.
    pub fn exit(&self) {
        for window in self.registry.snapshot() {
            window.close();
        }
    }

    fn dispatch_events(&self, events: Vec<(WindowId, PlatformEvent)>) {
        if events.is_empty() {
            return;
        }
        let windows = self.registry.snapshot();
        for (id, event) in events {
            if let Some(window) = windows.iter().find(|w| w.inner.id == id) {
                window::dispatch(window, event);
            }
        }
    }

    fn process_monitor_changes(&self) {
        let changes = self.platform.borrow_mut().take_monitor_changes();
        for change in changes {
            match change {
                MonitorChange::Connected(id) => log::debug!("monitor connected: {id:?}"),
                MonitorChange::Disconnected(id) => log::debug!("monitor disconnected: {id:?}"),
            }
        }
    }

    /// Tear down windows that were closed or whose last strong handle
    /// dropped. The render surface is released before the native window.
    fn prune(&self) {
        let mut platform = self.platform.borrow_mut();
        let p = platform.as_mut();
        for id in self.registry.drain_graveyard() {
            log::debug!("destroying window {id:?} (handle dropped)");
            p.destroy_window(id);
        }
        unpoisoned(self.registry.windows.lock()).retain(|weak| {
            let Some(inner) = weak.upgrade() else {
                return false;
            };
            if !p.window_exists(inner.id) {
                return false;
            }
            if inner.close_requested() || p.should_close(inner.id) {
                log::debug!("destroying window {:?} (closed)", inner.id);
                drop(inner.take_surface());
                p.destroy_window(inner.id);
                false
            } else {
                true
            }
        });
    }

    // -- monitors ---------------------------------------------------------

    /// Snapshot of the currently connected monitors.
    pub fn monitors(&self) -> Vec<Monitor> {
        self.platform
            .borrow_mut()
            .monitors()
            .into_iter()
            .map(|id| Monitor { id })
            .collect()
    }

    /// The platform-designated primary monitor.
    pub fn primary_monitor(&self) -> Option<Monitor> {
        self.platform
            .borrow_mut()
            .primary_monitor()
            .map(|id| Monitor { id })
    }

    // -- pass-throughs ----------------------------------------------------

    /// The most recent platform error recorded on this thread.
    pub fn last_error() -> Option<Error> {
        error::last_error()
    }

    /// Register a callback fired synchronously at each platform failure.
    /// Registering replaces any previous callback.
    pub fn on_error(callback: impl FnMut(&Error) + 'static) {
        error::set_callback(callback);
    }

    /// Whether the given API extension is supported by the current context.
    pub fn has_extension(&self, extension: &str) -> bool {
        self.platform.borrow_mut().extension_supported(extension)
    }

    /// Address of the named client API function, for loading GL function
    /// pointers. Requires a current context; null when the function is
    /// unavailable.
    pub fn get_proc_address(&self, name: &str) -> *const std::ffi::c_void {
        self.platform.borrow_mut().get_proc_address(name)
    }

    /// Seconds elapsed on the platform timer.
    pub fn time(&self) -> f64 {
        self.platform.borrow().time()
    }

    /// Reset the platform timer.
    pub fn set_time(&self, time: f64) {
        self.platform.borrow_mut().set_time(time);
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Users are expected to let every window close before dropping the
        // context; windows still alive here are destroyed so the platform
        // can shut down cleanly.
        let mut platform = self.platform.borrow_mut();
        let p = platform.as_mut();
        for id in self.registry.drain_graveyard() {
            p.destroy_window(id);
        }
        for weak in unpoisoned(self.registry.windows.lock()).drain(..) {
            if let Some(inner) = weak.upgrade() {
                if p.window_exists(inner.id) {
                    log::warn!("window {:?} still alive at shutdown, destroying", inner.id);
                    drop(inner.take_surface());
                    p.destroy_window(inner.id);
                }
            }
        }
    }
}

#[cfg(test)]
impl App {
    /// A context over the in-memory backend, installed as this thread's
    /// current context.
    pub(crate) fn with_fake() -> Rc<App> {
        use crate::platform::fake::FakePlatform;
        CURRENT.with(|slot| {
            let app = Rc::new(App::from_platform(Box::new(FakePlatform::new())));
            *slot.borrow_mut() = Rc::downgrade(&app);
            app
        })
    }

    /// Direct access to the fake backend for scripting and inspection.
    pub(crate) fn fake<T>(
        &self,
        f: impl FnOnce(&mut crate::platform::fake::FakePlatform) -> T,
    ) -> T {
        let mut platform = self.platform.borrow_mut();
        f(platform
            .as_any_mut()
            .downcast_mut()
            .expect("fake backend"))
    }

    /// One iteration of the main loop, optionally including a draw pass.
    pub(crate) fn pump_once(&self, draw: bool) {
        if draw {
            self.registry.draw_pass();
        }
        let events = self.platform.borrow_mut().poll_events();
        self.dispatch_events(events);
        self.process_monitor_changes();
        self.prune();
    }
}
