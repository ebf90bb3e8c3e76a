//! Small object-oriented windowing layer over GLFW.
//!
//! `glaze` wraps window creation, the event loop, monitor handling, and
//! per-window draw callbacks behind a handful of handle types. Windows are
//! plain reference-counted handles: clone them freely, hand them to
//! callbacks, and drop the last one to close the window.
//!
//! ```no_run
//! use glaze::WindowOptions;
//!
//! fn main() -> Result<(), glaze::Error> {
//!     let app = glaze::init()?;
//!     let window = app.add_window(800, 600, "demo", &WindowOptions::default())?;
//!     window.on_key(|window, key, state, _mods| {
//!         if key == "escape" && state.pressed() {
//!             window.close();
//!         }
//!     });
//!     window.on_frame(|window| {
//!         // render one frame; buffers are swapped after this returns
//!         let _ = window.frame_count();
//!     });
//!     app.run(false);
//!     Ok(())
//! }
//! ```

mod app;
mod error;
mod events;
mod geometry;
mod input;
mod monitor;
mod options;
mod platform;
mod window;

pub use app::App;
pub use error::{Error, ErrorKind};
pub use geometry::{Point, Rect, Size};
pub use input::{ButtonState, CursorMode, KeyState, Modifiers};
pub use monitor::{Monitor, VideoMode};
pub use options::{GlApi, GlProfile, WindowOptions};
pub use platform::{MonitorId, WindowId};
pub use window::{Window, WindowState};

use std::sync::PoisonError;

/// Initialize the platform (if needed) and return this thread's
/// application context. Must be called from the main thread.
pub fn init() -> Result<std::rc::Rc<App>, Error> {
    App::instance()
}

/// Handler panics must not wedge every subsequent lock acquisition; the
/// protected values stay structurally sound, so poison is ignored.
pub(crate) fn unpoisoned<T>(result: Result<T, PoisonError<T>>) -> T {
    result.unwrap_or_else(PoisonError::into_inner)
}
