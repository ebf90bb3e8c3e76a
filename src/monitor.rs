//! Connected display devices
//!
//! A [`Monitor`] is a lookup handle, not an owner: every query re-resolves
//! the monitor through the platform by id, so a handle kept across a
//! disconnect simply starts reporting empty values. Windows likewise never
//! keep a monitor alive.

use std::fmt;

use crate::app::App;
use crate::geometry::{Point, Rect, Size};
use crate::platform::{MonitorId, MonitorInfo};

/// One display mode supported by a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoMode {
    /// Horizontal resolution in screen coordinates.
    pub width: i32,
    /// Vertical resolution in screen coordinates.
    pub height: i32,
    /// Red channel bit depth.
    pub red_bits: i32,
    /// Green channel bit depth.
    pub green_bits: i32,
    /// Blue channel bit depth.
    pub blue_bits: i32,
    /// Refresh rate in Hz.
    pub refresh_rate: i32,
}

impl VideoMode {
    pub(crate) fn from_native(mode: glfw::VidMode) -> Self {
        Self {
            width: mode.width as i32,
            height: mode.height as i32,
            red_bits: mode.red_bits as i32,
            green_bits: mode.green_bits as i32,
            blue_bits: mode.blue_bits as i32,
            refresh_rate: mode.refresh_rate as i32,
        }
    }
}

/// Handle to a connected monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monitor {
    pub(crate) id: MonitorId,
}

impl Monitor {
    fn info(&self) -> Option<MonitorInfo> {
        App::with_platform(|p| p.monitor_info(self.id)).flatten()
    }

    /// Whether the monitor is still connected.
    pub fn is_connected(&self) -> bool {
        self.info().is_some()
    }

    /// Human-readable monitor name, empty once disconnected.
    pub fn name(&self) -> String {
        self.info().map(|i| i.name).unwrap_or_default()
    }

    /// Position of the monitor in virtual-screen coordinates.
    pub fn pos(&self) -> Point<i32> {
        self.info().map(|i| i.position).unwrap_or_default()
    }

    /// Position plus current-mode size in virtual-screen coordinates.
    pub fn rect(&self) -> Rect<i32> {
        self.info().map(|i| i.rect()).unwrap_or_default()
    }

    /// The area not occupied by taskbars and docks.
    pub fn workarea_rect(&self) -> Rect<i32> {
        self.info().map(|i| i.workarea).unwrap_or_default()
    }

    /// Physical size in millimetres.
    pub fn physical_size(&self) -> Size<i32> {
        self.info().map(|i| i.physical_size).unwrap_or_default()
    }

    /// Content scale factors relative to the platform's default DPI.
    pub fn content_scale(&self) -> (f32, f32) {
        self.info().map(|i| i.content_scale).unwrap_or((0.0, 0.0))
    }

    /// Refresh rate of the current mode in Hz.
    pub fn refresh_rate(&self) -> i32 {
        self.info().map(|i| i.mode.refresh_rate).unwrap_or(0)
    }

    /// The currently active display mode.
    pub fn current_mode(&self) -> Option<VideoMode> {
        self.info().map(|i| i.mode)
    }

    /// All display modes the monitor supports.
    pub fn supported_modes(&self) -> Vec<VideoMode> {
        App::with_platform(|p| p.video_modes(self.id)).unwrap_or_default()
    }
}

impl fmt::Display for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.info() {
            Some(info) => {
                let rect = info.rect();
                write!(
                    f,
                    "{} - position:{},{} size:{}x{}px(workarea:{}x{}px) {}x{}mm {}Hz",
                    info.name,
                    rect.x(),
                    rect.y(),
                    rect.width(),
                    rect.height(),
                    info.workarea.width(),
                    info.workarea.height(),
                    info.physical_size.width(),
                    info.physical_size.height(),
                    info.mode.refresh_rate,
                )
            }
            None => write!(f, "(disconnected)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::app::App;
    use crate::geometry::Rect;

    #[test]
    fn queries_resolve_through_platform() {
        let app = App::with_fake();
        let monitor = app.primary_monitor().unwrap();
        assert_eq!(monitor.name(), "FakeDisplay 0");
        assert_eq!(monitor.rect(), Rect::new(0, 0, 1920, 1080));
        assert_eq!(monitor.refresh_rate(), 60);
        assert!(monitor.is_connected());
        let mode = monitor.current_mode().unwrap();
        assert_eq!((mode.width, mode.height), (1920, 1080));
    }

    #[test]
    fn disconnected_monitor_reports_empty_values() {
        let app = App::with_fake();
        let extra = app.fake(|fake| fake.add_monitor("Side", Rect::new(1920, 0, 1280, 1024), 75));
        app.pump_once(false);
        let monitor = app
            .monitors()
            .into_iter()
            .find(|m| m.id == extra)
            .unwrap();
        assert_eq!(monitor.name(), "Side");

        app.fake(|fake| fake.disconnect_monitor(extra));
        app.pump_once(false);
        assert!(!monitor.is_connected());
        assert_eq!(monitor.name(), "");
        assert!(!monitor.rect().is_valid());
        assert_eq!(monitor.supported_modes().len(), 0);
    }

    #[test]
    fn display_format() {
        let app = App::with_fake();
        let monitor = app.primary_monitor().unwrap();
        assert_eq!(
            monitor.to_string(),
            "FakeDisplay 0 - position:0,0 size:1920x1080px(workarea:1920x1080px) 480x270mm 60Hz"
        );
    }
}
