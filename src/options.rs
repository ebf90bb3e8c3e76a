//! Window creation options
//!
//! A builder-style bag of creation-time hints. The options are consumed once
//! when the native window is created and are otherwise opaque to the window
//! state machine.

/// Which client API to create the context for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlApi {
    /// Desktop OpenGL.
    OpenGl,
    /// OpenGL ES.
    OpenGlEs,
    /// No client API (for windows rendered by other means).
    NoApi,
}

/// Which OpenGL profile to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlProfile {
    /// Let the platform pick.
    Any,
    /// Core profile.
    Core,
    /// Compatibility profile.
    Compat,
}

/// Creation-time hints for a new window.
///
/// The defaults mirror the platform defaults: OpenGL 1.0, any profile,
/// 8-bit RGBA, 24-bit depth, 8-bit stencil, no MSAA, 60 Hz, double-buffered,
/// resizable, visible.
#[derive(Debug, Clone)]
pub struct WindowOptions {
    pub(crate) gl_version: (u32, u32),
    pub(crate) gl_api: GlApi,
    pub(crate) gl_profile: GlProfile,
    pub(crate) red_bits: u32,
    pub(crate) green_bits: u32,
    pub(crate) blue_bits: u32,
    pub(crate) alpha_bits: u32,
    pub(crate) depth_bits: u32,
    pub(crate) stencil_bits: u32,
    pub(crate) msaa_samples: u32,
    pub(crate) refresh_rate: u32,
    pub(crate) double_buffer: bool,
    pub(crate) resizable: bool,
    pub(crate) visible: bool,
    pub(crate) maximized: bool,
    pub(crate) topmost: bool,
    pub(crate) auto_minimize: bool,
    pub(crate) scale_to_monitor: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            gl_version: (1, 0),
            gl_api: GlApi::OpenGl,
            gl_profile: GlProfile::Any,
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 8,
            depth_bits: 24,
            stencil_bits: 8,
            msaa_samples: 0,
            refresh_rate: 60,
            double_buffer: true,
            resizable: true,
            visible: true,
            maximized: false,
            topmost: false,
            auto_minimize: true,
            scale_to_monitor: false,
        }
    }
}

impl WindowOptions {
    /// Request a specific OpenGL context version.
    pub fn gl_version(mut self, major: u32, minor: u32) -> Self {
        self.gl_version = (major, minor);
        self
    }

    /// Select the client API.
    pub fn gl_api(mut self, api: GlApi) -> Self {
        self.gl_api = api;
        self
    }

    /// Select the OpenGL profile.
    pub fn gl_profile(mut self, profile: GlProfile) -> Self {
        self.gl_profile = profile;
        self
    }

    /// Framebuffer color channel depths, in bits.
    pub fn color_bits(mut self, red: u32, green: u32, blue: u32, alpha: u32) -> Self {
        self.red_bits = red;
        self.green_bits = green;
        self.blue_bits = blue;
        self.alpha_bits = alpha;
        self
    }

    /// Depth buffer size in bits.
    pub fn depth_bits(mut self, bits: u32) -> Self {
        self.depth_bits = bits;
        self
    }

    /// Stencil buffer size in bits.
    pub fn stencil_bits(mut self, bits: u32) -> Self {
        self.stencil_bits = bits;
        self
    }

    /// MSAA sample count, zero to disable multisampling.
    pub fn msaa_samples(mut self, samples: u32) -> Self {
        self.msaa_samples = samples;
        self
    }

    /// Target refresh rate for fullscreen windows.
    pub fn refresh_rate(mut self, rate: u32) -> Self {
        self.refresh_rate = rate;
        self
    }

    /// Whether the framebuffer is double-buffered.
    pub fn double_buffer(mut self, enable: bool) -> Self {
        self.double_buffer = enable;
        self
    }

    /// Whether the window can be resized by the user.
    pub fn resizable(mut self, enable: bool) -> Self {
        self.resizable = enable;
        self
    }

    /// Whether the window is visible when created.
    pub fn visible(mut self, enable: bool) -> Self {
        self.visible = enable;
        self
    }

    /// Whether the window starts maximized.
    pub fn maximized(mut self, enable: bool) -> Self {
        self.maximized = enable;
        self
    }

    /// Whether the window stays above other windows.
    pub fn topmost(mut self, enable: bool) -> Self {
        self.topmost = enable;
        self
    }

    /// Whether a fullscreen window minimizes automatically on focus loss.
    pub fn auto_minimize(mut self, enable: bool) -> Self {
        self.auto_minimize = enable;
        self
    }

    /// Whether window content scales with the monitor content scale.
    pub fn scale_to_monitor(mut self, enable: bool) -> Self {
        self.scale_to_monitor = enable;
        self
    }
}
