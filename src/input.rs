//! Input state types and the fixed code-to-name translation tables
//!
//! Key and mouse-button codes are surfaced to callbacks as stable lowercase
//! string identifiers ("f11", "escape", "left", ...). Codes without an entry
//! in the table translate to the empty string. The tables are plain lookup
//! data; they take no part in the state machine.

use bitflags::bitflags;

/// State of a key at the time of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyState {
    pressed: bool,
    repeated: bool,
}

impl KeyState {
    pub(crate) fn new(pressed: bool, repeated: bool) -> Self {
        Self { pressed, repeated }
    }

    /// Whether the key is down (a repeat also counts as down).
    pub fn pressed(&self) -> bool {
        self.pressed
    }

    /// Whether this event is an auto-repeat of a held key.
    pub fn repeated(&self) -> bool {
        self.repeated
    }
}

/// State of a mouse button at the time of a button event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonState {
    pressed: bool,
}

impl ButtonState {
    pub(crate) fn new(pressed: bool) -> Self {
        Self { pressed }
    }

    /// Whether the button is down.
    pub fn pressed(&self) -> bool {
        self.pressed
    }
}

/// How the cursor behaves while inside a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorMode {
    /// Visible and free to leave the window.
    #[default]
    Normal,
    /// Invisible while over the window, otherwise unconstrained.
    Hidden,
    /// Hidden and locked to the window, providing unbounded motion.
    Disabled,
}

bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        /// A shift key.
        const SHIFT = 1;
        /// A control key.
        const CONTROL = 1 << 1;
        /// An alt key.
        const ALT = 1 << 2;
        /// A super (windows/command) key.
        const SUPER = 1 << 3;
        /// Caps lock is enabled.
        const CAPS_LOCK = 1 << 4;
        /// Num lock is enabled.
        const NUM_LOCK = 1 << 5;
    }
}

impl Modifiers {
    /// Whether a shift key was held.
    pub fn shift(&self) -> bool {
        self.contains(Self::SHIFT)
    }

    /// Whether a control key was held.
    pub fn control(&self) -> bool {
        self.contains(Self::CONTROL)
    }

    /// Whether an alt key was held.
    pub fn alt(&self) -> bool {
        self.contains(Self::ALT)
    }

    /// Whether a super key was held.
    pub fn super_key(&self) -> bool {
        self.contains(Self::SUPER)
    }

    /// Whether caps lock was enabled.
    pub fn caps_lock(&self) -> bool {
        self.contains(Self::CAPS_LOCK)
    }

    /// Whether num lock was enabled.
    pub fn num_lock(&self) -> bool {
        self.contains(Self::NUM_LOCK)
    }
}

/// Translate a GLFW key code to its stable name, or `""` when unmapped.
pub(crate) fn key_name(key: glfw::Key) -> &'static str {
    use glfw::Key;
    match key {
        Key::Space => "space",
        Key::Num0 => "0",
        Key::Num1 => "1",
        Key::Num2 => "2",
        Key::Num3 => "3",
        Key::Num4 => "4",
        Key::Num5 => "5",
        Key::Num6 => "6",
        Key::Num7 => "7",
        Key::Num8 => "8",
        Key::Num9 => "9",
        Key::A => "a",
        Key::B => "b",
        Key::C => "c",
        Key::D => "d",
        Key::E => "e",
        Key::F => "f",
        Key::G => "g",
        Key::H => "h",
        Key::I => "i",
        Key::J => "j",
        Key::K => "k",
        Key::L => "l",
        Key::M => "m",
        Key::N => "n",
        Key::O => "o",
        Key::P => "p",
        Key::Q => "q",
        Key::R => "r",
        Key::S => "s",
        Key::T => "t",
        Key::U => "u",
        Key::V => "v",
        Key::W => "w",
        Key::X => "x",
        Key::Y => "y",
        Key::Z => "z",
        Key::Escape => "escape",
        Key::Enter => "enter",
        Key::Tab => "tab",
        Key::Backspace => "backspace",
        Key::Insert => "insert",
        Key::Delete => "delete",
        Key::Right => "right",
        Key::Left => "left",
        Key::Down => "down",
        Key::Up => "up",
        Key::PageUp => "pageup",
        Key::PageDown => "pagedown",
        Key::Home => "home",
        Key::End => "end",
        Key::CapsLock => "capslock",
        Key::ScrollLock => "scrolllock",
        Key::NumLock => "numlock",
        Key::PrintScreen => "printscreen",
        Key::Pause => "pause",
        Key::F1 => "f1",
        Key::F2 => "f2",
        Key::F3 => "f3",
        Key::F4 => "f4",
        Key::F5 => "f5",
        Key::F6 => "f6",
        Key::F7 => "f7",
        Key::F8 => "f8",
        Key::F9 => "f9",
        Key::F10 => "f10",
        Key::F11 => "f11",
        Key::F12 => "f12",
        Key::F13 => "f13",
        Key::F14 => "f14",
        Key::F15 => "f15",
        Key::F16 => "f16",
        Key::F17 => "f17",
        Key::F18 => "f18",
        Key::F19 => "f19",
        Key::F20 => "f20",
        Key::F21 => "f21",
        Key::F22 => "f22",
        Key::F23 => "f23",
        Key::F24 => "f24",
        Key::F25 => "f25",
        Key::Kp0 => "num0",
        Key::Kp1 => "num1",
        Key::Kp2 => "num2",
        Key::Kp3 => "num3",
        Key::Kp4 => "num4",
        Key::Kp5 => "num5",
        Key::Kp6 => "num6",
        Key::Kp7 => "num7",
        Key::Kp8 => "num8",
        Key::Kp9 => "num9",
        Key::KpEnter => "enter",
        Key::LeftShift => "lshift",
        Key::LeftControl => "lcontrol",
        Key::LeftAlt => "lalt",
        Key::LeftSuper => "lsuper",
        Key::RightShift => "rshift",
        Key::RightControl => "rcontrol",
        Key::RightAlt => "ralt",
        Key::RightSuper => "rsuper",
        Key::Menu => "menu",
        _ => "",
    }
}

/// Translate a GLFW mouse button code to its stable name, or `""`.
pub(crate) fn mouse_button_name(button: glfw::MouseButton) -> &'static str {
    use glfw::MouseButton;
    match button {
        MouseButton::Button1 => "left",
        MouseButton::Button2 => "right",
        MouseButton::Button3 => "middle",
        _ => "",
    }
}
