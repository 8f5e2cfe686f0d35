use trellis_ipc::{Mode, OutputHead};

use crate::protocols::output_management::ConfigurationResult;
use crate::utils::geometry::{Point, Rectangle, Size};

pub mod headless;
pub use headless::Headless;

/// A physical display as reported by the backend when it gets connected.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDevice {
    /// Connector name, e.g. `eDP-1`. Stable across reconnects.
    pub name: String,
    pub make: String,
    pub model: String,
    pub modes: Vec<Mode>,
}

/// State that a monitor commits through the backend.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OutputState {
    pub enabled: bool,
    pub mode: Option<Mode>,
}

/// Z-ordered bands that auxiliary shell surfaces (panels, backgrounds) live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Background,
    Bottom,
    Top,
    Overlay,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Background, Layer::Bottom, Layer::Top, Layer::Overlay];
}

impl OutputDevice {
    pub fn new(name: impl Into<String>, modes: Vec<Mode>) -> Self {
        Self {
            name: name.into(),
            make: String::from("Unknown"),
            model: String::from("Unknown"),
            modes,
        }
    }

    /// Returns the mode flagged as preferred, falling back to the first one.
    pub fn preferred_mode(&self) -> Option<Mode> {
        self.modes
            .iter()
            .find(|m| m.is_preferred)
            .or_else(|| self.modes.first())
            .copied()
    }
}

impl OutputState {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn enabled(mode: Mode) -> Self {
        Self {
            enabled: true,
            mode: Some(mode),
        }
    }

    /// Logical size of the output in this state, zero when disabled.
    pub fn size(&self) -> Size {
        match self.mode {
            Some(mode) if self.enabled => Size::new(i32::from(mode.width), i32::from(mode.height)),
            _ => Size::default(),
        }
    }
}

/// Rendering, mode setting and protocol plumbing that the layout code drives.
///
/// Calls go strictly from the layout into the backend; the backend never calls back.
pub trait Backend {
    /// Sets up rendering for a freshly connected output.
    fn init_render(&mut self, device: &OutputDevice);

    /// Checks whether the output could adopt the state without applying it.
    fn test_state(&mut self, name: &str, state: &OutputState) -> anyhow::Result<()>;

    /// Applies the state to the output.
    fn commit_state(&mut self, name: &str, state: &OutputState) -> anyhow::Result<()>;

    /// Starts compositing the output at the given global geometry.
    fn bind_output(&mut self, name: &str, geometry: Rectangle);

    /// Stops compositing the output.
    fn unbind_output(&mut self, name: &str);

    /// Moves one overlay band of the output to the given global location.
    fn reposition_layer(&mut self, name: &str, layer: Layer, loc: Point);

    /// Announces the current output layout to configuration clients.
    fn publish_configuration(&mut self, serial: u32, heads: &[OutputHead]);

    /// Tells the client that sent a configuration request how it went.
    fn report_configuration(&mut self, serial: u32, result: ConfigurationResult);
}
