use std::cell::Cell;
use std::fmt;

use serde::Serialize;

use crate::layout::LayoutElement;
use crate::utils::geometry::Rectangle;
use crate::utils::id::IdCounter;

static WINDOW_ID_COUNTER: IdCounter = IdCounter::new();

/// Stable handle of a mapped toplevel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WindowId(u64);

impl WindowId {
    fn next() -> WindowId {
        WindowId(WINDOW_ID_COUNTER.next())
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A toplevel that has been mapped and handed over to the layout.
#[derive(Debug)]
pub struct Mapped {
    id: WindowId,
    title: String,
    geometry: Cell<Rectangle>,
    hidden: Cell<bool>,
    fullscreen: Cell<bool>,
    /// Whether the layout asked the client to close this window.
    close_requested: Cell<bool>,
}

impl Mapped {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: WindowId::next(),
            title: title.into(),
            geometry: Cell::new(Rectangle::default()),
            hidden: Cell::new(false),
            fullscreen: Cell::new(false),
            close_requested: Cell::new(false),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_fullscreen(&self, fullscreen: bool) {
        self.fullscreen.set(fullscreen);
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested.get()
    }
}

impl LayoutElement for Mapped {
    type Id = WindowId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn geometry(&self) -> Rectangle {
        self.geometry.get()
    }

    fn set_geometry(&self, geometry: Rectangle) {
        trace!("window {}: new geometry {geometry}", self.id);
        self.geometry.set(geometry);
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen.get()
    }

    fn is_hidden(&self) -> bool {
        self.hidden.get()
    }

    fn set_hidden(&self, hidden: bool) {
        self.hidden.set(hidden);
    }

    fn request_close(&self) {
        debug!("asking window {} ({}) to close", self.id, self.title);
        self.close_requested.set(true);
    }
}
