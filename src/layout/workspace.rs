use std::fmt;

use anyhow::{bail, Context as _};

use super::{Direction, LayoutElement, Seat};
use crate::utils::geometry::{Point, Rectangle, Size};
use crate::utils::id::IdCounter;

static WORKSPACE_ID_COUNTER: IdCounter = IdCounter::new();

#[derive(Debug)]
pub struct Workspace<W: LayoutElement> {
    id: WorkspaceId,

    /// Ordinal of this workspace on its output.
    num: usize,

    /// Output this workspace is bound to, `None` while orphaned.
    output: Option<OutputId>,

    /// Windows in this workspace, most recently added first.
    windows: Vec<W>,

    /// Currently active window, always one of `windows`.
    active_window_id: Option<W::Id>,

    /// Global geometry of the output.
    output_geometry: Rectangle,

    /// Area of the output that windows may cover, relative to the output.
    usable_area: Rectangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkspaceId(u64);

impl WorkspaceId {
    fn next() -> WorkspaceId {
        WorkspaceId(WORKSPACE_ID_COUNTER.next())
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-owning reference to an output, by connector name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputId(String);

impl OutputId {
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl<W: LayoutElement> Workspace<W> {
    pub fn new(num: usize) -> Self {
        Self {
            id: WorkspaceId::next(),
            num,
            output: None,
            windows: vec![],
            active_window_id: None,
            output_geometry: Rectangle::default(),
            usable_area: Rectangle::default(),
        }
    }

    pub fn id(&self) -> WorkspaceId {
        self.id
    }

    pub fn num(&self) -> usize {
        self.num
    }

    pub fn output(&self) -> Option<&OutputId> {
        self.output.as_ref()
    }

    pub fn set_output(&mut self, output: Option<OutputId>) {
        self.output = output;
    }

    pub fn windows(&self) -> impl Iterator<Item = &W> + '_ {
        self.windows.iter()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn has_windows(&self) -> bool {
        !self.windows.is_empty()
    }

    pub fn contains(&self, id: &W::Id) -> bool {
        self.windows.iter().any(|win| win.id() == id)
    }

    pub fn find_window(&self, id: &W::Id) -> Option<&W> {
        self.windows.iter().find(|win| win.id() == id)
    }

    pub fn find_window_mut(&mut self, id: &W::Id) -> Option<&mut W> {
        self.windows.iter_mut().find(|win| win.id() == id)
    }

    pub fn active_window(&self) -> Option<&W> {
        let id = self.active_window_id.as_ref()?;
        self.find_window(id)
    }

    pub fn usable_area(&self) -> Rectangle {
        self.usable_area
    }

    pub fn update_geometry(&mut self, output_geometry: Rectangle, usable_area: Rectangle) {
        self.output_geometry = output_geometry;
        self.usable_area = usable_area;
    }

    fn idx_of(&self, id: &W::Id) -> Option<usize> {
        self.windows.iter().position(|win| win.id() == id)
    }

    fn active_idx(&self) -> Option<usize> {
        self.idx_of(self.active_window_id.as_ref()?)
    }

    /// Adds a window at the front and makes it active.
    ///
    /// Returns `false` without doing anything if the window is already here.
    pub fn add_toplevel(&mut self, window: W, focus: bool, seat: &mut dyn Seat<W>) -> bool {
        if self.contains(window.id()) {
            return false;
        }

        self.active_window_id = Some(window.id().clone());
        self.windows.insert(0, window);

        if focus {
            seat.deliver_focus(&self.windows[0]);
        }

        true
    }

    /// Unlinks a window from this workspace.
    ///
    /// If the window was active, the window that followed it becomes active. Focus is left alone.
    pub fn remove_toplevel(&mut self, id: &W::Id) -> Option<W> {
        let idx = self.idx_of(id)?;
        let was_active = self.active_idx() == Some(idx);
        let window = self.windows.remove(idx);

        if was_active {
            self.active_window_id = if self.windows.is_empty() {
                None
            } else {
                Some(self.windows[idx % self.windows.len()].id().clone())
            };
        }

        Some(window)
    }

    /// Inserts the windows of `other` in front of ours, keeping their order.
    ///
    /// Our active window stays active; if we had none, the active window of `other` takes over.
    pub fn absorb(&mut self, mut other: Workspace<W>) {
        if other.windows.is_empty() {
            return;
        }

        if self.active_window_id.is_none() {
            self.active_window_id = other.active_window_id.take();
        }

        let mut windows = other.windows;
        windows.retain(|win| !self.contains(win.id()));
        windows.append(&mut self.windows);
        self.windows = windows;
    }

    /// Asks a window to close, moving the active window off it first.
    pub fn close(&mut self, id: &W::Id, seat: &mut dyn Seat<W>) -> bool {
        let Some(idx) = self.idx_of(id) else {
            return false;
        };

        if self.active_idx() == Some(idx) {
            if self.windows.len() >= 2 {
                self.focus_next(seat);
            } else {
                self.active_window_id = None;
                seat.clear_focus();
            }
        }

        self.windows[idx].request_close();
        true
    }

    pub fn close_active(&mut self, seat: &mut dyn Seat<W>) {
        if let Some(id) = self.active_window_id.clone() {
            self.close(&id, seat);
        }
    }

    /// Moves a window over to `target`, where it becomes active and focused.
    ///
    /// With `hide` set, the window gets hidden before it leaves.
    pub fn move_to(
        &mut self,
        id: &W::Id,
        target: &mut Workspace<W>,
        hide: bool,
        seat: &mut dyn Seat<W>,
    ) -> bool {
        if target.id == self.id || !self.contains(id) || target.contains(id) {
            return false;
        }

        let Some(window) = self.remove_toplevel(id) else {
            return false;
        };

        if hide {
            window.set_hidden(true);
        }

        target.add_toplevel(window, true, seat)
    }

    pub fn set_hidden(&self, hidden: bool) {
        for win in &self.windows {
            win.set_hidden(hidden);
        }
    }

    /// Exchanges the geometry of the active window with another one.
    pub fn swap(&mut self, other_id: &W::Id) -> anyhow::Result<()> {
        let active = self
            .active_window()
            .context("no active window to swap with")?;
        let Some(other) = self.find_window(other_id) else {
            bail!("window {other_id:?} is not on workspace {}", self.id);
        };

        let active_geo = active.geometry();
        active.set_geometry(other.geometry());
        other.set_geometry(active_geo);

        Ok(())
    }

    /// Finds the nearest window from the active one in the given direction.
    pub fn in_direction(&self, direction: Direction) -> Option<&W> {
        if self.windows.len() < 2 {
            return None;
        }

        let active = self.active_window()?;
        let from = active.geometry().loc;

        let mut best = None;
        let mut best_primary = i32::MAX;
        let mut best_secondary = i32::MAX;

        for win in &self.windows {
            if win.id() == active.id() {
                continue;
            }

            let to = win.geometry().loc;
            let (primary, secondary) = match direction {
                Direction::Up => (from.y - to.y, (from.x - to.x).abs()),
                Direction::Down => (to.y - from.y, (from.x - to.x).abs()),
                Direction::Left => (from.x - to.x, (from.y - to.y).abs()),
                Direction::Right => (to.x - from.x, (from.y - to.y).abs()),
            };

            // Less-or-equal on the primary axis lets windows aligned in a grid win ties.
            if primary > 0 && primary <= best_primary && secondary < best_secondary {
                best = Some(win);
                best_primary = primary;
                best_secondary = secondary;
            }
        }

        best
    }

    /// Shows the workspace and focuses its active window.
    ///
    /// Without an active window, the oldest window becomes active.
    pub fn focus(&mut self, seat: &mut dyn Seat<W>) {
        self.set_hidden(false);

        if self.active_idx().is_none() {
            self.active_window_id = self.windows.last().map(|win| win.id().clone());
        }

        match self.active_window() {
            Some(win) => seat.deliver_focus(win),
            None => seat.clear_focus(),
        }
    }

    pub fn focus_toplevel(&mut self, id: &W::Id, seat: &mut dyn Seat<W>) -> bool {
        let Some(idx) = self.idx_of(id) else {
            return false;
        };

        self.activate(idx, seat);
        true
    }

    pub fn focus_next(&mut self, seat: &mut dyn Seat<W>) {
        if self.windows.len() < 2 {
            return;
        }

        if let Some(idx) = self.active_idx() {
            self.activate((idx + 1) % self.windows.len(), seat);
        }
    }

    pub fn focus_prev(&mut self, seat: &mut dyn Seat<W>) {
        if self.windows.len() < 2 {
            return;
        }

        if let Some(idx) = self.active_idx() {
            let len = self.windows.len();
            self.activate((idx + len - 1) % len, seat);
        }
    }

    fn activate(&mut self, idx: usize, seat: &mut dyn Seat<W>) {
        let win = &self.windows[idx];
        self.active_window_id = Some(win.id().clone());
        seat.deliver_focus(win);
    }

    /// Arranges all non-fullscreen windows in a grid over the usable area.
    pub fn tile(&mut self) {
        let _span = tracy_client::span!("Workspace::tile");

        let n = self.windows.iter().filter(|win| !win.is_fullscreen()).count();
        if n == 0 {
            return;
        }

        let n = n as i32;
        let rows = f64::from(n).sqrt().round() as i32;
        let cols = (n + rows - 1) / rows;

        let cell = Size::new(self.usable_area.size.w / cols, self.usable_area.size.h / rows);
        let origin = self.output_geometry.loc + self.usable_area.loc;

        let tiled = self.windows.iter().filter(|win| !win.is_fullscreen());
        for (i, win) in (0..).zip(tiled) {
            let row = i / cols;
            let col = i % cols;
            let loc = origin + Point::new(col * cell.w, row * cell.h);
            win.set_geometry(Rectangle::new(loc, cell));
        }

        trace!(
            "tiled {n} windows on workspace {} into {rows}x{cols} cells of {}x{}",
            self.id,
            cell.w,
            cell.h
        );
    }

    #[cfg(test)]
    pub fn verify_invariants(&self) {
        for (i, win) in self.windows.iter().enumerate() {
            let dups = self.windows[i + 1..]
                .iter()
                .filter(|other| other.id() == win.id())
                .count();
            assert_eq!(dups, 0, "window {:?} is in the workspace twice", win.id());
        }

        if let Some(id) = &self.active_window_id {
            assert!(self.contains(id), "active window must be in the workspace");
        }

        if self.windows.is_empty() {
            assert!(self.active_window_id.is_none());
        }
    }
}
