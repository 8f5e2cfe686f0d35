use std::rc::Rc;

use trellis_config::{Output, Struts};
use trellis_ipc::{ConfiguredMode, Mode};

use super::workspace::{OutputId, Workspace, WorkspaceId};
use super::{LayoutElement, Options, Seat};
use crate::backend::{Backend, OutputDevice, OutputState};
use crate::utils::geometry::Rectangle;

/// Refresh rates closer than this to the requested one count as a match, in mHz.
const REFRESH_TOLERANCE: u32 = 1000;

#[derive(Debug)]
pub struct Monitor<W: LayoutElement> {
    /// Device for this monitor.
    device: OutputDevice,
    /// State last committed through the backend.
    state: OutputState,
    /// Configuration that produced `state`, `None` when running on the fallback mode.
    config: Option<Output>,
    /// Global geometry, empty while the monitor is not placed in the global space.
    geometry: Rectangle,
    /// Space reserved by auxiliary shell surfaces.
    exclusive_zones: Struts,
    /// Area that windows may cover, relative to the monitor.
    usable_area: Rectangle,
    // Must always contain at least one.
    pub(super) workspaces: Vec<Workspace<W>>,
    /// Index of the currently active workspace.
    pub(super) active_workspace_idx: usize,
    /// Configurable properties of the layout.
    options: Rc<Options>,
}

impl<W: LayoutElement> Monitor<W> {
    pub fn new(
        device: OutputDevice,
        mut workspaces: Vec<Workspace<W>>,
        options: Rc<Options>,
    ) -> Self {
        let output_id = OutputId::new(&device.name);
        for (idx, ws) in workspaces.iter_mut().enumerate() {
            ws.set_output(Some(output_id.clone()));
            ws.set_hidden(idx != 0);
        }

        Self {
            device,
            state: OutputState::disabled(),
            config: None,
            geometry: Rectangle::default(),
            exclusive_zones: Struts::default(),
            usable_area: Rectangle::default(),
            workspaces,
            active_workspace_idx: 0,
            options,
        }
    }

    pub fn name(&self) -> &str {
        &self.device.name
    }

    pub fn device(&self) -> &OutputDevice {
        &self.device
    }

    pub fn config(&self) -> Option<&Output> {
        self.config.as_ref()
    }

    pub fn current_state(&self) -> OutputState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled
    }

    pub fn geometry(&self) -> Rectangle {
        self.geometry
    }

    pub fn usable_area(&self) -> Rectangle {
        self.usable_area
    }

    pub fn workspaces(&self) -> &[Workspace<W>] {
        &self.workspaces
    }

    pub fn active_workspace_idx(&self) -> usize {
        self.active_workspace_idx
    }

    pub fn active_workspace(&self) -> &Workspace<W> {
        &self.workspaces[self.active_workspace_idx]
    }

    pub fn active_workspace_mut(&mut self) -> &mut Workspace<W> {
        &mut self.workspaces[self.active_workspace_idx]
    }

    pub fn workspace_by_id(&self, id: WorkspaceId) -> Option<&Workspace<W>> {
        self.workspaces.iter().find(|ws| ws.id() == id)
    }

    pub fn is_workspace_visible(&self, id: WorkspaceId) -> bool {
        self.is_enabled() && self.active_workspace().id() == id
    }

    /// Finds the device mode that best matches a configured mode.
    fn pick_mode(&self, target: ConfiguredMode) -> Option<Mode> {
        let same_size = self
            .device
            .modes
            .iter()
            .filter(|m| m.width == target.width && m.height == target.height);

        match target.refresh {
            Some(refresh) => {
                let refresh = (refresh * 1000.).round() as i64;
                same_size
                    .map(|m| (m, (i64::from(m.refresh_rate) - refresh).unsigned_abs()))
                    .filter(|(_, diff)| *diff <= u64::from(REFRESH_TOLERANCE))
                    .min_by_key(|(_, diff)| *diff)
                    .map(|(m, _)| *m)
            }
            None => {
                let candidates: Vec<Mode> = same_size.copied().collect();
                candidates
                    .iter()
                    .find(|m| m.is_preferred)
                    .or_else(|| candidates.iter().max_by_key(|m| m.refresh_rate))
                    .copied()
            }
        }
    }

    fn resolve_state(&self, config: &Output) -> Option<OutputState> {
        if config.off {
            return Some(OutputState::disabled());
        }

        let mode = match config.mode {
            Some(target) => {
                let mode = self.pick_mode(target);
                if mode.is_none() {
                    warn!("output {} has no mode matching {target}", self.name());
                }
                mode
            }
            None => {
                let mode = self.device.preferred_mode();
                if mode.is_none() {
                    warn!("output {} has no modes", self.name());
                }
                mode
            }
        }?;

        Some(OutputState::enabled(mode))
    }

    /// Applies a configuration to this monitor.
    ///
    /// In test mode only checks the configuration with the backend. Otherwise commits it and, on
    /// success, remembers it as current.
    pub fn apply_config(
        &mut self,
        config: Option<&Output>,
        test_only: bool,
        backend: &mut dyn Backend,
    ) -> bool {
        let Some(config) = config else {
            debug!("no configuration for output {}", self.name());
            return false;
        };

        let Some(state) = self.resolve_state(config) else {
            return false;
        };

        if test_only {
            return match backend.test_state(self.name(), &state) {
                Ok(()) => true,
                Err(err) => {
                    debug!("output {} failed the test: {err:?}", self.name());
                    false
                }
            };
        }

        match backend.commit_state(self.name(), &state) {
            Ok(()) => {
                self.state = state;
                self.config = Some(config.clone());
                true
            }
            Err(err) => {
                warn!("error applying configuration to {}: {err:?}", self.name());
                false
            }
        }
    }

    /// Enables the monitor at its preferred mode.
    ///
    /// On failure the monitor is left disabled.
    pub fn enable_preferred(&mut self, backend: &mut dyn Backend) -> bool {
        self.config = None;

        let Some(mode) = self.device.preferred_mode() else {
            warn!("output {} has no modes, leaving it disabled", self.name());
            self.state = OutputState::disabled();
            return false;
        };

        let state = OutputState::enabled(mode);
        match backend.commit_state(self.name(), &state) {
            Ok(()) => {
                info!("enabled output {} at its preferred mode {mode}", self.name());
                self.state = state;
                true
            }
            Err(err) => {
                warn!(
                    "error enabling output {} at its preferred mode, leaving it disabled: {err:?}",
                    self.name()
                );
                self.state = OutputState::disabled();
                false
            }
        }
    }

    /// Commits a previously current state again.
    pub fn restore_state(
        &mut self,
        state: OutputState,
        config: Option<Output>,
        backend: &mut dyn Backend,
    ) {
        if let Err(err) = backend.commit_state(self.name(), &state) {
            warn!("error restoring the state of {}: {err:?}", self.name());
        }

        self.state = state;
        self.config = config;
    }

    pub fn set_exclusive_zones(&mut self, zones: Struts) {
        self.exclusive_zones = zones;
        self.update_geometry(self.geometry);
    }

    /// Updates the global geometry and recomputes the usable area.
    pub fn update_geometry(&mut self, geometry: Rectangle) {
        self.geometry = geometry;
        self.usable_area = compute_usable_area(
            Rectangle::from_size(geometry.size),
            self.options.struts.combine(self.exclusive_zones),
        );

        for ws in &mut self.workspaces {
            ws.update_geometry(self.geometry, self.usable_area);
        }
    }

    /// Pushes visibility down to the windows: only the active workspace of an enabled monitor
    /// is shown.
    pub fn sync_visibility(&self) {
        for (idx, ws) in self.workspaces.iter().enumerate() {
            ws.set_hidden(!(self.is_enabled() && idx == self.active_workspace_idx));
        }
    }

    /// Switches to another workspace, hiding the current one.
    pub fn switch_workspace(&mut self, idx: usize, seat: &mut dyn Seat<W>) -> bool {
        if idx >= self.workspaces.len() || idx == self.active_workspace_idx {
            return false;
        }

        self.workspaces[self.active_workspace_idx].set_hidden(true);
        self.active_workspace_idx = idx;
        self.workspaces[idx].focus(seat);
        if !self.is_enabled() {
            self.workspaces[idx].set_hidden(true);
        }
        true
    }

    #[cfg(test)]
    pub fn verify_invariants(&self) {
        assert!(!self.workspaces.is_empty(), "monitor must have a workspace");
        assert!(self.active_workspace_idx < self.workspaces.len());

        for (idx, ws) in self.workspaces.iter().enumerate() {
            assert_eq!(ws.output().map(|o| o.name()), Some(self.name()));
            assert_eq!(ws.usable_area(), self.usable_area);

            if idx != self.active_workspace_idx {
                for win in ws.windows() {
                    assert!(win.is_hidden(), "windows on invisible workspaces must be hidden");
                }
            }

            ws.verify_invariants();
        }

        if !self.is_enabled() {
            assert!(self.geometry.is_empty());
        }
    }
}

/// Shrinks the output area by the reserved edges, never below zero.
pub fn compute_usable_area(area: Rectangle, struts: Struts) -> Rectangle {
    let mut usable = area;

    usable.size.w = (area.size.w - struts.left - struts.right).max(0);
    usable.loc.x += struts.left;

    usable.size.h = (area.size.h - struts.top - struts.bottom).max(0);
    usable.loc.y += struts.top;

    usable
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usable_area_excludes_struts() {
        let area = Rectangle::from_size((1920, 1080));
        let struts = Struts {
            left: 10,
            right: 20,
            top: 30,
            bottom: 0,
        };

        let usable = compute_usable_area(area, struts);
        assert_eq!(usable, Rectangle::new((10, 30), (1890, 1050)));
    }

    #[test]
    fn usable_area_never_goes_negative() {
        let area = Rectangle::from_size((100, 100));
        let struts = Struts {
            left: 80,
            right: 80,
            top: 0,
            bottom: 200,
        };

        let usable = compute_usable_area(area, struts);
        assert_eq!(usable.size.w, 0);
        assert_eq!(usable.size.h, 0);
        assert!(usable.is_empty());
    }
}
