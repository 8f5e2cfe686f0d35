//! Window placement logic.
//!
//! Every connected output is a [`Monitor`] holding a fixed set of workspaces, and every window
//! lives in exactly one workspace. The [`OutputLayoutManager`] owns the monitors together with the
//! global coordinate space they are placed in, and decides which configuration each monitor
//! runs with.
//!
//! Outputs come and go at runtime, and windows must never be lost along the way:
//!
//! 1. When an output disconnects, the windows from each of its workspaces move to the workspace
//!    with the same number on the first remaining output.
//! 2. When the last output disconnects, its workspaces are kept as they are, and the next output
//!    to connect picks them up.
//!
//! Configurations come from two places: the config file, which is consulted whenever an output
//! connects, and configuration clients, whose requests override the config file for the outputs
//! they name. A monitor that cannot use its configuration on connection falls back to its
//! preferred mode; a client request that cannot be applied in full is rejected and rolled back.

use std::cmp::min;
use std::fmt::Debug;
use std::hash::Hash;
use std::mem;
use std::rc::Rc;

use trellis_config::{Config, Output, Outputs, Struts};
use trellis_ipc::{LogicalOutput, OutputHead};

use self::global_space::GlobalSpace;
use self::monitor::Monitor;
use self::workspace::{Workspace, WorkspaceId};
use crate::backend::{Backend, Layer, OutputDevice, OutputState};
use crate::protocols::output_management::{
    self, ConfigurationRequest, ConfigurationResult, OutputManagementHandler,
    OutputManagementState,
};
use crate::utils::geometry::{Point, Rectangle};

pub mod global_space;
pub mod monitor;
pub mod reconcile;
pub mod workspace;


pub trait LayoutElement {
    /// Type that can be used as a unique ID of this element.
    type Id: PartialEq + Eq + Hash + Debug + Clone;

    /// Unique ID of this element.
    fn id(&self) -> &Self::Id;

    /// Current geometry of the element in the global space.
    fn geometry(&self) -> Rectangle;

    fn set_geometry(&self, geometry: Rectangle);

    /// Whether the element is fullscreen.
    ///
    /// Fullscreen elements manage their own geometry and are skipped by tiling.
    fn is_fullscreen(&self) -> bool;

    fn is_hidden(&self) -> bool;

    fn set_hidden(&self, hidden: bool);

    /// Asks the client to close the element.
    ///
    /// The element stays in the layout until the client actually goes away.
    fn request_close(&self);
}

/// Keyboard focus delivery.
pub trait Seat<W: LayoutElement> {
    fn deliver_focus(&mut self, window: &W);
    fn clear_focus(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Number of workspaces on every output.
    pub workspaces: usize,
    /// Extra padding around the usable area in logical pixels.
    pub struts: Struts,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            workspaces: 9,
            struts: Default::default(),
        }
    }
}

impl Options {
    pub fn from_config(config: &Config) -> Self {
        let layout = &config.layout;

        Self {
            workspaces: usize::from(layout.workspaces).max(1),
            struts: layout.struts,
        }
    }
}

#[derive(Debug)]
enum MonitorSet<W: LayoutElement> {
    /// At least one output is connected.
    Normal {
        /// Connected monitors.
        monitors: Vec<Monitor<W>>,
        /// Index of the focused monitor.
        active_monitor_idx: usize,
    },
    /// No outputs are connected, and these are the workspaces.
    NoOutputs {
        /// The workspaces.
        workspaces: Vec<Workspace<W>>,
    },
}

impl<W: LayoutElement> Default for MonitorSet<W> {
    fn default() -> Self {
        MonitorSet::NoOutputs { workspaces: vec![] }
    }
}

#[derive(Debug)]
pub struct OutputLayoutManager<W: LayoutElement> {
    /// Monitors and workspaces in the layout.
    monitor_set: MonitorSet<W>,
    /// Placement of the enabled monitors.
    space: GlobalSpace,
    /// Output configuration from the config file.
    persisted: Outputs,
    /// Layout as last announced to configuration clients.
    output_management: OutputManagementState,
    /// Configurable properties of the layout.
    options: Rc<Options>,
}

impl<W: LayoutElement> OutputLayoutManager<W> {
    pub fn new(config: &Config) -> Self {
        Self::with_options(Options::from_config(config), config.outputs.clone())
    }

    pub fn with_options(options: Options, persisted: Outputs) -> Self {
        Self {
            monitor_set: MonitorSet::default(),
            space: GlobalSpace::new(),
            persisted,
            output_management: OutputManagementState::new(),
            options: Rc::new(options),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn persisted_outputs(&self) -> &Outputs {
        &self.persisted
    }

    /// Replaces the output configuration from the config file.
    ///
    /// Takes effect on the next configuration pass or output connection.
    pub fn set_persisted_outputs(&mut self, outputs: Outputs) {
        self.persisted = outputs;
    }

    pub fn output_management(&self) -> &OutputManagementState {
        &self.output_management
    }

    pub fn monitors(&self) -> impl Iterator<Item = &Monitor<W>> + '_ {
        let monitors: &[Monitor<W>] = match &self.monitor_set {
            MonitorSet::Normal { monitors, .. } => monitors,
            MonitorSet::NoOutputs { .. } => &[],
        };
        monitors.iter()
    }

    fn monitors_mut(&mut self) -> impl Iterator<Item = &mut Monitor<W>> + '_ {
        let monitors: &mut [Monitor<W>] = match &mut self.monitor_set {
            MonitorSet::Normal { monitors, .. } => monitors,
            MonitorSet::NoOutputs { .. } => &mut [],
        };
        monitors.iter_mut()
    }

    pub fn workspaces(&self) -> impl Iterator<Item = &Workspace<W>> + '_ {
        let iter_normal;
        let iter_no_outputs;

        match &self.monitor_set {
            MonitorSet::Normal { monitors, .. } => {
                iter_normal = Some(monitors.iter().flat_map(|mon| mon.workspaces.iter()));
                iter_no_outputs = None;
            }
            MonitorSet::NoOutputs { workspaces } => {
                iter_normal = None;
                iter_no_outputs = Some(workspaces.iter());
            }
        }

        let iter_normal = iter_normal.into_iter().flatten();
        let iter_no_outputs = iter_no_outputs.into_iter().flatten();
        iter_normal.chain(iter_no_outputs)
    }

    pub fn workspaces_mut(&mut self) -> impl Iterator<Item = &mut Workspace<W>> + '_ {
        let iter_normal;
        let iter_no_outputs;

        match &mut self.monitor_set {
            MonitorSet::Normal { monitors, .. } => {
                let it = monitors
                    .iter_mut()
                    .flat_map(|mon| mon.workspaces.iter_mut());

                iter_normal = Some(it);
                iter_no_outputs = None;
            }
            MonitorSet::NoOutputs { workspaces } => {
                iter_normal = None;
                iter_no_outputs = Some(workspaces.iter_mut());
            }
        }

        let iter_normal = iter_normal.into_iter().flatten();
        let iter_no_outputs = iter_no_outputs.into_iter().flatten();
        iter_normal.chain(iter_no_outputs)
    }

    pub fn workspace(&self, id: WorkspaceId) -> Option<&Workspace<W>> {
        self.workspaces().find(|ws| ws.id() == id)
    }

    /// Returns two distinct workspaces at once.
    fn two_workspaces_mut(
        &mut self,
        a: WorkspaceId,
        b: WorkspaceId,
    ) -> Option<(&mut Workspace<W>, &mut Workspace<W>)> {
        let mut first = None;
        let mut second = None;

        for ws in self.workspaces_mut() {
            if ws.id() == a {
                first = Some(ws);
            } else if ws.id() == b {
                second = Some(ws);
            }
        }

        first.zip(second)
    }

    /// Looks up a monitor by output name.
    pub fn monitor(&self, name: &str) -> Option<&Monitor<W>> {
        self.monitors().find(|mon| mon.name() == name)
    }

    /// Looks up the monitor covering a point of the global space.
    pub fn output_at(&self, point: impl Into<Point>) -> Option<&Monitor<W>> {
        let name = self.space.output_under(point)?;
        self.monitor(name)
    }

    pub fn active_monitor(&self) -> Option<&Monitor<W>> {
        let MonitorSet::Normal {
            monitors,
            active_monitor_idx,
        } = &self.monitor_set
        else {
            return None;
        };

        Some(&monitors[*active_monitor_idx])
    }

    /// Workspace that window commands act on.
    pub fn active_workspace(&self) -> Option<&Workspace<W>> {
        match &self.monitor_set {
            MonitorSet::Normal {
                monitors,
                active_monitor_idx,
            } => Some(monitors[*active_monitor_idx].active_workspace()),
            MonitorSet::NoOutputs { workspaces } => workspaces.first(),
        }
    }

    fn active_workspace_mut(&mut self) -> Option<&mut Workspace<W>> {
        match &mut self.monitor_set {
            MonitorSet::Normal {
                monitors,
                active_monitor_idx,
            } => Some(monitors[*active_monitor_idx].active_workspace_mut()),
            MonitorSet::NoOutputs { workspaces } => workspaces.first_mut(),
        }
    }

    fn is_workspace_visible(&self, id: WorkspaceId) -> bool {
        self.monitors().any(|mon| mon.is_workspace_visible(id))
    }

    /// Whether this is the active workspace of the focused monitor.
    fn is_workspace_focused(&self, id: WorkspaceId) -> bool {
        self.active_monitor()
            .is_some_and(|mon| mon.active_workspace().id() == id)
    }

    /// Handles a newly connected output.
    pub fn on_monitor_attach(&mut self, device: OutputDevice, backend: &mut dyn Backend) {
        let _span = tracy_client::span!("OutputLayoutManager::on_monitor_attach");

        let name = device.name.clone();
        if self.monitor(&name).is_some() {
            warn!("output {name} is already connected");
            return;
        }

        debug!("connecting output {name}");
        backend.init_render(&device);

        let mut workspaces = match &mut self.monitor_set {
            MonitorSet::NoOutputs { workspaces } => mem::take(workspaces),
            MonitorSet::Normal { .. } => vec![],
        };
        if !workspaces.is_empty() {
            debug!("moving {} orphaned workspaces to {name}", workspaces.len());
        }
        while workspaces.len() < self.options.workspaces {
            workspaces.push(Workspace::new(workspaces.len()));
        }

        let mut monitor = Monitor::new(device, workspaces, self.options.clone());

        let applied = match self.persisted.find(&name) {
            Some(config) => monitor.apply_config(Some(config), false, backend),
            None => false,
        };
        if !applied {
            info!("no usable configuration for {name}, falling back to its preferred mode");
            monitor.enable_preferred(backend);
        }

        if let MonitorSet::Normal { monitors, .. } = &mut self.monitor_set {
            monitors.push(monitor);
        } else {
            self.monitor_set = MonitorSet::Normal {
                monitors: vec![monitor],
                active_monitor_idx: 0,
            };
        }

        self.on_layout_change(backend);
    }

    /// Handles a disconnected output, moving its windows elsewhere.
    ///
    /// If the output was focused, focus moves to the new active monitor.
    pub fn on_monitor_detach(
        &mut self,
        name: &str,
        backend: &mut dyn Backend,
        seat: &mut dyn Seat<W>,
    ) -> bool {
        let _span = tracy_client::span!("OutputLayoutManager::on_monitor_detach");

        let MonitorSet::Normal {
            monitors,
            active_monitor_idx,
        } = &mut self.monitor_set
        else {
            return false;
        };

        let Some(idx) = monitors.iter().position(|mon| mon.name() == name) else {
            return false;
        };

        debug!("disconnecting output {name}");
        let monitor = monitors.remove(idx);
        self.space.unmap_output(name);
        backend.unbind_output(name);

        let mut workspaces = monitor.workspaces;

        if monitors.is_empty() {
            for ws in &mut workspaces {
                ws.set_output(None);
                ws.set_hidden(true);
                ws.update_geometry(Rectangle::default(), Rectangle::default());
            }

            info!("last output {name} disconnected, keeping its workspaces around");
            self.monitor_set = MonitorSet::NoOutputs { workspaces };
            seat.clear_focus();
        } else {
            let was_active = *active_monitor_idx == idx;
            if *active_monitor_idx >= idx {
                *active_monitor_idx = active_monitor_idx.saturating_sub(1);
            }

            let target = &mut monitors[0];
            for (ws_idx, ws) in workspaces.into_iter().enumerate() {
                if !ws.has_windows() {
                    continue;
                }

                let target_idx = min(ws_idx, target.workspaces.len() - 1);
                let visible = target.is_enabled() && target_idx == target.active_workspace_idx;
                ws.set_hidden(!visible);

                debug!(
                    "moving {} windows from workspace {ws_idx} of {name} to {}",
                    ws.len(),
                    target.name()
                );
                target.workspaces[target_idx].absorb(ws);
            }

            if was_active {
                monitors[*active_monitor_idx]
                    .active_workspace_mut()
                    .focus(seat);
            }
        }

        self.on_layout_change(backend);
        true
    }

    /// Places every enabled monitor in the global space.
    ///
    /// Monitors with an explicitly configured position go first, in name order. The rest are
    /// lined up to the right in the order they were connected.
    fn reposition_outputs(&mut self) {
        let _span = tracy_client::span!("OutputLayoutManager::reposition_outputs");

        self.space.clear();

        let MonitorSet::Normal { monitors, .. } = &mut self.monitor_set else {
            return;
        };

        let mut explicit: Vec<usize> = (0..monitors.len())
            .filter(|idx| monitors[*idx].is_enabled())
            .filter(|idx| monitors[*idx].config().is_some_and(|c| c.position.is_some()))
            .collect();
        explicit.sort_by(|a, b| monitors[*a].name().cmp(monitors[*b].name()));

        for idx in explicit {
            let mon = &monitors[idx];
            let Some(pos) = mon.config().and_then(|c| c.position) else {
                continue;
            };

            let geometry = Rectangle::new((pos.x, pos.y), mon.current_state().size());
            if self.space.overlaps_any(geometry) {
                warn!(
                    "output {} at x={} y={} overlaps an existing output, \
                     falling back to automatic placement",
                    mon.name(),
                    pos.x,
                    pos.y,
                );
            } else {
                self.space.map_output(mon.name(), geometry);
            }
        }

        // Monitors are kept in connection order.
        for mon in monitors.iter() {
            if !mon.is_enabled() || self.space.output_geometry(mon.name()).is_some() {
                continue;
            }

            let loc = self.space.place_auto();
            self.space
                .map_output(mon.name(), Rectangle::new(loc, mon.current_state().size()));
        }

        for mon in monitors.iter_mut() {
            let geometry = self.space.output_geometry(mon.name()).unwrap_or_default();
            if geometry != mon.geometry() {
                debug!("putting output {} at {geometry}", mon.name());
            }
            mon.update_geometry(geometry);
        }
    }

    /// Recomputes the usable areas and moves the overlay bands along with their monitors.
    pub fn arrange(&mut self, backend: &mut dyn Backend) {
        let _span = tracy_client::span!("OutputLayoutManager::arrange");

        let MonitorSet::Normal { monitors, .. } = &mut self.monitor_set else {
            return;
        };

        for mon in monitors {
            let geometry = self.space.output_geometry(mon.name()).unwrap_or_default();
            mon.update_geometry(geometry);

            if geometry.is_empty() {
                continue;
            }

            for layer in Layer::ALL {
                backend.reposition_layer(mon.name(), layer, geometry.loc);
            }
        }
    }

    /// Brings everything in line after the set of monitors or their configuration changed, and
    /// announces the new layout.
    pub fn on_layout_change(&mut self, backend: &mut dyn Backend) {
        let _span = tracy_client::span!("OutputLayoutManager::on_layout_change");

        self.reposition_outputs();

        for mon in self.monitors() {
            match self.space.output_geometry(mon.name()) {
                Some(geometry) => backend.bind_output(mon.name(), geometry),
                None => backend.unbind_output(mon.name()),
            }
            mon.sync_visibility();
        }

        self.arrange(backend);

        let heads = self.snapshot();
        let serial = self.output_management.notify_changes(heads.clone());
        backend.publish_configuration(serial, &heads);
    }

    /// Current layout as seen by configuration clients.
    pub fn snapshot(&self) -> Vec<OutputHead> {
        self.monitors()
            .map(|mon| {
                let geometry = self.space.output_geometry(mon.name()).unwrap_or_default();
                let enabled = !geometry.is_empty();
                OutputHead {
                    name: mon.name().to_owned(),
                    enabled,
                    x: geometry.loc.x,
                    y: geometry.loc.y,
                    current_mode: mon.current_state().mode.filter(|_| enabled),
                }
            })
            .collect()
    }

    pub fn ipc_outputs(&self) -> Vec<trellis_ipc::Output> {
        self.monitors()
            .map(|mon| {
                let device = mon.device();
                let state = mon.current_state();
                let geometry = mon.geometry();

                let current_mode = state
                    .mode
                    .filter(|_| state.enabled)
                    .and_then(|mode| device.modes.iter().position(|m| *m == mode));
                let logical = (!geometry.is_empty()).then(|| LogicalOutput {
                    x: geometry.loc.x,
                    y: geometry.loc.y,
                    width: geometry.size.w as u32,
                    height: geometry.size.h as u32,
                });

                trellis_ipc::Output {
                    name: device.name.clone(),
                    make: device.make.clone(),
                    model: device.model.clone(),
                    modes: device.modes.clone(),
                    current_mode,
                    logical,
                }
            })
            .collect()
    }

    /// Applies a set of requested output configurations on top of the persisted ones.
    ///
    /// The configuration is tested on every monitor first and committed only if all of them
    /// accept it. A commit that fails anyway rolls back the monitors committed before it.
    pub fn apply_config(
        &mut self,
        requested: &Outputs,
        test_only: bool,
        backend: &mut dyn Backend,
    ) -> bool {
        let _span = tracy_client::span!("OutputLayoutManager::apply_config");

        let decisions = reconcile::resolve(&self.persisted, requested);

        let MonitorSet::Normal { monitors, .. } = &mut self.monitor_set else {
            return true;
        };

        let keeps_any_enabled = monitors.iter().any(|mon| {
            decisions
                .find(mon.name())
                .is_some_and(|config| config.is_enabled())
        });
        if !keeps_any_enabled {
            warn!("output configuration would disable every output");
            return false;
        }

        let mut ok = true;
        for mon in monitors.iter_mut() {
            let config = decisions.find(mon.name());
            if !mon.apply_config(config, true, backend) {
                ok = false;
            }
        }

        if !ok {
            info!("output configuration failed testing");
            return false;
        }

        if test_only {
            return true;
        }

        let mut committed: Vec<(usize, OutputState, Option<Output>)> = vec![];
        for idx in 0..monitors.len() {
            let mon = &mut monitors[idx];
            let previous_state = mon.current_state();
            let previous_config = mon.config().cloned();

            if mon.apply_config(decisions.find(mon.name()), false, backend) {
                committed.push((idx, previous_state, previous_config));
                continue;
            }

            warn!("error committing output configuration, rolling back");
            for (idx, state, config) in committed.into_iter().rev() {
                monitors[idx].restore_state(state, config, backend);
            }
            return false;
        }

        self.on_layout_change(backend);
        true
    }

    pub fn handle_configuration_request(
        &mut self,
        request: &ConfigurationRequest,
        backend: &mut dyn Backend,
    ) -> ConfigurationResult {
        output_management::handle_request(self, request, backend)
    }

    pub fn has_window(&self, id: &W::Id) -> bool {
        self.workspaces().any(|ws| ws.contains(id))
    }

    pub fn find_window(&self, id: &W::Id) -> Option<&W> {
        self.workspaces().find_map(|ws| ws.find_window(id))
    }

    pub fn workspace_for_window(&self, id: &W::Id) -> Option<WorkspaceId> {
        self.workspaces()
            .find(|ws| ws.contains(id))
            .map(|ws| ws.id())
    }

    /// Adds a window to the active workspace.
    pub fn add_window(&mut self, window: W, focus: bool, seat: &mut dyn Seat<W>) -> bool {
        if self.has_window(window.id()) {
            return false;
        }

        match &mut self.monitor_set {
            MonitorSet::Normal {
                monitors,
                active_monitor_idx,
            } => {
                let mon = &mut monitors[*active_monitor_idx];
                window.set_hidden(!mon.is_enabled());
                mon.active_workspace_mut().add_toplevel(window, focus, seat)
            }
            MonitorSet::NoOutputs { workspaces } => {
                if workspaces.is_empty() {
                    workspaces.push(Workspace::new(0));
                }

                window.set_hidden(true);
                workspaces[0].add_toplevel(window, focus, seat)
            }
        }
    }

    /// Removes a window whose client went away.
    pub fn remove_window(&mut self, id: &W::Id) -> Option<W> {
        self.workspaces_mut().find_map(|ws| ws.remove_toplevel(id))
    }

    /// Moves a window to another workspace, possibly on another monitor.
    pub fn move_window_to_workspace(
        &mut self,
        id: &W::Id,
        target: WorkspaceId,
        seat: &mut dyn Seat<W>,
    ) -> bool {
        let Some(source) = self.workspace_for_window(id) else {
            return false;
        };
        if source == target {
            return false;
        }

        let hide = self.is_workspace_focused(source);
        let visible = self.is_workspace_visible(target);

        let Some((from, to)) = self.two_workspaces_mut(source, target) else {
            return false;
        };

        if !from.move_to(id, to, hide, seat) {
            return false;
        }

        if let Some(win) = to.find_window(id) {
            win.set_hidden(!visible);
        }

        true
    }

    pub fn close_window(&mut self, id: &W::Id, seat: &mut dyn Seat<W>) -> bool {
        match self.workspaces_mut().find(|ws| ws.contains(id)) {
            Some(ws) => ws.close(id, seat),
            None => false,
        }
    }

    pub fn close_active(&mut self, seat: &mut dyn Seat<W>) {
        if let Some(ws) = self.active_workspace_mut() {
            ws.close_active(seat);
        }
    }

    /// Focuses a window, bringing up its monitor and workspace.
    pub fn focus_window(&mut self, id: &W::Id, seat: &mut dyn Seat<W>) -> bool {
        match &mut self.monitor_set {
            MonitorSet::Normal {
                monitors,
                active_monitor_idx,
            } => {
                for (mon_idx, mon) in monitors.iter_mut().enumerate() {
                    let Some(ws_idx) = mon.workspaces.iter().position(|ws| ws.contains(id)) else {
                        continue;
                    };

                    *active_monitor_idx = mon_idx;
                    mon.switch_workspace(ws_idx, seat);
                    return mon.workspaces[ws_idx].focus_toplevel(id, seat);
                }

                false
            }
            MonitorSet::NoOutputs { workspaces } => workspaces
                .iter_mut()
                .find(|ws| ws.contains(id))
                .is_some_and(|ws| ws.focus_toplevel(id, seat)),
        }
    }

    pub fn focus_next(&mut self, seat: &mut dyn Seat<W>) {
        if let Some(ws) = self.active_workspace_mut() {
            ws.focus_next(seat);
        }
    }

    pub fn focus_prev(&mut self, seat: &mut dyn Seat<W>) {
        if let Some(ws) = self.active_workspace_mut() {
            ws.focus_prev(seat);
        }
    }

    pub fn focus_direction(&mut self, direction: Direction, seat: &mut dyn Seat<W>) -> bool {
        let Some(ws) = self.active_workspace_mut() else {
            return false;
        };
        let Some(id) = ws.in_direction(direction).map(|win| win.id().clone()) else {
            return false;
        };

        ws.focus_toplevel(&id, seat)
    }

    /// Swaps the active window with its neighbor in the given direction.
    pub fn swap_direction(&mut self, direction: Direction) -> bool {
        let Some(ws) = self.active_workspace_mut() else {
            return false;
        };
        let Some(id) = ws.in_direction(direction).map(|win| win.id().clone()) else {
            return false;
        };

        match ws.swap(&id) {
            Ok(()) => true,
            Err(err) => {
                warn!("error swapping windows: {err:?}");
                false
            }
        }
    }

    pub fn tile_active(&mut self) {
        if let Some(ws) = self.active_workspace_mut() {
            ws.tile();
        }
    }

    pub fn tile_all(&mut self) {
        for ws in self.workspaces_mut() {
            ws.tile();
        }
    }

    /// Switches the focused monitor to another workspace.
    pub fn switch_workspace(&mut self, idx: usize, seat: &mut dyn Seat<W>) -> bool {
        let MonitorSet::Normal {
            monitors,
            active_monitor_idx,
        } = &mut self.monitor_set
        else {
            return false;
        };

        monitors[*active_monitor_idx].switch_workspace(idx, seat)
    }

    /// Moves focus to another monitor.
    pub fn focus_output(&mut self, name: &str, seat: &mut dyn Seat<W>) -> bool {
        let MonitorSet::Normal {
            monitors,
            active_monitor_idx,
        } = &mut self.monitor_set
        else {
            return false;
        };

        let Some(idx) = monitors
            .iter()
            .position(|mon| mon.name() == name && mon.is_enabled())
        else {
            return false;
        };

        *active_monitor_idx = idx;
        monitors[idx].active_workspace_mut().focus(seat);
        true
    }

    /// Updates the space reserved by auxiliary shell surfaces on a monitor.
    pub fn set_exclusive_zones(
        &mut self,
        name: &str,
        zones: Struts,
        backend: &mut dyn Backend,
    ) -> bool {
        let Some(mon) = self.monitors_mut().find(|mon| mon.name() == name) else {
            return false;
        };

        mon.set_exclusive_zones(zones);
        self.arrange(backend);
        true
    }

    #[cfg(test)]
    fn verify_invariants(&self) {
        use std::collections::HashSet;

        let mut seen_window_ids = HashSet::new();
        let mut seen_workspace_ids = HashSet::new();

        for ws in self.workspaces() {
            assert!(
                seen_workspace_ids.insert(ws.id()),
                "workspace id must be unique"
            );

            for win in ws.windows() {
                assert!(
                    seen_window_ids.insert(win.id().clone()),
                    "window {:?} must be in exactly one workspace",
                    win.id()
                );
            }
        }

        let (monitors, active_monitor_idx) = match &self.monitor_set {
            MonitorSet::Normal {
                monitors,
                active_monitor_idx,
            } => (monitors, *active_monitor_idx),
            MonitorSet::NoOutputs { workspaces } => {
                assert_eq!(self.space.outputs().count(), 0);

                for ws in workspaces {
                    assert!(ws.output().is_none(), "orphaned workspace can't have an output");
                    for win in ws.windows() {
                        assert!(win.is_hidden(), "orphaned windows must be hidden");
                    }
                    ws.verify_invariants();
                }

                return;
            }
        };

        assert!(!monitors.is_empty(), "monitors must be non-empty");
        assert!(
            active_monitor_idx < monitors.len(),
            "active_monitor_idx must be in range"
        );

        let mut seen_names = HashSet::new();
        for mon in monitors {
            assert!(
                seen_names.insert(mon.name().to_owned()),
                "output names must be unique"
            );

            mon.verify_invariants();

            let geometry = self.space.output_geometry(mon.name()).unwrap_or_default();
            assert_eq!(geometry, mon.geometry(), "monitor geometry must match the space");
            assert_eq!(mon.is_enabled(), !geometry.is_empty());
        }

        let placed: Vec<_> = self.space.outputs().collect();
        for (i, (name, a)) in placed.iter().enumerate() {
            for (other, b) in &placed[i + 1..] {
                assert!(!a.overlaps(*b), "outputs {name} and {other} must not overlap");
            }
        }
    }
}

impl<W: LayoutElement> OutputManagementHandler for OutputLayoutManager<W> {
    fn output_management_state(&mut self) -> &mut OutputManagementState {
        &mut self.output_management
    }

    fn apply_output_config(
        &mut self,
        heads: &Outputs,
        test_only: bool,
        backend: &mut dyn Backend,
    ) -> bool {
        self.apply_config(heads, test_only, backend)
    }
}
