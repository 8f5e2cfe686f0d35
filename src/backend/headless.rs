//! Headless backend for tests and the command line.
//!
//! Nothing is rendered. Every call is recorded so that the effects of the layout code can be
//! inspected afterwards.

use std::collections::{HashMap, HashSet};

use anyhow::{bail, ensure};
use trellis_ipc::OutputHead;

use super::{Backend, Layer, OutputDevice, OutputState};
use crate::layout::{LayoutElement, Seat};
use crate::protocols::output_management::ConfigurationResult;
use crate::utils::geometry::{Point, Rectangle};

#[derive(Debug, Default)]
pub struct Headless {
    pub initialized: Vec<String>,
    pub committed: HashMap<String, OutputState>,
    pub bound: HashMap<String, Rectangle>,
    pub layers: HashMap<(String, Layer), Point>,
    pub published: Vec<(u32, Vec<OutputHead>)>,
    pub reports: Vec<(u32, ConfigurationResult)>,
    pub test_calls: usize,
    pub commit_calls: usize,
    /// Debug representation of the element that last received keyboard focus.
    pub focus: Option<String>,
    rejected_modes: HashSet<(String, u16, u16)>,
    broken_outputs: HashSet<String>,
}

impl Headless {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes both testing and committing any mode of this size fail on the output.
    pub fn reject_mode(&mut self, name: &str, width: u16, height: u16) {
        self.rejected_modes.insert((name.to_owned(), width, height));
    }

    /// Makes every commit on the output fail while tests keep passing.
    pub fn break_commits(&mut self, name: &str) {
        self.broken_outputs.insert(name.to_owned());
    }

    pub fn last_published(&self) -> Option<&[OutputHead]> {
        self.published.last().map(|(_, heads)| &heads[..])
    }

    fn check(&self, name: &str, state: &OutputState) -> anyhow::Result<()> {
        ensure!(
            self.initialized.iter().any(|n| n == name),
            "output {name} was never initialized"
        );

        if let Some(mode) = state.mode.filter(|_| state.enabled) {
            let key = (name.to_owned(), mode.width, mode.height);
            if self.rejected_modes.contains(&key) {
                bail!("mode {mode} is not supported on {name}");
            }
        }

        Ok(())
    }
}

impl Backend for Headless {
    fn init_render(&mut self, device: &OutputDevice) {
        debug!("initializing rendering for {}", device.name);
        if !self.initialized.contains(&device.name) {
            self.initialized.push(device.name.clone());
        }
    }

    fn test_state(&mut self, name: &str, state: &OutputState) -> anyhow::Result<()> {
        self.test_calls += 1;
        self.check(name, state)
    }

    fn commit_state(&mut self, name: &str, state: &OutputState) -> anyhow::Result<()> {
        self.commit_calls += 1;
        self.check(name, state)?;
        ensure!(!self.broken_outputs.contains(name), "commit on {name} failed");

        self.committed.insert(name.to_owned(), *state);
        Ok(())
    }

    fn bind_output(&mut self, name: &str, geometry: Rectangle) {
        self.bound.insert(name.to_owned(), geometry);
    }

    fn unbind_output(&mut self, name: &str) {
        self.bound.remove(name);
        self.layers.retain(|(n, _), _| n != name);
    }

    fn reposition_layer(&mut self, name: &str, layer: Layer, loc: Point) {
        self.layers.insert((name.to_owned(), layer), loc);
    }

    fn publish_configuration(&mut self, serial: u32, heads: &[OutputHead]) {
        self.published.push((serial, heads.to_vec()));
    }

    fn report_configuration(&mut self, serial: u32, result: ConfigurationResult) {
        self.reports.push((serial, result));
    }
}

impl<W: LayoutElement> Seat<W> for Headless {
    fn deliver_focus(&mut self, window: &W) {
        self.focus = Some(format!("{:?}", window.id()));
    }

    fn clear_focus(&mut self) {
        self.focus = None;
    }
}
