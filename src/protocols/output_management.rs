//! Negotiation of output configurations with external clients.
//!
//! Clients see the current layout as a list of heads tagged with a serial. A configuration request
//! carries the serial it was built against; requests built against an older layout are cancelled
//! rather than applied.

use std::collections::HashSet;

use trellis_config::Outputs;
use trellis_ipc::OutputHead;

use crate::backend::Backend;

/// Outcome of a configuration request, as reported back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationResult {
    Succeeded,
    Failed,
    /// The layout changed after the client built the request.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct ConfigurationRequest {
    pub serial: u32,
    pub heads: Outputs,
    /// Only check whether the configuration could be applied.
    pub test_only: bool,
}

#[derive(Debug, Default)]
pub struct OutputManagementState {
    serial: u32,
    current: Vec<OutputHead>,
}

pub trait OutputManagementHandler {
    fn output_management_state(&mut self) -> &mut OutputManagementState;
    fn apply_output_config(
        &mut self,
        heads: &Outputs,
        test_only: bool,
        backend: &mut dyn Backend,
    ) -> bool;
}

impl OutputManagementState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serial(&self) -> u32 {
        self.serial
    }

    pub fn current(&self) -> &[OutputHead] {
        &self.current
    }

    /// Records a new layout and returns the serial it is published under.
    pub fn notify_changes(&mut self, heads: Vec<OutputHead>) -> u32 {
        self.serial = self.serial.wrapping_add(1);
        self.current = heads;
        self.serial
    }
}

impl ConfigurationRequest {
    pub fn new(serial: u32, heads: Outputs) -> Self {
        Self {
            serial,
            heads,
            test_only: false,
        }
    }

    pub fn test(serial: u32, heads: Outputs) -> Self {
        Self {
            serial,
            heads,
            test_only: true,
        }
    }

    fn has_duplicate_heads(&self) -> bool {
        let mut seen = HashSet::new();
        !self
            .heads
            .iter()
            .all(|head| seen.insert(head.name.to_ascii_lowercase()))
    }
}

/// Validates and applies a configuration request, then reports the result to the client.
pub fn handle_request<D: OutputManagementHandler>(
    state: &mut D,
    request: &ConfigurationRequest,
    backend: &mut dyn Backend,
) -> ConfigurationResult {
    let _span = tracy_client::span!("output_management::handle_request");

    let current_serial = state.output_management_state().serial();

    let result = if request.serial != current_serial {
        debug!(
            "cancelling outdated configuration (serial {}, current {current_serial})",
            request.serial
        );
        ConfigurationResult::Cancelled
    } else if request.has_duplicate_heads() {
        warn!("configuration request names the same output twice");
        ConfigurationResult::Failed
    } else if state.apply_output_config(&request.heads, request.test_only, backend) {
        ConfigurationResult::Succeeded
    } else {
        ConfigurationResult::Failed
    };

    backend.report_configuration(request.serial, result);
    result
}

#[cfg(test)]
mod tests {
    use trellis_config::Output;

    use super::*;
    use crate::backend::Headless;

    /// Handler that accepts everything and counts how often it was asked.
    #[derive(Default)]
    struct Accepting {
        state: OutputManagementState,
        applied: Vec<(usize, bool)>,
    }

    impl OutputManagementHandler for Accepting {
        fn output_management_state(&mut self) -> &mut OutputManagementState {
            &mut self.state
        }

        fn apply_output_config(
            &mut self,
            heads: &Outputs,
            test_only: bool,
            _backend: &mut dyn Backend,
        ) -> bool {
            self.applied.push((heads.len(), test_only));
            true
        }
    }

    fn heads(names: &[(&str, bool)]) -> Outputs {
        names
            .iter()
            .map(|(name, enabled)| Output {
                off: !enabled,
                ..Output::new(*name)
            })
            .collect()
    }

    #[test]
    fn serial_bumps_on_every_publish() {
        let mut state = OutputManagementState::new();
        assert_eq!(state.serial(), 0);
        assert_eq!(state.notify_changes(vec![]), 1);
        assert_eq!(state.notify_changes(vec![]), 2);
        assert!(state.current().is_empty());
    }

    #[test]
    fn outdated_request_is_cancelled() {
        let mut handler = Accepting::default();
        handler.state.notify_changes(vec![]);
        handler.state.notify_changes(vec![]);

        let mut backend = Headless::new();
        let request = ConfigurationRequest::new(1, heads(&[("DP-1", true)]));
        let result = handle_request(&mut handler, &request, &mut backend);

        assert_eq!(result, ConfigurationResult::Cancelled);
        assert!(handler.applied.is_empty());
        assert_eq!(backend.reports, vec![(1, ConfigurationResult::Cancelled)]);
    }

    #[test]
    fn partial_disabling_request_reaches_handler() {
        let mut handler = Accepting::default();
        let serial = handler.state.notify_changes(vec![]);

        // Other outputs may stay enabled through their persisted configuration.
        let mut backend = Headless::new();
        let request = ConfigurationRequest::test(serial, heads(&[("DP-1", false)]));
        let result = handle_request(&mut handler, &request, &mut backend);

        assert_eq!(result, ConfigurationResult::Succeeded);
        assert_eq!(handler.applied, vec![(1, true)]);
    }

    #[test]
    fn duplicate_heads_fail() {
        let mut handler = Accepting::default();
        let serial = handler.state.notify_changes(vec![]);

        let mut backend = Headless::new();
        let request =
            ConfigurationRequest::new(serial, heads(&[("DP-1", true), ("dp-1", false)]));
        let result = handle_request(&mut handler, &request, &mut backend);

        assert_eq!(result, ConfigurationResult::Failed);
        assert!(handler.applied.is_empty());
    }

    #[test]
    fn valid_request_is_applied() {
        let mut handler = Accepting::default();
        let serial = handler.state.notify_changes(vec![]);

        let mut backend = Headless::new();
        let request =
            ConfigurationRequest::test(serial, heads(&[("DP-1", true), ("HDMI-A-1", false)]));
        let result = handle_request(&mut handler, &request, &mut backend);

        assert_eq!(result, ConfigurationResult::Succeeded);
        assert_eq!(handler.applied, vec![(2, true)]);
        assert_eq!(backend.reports, vec![(serial, ConfigurationResult::Succeeded)]);
    }
}
