//! Merging of persisted and requested output configurations.

use trellis_config::{Output, Outputs};

/// Builds the decision table for one configuration pass.
///
/// Persisted entries keep their order. Each is replaced by the last requested entry with the same
/// name, if any. Requested entries for outputs that have nothing persisted are appended in the
/// order they were requested. Names compare case-insensitively.
pub fn resolve(persisted: &Outputs, requested: &Outputs) -> Outputs {
    let last_requested = |name: &str| requested.iter().rev().find(|o| o.matches(name));

    let mut resolved: Vec<Output> = persisted
        .iter()
        .map(|config| last_requested(&config.name).unwrap_or(config).clone())
        .collect();

    for config in requested.iter() {
        if resolved.iter().any(|o| o.matches(&config.name)) {
            continue;
        }

        let last = last_requested(&config.name).unwrap_or(config);
        resolved.push(last.clone());
    }

    Outputs(resolved)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use trellis_config::Position;

    use super::*;

    fn at(name: &str, x: i32, y: i32) -> Output {
        Output {
            position: Some(Position { x, y }),
            ..Output::new(name)
        }
    }

    fn positions(outputs: &Outputs) -> Vec<(&str, i32)> {
        outputs
            .iter()
            .map(|o| (o.name.as_str(), o.position.map_or(-1, |p| p.x)))
            .collect()
    }

    #[test]
    fn requested_wins_per_name() {
        let persisted = Outputs(vec![at("DP-1", 0, 0), at("DP-2", 1920, 0)]);
        let requested = Outputs(vec![at("dp-2", 3000, 0)]);

        let resolved = resolve(&persisted, &requested);
        assert_eq!(positions(&resolved), vec![("DP-1", 0), ("dp-2", 3000)]);
    }

    #[test]
    fn unknown_requested_are_appended() {
        let persisted = Outputs(vec![at("DP-1", 0, 0)]);
        let requested = Outputs(vec![at("HDMI-A-1", 10, 0), at("eDP-1", 20, 0)]);

        let resolved = resolve(&persisted, &requested);
        assert_eq!(
            positions(&resolved),
            vec![("DP-1", 0), ("HDMI-A-1", 10), ("eDP-1", 20)]
        );
    }

    #[test]
    fn last_duplicate_wins() {
        let persisted = Outputs(vec![at("DP-1", 0, 0)]);
        let requested = Outputs(vec![
            at("DP-1", 1, 0),
            at("DP-2", 5, 0),
            at("DP-1", 2, 0),
            at("DP-2", 6, 0),
        ]);

        let resolved = resolve(&persisted, &requested);
        assert_eq!(positions(&resolved), vec![("DP-1", 2), ("DP-2", 6)]);
    }

    #[test]
    fn nothing_requested_keeps_persisted() {
        let persisted = Outputs(vec![at("DP-1", 0, 0), Output::new("DP-2")]);
        let resolved = resolve(&persisted, &Outputs::default());
        assert_eq!(resolved, persisted);
    }
}
