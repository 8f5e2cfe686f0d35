//! Types shared between the trellis layout core and whoever observes it.
#![warn(missing_docs)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output mode as reported by the display device.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    /// Width in physical pixels.
    pub width: u16,
    /// Height in physical pixels.
    pub height: u16,
    /// Refresh rate in millihertz.
    pub refresh_rate: u32,
    /// Whether this mode is preferred by the monitor.
    pub is_preferred: bool,
}

/// Output mode as requested in the config or by a configuration client.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ConfiguredMode {
    /// Width in physical pixels.
    pub width: u16,
    /// Height in physical pixels.
    pub height: u16,
    /// Refresh rate in hertz.
    pub refresh: Option<f64>,
}

/// One row of the layout snapshot published after every layout change.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OutputHead {
    /// Name of the output.
    pub name: String,
    /// Whether the output occupies a non-empty box in the global coordinate space.
    pub enabled: bool,
    /// Logical X position.
    pub x: i32,
    /// Logical Y position.
    pub y: i32,
    /// Currently committed mode, if the output is enabled.
    pub current_mode: Option<Mode>,
}

/// Connected output.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Output {
    /// Name of the output.
    pub name: String,
    /// Textual description of the manufacturer.
    pub make: String,
    /// Textual description of the model.
    pub model: String,
    /// Available modes for the output.
    pub modes: Vec<Mode>,
    /// Index of the current mode in [`Self::modes`].
    ///
    /// `None` if the output is disabled.
    pub current_mode: Option<usize>,
    /// Logical output information.
    ///
    /// `None` if the output is not mapped to any logical output (for example, if it is disabled).
    pub logical: Option<LogicalOutput>,
}

/// Logical output in the compositor's coordinate space.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct LogicalOutput {
    /// Logical X position.
    pub x: i32,
    /// Logical Y position.
    pub y: i32,
    /// Width in logical pixels.
    pub width: u32,
    /// Height in logical pixels.
    pub height: u32,
}

impl Mode {
    /// Refresh rate in hertz.
    pub fn refresh_hz(&self) -> f64 {
        f64::from(self.refresh_rate) / 1000.
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}@{:.3}",
            self.width,
            self.height,
            self.refresh_hz()
        )
    }
}

impl FromStr for ConfiguredMode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((width, rest)) = s.split_once('x') else {
            return Err("no 'x' separator found");
        };

        let (height, refresh) = match rest.split_once('@') {
            Some((height, refresh)) => (height, Some(refresh)),
            None => (rest, None),
        };

        let width = width.parse().map_err(|_| "error parsing width")?;
        let height = height.parse().map_err(|_| "error parsing height")?;
        let refresh = refresh
            .map(str::parse)
            .transpose()
            .map_err(|_| "error parsing refresh rate")?;

        Ok(Self {
            width,
            height,
            refresh,
        })
    }
}

impl fmt::Display for ConfiguredMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)?;
        if let Some(refresh) = self.refresh {
            write!(f, "@{refresh}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_configured_mode() {
        assert_eq!(
            "1920x1080".parse::<ConfiguredMode>(),
            Ok(ConfiguredMode {
                width: 1920,
                height: 1080,
                refresh: None,
            })
        );
        assert_eq!(
            "2560x1440@143.998".parse::<ConfiguredMode>(),
            Ok(ConfiguredMode {
                width: 2560,
                height: 1440,
                refresh: Some(143.998),
            })
        );

        assert!("1920".parse::<ConfiguredMode>().is_err());
        assert!("1920x".parse::<ConfiguredMode>().is_err());
        assert!("axb".parse::<ConfiguredMode>().is_err());
        assert!("1920x1080@".parse::<ConfiguredMode>().is_err());
        assert!("99999x1080".parse::<ConfiguredMode>().is_err());
    }

    #[test]
    fn display_configured_mode() {
        let mode: ConfiguredMode = "1280x720@60".parse().unwrap();
        assert_eq!(mode.to_string(), "1280x720@60");

        let mode: ConfiguredMode = "1280x720".parse().unwrap();
        assert_eq!(mode.to_string(), "1280x720");
    }

    #[test]
    fn output_head_serializes_with_field_names() {
        let head = OutputHead {
            name: "DP-1".to_owned(),
            enabled: true,
            x: 1920,
            y: 0,
            current_mode: None,
        };

        let json = serde_json::to_string(&head).unwrap();
        assert_eq!(
            json,
            r#"{"name":"DP-1","enabled":true,"x":1920,"y":0,"current_mode":null}"#
        );
    }
}
