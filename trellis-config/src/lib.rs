#[macro_use]
extern crate tracing;

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use miette::{Context as _, IntoDiagnostic as _};

pub mod layout;
pub mod output;

pub use crate::layout::{Layout, Struts};
pub use crate::output::{Output, Outputs, Position};

#[derive(knuffel::Decode, Debug, Default, PartialEq)]
pub struct Config {
    #[knuffel(children(name = "output"))]
    pub outputs: Outputs,
    #[knuffel(child, default)]
    pub layout: Layout,
}

#[derive(Debug, Clone)]
pub enum ConfigPath {
    /// Explicitly set config path.
    ///
    /// Load the config only from this path.
    Explicit(PathBuf),

    /// Default config path.
    ///
    /// Prioritize the user path, fall back to the system path, fall back to the built-in default.
    Regular {
        /// User config path, usually `$XDG_CONFIG_HOME/trellis/config.kdl`.
        user_path: PathBuf,
        /// System config path, usually `/etc/trellis/config.kdl`.
        system_path: PathBuf,
    },
}

impl Config {
    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("error reading {path:?}"))?;

        let config = Self::parse(
            path.file_name()
                .and_then(OsStr::to_str)
                .unwrap_or("config.kdl"),
            &contents,
        )
        .context("error parsing")?;
        debug!("loaded config from {path:?}");
        Ok(config)
    }

    pub fn parse(filename: &str, text: &str) -> Result<Self, knuffel::Error> {
        let _span = tracy_client::span!("Config::parse");
        knuffel::parse(filename, text)
    }

    /// Parses the config shipped with trellis.
    pub fn builtin() -> Result<Self, knuffel::Error> {
        Self::parse(
            "default-config.kdl",
            include_str!("../../resources/default-config.kdl"),
        )
    }
}

impl ConfigPath {
    /// Loads the config.
    ///
    /// An explicit path must exist. With regular paths, if neither file exists, the built-in
    /// config is used.
    pub fn load(&self) -> miette::Result<Config> {
        let _span = tracy_client::span!("ConfigPath::load");

        let path = match self {
            ConfigPath::Explicit(path) => path.as_path(),
            ConfigPath::Regular {
                user_path,
                system_path,
            } => {
                if user_path.exists() {
                    user_path.as_path()
                } else if system_path.exists() {
                    system_path.as_path()
                } else {
                    info!("no config file found, using the built-in config");
                    return Config::builtin().map_err(miette::Report::new);
                }
            }
        };

        Config::load(path).context("error loading config")
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_debug_snapshot;
    use pretty_assertions::assert_eq;
    use trellis_ipc::ConfiguredMode;

    use super::*;

    #[test]
    fn can_parse_builtin_config() {
        let config = Config::builtin().unwrap();
        assert!(config.outputs.is_empty());
        assert_eq!(config.layout, Layout::default());
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("config.kdl", "").unwrap();
        assert_eq!(config.layout.workspaces, 9);
        assert_eq!(config.layout.struts, Struts::default());
    }

    #[track_caller]
    fn do_parse(text: &str) -> Config {
        Config::parse("test.kdl", text)
            .map_err(miette::Report::new)
            .unwrap()
    }

    #[test]
    fn parse() {
        let parsed = do_parse(
            r##"
            output "eDP-1" {
                position x=10 y=20
                mode "1920x1080@144"
            }

            output "HDMI-A-1" {
                off
            }

            layout {
                workspaces 4

                struts {
                    left 1
                    right 2
                    top 3
                }
            }
            "##,
        );

        assert_debug_snapshot!(parsed, @r#"
        Config {
            outputs: Outputs(
                [
                    Output {
                        off: false,
                        name: "eDP-1",
                        position: Some(
                            Position {
                                x: 10,
                                y: 20,
                            },
                        ),
                        mode: Some(
                            ConfiguredMode {
                                width: 1920,
                                height: 1080,
                                refresh: Some(
                                    144.0,
                                ),
                            },
                        ),
                    },
                    Output {
                        off: true,
                        name: "HDMI-A-1",
                        position: None,
                        mode: None,
                    },
                ],
            ),
            layout: Layout {
                workspaces: 4,
                struts: Struts {
                    left: 1,
                    right: 2,
                    top: 3,
                    bottom: 0,
                },
            },
        }
        "#);
    }

    #[test]
    fn find_output_ignores_case() {
        let config = do_parse(
            r#"
            output "eDP-1" {
                mode "1280x720"
            }
            "#,
        );

        let output = config.outputs.find("edp-1").unwrap();
        assert_eq!(
            output.mode,
            Some(ConfiguredMode {
                width: 1280,
                height: 720,
                refresh: None,
            })
        );
        assert!(config.outputs.find("DP-1").is_none());
    }

    #[test]
    fn invalid_mode_is_an_error() {
        let res = Config::parse(
            "test.kdl",
            r#"
            output "eDP-1" {
                mode "1920by1080"
            }
            "#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn unknown_node_is_an_error() {
        let res = Config::parse("test.kdl", "frobnicate");
        assert!(res.is_err());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let path = ConfigPath::Explicit(PathBuf::from("/nonexistent/trellis/config.kdl"));
        assert!(path.load().is_err());
    }

    #[test]
    fn missing_regular_config_falls_back_to_builtin() {
        let path = ConfigPath::Regular {
            user_path: PathBuf::from("/nonexistent/user/config.kdl"),
            system_path: PathBuf::from("/nonexistent/system/config.kdl"),
        };
        let config = path.load().unwrap();
        assert_eq!(config, Config::builtin().unwrap());
    }
}
