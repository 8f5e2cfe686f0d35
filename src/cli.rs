use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use trellis_ipc::{ConfiguredMode, Mode};

use crate::backend::OutputDevice;
use crate::utils::version;

#[derive(Parser)]
#[command(author, version = version(), about, long_about = None)]
#[command(subcommand_value_name = "SUBCOMMAND")]
#[command(subcommand_help_heading = "Subcommands")]
pub struct Cli {
    /// Path to config file (default: `$XDG_CONFIG_HOME/trellis/config.kdl`).
    ///
    /// This can also be set with the `TRELLIS_CONFIG` environment variable. If both are set, the
    /// command line argument takes precedence.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub subcommand: Sub,
}

#[derive(Subcommand)]
pub enum Sub {
    /// Validate the config file.
    Validate,
    /// Lay out windows on headless outputs and print the result.
    Layout {
        /// Output to connect, as `NAME=WIDTHxHEIGHT[@REFRESH]`.
        ///
        /// Can be given several times; outputs connect in the given order.
        #[arg(short, long = "output", value_name = "NAME=MODE", required = true)]
        outputs: Vec<HeadlessOutput>,
        /// Number of windows to open on the focused workspace.
        #[arg(short = 'n', long, default_value_t = 0)]
        windows: usize,
        /// Format output as JSON.
        #[arg(short, long)]
        json: bool,
    },
}

/// Output to simulate with the headless backend.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessOutput {
    pub name: String,
    pub mode: ConfiguredMode,
}

impl HeadlessOutput {
    pub fn device(&self) -> OutputDevice {
        let refresh_rate = self
            .mode
            .refresh
            .map_or(60_000, |refresh| (refresh * 1000.).round() as u32);

        OutputDevice::new(
            self.name.clone(),
            vec![Mode {
                width: self.mode.width,
                height: self.mode.height,
                refresh_rate,
                is_preferred: true,
            }],
        )
    }
}

impl FromStr for HeadlessOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((name, mode)) = s.split_once('=') else {
            return Err(String::from("expected NAME=WIDTHxHEIGHT[@REFRESH]"));
        };

        if name.is_empty() {
            return Err(String::from("output name can't be empty"));
        }

        let mode = mode.parse::<ConfiguredMode>().map_err(String::from)?;
        Ok(Self {
            name: name.to_owned(),
            mode,
        })
    }
}
