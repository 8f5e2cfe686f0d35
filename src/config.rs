use std::env;
use std::path::PathBuf;

use directories::ProjectDirs;
use miette::miette;
use trellis_config::ConfigPath;

/// Resolves where the config should be loaded from.
///
/// An explicit path wins over the `TRELLIS_CONFIG` environment variable, which wins over the
/// default locations.
pub fn config_path(cli_path: Option<PathBuf>) -> miette::Result<ConfigPath> {
    if let Some(path) = cli_path {
        return Ok(ConfigPath::Explicit(path));
    }

    if let Some(path) = env::var_os("TRELLIS_CONFIG").filter(|p| !p.is_empty()) {
        return Ok(ConfigPath::Explicit(PathBuf::from(path)));
    }

    let mut user_path = ProjectDirs::from("", "", "trellis")
        .ok_or_else(|| miette!("error retrieving home directory"))?
        .config_dir()
        .to_owned();
    user_path.push("config.kdl");

    Ok(ConfigPath::Regular {
        user_path,
        system_path: PathBuf::from("/etc/trellis/config.kdl"),
    })
}
