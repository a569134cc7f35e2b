use anyhow::Result;
use std::{env, path::PathBuf};

/// Directory holding glsync's own configuration.
///
/// `$XDG_CONFIG_HOME/glsync`, or `~/.config/glsync` when the variable is unset.
pub fn glsync_home() -> Result<PathBuf> {
    let xdg = env::var_os("XDG_CONFIG_HOME");
    let base = xdg
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env::var_os("HOME").unwrap_or_default()).join(".config"));
    Ok(base.join("glsync"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(glsync_home()?.join("config.toml"))
}
