//! Config file location.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// App directory under the XDG config root.
const APP_DIR: &str = "spectapp";

/// Config file name.
const CONFIG_FILE: &str = "config.toml";

/// Resolves the config file path.
///
/// Precedence: `--dir`, then `$XDG_CONFIG_HOME/spectapp`, then
/// `$HOME/.config/spectapp`.
///
/// # Errors
///
/// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` is usable (when `dir` is `None`).
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(CONFIG_FILE));
    }

    let xdg = std::env::var_os("XDG_CONFIG_HOME");
    let home = std::env::var_os("HOME");
    default_config_path(xdg.as_deref().map(Path::new), home.as_deref().map(Path::new))
}

/// Picks the config root from the XDG and home directories.
///
/// Empty or relative `XDG_CONFIG_HOME` values are ignored, as the XDG base
/// directory rules require.
fn default_config_path(xdg_config_home: Option<&Path>, home: Option<&Path>) -> Result<PathBuf> {
    let root = match (xdg_config_home.filter(|p| p.is_absolute()), home) {
        (Some(xdg), _) => xdg.to_path_buf(),
        (None, Some(home)) if !home.as_os_str().is_empty() => home.join(".config"),
        _ => bail!("cannot locate config directory: neither XDG_CONFIG_HOME nor HOME is set"),
    };
    Ok(root.join(APP_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_resolve_with_dir() {
        // Arrange
        let dir = PathBuf::from("/tmp/festival");

        // Act
        let path = resolve_config_path(Some(&dir)).unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/tmp/festival/config.toml"));
    }

    #[test]
    fn test_default_prefers_xdg_config_home() {
        // Arrange & Act
        let path =
            default_config_path(Some(Path::new("/xdg")), Some(Path::new("/home/ana"))).unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/xdg/spectapp/config.toml"));
    }

    #[test]
    fn test_default_ignores_relative_xdg_config_home() {
        // Arrange & Act
        let path =
            default_config_path(Some(Path::new("conf")), Some(Path::new("/home/ana"))).unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/home/ana/.config/spectapp/config.toml"));
    }

    #[test]
    fn test_default_falls_back_to_home() {
        // Arrange & Act
        let path = default_config_path(None, Some(Path::new("/home/ana"))).unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/home/ana/.config/spectapp/config.toml"));
    }

    #[test]
    fn test_default_without_any_root_fails() {
        // Arrange & Act
        let result = default_config_path(None, None);

        // Assert
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("cannot locate config directory")
        );
    }
}
