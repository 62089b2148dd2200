// src/config.rs
// Loads stacher2appimage configuration from the user config file and environment; provides defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_RELEASE_URL: &str = "https://api.github.com/repos/AppImage/appimagetool/releases/latest";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Release-metadata endpoint queried for the packaging tool.
    pub release_url: String,
    pub user_agent: String,
    /// Where the packaging tool is cached. `None` means the invocation directory.
    pub tool_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            release_url: DEFAULT_RELEASE_URL.to_string(),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            tool_dir: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        let mut cfg = AppConfig::default();

        // 1) User config: $XDG_CONFIG_HOME/stacher2appimage/config.cfg or ~/.config/stacher2appimage/config.cfg
        let user_cfg_path = Self::user_config_path();
        if user_cfg_path.exists() {
            if let Err(e) = Self::apply_cfg_file(&mut cfg, &user_cfg_path) {
                crate::ui::warn(&format!("failed to load {}: {}", user_cfg_path.display(), e));
            }
        }

        // 2) Environment overrides (highest priority)
        cfg.apply_env(|key| env::var(key).ok());

        cfg
    }

    pub fn user_config_path() -> PathBuf {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("~/.config").expand_home())
            .join("stacher2appimage/config.cfg")
    }

    /// Directory that holds the packaging tool, relative to the invocation directory.
    pub fn tool_dir(&self, invocation_dir: &Path) -> PathBuf {
        match &self.tool_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => invocation_dir.join(dir),
            None => invocation_dir.to_path_buf(),
        }
    }

    fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(v) = lookup("STACHER2APPIMAGE_RELEASE_URL") { self.release_url = v; }
        if let Some(v) = lookup("STACHER2APPIMAGE_USER_AGENT") { self.user_agent = v; }
        if let Some(v) = lookup("STACHER2APPIMAGE_TOOL_DIR") {
            self.tool_dir = Some(PathBuf::from(v).expand_home());
        }
    }

    fn apply_cfg_file(cfg: &mut AppConfig, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Self::apply_cfg_str(cfg, &content)
    }

    fn apply_cfg_str(cfg: &mut AppConfig, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut section = String::new();
        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if line.starts_with('[') && line.ends_with(']') {
                section = line[1..line.len()-1].trim().to_lowercase();
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(format!("line {}: expected 'key = value', got '{}'", lineno + 1, line).into());
            };
            let key = key.trim();
            let value = value.trim();
            match section.as_str() {
                "release" => {
                    if key == "url" { cfg.release_url = value.to_string(); }
                    else if key == "user_agent" { cfg.user_agent = value.to_string(); }
                }
                "tool" => {
                    if key == "dir" { cfg.tool_dir = Some(PathBuf::from(value).expand_home()); }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

// Small helper to expand leading ~ in paths
trait ExpandHome {
    fn expand_home(self) -> PathBuf;
}

impl ExpandHome for PathBuf {
    fn expand_home(self) -> PathBuf {
        let s = self.to_string_lossy().to_string();
        if let Some(rest) = s.strip_prefix("~/") {
            if let Some(home) = dirs_next::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(s)
    }
}
