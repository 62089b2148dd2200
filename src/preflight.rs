//! src/preflight.rs
//! Checks that run before anything touches the disk: host tools and the input package.

use crate::error::{Failure, MissingTool};
use std::fs;
use std::path::{Path, PathBuf};

/// Host commands the unpack step shells out to, with the package providing each.
pub const REQUIRED_TOOLS: &[(&str, &str)] = &[
    ("ar", "binutils"),
    ("tar", "tar"),
    ("xz", "xz-utils"),
];

pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Probes every tool before reporting, so the user gets the full list in one pass.
pub fn check_required_tools(tools: &[(&str, &str)]) -> Result<(), Failure> {
    let missing: Vec<MissingTool> = tools
        .iter()
        .filter(|(cmd, _)| !command_exists(cmd))
        .map(|(cmd, package)| MissingTool {
            command: cmd.to_string(),
            package: package.to_string(),
        })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Failure::MissingDependencies(missing))
    }
}

/// Suggested install command for a list of missing tools.
pub fn install_hint(missing: &[MissingTool]) -> String {
    let mut packages: Vec<&str> = missing.iter().map(|t| t.package.as_str()).collect();
    packages.dedup();
    format!("sudo apt install {}", packages.join(" "))
}

fn is_input_package(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.starts_with("stacher") && lower.ends_with(".deb")
}

/// Locates the single `stacher*.deb` (case-insensitive) in `dir`.
/// Symlinks count when they resolve to a regular file.
pub fn find_input_package(dir: &Path) -> Result<PathBuf, Failure> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_str().map(is_input_package).unwrap_or(false))
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    candidates.sort();

    match candidates.len() {
        0 => Err(Failure::NoInput(dir.to_path_buf())),
        1 => Ok(candidates.remove(0)),
        _ => Err(Failure::AmbiguousInput(candidates)),
    }
}
