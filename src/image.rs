//! src/image.rs
//! Runs the packaging tool over the assembled AppDir.

use crate::appdir::AppLayout;
use crate::arch::HostArch;
use crate::error::Failure;
use anyhow::Context;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Name of the stray file the packaging tool may leave next to the image.
pub fn incidental_artifact(layout: &AppLayout, host: &HostArch) -> String {
    format!("{}.zsync", layout.image_name(&host.kernel))
}

/// Builds the image into `out_dir` and returns its path when the tool produced the expected file.
pub fn build_image(
    tool: &Path,
    appdir: &Path,
    out_dir: &Path,
    layout: &AppLayout,
    host: &HostArch,
) -> Result<Option<PathBuf>, Failure> {
    let appdir = fs::canonicalize(appdir)
        .with_context(|| format!("resolving {}", appdir.display()))?;

    let status = Command::new(tool)
        .arg(&appdir)
        .current_dir(out_dir)
        .env("ARCH", &host.kernel)
        .status()
        .map_err(|e| Failure::ToolFailed(format!("could not run {}: {}", tool.display(), e)))?;
    if !status.success() {
        return Err(Failure::ToolFailed(format!("{} exited with {}", tool.display(), status)));
    }

    remove_if_present(&out_dir.join(incidental_artifact(layout, host)))?;

    let image = out_dir.join(layout.image_name(&host.kernel));
    Ok(image.is_file().then_some(image))
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
