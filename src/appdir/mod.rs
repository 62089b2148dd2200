//! src/appdir/mod.rs
//! Builds the AppDir from an extracted payload.
//!
//! The source paths in [`AppLayout`] are a contract with the upstream package layout.
//! If upstream moves a file, assembly fails on the missing source instead of producing
//! a partial AppDir.

pub mod launcher;

use anyhow::{bail, Context, Result};
use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Where things live in the payload and what they are called in the AppDir.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Display name, also the AppDir and image name stem.
    pub name: &'static str,
    /// Launch name: the main binary, and the stem of the desktop file and icon.
    pub binary: &'static str,
    pub sandbox_helper: &'static str,
    /// Flag prepended to the application's arguments by the launcher.
    pub launch_flag: &'static str,
    pub app_tree: &'static str,
    pub desktop_file: &'static str,
    pub icon_file: &'static str,
}

pub const STACHER7: AppLayout = AppLayout {
    name: "Stacher7",
    binary: "stacher7",
    sandbox_helper: "chrome-sandbox",
    launch_flag: "--no-sandbox",
    app_tree: "opt/Stacher7",
    desktop_file: "usr/share/applications/stacher7.desktop",
    icon_file: "usr/share/icons/hicolor/256x256/apps/stacher7.png",
};

impl AppLayout {
    pub fn appdir_name(&self) -> String {
        format!("{}.AppDir", self.name)
    }

    pub fn desktop_name(&self) -> String {
        format!("{}.desktop", self.binary)
    }

    pub fn icon_name(&self) -> String {
        let ext = Path::new(self.icon_file)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png");
        format!("{}.{}", self.binary, ext)
    }

    /// File name the packaging tool gives the finished image.
    pub fn image_name(&self, kernel_arch: &str) -> String {
        format!("{}-{}.AppImage", self.name, kernel_arch)
    }
}

/// Paths of the assembled AppDir's top-level entries.
#[derive(Debug, Clone)]
pub struct AppDir {
    pub root: PathBuf,
    pub desktop: PathBuf,
    pub icon: PathBuf,
}

fn require(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("Payload layout changed: '{}' not found", path.display());
    }
    Ok(())
}

/// Copies the contents of `src` into the existing directory `dest`.
pub fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.with_context(|| format!("walking {}", src.display()))?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dest.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            let link = fs::read_link(entry.path())?;
            symlink(&link, &target)
                .with_context(|| format!("linking {} -> {}", target.display(), link.display()))?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("copying {}", entry.path().display()))?;
        }
    }
    Ok(())
}

/// Creates `dest` (which must not exist) and fills it from the payload extracted at `payload_root`.
pub fn assemble(layout: &AppLayout, payload_root: &Path, dest: &Path) -> Result<AppDir> {
    let app_tree = payload_root.join(layout.app_tree);
    let desktop_src = payload_root.join(layout.desktop_file);
    let icon_src = payload_root.join(layout.icon_file);
    for src in [&app_tree, &desktop_src, &icon_src] {
        require(src)?;
    }

    fs::create_dir(dest).with_context(|| format!("creating {}", dest.display()))?;

    copy_tree(&app_tree, dest)?;

    let appdir = AppDir {
        root: dest.to_path_buf(),
        desktop: dest.join(layout.desktop_name()),
        icon: dest.join(layout.icon_name()),
    };
    fs::copy(&desktop_src, &appdir.desktop)
        .with_context(|| format!("copying {}", desktop_src.display()))?;
    fs::copy(&icon_src, &appdir.icon)
        .with_context(|| format!("copying {}", icon_src.display()))?;

    Ok(appdir)
}
