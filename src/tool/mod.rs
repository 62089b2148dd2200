//! src/tool/mod.rs
//! Locates the packaging tool, downloading the latest release when it is not cached.

pub mod download;

use crate::arch::HostArch;
use crate::config::AppConfig;
use crate::error::Failure;
use crate::ui::{self, Answer};
use colored::*;
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub const TOOL_NAME: &str = "appimagetool";
pub const RELEASES_PAGE: &str = "https://github.com/AppImage/appimagetool/releases";

pub fn tool_file_name(host: &HostArch) -> String {
    format!("{}-{}.AppImage", TOOL_NAME, host.kernel)
}

/// Returns the cached tool in `tool_dir`, or asks before downloading it there.
///
/// `ask` is only consulted when the tool is absent.
pub fn ensure_tool<F>(cfg: &AppConfig, tool_dir: &Path, host: &HostArch, ask: F) -> Result<PathBuf, Failure>
where
    F: FnOnce(&str) -> io::Result<Answer>,
{
    let path = tool_dir.join(tool_file_name(host));
    if path.is_file() {
        ensure_executable(&path)?;
        return Ok(path);
    }

    let question = format!("{} was not found in {}. Download it now?", TOOL_NAME, tool_dir.display());
    if ask(&question)? == Answer::No {
        return Err(Failure::ToolAcquisition {
            reason: format!("{} is required to build the image; download declined", TOOL_NAME),
            declined: true,
        });
    }

    acquire(cfg, host, &path)?;
    Ok(path)
}

/// Queries the release endpoint, downloads the asset for `host` and installs it at `dest`.
///
/// The bytes land in a hidden `.part` file next to `dest`, which is only renamed into
/// place once the checksum matches and the mode is set. An interrupted download never
/// leaves a file under the final name.
pub fn acquire(cfg: &AppConfig, host: &HostArch, dest: &Path) -> Result<(), Failure> {
    let client = download::client(&cfg.user_agent)
        .map_err(|e| Failure::acquisition(format!("could not create HTTP client: {}", e)))?;

    let pb = ui::spinner(format!("Querying latest {} release...", TOOL_NAME));
    let release = download::fetch_release(&client, &cfg.release_url);
    pb.finish_and_clear();
    let release = release
        .map_err(|e| Failure::acquisition(format!("failed to query {}: {}", cfg.release_url, e)))?;

    let asset = release.find_asset(TOOL_NAME, &host.kernel).ok_or_else(|| {
        Failure::acquisition(format!(
            "no {} download for {} in release '{}'",
            TOOL_NAME, host.kernel, release.tag_name
        ))
    })?;

    let dir = dest.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let final_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| Failure::acquisition(format!("invalid tool path {}", dest.display())))?;
    let partial_prefix = format!(".{}.", final_name);
    sweep_partials(dir, &partial_prefix);

    // Removed on drop unless persisted.
    let mut partial = tempfile::Builder::new()
        .prefix(&partial_prefix)
        .suffix(PARTIAL_SUFFIX)
        .tempfile_in(dir)
        .map_err(|e| Failure::acquisition(format!("could not create a file in {}: {}", dir.display(), e)))?;

    println!("Downloading {}...", asset.browser_download_url.cyan());
    download::download_file_with_progress(&client, &asset.browser_download_url, partial.as_file_mut())
        .map_err(|e| Failure::acquisition(format!("download failed: {}", e)))?;
    partial
        .as_file()
        .sync_all()
        .map_err(|e| Failure::acquisition(format!("could not write {}: {}", partial.path().display(), e)))?;

    finish_download(asset, partial.path())?;

    partial.persist(dest).map_err(|e| {
        Failure::acquisition(format!("could not move download to {}: {}", dest.display(), e.error))
    })?;
    Ok(())
}

const PARTIAL_SUFFIX: &str = ".part";

/// Removes leftovers of earlier downloads that were killed before finishing.
fn sweep_partials(dir: &Path, prefix: &str) {
    let Ok(entries) = fs::read_dir(dir) else { return };
    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(prefix) && name.ends_with(PARTIAL_SUFFIX) {
            if let Err(e) = fs::remove_file(entry.path()) {
                ui::warn(&format!("could not remove stale download {}: {}", entry.path().display(), e));
            }
        }
    }
}

fn finish_download(asset: &download::ReleaseAsset, downloaded: &Path) -> Result<(), Failure> {
    if let Some(expected) = asset.sha256() {
        let actual = download::sha256_file(downloaded)
            .map_err(|e| Failure::acquisition(format!("could not hash {}: {}", downloaded.display(), e)))?;
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(Failure::acquisition(format!(
                "checksum mismatch for {}: expected {}, got {}",
                asset.name, expected, actual
            )));
        }
    }
    mark_executable(downloaded)
}

/// A cached tool copied in without its execute bits would otherwise fail at build time.
fn ensure_executable(path: &Path) -> Result<(), Failure> {
    let mode = fs::metadata(path)
        .map_err(|e| Failure::acquisition(format!("could not inspect {}: {}", path.display(), e)))?
        .permissions()
        .mode();
    if mode & 0o111 == 0 {
        ui::warn(&format!("{} is not executable, marking it 0755", path.display()));
        mark_executable(path)?;
    }
    Ok(())
}

fn mark_executable(path: &Path) -> Result<(), Failure> {
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .map_err(|e| Failure::acquisition(format!("could not mark {} executable: {}", path.display(), e)))
}
