//! src/unpack.rs
//! Unpacks a .deb: the outer `ar` container first, then its xz-compressed tar members.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const CONTROL_MEMBER: &str = "control.tar.xz";
pub const DATA_MEMBER: &str = "data.tar.xz";
/// Subdirectory the metadata archive is extracted into, away from the payload tree.
pub const CONTROL_DIR: &str = "DEBIAN";

/// The member archives found inside the outer container.
#[derive(Debug, Clone)]
pub struct DebMembers {
    pub control: PathBuf,
    pub data: PathBuf,
}

fn run(cmd: &mut Command) -> Result<()> {
    let program = cmd.get_program().to_string_lossy().to_string();
    let output = cmd
        .output()
        .with_context(|| format!("failed to start '{}'", program))?;
    if !output.status.success() {
        bail!(
            "'{}' failed ({}): {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

/// Extracts every member of `deb` into `dest`.
pub fn extract_container(deb: &Path, dest: &Path) -> Result<DebMembers> {
    if !deb.exists() {
        bail!("Source file not found: {}", deb.display());
    }
    run(Command::new("ar").arg("x").arg(deb).current_dir(dest))
        .with_context(|| format!("unpacking {}", deb.display()))?;

    let members = DebMembers {
        control: dest.join(CONTROL_MEMBER),
        data: dest.join(DATA_MEMBER),
    };
    for member in [&members.control, &members.data] {
        if !member.is_file() {
            bail!(
                "Invalid package: '{}' not found in {}",
                member.file_name().unwrap_or_default().to_string_lossy(),
                deb.display()
            );
        }
    }
    Ok(members)
}

fn extract_tar_xz(archive: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)?;
    run(Command::new("tar").arg("-xJf").arg(archive).arg("-C").arg(dest))
        .with_context(|| format!("extracting {}", archive.display()))
}

/// Extracts the metadata archive into `<workdir>/DEBIAN` and returns the control file path.
pub fn extract_control(members: &DebMembers, workdir: &Path) -> Result<PathBuf> {
    let dir = workdir.join(CONTROL_DIR);
    extract_tar_xz(&members.control, &dir)?;
    let control = dir.join("control");
    if !control.is_file() {
        bail!("Invalid package: metadata archive has no 'control' file");
    }
    Ok(control)
}

/// Extracts the payload archive into `workdir`, recreating the package's filesystem layout.
pub fn extract_payload(members: &DebMembers, workdir: &Path) -> Result<()> {
    extract_tar_xz(&members.data, workdir)
}
