//! src/arch.rs
//! Host architecture detection and comparison against the package's declared architecture.

use crate::error::Failure;
use anyhow::Context;
use std::fs;
use std::path::Path;

/// Kernel machine name -> Debian architecture name.
pub const ARCH_TABLE: &[(&str, &str)] = &[
    ("x86_64", "amd64"),
    ("aarch64", "arm64"),
];

const ARCH_FIELD: &str = "Architecture:";

/// The host architecture in both spellings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostArch {
    /// As reported by the kernel (`uname -m`), used in AppImage file names.
    pub kernel: String,
    /// As used by Debian packages.
    pub package: String,
}

impl HostArch {
    pub fn from_kernel(kernel: &str) -> Result<Self, Failure> {
        ARCH_TABLE
            .iter()
            .find(|(k, _)| *k == kernel)
            .map(|(k, p)| HostArch { kernel: k.to_string(), package: p.to_string() })
            .ok_or_else(|| Failure::UnsupportedHost(kernel.to_string()))
    }

    pub fn detect() -> Result<Self, Failure> {
        let uts = nix::sys::utsname::uname().context("querying host machine via uname")?;
        Self::from_kernel(&uts.machine().to_string_lossy())
    }
}

/// Reads the `Architecture:` field from a Debian control file's text.
pub fn declared_arch(control: &str) -> Option<String> {
    control
        .lines()
        .find_map(|line| line.strip_prefix(ARCH_FIELD))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn declared_arch_from_file(path: &Path) -> anyhow::Result<String> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading control file {}", path.display()))?;
    declared_arch(&content)
        .with_context(|| format!("no '{}' field in {}", ARCH_FIELD, path.display()))
}

/// Exact equality is the only success; there is no notion of compatible architectures.
pub fn verify(declared: &str, host: &HostArch) -> Result<(), Failure> {
    if declared == host.package {
        Ok(())
    } else {
        Err(Failure::ArchMismatch {
            declared: declared.to_string(),
            host: host.package.clone(),
        })
    }
}
